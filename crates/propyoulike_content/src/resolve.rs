//! Project resolution.
//!
//! Turns a public slug into one validated project object:
//!
//! 1. locate the identity file for the slug
//! 2. load and validate the builder config
//! 3. for every section: global default, then builder default, then the
//!    project's own data, deep-merged in that order
//! 4. seed `aboutBuilder`, attach `builderConfig`, concatenate FAQ tiers
//! 5. validate against the project schema (hard fail)
//! 6. attach related projects from the index
//!
//! Results are memoized in a [`ResolveCache`] owned by the resolver, so one
//! build resolves each slug once.

use crate::config::{BuilderConfig, SiteConfig};
use crate::error::{ContentError, ContentResult};
use crate::expr::{Scope, Template};
use crate::faq;
use crate::index::ProjectIndex;
use crate::merge::{deep_merge, merge_tiers};
use crate::related::{self, Subject};
use crate::store::{ContentStore, Identity};
use indexmap::IndexMap;
use propyoulike_core::{BuilderId, ProjectSlug};
use propyoulike_schema::{BatchReport, Schema, Validator, project_schema};
use serde_json::{Map, Value};
use std::collections::HashMap;

type Defaults = IndexMap<String, Template>;

fn parse_defaults(defaults: &Map<String, Value>) -> ContentResult<Defaults> {
    defaults
        .iter()
        .map(|(name, raw)| Ok((name.clone(), Template::parse(raw)?)))
        .collect()
}

/// A fully merged, validated project
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProject {
    slug: ProjectSlug,
    data: Value,
}

impl ResolvedProject {
    /// Public slug
    #[must_use]
    pub fn slug(&self) -> &ProjectSlug {
        &self.slug
    }

    /// Merged project object
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consume into the merged object
    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }

    /// String at a dotted path, ignoring blanks
    #[must_use]
    pub fn text(&self, path: &str) -> Option<&str> {
        path.split('.')
            .try_fold(&self.data, |value, key| value.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// `projectName`
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.text("projectName").unwrap_or_default()
    }
}

/// Per-build memo of resolved projects
#[derive(Debug, Default)]
pub struct ResolveCache {
    entries: HashMap<ProjectSlug, ResolvedProject>,
}

impl ResolveCache {
    /// Cached project
    #[must_use]
    pub fn get(&self, slug: &ProjectSlug) -> Option<&ResolvedProject> {
        self.entries.get(slug)
    }

    /// Store a project
    pub fn insert(&mut self, project: ResolvedProject) {
        self.entries.insert(project.slug.clone(), project);
    }

    /// Number of cached projects
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

struct BuilderEntry {
    config: BuilderConfig,
    defaults: Defaults,
}

/// Project resolver for one build
pub struct Resolver {
    store: ContentStore,
    site: SiteConfig,
    index: ProjectIndex,
    schema: Schema,
    validator: Validator,
    global_defaults: Defaults,
    universal_faq: Vec<faq::FaqEntry>,
    builders: HashMap<BuilderId, BuilderEntry>,
    cache: ResolveCache,
}

impl Resolver {
    /// Create a resolver; global defaults and the universal FAQ load once here
    ///
    /// # Errors
    ///
    /// Returns error if a global default template or the universal FAQ is malformed
    pub fn new(store: ContentStore, site: SiteConfig, index: ProjectIndex) -> ContentResult<Self> {
        let global_defaults = parse_defaults(&site.section_defaults)?;
        let universal_faq = store.universal_faq()?;
        Ok(Self {
            store,
            site,
            index,
            schema: project_schema(),
            validator: Validator::publish(),
            global_defaults,
            universal_faq,
            builders: HashMap::new(),
            cache: ResolveCache::default(),
        })
    }

    /// Content store
    #[must_use]
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Site config
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Project index
    #[must_use]
    pub fn index(&self) -> &ProjectIndex {
        &self.index
    }

    /// Resolution cache
    #[must_use]
    pub fn cache(&self) -> &ResolveCache {
        &self.cache
    }

    /// Builder config, loaded and validated once per build
    ///
    /// # Errors
    ///
    /// Returns error if the builder config is missing or invalid
    pub fn builder_config(&mut self, builder: &BuilderId) -> ContentResult<&BuilderConfig> {
        self.builder_entry(builder).map(|entry| &entry.config)
    }

    fn builder_entry(&mut self, builder: &BuilderId) -> ContentResult<&BuilderEntry> {
        if !self.builders.contains_key(builder) {
            let config = self.store.builder_config(builder)?;
            let defaults = parse_defaults(&config.section_defaults)?;
            self.builders
                .insert(builder.clone(), BuilderEntry { config, defaults });
        }
        self.builders
            .get(builder)
            .ok_or_else(|| ContentError::NotFound {
                kind: "builder config".to_string(),
                path: builder.to_string(),
            })
    }

    /// Resolve a public slug into a validated project
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` for unknown slugs, `Schema` if the merged
    /// object fails validation, and load errors otherwise
    pub fn resolve(&mut self, slug: &str) -> ContentResult<ResolvedProject> {
        let parsed = ProjectSlug::parse(slug).map_err(|_| ContentError::ProjectNotFound {
            slug: slug.to_string(),
        })?;
        if let Some(hit) = self.cache.get(&parsed) {
            return Ok(hit.clone());
        }

        let identity = self.store.find_identity(&parsed)?;
        let merged = self.merge(&identity)?;
        let mut data = self.validator.parse(&self.schema, merged)?;

        let priority = identity.related_priority();
        let related = related::compute(
            &self.index,
            &Subject {
                slug,
                builder: parsed.builder().as_str(),
                city: identity.str_field("city"),
                locality: identity.str_field("locality"),
            },
            &priority,
            self.site.max_related,
        );
        if let Value::Object(map) = &mut data {
            map.insert(
                "related".to_string(),
                serde_json::to_value(&related).map_err(|e| ContentError::InvalidJson {
                    path: identity.path.display().to_string(),
                    source: e.into(),
                })?,
            );
        }

        tracing::debug!(project = %parsed, "resolved");
        let project = ResolvedProject { slug: parsed, data };
        self.cache.insert(project.clone());
        Ok(project)
    }

    /// Merge a project without validating it
    ///
    /// # Errors
    ///
    /// Returns error if any tier fails to load or a default fails to evaluate
    pub fn merge(&mut self, identity: &Identity) -> ContentResult<Value> {
        let builder_id = identity.slug.builder().clone();
        self.builder_entry(&builder_id)?;
        let Some(builder) = self.builders.get(&builder_id) else {
            return Err(ContentError::NotFound {
                kind: "builder config".to_string(),
                path: builder_id.to_string(),
            });
        };
        let store = &self.store;
        let global_defaults = &self.global_defaults;

        let site_value = serde_json::to_value(&self.site).map_err(|e| ContentError::InvalidJson {
            path: "global/site.json".to_string(),
            source: e.into(),
        })?;
        let builder_faq = store.builder_faq(&builder_id)?;
        let project_faq = store.project_faq(identity)?;

        let builder_value =
            serde_json::to_value(&builder.config).map_err(|e| ContentError::InvalidJson {
                path: builder_id.to_string(),
                source: e.into(),
            })?;
        let mut context = Map::new();
        context.insert("site".to_string(), site_value);
        context.insert("builder".to_string(), builder_value);
        let context = Value::Object(context);
        let project = Value::Object(identity.fields.clone());
        let scope = Scope {
            context: &context,
            project: &project,
        };

        let mut names = identity.section_names();
        names.extend(global_defaults.keys().cloned());
        names.extend(builder.defaults.keys().cloned());

        let mut merged = identity.fields.clone();
        for name in &names {
            let global = match global_defaults.get(name) {
                Some(template) => template.eval(&scope)?,
                None => Value::Null,
            };
            let builder_tier = match builder.defaults.get(name) {
                Some(template) => template.eval(&scope)?,
                None => Value::Null,
            };
            let inline = identity.fields.get(name).cloned().unwrap_or(Value::Null);
            let file = store.section(identity, name)?.unwrap_or(Value::Null);
            let value = merge_tiers([global, builder_tier, deep_merge(inline, file)]);
            if !value.is_null() {
                merged.insert(name.clone(), value);
            }
        }

        let about = builder.config.about();
        let seeded = match merged.remove("aboutBuilder") {
            Some(authored) => deep_merge(about, authored),
            None => about,
        };
        merged.insert("aboutBuilder".to_string(), seeded);
        merged.insert("builderConfig".to_string(), builder.config.presentation());

        let faq = faq::merge(self.universal_faq.clone(), builder_faq, project_faq);
        merged.insert(
            "faq".to_string(),
            serde_json::to_value(&faq).map_err(|e| ContentError::InvalidJson {
                path: identity.path.display().to_string(),
                source: e.into(),
            })?,
        );

        Ok(Value::Object(merged))
    }

    /// Merge and validate every indexed project in report mode
    ///
    /// Never aborts: load failures and skipped identities become invalid rows.
    pub fn report(&mut self) -> BatchReport {
        let mut report = BatchReport::default();
        for skipped in self.index.skipped() {
            report.push_failure(skipped.path.clone(), skipped.error.to_string());
        }
        let slugs: Vec<String> = self.index.entries().iter().map(|e| e.slug.clone()).collect();
        for slug in slugs {
            let merged = ProjectSlug::parse(&slug)
                .map_err(|_| ContentError::ProjectNotFound { slug: slug.clone() })
                .and_then(|parsed| self.store.find_identity(&parsed))
                .and_then(|identity| self.merge(&identity));
            match merged {
                Ok(value) => {
                    let rows = self.validator.report(&self.schema, [(slug, value)]);
                    report.rows.extend(rows.rows);
                }
                Err(error) => report.push_failure(slug, error.to_string()),
            }
        }
        report
    }
}
