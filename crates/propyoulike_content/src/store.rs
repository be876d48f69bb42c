//! On-disk content store.
//!
//! Layout:
//!
//! ```text
//! <root>/global/site.json
//! <root>/global/faq.json
//! <root>/global/shell.html
//! <root>/legal/<slug>.json
//! <root>/projects/<builder>/aboutbuilder.json
//! <root>/projects/<builder>/faq.json
//! <root>/projects/<builder>/<project>/index.json
//! ```
//!
//! All reads are synchronous and side-effect free.

use crate::config::{BuilderConfig, SiteConfig};
use crate::error::{ContentError, ContentResult};
use crate::faq::{self, FaqEntry, FaqLevel};
use indexmap::{IndexMap, IndexSet};
use propyoulike_core::{BuilderId, CoreError, ProjectSlug, SlugError};
use propyoulike_schema::{KNOWN_SECTIONS, Validator, builder_schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IDENTITY_FILE: &str = "index.json";
const BUILDER_FILE: &str = "aboutbuilder.json";
const FAQ_FILE: &str = "faq.json";

/// Read and parse a JSON file
///
/// # Errors
///
/// Returns `NotFound` if the file is absent, `InvalidJson` if it does not parse
pub fn read_json(path: &Path, kind: &str) -> ContentResult<Value> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ContentError::NotFound {
            kind: kind.to_string(),
            path: path.display().to_string(),
        },
        _ => ContentError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })?;
    serde_json::from_str(&text).map_err(|e| ContentError::InvalidJson {
        path: path.display().to_string(),
        source: e.into(),
    })
}

fn read_optional_json(path: &Path, kind: &str) -> ContentResult<Option<Value>> {
    match read_json(path, kind) {
        Ok(value) => Ok(Some(value)),
        Err(ContentError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn invalid_shape(path: &Path, message: &str) -> ContentError {
    ContentError::InvalidJson {
        path: path.display().to_string(),
        source: CoreError::InvalidJson {
            message: message.to_string(),
        },
    }
}

/// Treat `{"<section>": X}` as `X`.
fn unwrap_envelope(name: &str, value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.contains_key(name) => {
            map.remove(name).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// A project's identity file
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Public slug
    pub slug: ProjectSlug,
    /// Path of `index.json`
    pub path: PathBuf,
    /// Project directory
    pub dir: PathBuf,
    /// Identity fields, manifest keys removed, `slug`/`builder` canonicalized
    pub fields: Map<String, Value>,
    /// Section manifest: section name -> path relative to `dir`
    pub manifest: IndexMap<String, String>,
    /// Project FAQ tier file, relative to `dir`
    pub faq_file: String,
}

impl Identity {
    /// Build an identity from its parsed JSON
    ///
    /// # Errors
    ///
    /// Returns error if the shape is wrong, the builder field disagrees with
    /// the directory, or the slug cannot be derived
    pub fn from_value(builder: &BuilderId, dir: &Path, value: Value) -> ContentResult<Self> {
        let path = dir.join(IDENTITY_FILE);
        let Value::Object(mut fields) = value else {
            return Err(invalid_shape(&path, "identity must be a JSON object"));
        };

        if let Some(declared) = fields.get("builder").and_then(Value::as_str) {
            let declared_id = BuilderId::parse(declared).map_err(|source| ContentError::InvalidId {
                path: path.display().to_string(),
                source,
            })?;
            if &declared_id != builder {
                return Err(ContentError::BuilderMismatch {
                    path: path.display().to_string(),
                    declared: declared.to_string(),
                    directory: builder.to_string(),
                });
            }
        }

        let dir_name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let token = fields
            .get("slug")
            .and_then(Value::as_str)
            .map_or(dir_name, str::to_string);
        let slug = ProjectSlug::new(builder.clone(), &token).map_err(|source| {
            ContentError::InvalidId {
                path: path.display().to_string(),
                source,
            }
        })?;

        let mut manifest = IndexMap::new();
        match fields.remove("sections") {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (name, file) in entries {
                    let Value::String(file) = file else {
                        return Err(invalid_shape(&path, "section manifest values must be paths"));
                    };
                    manifest.insert(name, file);
                }
            }
            Some(_) => return Err(invalid_shape(&path, "sections must be an object")),
        }

        // `faq` names the project FAQ file; `faqFile` is accepted as an alias
        let mut faq_file = FAQ_FILE.to_string();
        for key in ["faqFile", "faq"] {
            if let Some(Value::String(file)) = fields.get(key) {
                faq_file = file.clone();
                fields.remove(key);
            }
        }

        fields.insert("slug".to_string(), Value::String(slug.to_string()));
        fields.insert("builder".to_string(), Value::String(builder.to_string()));

        Ok(Self {
            slug,
            path,
            dir: dir.to_path_buf(),
            fields,
            manifest,
            faq_file,
        })
    }

    /// Display name: `projectName`, falling back to the slug
    #[must_use]
    pub fn display_name(&self) -> String {
        self.str_field("projectName")
            .map_or_else(|| self.slug.to_string(), str::to_string)
    }

    /// String field by name
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Section names to load: manifest order, then conventional names
    #[must_use]
    pub fn section_names(&self) -> IndexSet<String> {
        let mut names: IndexSet<String> = self.manifest.keys().cloned().collect();
        names.extend(KNOWN_SECTIONS.iter().map(|s| (*s).to_string()));
        names
    }

    /// Explicit related-project priority list
    #[must_use]
    pub fn related_priority(&self) -> Vec<String> {
        self.fields
            .get("relatedProjects")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Legal page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalPage {
    /// Page slug (file stem)
    pub slug: String,
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Page body
    #[serde(default)]
    pub body: Value,
}

/// Filesystem content store
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open a content store rooted at `root`
    ///
    /// # Errors
    ///
    /// Returns error if the root or its `projects/` directory is missing
    pub fn open(root: impl Into<PathBuf>) -> ContentResult<Self> {
        let root = root.into();
        if !root.join("projects").is_dir() {
            return Err(ContentError::NotFound {
                kind: "content store".to_string(),
                path: root.join("projects").display().to_string(),
            });
        }
        Ok(Self { root })
    }

    /// Store root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    /// Static assets copied verbatim into the output
    #[must_use]
    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    /// Global brand config; defaults when `global/site.json` is absent
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but is malformed
    pub fn site_config(&self) -> ContentResult<SiteConfig> {
        let path = self.root.join("global").join("site.json");
        match read_optional_json(&path, "site config")? {
            Some(value) => serde_json::from_value(value)
                .map(SiteConfig::normalized)
                .map_err(|e| ContentError::InvalidJson {
                    path: path.display().to_string(),
                    source: e.into(),
                }),
            None => {
                tracing::warn!(path = %path.display(), "no site config, using defaults");
                Ok(SiteConfig::default())
            }
        }
    }

    /// Custom HTML shell, if authored
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read
    pub fn shell(&self) -> ContentResult<Option<String>> {
        let path = self.root.join("global").join("shell.html");
        match fs::read_to_string(&path) {
            Ok(html) => Ok(Some(html)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ContentError::Io {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Universal FAQ tier
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but is malformed
    pub fn universal_faq(&self) -> ContentResult<Vec<FaqEntry>> {
        let path = self.root.join("global").join(FAQ_FILE);
        self.faq_tier(&path, FaqLevel::Universal)
    }

    /// Builder FAQ tier
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but is malformed
    pub fn builder_faq(&self, builder: &BuilderId) -> ContentResult<Vec<FaqEntry>> {
        let path = self.projects_dir().join(builder.as_str()).join(FAQ_FILE);
        self.faq_tier(&path, FaqLevel::Builder)
    }

    /// Project FAQ tier
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but is malformed
    pub fn project_faq(&self, identity: &Identity) -> ContentResult<Vec<FaqEntry>> {
        let path = identity.dir.join(&identity.faq_file);
        self.faq_tier(&path, FaqLevel::Project)
    }

    fn faq_tier(&self, path: &Path, level: FaqLevel) -> ContentResult<Vec<FaqEntry>> {
        match read_optional_json(path, "faq")? {
            Some(value) => faq::parse_tier(value, level, &path.display().to_string()),
            None => Ok(Vec::new()),
        }
    }

    /// All builder ids, sorted
    ///
    /// # Errors
    ///
    /// Returns error if a builder directory name is not a canonical dash-free id
    pub fn builders(&self) -> ContentResult<Vec<BuilderId>> {
        let mut builders = Vec::new();
        for name in self.subdirectories(&self.projects_dir())? {
            let path = self.projects_dir().join(&name);
            let id = BuilderId::parse(&name).map_err(|source| ContentError::InvalidId {
                path: path.display().to_string(),
                source,
            })?;
            if id.as_str() != name {
                return Err(ContentError::InvalidId {
                    path: path.display().to_string(),
                    source: SlugError::NotCanonical {
                        slug: name,
                        expected: id.to_string(),
                    },
                });
            }
            builders.push(id);
        }
        Ok(builders)
    }

    /// Builder config, validated against the builder schema
    ///
    /// # Errors
    ///
    /// Returns error if `aboutbuilder.json` is missing, malformed, or fails its schema
    pub fn builder_config(&self, builder: &BuilderId) -> ContentResult<BuilderConfig> {
        let path = self.projects_dir().join(builder.as_str()).join(BUILDER_FILE);
        let value = read_json(&path, "builder config")?;
        let value = Validator::publish().parse(&builder_schema(), value)?;
        serde_json::from_value(value).map_err(|e| ContentError::InvalidJson {
            path: path.display().to_string(),
            source: e.into(),
        })
    }

    /// Every identity file under `projects/<builder>/<project>/`, sorted
    #[must_use]
    pub fn identity_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(self.projects_dir())
            .min_depth(3)
            .max_depth(3)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && e.file_name() == IDENTITY_FILE)
            .map(walkdir::DirEntry::into_path)
            .collect();
        files.sort();
        files
    }

    /// Load the identity in `projects/<builder>/<project_dir>/`
    ///
    /// # Errors
    ///
    /// Returns error if the identity file is missing or invalid
    pub fn identity(&self, builder: &BuilderId, project_dir: &str) -> ContentResult<Identity> {
        let dir = self.projects_dir().join(builder.as_str()).join(project_dir);
        let value = read_json(&dir.join(IDENTITY_FILE), "identity")?;
        Identity::from_value(builder, &dir, value)
    }

    /// Load an identity from its file path
    ///
    /// # Errors
    ///
    /// Returns error if the path is not inside a builder directory or the identity is invalid
    pub fn identity_at(&self, path: &Path) -> ContentResult<Identity> {
        let dir = path.parent().unwrap_or(path);
        let builder_name = dir
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let builder = BuilderId::parse(builder_name).map_err(|source| ContentError::InvalidId {
            path: path.display().to_string(),
            source,
        })?;
        let value = read_json(path, "identity")?;
        Identity::from_value(&builder, dir, value)
    }

    /// Locate the identity whose derived slug equals `slug`
    ///
    /// Tries the directory named after the project token first, then scans
    /// the builder's other project directories.
    ///
    /// # Errors
    ///
    /// Returns `ProjectNotFound` if no identity derives this slug
    pub fn find_identity(&self, slug: &ProjectSlug) -> ContentResult<Identity> {
        let not_found = || ContentError::ProjectNotFound {
            slug: slug.to_string(),
        };
        let builder_dir = self.projects_dir().join(slug.builder().as_str());
        if !builder_dir.is_dir() {
            return Err(not_found());
        }

        if builder_dir.join(slug.project()).join(IDENTITY_FILE).is_file() {
            let identity = self.identity(slug.builder(), slug.project())?;
            if &identity.slug == slug {
                return Ok(identity);
            }
        }

        for dir in self.subdirectories(&builder_dir)? {
            if dir == slug.project() {
                continue;
            }
            if let Ok(identity) = self.identity(slug.builder(), &dir) {
                if &identity.slug == slug {
                    return Ok(identity);
                }
            }
        }
        Err(not_found())
    }

    /// Load one section for a project.
    ///
    /// Looks up the manifest path first, then the conventional sibling file
    /// `<section>.json`. A file wrapping its content in a single key named
    /// after the section is unwrapped.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if a section declared in the manifest has no file
    pub fn section(&self, identity: &Identity, name: &str) -> ContentResult<Option<Value>> {
        let declared = identity.manifest.get(name).map(|file| identity.dir.join(file));
        let fallback = identity.dir.join(format!("{}.json", name));

        for candidate in declared.iter().chain(std::iter::once(&fallback)) {
            if let Some(value) = read_optional_json(candidate, "section")? {
                return Ok(Some(unwrap_envelope(name, value)));
            }
        }

        match declared {
            Some(path) => Err(ContentError::NotFound {
                kind: "section".to_string(),
                path: path.display().to_string(),
            }),
            None => Ok(None),
        }
    }

    /// All legal pages, sorted by slug
    ///
    /// # Errors
    ///
    /// Returns error if a legal file is malformed
    pub fn legal_pages(&self) -> ContentResult<Vec<LegalPage>> {
        let dir = self.root.join("legal");
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut files: Vec<PathBuf> = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .map(walkdir::DirEntry::into_path)
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut pages = Vec::with_capacity(files.len());
        for path in files {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default();
            let slug = propyoulike_core::normalize(stem);
            let mut value = read_json(&path, "legal page")?;
            if let Value::Object(map) = &mut value {
                map.insert("slug".to_string(), Value::String(slug));
            }
            let page: LegalPage =
                serde_json::from_value(value).map_err(|e| ContentError::InvalidJson {
                    path: path.display().to_string(),
                    source: e.into(),
                })?;
            pages.push(page);
        }
        Ok(pages)
    }

    fn subdirectories(&self, dir: &Path) -> ContentResult<Vec<String>> {
        let entries = fs::read_dir(dir).map_err(|e| ContentError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{sample, write};
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, ContentStore) {
        let dir = TempDir::new().unwrap();
        sample(dir.path());
        let store = ContentStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_requires_projects_dir() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ContentStore::open(dir.path()),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_builders_sorted() {
        let (_dir, store) = store();
        let builders: Vec<String> = store.builders().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(builders, vec!["acme", "zen"]);
    }

    #[test]
    fn test_builder_with_dash_is_rejected() {
        let (dir, store) = store();
        write(dir.path(), "projects/prestige-group/aboutbuilder.json", &json!({"name": "P"}));
        let err = store.builders().unwrap_err();
        assert!(matches!(
            err,
            ContentError::InvalidId {
                source: SlugError::BuilderContainsDash { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_identity_files_found() {
        let (_dir, store) = store();
        let files = store.identity_files();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("projects/acme/hillcrest/index.json"));
    }

    #[test]
    fn test_identity_canonicalizes_fields() {
        let (_dir, store) = store();
        let identity = store.identity(&BuilderId::parse("acme").unwrap(), "hillcrest").unwrap();
        assert_eq!(identity.slug.to_string(), "acme-hillcrest");
        assert_eq!(identity.fields["slug"], json!("acme-hillcrest"));
        assert_eq!(identity.display_name(), "Hillcrest");
        assert_eq!(
            identity.related_priority(),
            vec!["zen-meadows", "acme-lakeview", "acme-missing"]
        );
        assert!(!identity.fields.contains_key("sections"));
    }

    #[test]
    fn test_identity_builder_mismatch() {
        let (dir, store) = store();
        write(
            dir.path(),
            "projects/acme/stray/index.json",
            &json!({"builder": "zen", "projectName": "Stray"}),
        );
        let err = store.identity(&BuilderId::parse("acme").unwrap(), "stray").unwrap_err();
        assert!(matches!(err, ContentError::BuilderMismatch { .. }));
    }

    #[test]
    fn test_find_identity_by_slug_field() {
        let (dir, store) = store();
        write(
            dir.path(),
            "projects/zen/phase-two/index.json",
            &json!({"slug": "meadows-ii", "builder": "zen", "projectName": "Meadows II"}),
        );
        let slug = ProjectSlug::parse("zen-meadows-ii").unwrap();
        let identity = store.find_identity(&slug).unwrap();
        assert!(identity.dir.ends_with("phase-two"));

        let missing = ProjectSlug::parse("zen-nowhere").unwrap();
        assert!(matches!(
            store.find_identity(&missing),
            Err(ContentError::ProjectNotFound { .. })
        ));
        let no_builder = ProjectSlug::parse("nobody-home").unwrap();
        assert!(store.find_identity(&no_builder).is_err());
    }

    #[test]
    fn test_section_direct_fallback_and_envelope() {
        let (_dir, store) = store();
        let identity = store.identity(&BuilderId::parse("acme").unwrap(), "lakeview").unwrap();

        // direct path, envelope unwrapped
        let hero = store.section(&identity, "hero").unwrap().unwrap();
        assert_eq!(hero["title"], json!("Lakeview Residences"));

        // manifest points at data/amenities.json which is absent; sibling fallback hits
        let amenities = store.section(&identity, "amenities").unwrap().unwrap();
        assert_eq!(amenities.as_array().unwrap().len(), 2);

        // undeclared conventional file
        assert!(store.section(&identity, "configurations").unwrap().is_some());
        assert!(store.section(&identity, "brochure").unwrap().is_none());
    }

    #[test]
    fn test_section_names_add_conventional_after_manifest() {
        let (dir, store) = store();
        write(
            dir.path(),
            "projects/zen/custom/index.json",
            &json!({"projectName": "Custom", "sections": {"brochure": "b.json", "hero": "h.json"}}),
        );
        let identity = store.identity(&BuilderId::parse("zen").unwrap(), "custom").unwrap();
        let names: Vec<String> = identity.section_names().into_iter().collect();
        assert_eq!(names[..2], ["brochure".to_string(), "hero".to_string()]);
        assert_eq!(names.iter().filter(|n| n.as_str() == "hero").count(), 1);
        for known in KNOWN_SECTIONS {
            assert!(names.iter().any(|n| n == known), "missing {known}");
        }
    }

    #[test]
    fn test_declared_section_missing_everywhere() {
        let (dir, store) = store();
        write(
            dir.path(),
            "projects/zen/empty/index.json",
            &json!({"projectName": "Empty", "sections": {"summary": "summary-v2.json"}}),
        );
        let identity = store.identity(&BuilderId::parse("zen").unwrap(), "empty").unwrap();
        assert!(matches!(
            store.section(&identity, "summary"),
            Err(ContentError::NotFound { .. })
        ));
    }

    #[test]
    fn test_faq_tiers() {
        let (_dir, store) = store();
        let acme = BuilderId::parse("acme").unwrap();
        assert_eq!(store.universal_faq().unwrap().len(), 1);
        assert_eq!(store.builder_faq(&acme).unwrap().len(), 1);
        let identity = store.identity(&acme, "lakeview").unwrap();
        assert_eq!(store.project_faq(&identity).unwrap().len(), 2);
        assert!(store.builder_faq(&BuilderId::parse("zen").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_builder_config_validated() {
        let (dir, store) = store();
        let config = store.builder_config(&BuilderId::parse("acme").unwrap()).unwrap();
        assert_eq!(config.name, "Acme Developers");
        assert_eq!(config.section_order, vec!["hero", "summary"]);

        write(dir.path(), "projects/zen/aboutbuilder.json", &json!({"logo": "/z.png"}));
        assert!(matches!(
            store.builder_config(&BuilderId::parse("zen").unwrap()),
            Err(ContentError::Schema(_))
        ));
    }

    #[test]
    fn test_legal_pages_and_site_config() {
        let (_dir, store) = store();
        let legal: Vec<String> = store.legal_pages().unwrap().into_iter().map(|p| p.slug).collect();
        assert_eq!(legal, vec!["disclaimer", "privacy-policy", "terms-and-conditions"]);
        assert_eq!(store.site_config().unwrap().site_name, "PropYouLike");
        assert!(store.shell().unwrap().is_none());
    }

    #[test]
    fn test_site_config_origin_lowercased_on_load() {
        let (dir, store) = store();
        write(
            dir.path(),
            "global/site.json",
            &json!({"siteName": "PropYouLike", "origin": "HTTPS://PropYouLike.com/"}),
        );
        let config = store.site_config().unwrap();
        assert_eq!(config.origin, "https://propyoulike.com");
        assert_eq!(
            config.absolute_url("/acme-lakeview/"),
            "https://propyoulike.com/acme-lakeview/"
        );
    }
}
