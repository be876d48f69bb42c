//! The build pipeline.
//!
//! Steps run in a fixed order against one loaded [`BuildContext`]; the
//! first failing step or gate aborts the build with its label.

use crate::output;
use propyoulike_content::{
    ContentError, ContentStore, ProjectIndex, RelatedProjects, ResolvedProject, Resolver, SiteConfig,
};
use propyoulike_core::{Classify, ErrorClass};
use propyoulike_render::{
    BuildManifest, BuilderHub, GeneratedPage, Link, PageGenerator, PageKind, RenderError, Sitemap,
    links, sitemap,
};
use propyoulike_verify::{DistContext, GateChain, GateConfig, GateError, GateReport};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Index artifact location relative to the output directory
pub const INDEX_PATH: &str = "data/projects-index.json";

/// Pipeline result type
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Where to read content and write output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Content store root
    pub content: PathBuf,
    /// Output directory
    pub dist: PathBuf,
    /// Staging directory for intermediate artifacts
    pub work: PathBuf,
    /// Overrides `site.origin`
    pub origin: Option<String>,
    /// Regenerate after the build and compare digests
    pub verify_idempotent: bool,
}

/// A pipeline step failure
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Content could not be loaded or resolved
    #[error(transparent)]
    Content(#[from] ContentError),

    /// A page could not be generated or written
    #[error(transparent)]
    Render(#[from] RenderError),

    /// A post-build gate failed
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Artifact serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure outside the render crate
    #[error("IO error at {path}: {reason}")]
    Io {
        /// Path
        path: String,
        /// OS message
        reason: String,
    },

    /// The output directory would swallow the content store
    #[error("refusing to clear {dist}: it contains the content store")]
    UnsafeDist {
        /// Output directory
        dist: String,
    },

    /// A second generation pass produced different bytes
    #[error("regenerated output differs from the build: {}", paths.join(", "))]
    NotIdempotent {
        /// Output paths whose digests changed
        paths: Vec<String>,
    },
}

impl PipelineError {
    fn io(path: &Path, err: &impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl Classify for PipelineError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Content(e) => e.class(),
            Self::Render(e) => e.class(),
            Self::Gate(e) => e.class(),
            Self::Json(_) => ErrorClass::InvalidContent,
            Self::Io { .. } | Self::UnsafeDist { .. } => ErrorClass::Io,
            Self::NotIdempotent { .. } => ErrorClass::BuildArtifactMissing,
        }
    }
}

/// Labeled failure printed as `❌ <label> FAILED: <reason>`
#[derive(Debug, thiserror::Error)]
#[error("{label} FAILED: {source}")]
pub struct StepFailure {
    /// Step or gate label
    pub label: String,
    /// Underlying error
    #[source]
    pub source: PipelineError,
}

/// Named pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Copy static assets and write the site entry point
    Bundle,
    /// Resolve and render every indexed project
    Projects,
    /// Render one hub per builder
    Builders,
    /// Render legal pages
    Legal,
    /// Inject internal link blocks
    Links,
    /// Stage the sitemap
    Sitemap,
    /// Copy the staged sitemap into the output
    CopySitemap,
    /// Record page digests
    Manifest,
    /// Regenerate and compare digests
    VerifyIdempotent,
}

impl Step {
    /// Steps of a normal build
    pub const BUILD: [Step; 8] = [
        Step::Bundle,
        Step::Projects,
        Step::Builders,
        Step::Legal,
        Step::Links,
        Step::Sitemap,
        Step::CopySitemap,
        Step::Manifest,
    ];

    /// Name printed on success
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Step::Bundle => "bundle",
            Step::Projects => "projects",
            Step::Builders => "builders",
            Step::Legal => "legal",
            Step::Links => "links",
            Step::Sitemap => "sitemap",
            Step::CopySitemap => "copy-sitemap",
            Step::Manifest => "manifest",
            Step::VerifyIdempotent => "verify-idempotent",
        }
    }

    /// Label printed on failure
    #[must_use]
    pub fn label(self) -> String {
        self.name().to_ascii_uppercase().replace('-', "_")
    }
}

/// Loaded content plus everything generated so far
pub struct BuildContext {
    options: BuildOptions,
    resolver: Resolver,
    generator: PageGenerator,
    pages: Vec<GeneratedPage>,
    resolved: Vec<ResolvedProject>,
}

impl BuildContext {
    /// Open the content store and build the index
    ///
    /// # Errors
    ///
    /// Returns error if the store, site config, index or shell cannot be loaded
    pub fn load(options: BuildOptions) -> PipelineResult<Self> {
        let store = ContentStore::open(&options.content)?;
        let site = site_config(&store, options.origin.as_deref())?;
        let index = ProjectIndex::build(&store)?;
        let generator = PageGenerator::new(site.clone(), store.shell()?)?;
        let resolver = Resolver::new(store, site, index)?;
        Ok(Self {
            options,
            resolver,
            generator,
            pages: Vec::new(),
            resolved: Vec::new(),
        })
    }

    /// Effective site config
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        self.resolver.site()
    }

    /// Run one step; returns the detail shown after its name
    ///
    /// # Errors
    ///
    /// Returns the step's failure
    pub fn run_step(&mut self, step: Step) -> PipelineResult<String> {
        let dist = self.options.dist.clone();
        match step {
            Step::Bundle => {
                prepare_dist(&dist, &self.options.content)?;
                let assets = copy_tree(&self.resolver.store().public_dir(), &dist)?;
                let home = self.generator.home();
                home.write(&dist)?;
                self.pages.push(home);
                Ok(format!("({} assets)", assets))
            }
            Step::Projects => {
                let pages = self.project_pages()?;
                let count = self.write_pages(pages)?;
                write_index(self.resolver.index(), &dist)?;
                Ok(format!("({} pages)", count))
            }
            Step::Builders => {
                let pages = self.builder_pages()?;
                let count = self.write_pages(pages)?;
                Ok(format!("({} hubs)", count))
            }
            Step::Legal => {
                let pages = self.legal_pages()?;
                let count = self.write_pages(pages)?;
                Ok(format!("({} pages)", count))
            }
            Step::Links => {
                let mut pages = std::mem::take(&mut self.pages);
                let changed = self.apply_links(&mut pages);
                for page in pages.iter().filter(|p| changed.contains(&p.output_path)) {
                    page.write(&dist)?;
                }
                self.pages = pages;
                Ok(format!("({} pages)", changed.len()))
            }
            Step::Sitemap => {
                let mut map = Sitemap::new(self.site())?;
                for page in self.pages.iter().filter(|p| p.kind != PageKind::Home) {
                    map.add_path(&page.url_path());
                }
                map.write(&self.options.work)?;
                Ok(format!("({} urls)", map.urls().count()))
            }
            Step::CopySitemap => {
                sitemap::copy_into(&self.options.work, &dist)?;
                Ok(String::new())
            }
            Step::Manifest => {
                BuildManifest::from_pages(&self.pages).write(&dist)?;
                Ok(format!("({} digests)", self.pages.len()))
            }
            Step::VerifyIdempotent => {
                let mut fresh = Self::load(self.options.clone())?;
                let regenerated = BuildManifest::from_pages(&fresh.render_all()?);
                let paths = BuildManifest::load(&dist)?.diff(&regenerated);
                if !paths.is_empty() {
                    return Err(PipelineError::NotIdempotent { paths });
                }
                Ok(format!("({} pages identical)", regenerated.pages.len()))
            }
        }
    }

    /// Every page of a build, in memory, links included
    ///
    /// # Errors
    ///
    /// Returns the first generation failure
    pub fn render_all(&mut self) -> PipelineResult<Vec<GeneratedPage>> {
        let mut pages = vec![self.generator.home()];
        pages.extend(self.project_pages()?);
        pages.extend(self.builder_pages()?);
        pages.extend(self.legal_pages()?);
        self.apply_links(&mut pages);
        Ok(pages)
    }

    fn project_pages(&mut self) -> PipelineResult<Vec<GeneratedPage>> {
        let slugs: Vec<String> = self
            .resolver
            .index()
            .entries()
            .iter()
            .map(|e| e.slug.clone())
            .collect();
        let mut pages = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let project = self.resolver.resolve(&slug)?;
            pages.push(self.generator.project(&project)?);
            self.resolved.push(project);
        }
        Ok(pages)
    }

    fn builder_pages(&mut self) -> PipelineResult<Vec<GeneratedPage>> {
        let mut pages = Vec::new();
        for id in self.resolver.store().builders()? {
            let config = self.resolver.builder_config(&id)?.clone();
            let projects = self.resolver.index().by_builder(&id);
            pages.push(self.generator.builder(&BuilderHub {
                id: &id,
                config: &config,
                projects: &projects,
            })?);
        }
        Ok(pages)
    }

    fn legal_pages(&self) -> PipelineResult<Vec<GeneratedPage>> {
        Ok(self
            .resolver
            .store()
            .legal_pages()?
            .iter()
            .map(|page| self.generator.legal(page))
            .collect())
    }

    /// Project link blocks keyed by slug: the builder hub, then related projects
    fn project_links(&self) -> BTreeMap<String, Vec<Link>> {
        let mut targets = BTreeMap::new();
        for project in &self.resolved {
            let builder = project.slug().builder().as_str();
            let builder_name = project.text("aboutBuilder.name").unwrap_or(builder);
            let mut links = vec![Link::new(format!("/{}/", builder), builder_name)];
            let related: Option<RelatedProjects> = project
                .data()
                .get("related")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok());
            if let Some(related) = related {
                links.extend(
                    related
                        .entries()
                        .into_iter()
                        .map(|e| Link::new(format!("/{}/", e.slug), e.display_name.as_str())),
                );
            }
            targets.insert(project.slug().to_string(), links);
        }
        targets
    }

    /// Hub link block: the builder's projects in index order
    fn hub_links(&self, builder: &str) -> Vec<Link> {
        self.resolver
            .index()
            .entries()
            .iter()
            .filter(|e| e.builder == builder)
            .map(|e| Link::new(format!("/{}/", e.slug), e.display_name.as_str()))
            .collect()
    }

    /// Inject link blocks; returns the output paths that changed
    fn apply_links(&self, pages: &mut [GeneratedPage]) -> Vec<PathBuf> {
        let projects = self.project_links();
        let mut changed = Vec::new();
        for page in pages.iter_mut() {
            let links = match page.kind {
                PageKind::Project => match projects.get(&page.slug) {
                    Some(links) => links.clone(),
                    None => continue,
                },
                PageKind::Builder => self.hub_links(&page.slug),
                PageKind::Home | PageKind::Legal => continue,
            };
            let html = links::inject(&page.html, &links);
            if html != page.html {
                page.html = html;
                changed.push(page.output_path.clone());
            }
        }
        tracing::debug!(pages = changed.len(), "internal links injected");
        changed
    }

    fn write_pages(&mut self, pages: Vec<GeneratedPage>) -> PipelineResult<usize> {
        let count = pages.len();
        for page in pages {
            page.write(&self.options.dist)?;
            self.pages.push(page);
        }
        Ok(count)
    }
}

/// Load the site config, applying an origin override
///
/// # Errors
///
/// Returns error if `global/site.json` is malformed
pub fn site_config(store: &ContentStore, origin: Option<&str>) -> PipelineResult<SiteConfig> {
    let site = store.site_config()?;
    Ok(match origin {
        Some(origin) => site.with_origin(origin),
        None => site,
    })
}

/// Write `<dist>/data/projects-index.json`
///
/// # Errors
///
/// Returns error if the file cannot be written
pub fn write_index(index: &ProjectIndex, dist: &Path) -> PipelineResult<PathBuf> {
    let path = dist.join(INDEX_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, &e))?;
    }
    fs::write(&path, index.to_json_pretty()?).map_err(|e| PipelineError::io(&path, &e))?;
    tracing::debug!(path = %path.display(), entries = index.len(), "index written");
    Ok(path)
}

/// Empty the output directory, refusing when it contains the content store
fn prepare_dist(dist: &Path, content: &Path) -> PipelineResult<()> {
    if dist.exists() {
        let dist_abs = dist.canonicalize().map_err(|e| PipelineError::io(dist, &e))?;
        let content_abs = content
            .canonicalize()
            .map_err(|e| PipelineError::io(content, &e))?;
        if content_abs.starts_with(&dist_abs) {
            return Err(PipelineError::UnsafeDist {
                dist: dist.display().to_string(),
            });
        }
        fs::remove_dir_all(dist).map_err(|e| PipelineError::io(dist, &e))?;
    }
    fs::create_dir_all(dist).map_err(|e| PipelineError::io(dist, &e))
}

/// Copy a directory tree; returns the number of files copied
fn copy_tree(from: &Path, to: &Path) -> PipelineResult<usize> {
    if !from.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| PipelineError::io(from, &e))?;
        let Ok(rel) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| PipelineError::io(&target, &e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| PipelineError::io(entry.path(), &e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Run the gate chain over an output directory
///
/// # Errors
///
/// Returns the first gate failure
pub fn run_gates(dist: &Path, site: &SiteConfig) -> Result<Vec<GateReport>, GateError> {
    let ctx = DistContext::scan(GateConfig {
        dist: dist.to_path_buf(),
        origin: site.origin().to_string(),
        legal_pages: site.legal_pages.clone(),
    })?;
    GateChain::standard().run_with(&ctx, |report| {
        output::success(&report.gate.to_ascii_lowercase().replace('_', "-"), "");
    })
}

/// Run every build step, then the gates
///
/// # Errors
///
/// Returns the first failure, labeled with its step or gate
pub fn build(options: BuildOptions) -> Result<(), StepFailure> {
    let fail = |label: String| move |source: PipelineError| StepFailure { label, source };

    let verify_idempotent = options.verify_idempotent;
    let mut ctx = BuildContext::load(options).map_err(fail("LOAD".to_string()))?;

    let mut steps = Step::BUILD.to_vec();
    if verify_idempotent {
        steps.push(Step::VerifyIdempotent);
    }
    for step in steps {
        let _span = tracing::info_span!("step", name = step.name()).entered();
        let detail = ctx.run_step(step).map_err(fail(step.label()))?;
        tracing::info!(step = step.name(), "{}", detail);
        output::success(step.name(), &detail);
    }

    run_gates(&ctx.options.dist, ctx.site()).map_err(|e| StepFailure {
        label: e.gate().to_string(),
        source: e.into(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, value: &Value) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn content(root: &Path) {
        write(root, "global/site.json", &json!({"siteName": "PropYouLike", "origin": "https://example.test"}));
        write(root, "projects/acme/aboutbuilder.json", &json!({"name": "Acme Developers"}));
        write(
            root,
            "projects/acme/lakeview/index.json",
            &json!({
                "builder": "acme",
                "projectName": "Lakeview",
                "city": "Bengaluru",
                "locality": "Whitefield",
                "hero": {"title": "Lakeview"}
            }),
        );
        write(
            root,
            "projects/acme/lakeview/configurations.json",
            &json!([{"type": "2 BHK", "price": 8500000}]),
        );
        write(
            root,
            "projects/acme/hillcrest/index.json",
            &json!({
                "builder": "acme",
                "projectName": "Hillcrest",
                "city": "Bengaluru",
                "locality": "Sarjapur",
                "hero": {"title": "Hillcrest"}
            }),
        );
        for slug in ["privacy-policy", "terms-and-conditions", "disclaimer"] {
            write(root, &format!("legal/{}.json", slug), &json!({"title": slug}));
        }
        fs::create_dir_all(root.join("public/img")).unwrap();
        fs::write(root.join("public/img/logo.svg"), "<svg/>").unwrap();
    }

    fn options(dir: &TempDir) -> BuildOptions {
        content(&dir.path().join("content"));
        BuildOptions {
            content: dir.path().join("content"),
            dist: dir.path().join("dist"),
            work: dir.path().join("work"),
            origin: None,
            verify_idempotent: true,
        }
    }

    #[test]
    fn test_full_build_passes_every_gate() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        build(options.clone()).unwrap();

        let dist = &options.dist;
        for rel in [
            "index.html",
            "img/logo.svg",
            "acme/index.html",
            "acme-lakeview/index.html",
            "acme-hillcrest/index.html",
            "legal/disclaimer/index.html",
            "sitemap.xml",
            INDEX_PATH,
            propyoulike_render::MANIFEST_PATH,
        ] {
            assert!(dist.join(rel).is_file(), "{} missing", rel);
        }
        assert!(options.work.join("sitemap.xml").is_file());

        let hub = fs::read_to_string(dist.join("acme/index.html")).unwrap();
        assert!(hub.contains(r#"<a href="/acme-lakeview/">Lakeview</a>"#));
        let project = fs::read_to_string(dist.join("acme-lakeview/index.html")).unwrap();
        assert!(project.contains(r#"<a href="/acme/">Acme Developers</a>"#));
        assert!(project.contains(r#"<link rel="canonical" href="https://example.test/acme-lakeview/">"#));
    }

    #[test]
    fn test_origin_override_reaches_pages_and_gates() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.origin = Some("https://staging.example.test/".to_string());
        build(options.clone()).unwrap();
        let sitemap = fs::read_to_string(options.dist.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://staging.example.test/acme/</loc>"));
    }

    #[test]
    fn test_missing_legal_page_fails_presence() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        fs::remove_file(options.content.join("legal/disclaimer.json")).unwrap();
        let failure = build(options).unwrap_err();
        assert_eq!(failure.label, "PRESENCE");
        assert!(failure.to_string().starts_with("PRESENCE FAILED: "));
    }

    #[test]
    fn test_invalid_project_aborts_projects_step() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        write(
            &options.content,
            "projects/acme/broken/index.json",
            &json!({"builder": "acme", "projectName": "Broken"}),
        );
        let failure = build(options).unwrap_err();
        assert_eq!(failure.label, "PROJECTS");
        assert_eq!(failure.source.class(), ErrorClass::SchemaValidation);
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let options = options(&dir);
        build(options.clone()).unwrap();
        let first = BuildManifest::load(&options.dist).unwrap();
        build(options.clone()).unwrap();
        let second = BuildManifest::load(&options.dist).unwrap();
        assert!(first.diff(&second).is_empty());
    }

    #[test]
    fn test_refuses_dist_containing_content() {
        let dir = TempDir::new().unwrap();
        let mut options = options(&dir);
        options.dist = dir.path().to_path_buf();
        let failure = build(options).unwrap_err();
        assert_eq!(failure.label, "BUNDLE");
        assert!(matches!(failure.source, PipelineError::UnsafeDist { .. }));
    }

    #[test]
    fn test_step_labels() {
        assert_eq!(Step::CopySitemap.label(), "COPY_SITEMAP");
        assert_eq!(Step::VerifyIdempotent.name(), "verify-idempotent");
    }
}
