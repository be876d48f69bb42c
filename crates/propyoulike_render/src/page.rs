//! Static page generation.
//!
//! One page per project (`<builder>-<project>/index.html`), per builder hub
//! (`<builder>/index.html`) and per legal page (`legal/<slug>/index.html`).
//! Output depends only on the inputs, so regenerating is byte-identical.

use crate::error::{RenderError, RenderResult};
use crate::html::{DEFAULT_SHELL, Shell, script_json};
use crate::jsonld::{self, ListEntry, Organization};
use crate::seo::{SEO_END, SEO_START, SeoMeta, first_present};
use propyoulike_content::{BuilderConfig, LegalPage, ProjectSummary, ResolvedProject, SiteConfig};
use propyoulike_core::{BuilderId, Digest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Element id of the embedded project payload
pub const PROJECT_DATA_ID: &str = "__PROJECT_DATA__";
/// Element id of the embedded builder payload
pub const BUILDER_DATA_ID: &str = "__BUILDER_DATA__";

/// Kind of generated page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    /// Site entry point
    Home,
    /// Project detail page
    Project,
    /// Builder hub
    Builder,
    /// Legal page
    Legal,
}

/// One generated HTML document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    /// Slug the page was generated for (empty for home)
    pub slug: String,
    /// Page kind
    pub kind: PageKind,
    /// Path relative to the output directory
    pub output_path: PathBuf,
    /// Document
    pub html: String,
}

impl GeneratedPage {
    fn new(kind: PageKind, slug: &str, html: String) -> Self {
        let output_path = match kind {
            PageKind::Home => PathBuf::from("index.html"),
            PageKind::Project | PageKind::Builder => Path::new(slug).join("index.html"),
            PageKind::Legal => Path::new("legal").join(slug).join("index.html"),
        };
        Self {
            slug: slug.to_string(),
            kind,
            output_path,
            html,
        }
    }

    /// Public path of the page (`/x/` style)
    #[must_use]
    pub fn url_path(&self) -> String {
        match self.kind {
            PageKind::Home => "/".to_string(),
            PageKind::Project | PageKind::Builder => format!("/{}/", self.slug),
            PageKind::Legal => format!("/legal/{}/", self.slug),
        }
    }

    /// BLAKE3 digest of the document
    #[must_use]
    pub fn digest(&self) -> Digest {
        Digest::compute(self.html.as_bytes())
    }

    /// Write under `dist`, creating directories
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write(&self, dist: &Path) -> RenderResult<PathBuf> {
        let path = dist.join(&self.output_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, &e))?;
        }
        fs::write(&path, &self.html).map_err(|e| RenderError::io(&path, &e))?;
        tracing::debug!(path = %path.display(), "page written");
        Ok(path)
    }
}

/// A builder hub to render
#[derive(Debug, Clone, Copy)]
pub struct BuilderHub<'a> {
    /// Builder id
    pub id: &'a BuilderId,
    /// Builder config
    pub config: &'a BuilderConfig,
    /// The builder's projects, in index order
    pub projects: &'a [&'a ProjectSummary],
}

/// Page generator for one build
#[derive(Debug, Clone)]
pub struct PageGenerator {
    site: SiteConfig,
    shell: String,
}

impl PageGenerator {
    /// Create a generator; `shell` falls back to the built-in shell
    ///
    /// # Errors
    ///
    /// Returns error if the shell lacks `</head>` or `</body>`
    pub fn new(site: SiteConfig, shell: Option<String>) -> RenderResult<Self> {
        let shell = shell.unwrap_or_else(|| DEFAULT_SHELL.to_string());
        Shell::parse(&shell)?;
        Ok(Self { site, shell })
    }

    /// Site config
    #[must_use]
    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// Site entry point: the shell as authored
    #[must_use]
    pub fn home(&self) -> GeneratedPage {
        GeneratedPage::new(PageKind::Home, "", self.shell.clone())
    }

    /// Legal pages reuse the shared shell unchanged
    #[must_use]
    pub fn legal(&self, page: &LegalPage) -> GeneratedPage {
        GeneratedPage::new(PageKind::Legal, &page.slug, self.shell.clone())
    }

    /// Render a project page
    ///
    /// # Errors
    ///
    /// Returns error if structured data cannot be serialized
    pub fn project(&self, project: &ResolvedProject) -> RenderResult<GeneratedPage> {
        let slug = project.slug().to_string();
        let url = self.site.absolute_url(&project.slug().url_path());
        let name = project.display_name();
        let builder_name = project
            .text("aboutBuilder.name")
            .unwrap_or_else(|| project.slug().builder().as_str());

        let generated = project_description(
            name,
            builder_name,
            project.text("locality"),
            project.text("city"),
        );
        let description = first_present(&[
            project.text("seo.description"),
            project.text("summary.description"),
        ])
        .map_or(generated, str::to_string);

        let image = self.site.absolute_url(
            first_present(&[
                project.text("seo.socialImage"),
                project.text("hero.image"),
                Some(self.site.default_image.as_str()),
            ])
            .unwrap_or_default(),
        );

        let meta = SeoMeta {
            title: format!("{} | {}", name, self.site.title_suffix),
            description,
            canonical: url.clone(),
            image: image.clone(),
            og_type: "website",
            site_name: self.site.site_name.clone(),
        };

        let mut blocks = vec![jsonld::residence(project, &self.site, &url, &image)];
        blocks.extend(jsonld::offer(project, &self.site, &url));
        blocks.extend(jsonld::faq_page(project));

        let payload = format!(
            r#"<script id="{}" type="application/json">{}</script>"#,
            PROJECT_DATA_ID,
            script_json(project.data())?
        );
        let html = self.render(&meta, &blocks, &payload)?;
        Ok(GeneratedPage::new(PageKind::Project, &slug, html))
    }

    /// Render a builder hub
    ///
    /// # Errors
    ///
    /// Returns error if structured data cannot be serialized
    pub fn builder(&self, hub: &BuilderHub<'_>) -> RenderResult<GeneratedPage> {
        let slug = hub.id.to_string();
        let url = self.site.absolute_url(&format!("/{}/", slug));
        let name = hub.config.name.as_str();

        let count = hub.projects.len();
        let generated = format!(
            "Explore {} {} by {} on {}.",
            count,
            if count == 1 { "project" } else { "projects" },
            name,
            self.site.site_name
        );
        let description = first_present(&[hub.config.description.as_deref()])
            .map_or(generated, str::to_string);
        let image = self.site.absolute_url(
            first_present(&[hub.config.logo.as_deref(), Some(self.site.default_image.as_str())])
                .unwrap_or_default(),
        );

        let meta = SeoMeta {
            title: format!("{} | {}", name, self.site.title_suffix),
            description: description.clone(),
            canonical: url.clone(),
            image,
            og_type: "website",
            site_name: self.site.site_name.clone(),
        };

        let entries: Vec<ListEntry> = hub
            .projects
            .iter()
            .map(|p| ListEntry {
                url: self.site.absolute_url(&format!("/{}/", p.slug)),
                name: p.display_name.clone(),
            })
            .collect();
        let blocks = vec![
            jsonld::organization(&Organization {
                name,
                url: &url,
                logo: hub.config.logo.as_deref(),
                description: Some(description.as_str()),
                website: hub.config.website.as_deref(),
            }),
            jsonld::item_list(&format!("Projects by {}", name), &entries),
        ];

        let payload_value = json!({
            "builder": slug,
            "name": name,
            "builderConfig": hub.config.presentation(),
            "projects": hub.projects,
        });
        let payload = format!(
            r#"<script id="{}" type="application/json">{}</script>"#,
            BUILDER_DATA_ID,
            script_json(&payload_value)?
        );
        let html = self.render(&meta, &blocks, &payload)?;
        Ok(GeneratedPage::new(PageKind::Builder, &slug, html))
    }

    fn render(&self, meta: &SeoMeta, blocks: &[serde_json::Value], payload: &str) -> RenderResult<String> {
        let mut head = vec![meta.render()];
        for block in blocks {
            head.push(jsonld::script(block)?);
        }
        head.push(payload.to_string());
        Ok(Shell::parse(&self.shell)?
            .with_title(&meta.title)
            .with_head_block(SEO_START, SEO_END, &head.join("\n"))
            .into_html())
    }
}

fn project_description(name: &str, builder: &str, locality: Option<&str>, city: Option<&str>) -> String {
    let place: Vec<&str> = [locality, city].into_iter().flatten().collect();
    if place.is_empty() {
        format!("{} by {}.", name, builder)
    } else {
        format!("{} by {} in {}.", name, builder, place.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propyoulike_content::{ContentStore, ProjectIndex, Resolver};
    use serde_json::Value;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, value: &Value) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
    }

    fn resolver() -> (TempDir, Resolver) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "projects/acme/aboutbuilder.json", &json!({"name": "Acme Developers", "logo": "/acme.png"}));
        write(
            root,
            "projects/acme/lakeview/index.json",
            &json!({
                "slug": "acme-lakeview",
                "builder": "acme",
                "projectName": "Lakeview",
                "locality": "Whitefield",
                "city": "Bengaluru"
            }),
        );
        write(root, "projects/acme/lakeview/hero.json", &json!({"hero": {"title": "Lakeview", "image": "/img/lv.jpg"}}));
        write(root, "projects/acme/lakeview/faq.json", &json!([{"question": "When?", "answer": "</script> soon"}]));
        let store = ContentStore::open(root).unwrap();
        let index = ProjectIndex::build(&store).unwrap();
        let resolver = Resolver::new(store, SiteConfig::default(), index).unwrap();
        (dir, resolver)
    }

    fn ld_types(html: &str) -> Vec<String> {
        html.split(r#"<script type="application/ld+json">"#)
            .skip(1)
            .map(|rest| {
                let json = &rest[..rest.find("</script>").unwrap()];
                let value: Value = serde_json::from_str(&json.replace("<\\/", "</")).unwrap();
                value["@type"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[test]
    fn test_project_page_end_to_end() {
        let (_dir, mut resolver) = resolver();
        let project = resolver.resolve("acme-lakeview").unwrap();
        assert_eq!(project.text("hero.title"), Some("Lakeview"));

        let generator = PageGenerator::new(SiteConfig::default(), None).unwrap();
        let page = generator.project(&project).unwrap();

        assert_eq!(page.output_path, Path::new("acme-lakeview/index.html"));
        assert!(page.html.contains("<title>Lakeview | PropYouLike</title>"));
        assert!(page.html.contains(r#"<link rel="canonical" href="https://propyoulike.com/acme-lakeview/">"#));
        assert!(page.html.contains(r#""name":"Lakeview""#));
        assert!(page.html.contains(r#"content="Lakeview by Acme Developers in Whitefield, Bengaluru.""#));
        assert!(page.html.contains(r#"<meta property="og:image" content="https://propyoulike.com/img/lv.jpg">"#));
        assert!(page.html.contains(r#"<script id="__PROJECT_DATA__" type="application/json">"#));
        assert!(!page.html.contains("</script> soon"));
        assert_eq!(ld_types(&page.html), vec!["Residence", "FAQPage"]);
    }

    #[test]
    fn test_project_page_is_idempotent() {
        let (_dir, mut resolver) = resolver();
        let project = resolver.resolve("acme-lakeview").unwrap();
        let generator = PageGenerator::new(SiteConfig::default(), None).unwrap();
        let first = generator.project(&project).unwrap();
        let second = generator.project(&project).unwrap();
        assert_eq!(first.html, second.html);
        assert_eq!(first.digest(), second.digest());
    }

    #[test]
    fn test_builder_hub() {
        let (_dir, mut resolver) = resolver();
        let id = BuilderId::parse("acme").unwrap();
        let config = resolver.builder_config(&id).unwrap().clone();
        let projects = resolver.index().by_builder(&id);
        let generator = PageGenerator::new(SiteConfig::default(), None).unwrap();
        let page = generator
            .builder(&BuilderHub {
                id: &id,
                config: &config,
                projects: &projects,
            })
            .unwrap();

        assert_eq!(page.output_path, Path::new("acme/index.html"));
        assert!(page.html.contains("<title>Acme Developers | PropYouLike</title>"));
        assert!(page.html.contains(r#"href="https://propyoulike.com/acme/""#));
        assert!(page.html.contains(r#"content="Explore 1 project by Acme Developers on PropYouLike.""#));
        assert_eq!(ld_types(&page.html), vec!["Organization", "ItemList"]);
        assert!(page.html.contains(r#""url":"https://propyoulike.com/acme-lakeview/""#));
    }

    #[test]
    fn test_legal_and_home_use_shell_unchanged() {
        let shell = DEFAULT_SHELL.replace("PropYouLike", "Custom");
        let generator = PageGenerator::new(SiteConfig::default(), Some(shell.clone())).unwrap();
        let legal = generator.legal(&LegalPage {
            slug: "privacy-policy".to_string(),
            title: "Privacy".to_string(),
            body: Value::Null,
        });
        assert_eq!(legal.html, shell);
        assert_eq!(legal.output_path, Path::new("legal/privacy-policy/index.html"));
        assert_eq!(legal.url_path(), "/legal/privacy-policy/");
        assert_eq!(generator.home().output_path, Path::new("index.html"));
    }

    #[test]
    fn test_bad_shell_rejected() {
        assert!(PageGenerator::new(SiteConfig::default(), Some("<html></html>".to_string())).is_err());
    }

    #[test]
    fn test_write_creates_directories() {
        let dist = TempDir::new().unwrap();
        let generator = PageGenerator::new(SiteConfig::default(), None).unwrap();
        let page = generator.legal(&LegalPage {
            slug: "disclaimer".to_string(),
            title: String::new(),
            body: Value::Null,
        });
        let path = page.write(dist.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), DEFAULT_SHELL);
    }
}
