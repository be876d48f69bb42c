//! Output directory discovery and HTML scanning.
//!
//! Pages are discovered from the output tree alone. A top-level directory
//! holding `index.html` is a project page when its name contains a dash and
//! a builder hub otherwise; `legal/` and `data/` are reserved.

use crate::error::{GateError, GateResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const RESERVED: &[&str] = &["legal", "data"];

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("title regex must compile"));
static META: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("meta regex must compile"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<link\s[^>]*>").expect("link regex must compile"));
static ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute regex must compile")
});
static LD_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("json-ld regex must compile")
});

/// Kind of a discovered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageRole {
    /// `<builder>-<project>/`
    Project,
    /// `<builder>/`
    Builder,
}

/// A page found in the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistPage {
    /// Top-level directory name
    pub slug: String,
    /// Project or builder
    pub role: PageRole,
    /// Path of `index.html`
    pub path: PathBuf,
}

impl DistPage {
    /// Public URL computed from the directory name
    #[must_use]
    pub fn expected_url(&self, origin: &str) -> String {
        format!("{}/{}/", origin.trim_end_matches('/'), self.slug)
    }

    /// Path relative to the output directory, for messages
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}/index.html", self.slug)
    }

    /// Read and scan the page
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read
    pub fn scan(&self, gate: &'static str) -> GateResult<PageScan> {
        let html = fs::read_to_string(&self.path).map_err(|e| GateError::Io {
            gate,
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(PageScan::parse(&html))
    }
}

/// Discover project and builder pages, sorted by directory name
///
/// # Errors
///
/// Returns error if the output directory cannot be read
pub fn discover(dist: &Path, gate: &'static str) -> GateResult<Vec<DistPage>> {
    if !dist.is_dir() {
        return Err(GateError::missing(
            gate,
            format!("output directory {} does not exist", dist.display()),
        ));
    }
    let mut pages = Vec::new();
    for entry in WalkDir::new(dist).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| GateError::Io {
            gate,
            path: dist.display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.') || RESERVED.contains(&name) {
            continue;
        }
        let index = entry.path().join("index.html");
        if !index.is_file() {
            continue;
        }
        let role = if name.contains('-') {
            PageRole::Project
        } else {
            PageRole::Builder
        };
        pages.push(DistPage {
            slug: name.to_string(),
            role,
            path: index,
        });
    }
    Ok(pages)
}

/// Head tags extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageScan {
    /// `<title>` text, entities decoded, trimmed
    pub title: Option<String>,
    /// `<meta name="description">` content
    pub description: Option<String>,
    /// `<link rel="canonical">` href
    pub canonical: Option<String>,
    /// `<meta property="og:url">` content
    pub og_url: Option<String>,
    /// Raw bodies of every JSON-LD script, in document order
    pub json_ld: Vec<String>,
}

impl PageScan {
    /// Scan an HTML document
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let mut scan = Self {
            title: TITLE
                .captures(html)
                .map(|c| decode_entities(c[1].trim())),
            ..Self::default()
        };

        for tag in META.find_iter(html) {
            let attrs = attributes(tag.as_str());
            let content = attrs.get("content").cloned();
            if attrs.get("name").is_some_and(|n| n.eq_ignore_ascii_case("description")) {
                scan.description = scan.description.or(content);
            } else if attrs.get("property").is_some_and(|p| p == "og:url") {
                scan.og_url = scan.og_url.or(content);
            }
        }

        for tag in LINK.find_iter(html) {
            let attrs = attributes(tag.as_str());
            if attrs.get("rel").is_some_and(|r| r.eq_ignore_ascii_case("canonical")) {
                scan.canonical = scan.canonical.or_else(|| attrs.get("href").cloned());
            }
        }

        scan.json_ld = LD_JSON
            .captures_iter(html)
            .map(|c| c[1].trim().to_string())
            .collect();
        scan
    }
}

fn attributes(tag: &str) -> BTreeMap<String, String> {
    ATTR.captures_iter(tag)
        .map(|c| {
            let value = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            (c[1].to_ascii_lowercase(), decode_entities(value))
        })
        .collect()
}

/// Decode the entities the generator emits
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
