//! `sitemap.xml` generation.
//!
//! The sitemap is written to a staging path first and copied into the
//! output directory by a separate pipeline step.

use crate::error::{RenderError, RenderResult};
use crate::html::escape;
use chrono::NaiveDate;
use propyoulike_content::SiteConfig;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the sitemap in staging and output
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Sitemap under construction
#[derive(Debug, Clone, PartialEq)]
pub struct Sitemap {
    site: SiteConfig,
    lastmod: Option<NaiveDate>,
    urls: BTreeSet<String>,
}

impl Sitemap {
    /// Start a sitemap containing the site root
    ///
    /// # Errors
    ///
    /// Returns error if `site.buildDate` is set but not `YYYY-MM-DD`
    pub fn new(site: &SiteConfig) -> RenderResult<Self> {
        let lastmod = site
            .build_date
            .as_deref()
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                    RenderError::InvalidDate {
                        value: raw.to_string(),
                    }
                })
            })
            .transpose()?;
        let mut sitemap = Self {
            site: site.clone(),
            lastmod,
            urls: BTreeSet::new(),
        };
        sitemap.add_path("/");
        Ok(sitemap)
    }

    /// Add a site path (`/x/` style)
    pub fn add_path(&mut self, path: &str) {
        self.urls.insert(self.site.absolute_url(path));
    }

    /// Absolute URLs, sorted
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Render the XML document
    #[must_use]
    pub fn render(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        let lastmod = self.lastmod.map(|d| d.format("%Y-%m-%d").to_string());
        for url in &self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape(url)));
            if let Some(lastmod) = &lastmod {
                xml.push_str(&format!("    <lastmod>{}</lastmod>\n", lastmod));
            }
            xml.push_str("  </url>\n");
        }
        xml.push_str("</urlset>\n");
        xml
    }

    /// Write to `<staging>/sitemap.xml`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write(&self, staging: &Path) -> RenderResult<PathBuf> {
        fs::create_dir_all(staging).map_err(|e| RenderError::io(staging, &e))?;
        let path = staging.join(SITEMAP_FILE);
        fs::write(&path, self.render()).map_err(|e| RenderError::io(&path, &e))?;
        tracing::debug!(urls = self.urls.len(), path = %path.display(), "sitemap staged");
        Ok(path)
    }
}

/// Copy the staged sitemap into the output directory
///
/// # Errors
///
/// Returns error if the staged file is missing or the copy fails
pub fn copy_into(staging: &Path, dist: &Path) -> RenderResult<PathBuf> {
    let from = staging.join(SITEMAP_FILE);
    let to = dist.join(SITEMAP_FILE);
    fs::create_dir_all(dist).map_err(|e| RenderError::io(dist, &e))?;
    fs::copy(&from, &to).map_err(|e| RenderError::io(&from, &e))?;
    Ok(to)
}
