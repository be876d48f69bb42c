//! Build manifest: content digest of every generated page.

use crate::error::{RenderError, RenderResult};
use crate::page::GeneratedPage;
use propyoulike_core::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest location relative to the output directory
pub const MANIFEST_PATH: &str = "data/build-manifest.json";

/// Digests keyed by output path, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// `output path -> BLAKE3 digest`
    pub pages: BTreeMap<String, Digest>,
}

impl BuildManifest {
    /// Record one page
    pub fn record(&mut self, page: &GeneratedPage) {
        let key = page.output_path.to_string_lossy().replace('\\', "/");
        self.pages.insert(key, page.digest());
    }

    /// Manifest for a set of pages
    #[must_use]
    pub fn from_pages<'a, I>(pages: I) -> Self
    where
        I: IntoIterator<Item = &'a GeneratedPage>,
    {
        let mut manifest = Self::default();
        for page in pages {
            manifest.record(page);
        }
        manifest
    }

    /// Output paths whose digests differ, or that exist on only one side
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut changed: Vec<String> = self
            .pages
            .iter()
            .filter(|(path, digest)| other.pages.get(*path) != Some(*digest))
            .map(|(path, _)| path.clone())
            .collect();
        changed.extend(
            other
                .pages
                .keys()
                .filter(|path| !self.pages.contains_key(*path))
                .cloned(),
        );
        changed.sort();
        changed
    }

    /// Write to `<dist>/data/build-manifest.json`
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write(&self, dist: &Path) -> RenderResult<PathBuf> {
        let path = dist.join(MANIFEST_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RenderError::io(parent, &e))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(&path, text).map_err(|e| RenderError::io(&path, &e))?;
        Ok(path)
    }

    /// Load from an output directory
    ///
    /// # Errors
    ///
    /// Returns error if the manifest is missing or malformed
    pub fn load(dist: &Path) -> RenderResult<Self> {
        let path = dist.join(MANIFEST_PATH);
        let text = fs::read_to_string(&path).map_err(|e| RenderError::io(&path, &e))?;
        Ok(serde_json::from_str(&text)?)
    }
}
