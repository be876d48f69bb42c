//! Project index: one summary row per resolvable project.
//!
//! Built from identity files plus the `hero` and `configurations` sections.
//! Projects that fail to load are skipped with a warning; two identities
//! deriving the same public slug abort the build.

use crate::error::{ContentError, ContentResult};
use crate::store::{ContentStore, Identity};
use propyoulike_core::{BuilderId, Classify};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Summary of one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    /// Public slug
    pub slug: String,
    /// `projectName`, or the slug when absent
    pub display_name: String,
    /// Builder id
    pub builder: String,
    /// Locality
    pub locality: Option<String>,
    /// City
    pub city: Option<String>,
    /// Project type
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// `hero.image`
    pub hero_image: Option<String>,
    /// Explicit or derived price range
    pub price_range: Option<String>,
    /// Construction status
    pub status: Option<String>,
}

impl ProjectSummary {
    fn from_identity(store: &ContentStore, identity: &Identity) -> ContentResult<Self> {
        let hero = store.section(identity, "hero")?;
        let configurations = store.section(identity, "configurations")?;
        let field = |name: &str| identity.str_field(name).map(str::to_string);

        Ok(Self {
            slug: identity.slug.to_string(),
            display_name: identity.display_name(),
            builder: identity.slug.builder().to_string(),
            locality: field("locality"),
            city: field("city"),
            kind: field("type"),
            hero_image: hero
                .as_ref()
                .and_then(|h| h.get("image"))
                .and_then(Value::as_str)
                .map(str::to_string),
            price_range: price_range(identity.str_field("priceRange"), configurations.as_ref()),
            status: field("status"),
        })
    }
}

/// Explicit price range, else derived from configuration prices.
///
/// Two or more priced configurations give `"<first> – <last>"`; one gives
/// that price alone.
#[must_use]
pub fn price_range(explicit: Option<&str>, configurations: Option<&Value>) -> Option<String> {
    if let Some(explicit) = explicit.filter(|s| !s.trim().is_empty()) {
        return Some(explicit.to_string());
    }
    let prices: Vec<String> = configurations?
        .as_array()?
        .iter()
        .filter_map(|c| match c.get("price")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect();
    match prices.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        [first, .., last] => Some(format!("{} – {}", first, last)),
    }
}

/// A project that could not be indexed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Identity file path
    pub path: String,
    /// Why it was skipped
    pub error: ContentError,
}

/// All indexed projects, sorted by display name then slug
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIndex {
    entries: Vec<ProjectSummary>,
    #[serde(skip)]
    skipped: Vec<Skipped>,
}

impl ProjectIndex {
    /// Scan the store and build the index
    ///
    /// # Errors
    ///
    /// Returns error on duplicate slugs, invalid builder directories, or
    /// failures that are not local to one project
    pub fn build(store: &ContentStore) -> ContentResult<Self> {
        // validates every builder directory name up front
        store.builders()?;

        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();

        for path in store.identity_files() {
            let loaded = store
                .identity_at(&path)
                .and_then(|identity| ProjectSummary::from_identity(store, &identity));
            let summary = match loaded {
                Ok(summary) => summary,
                Err(error) if error.class().is_slug_local() => {
                    tracing::warn!(path = %path.display(), %error, "skipping project");
                    skipped.push(Skipped {
                        path: path.display().to_string(),
                        error,
                    });
                    continue;
                }
                Err(error) => return Err(error),
            };

            let current = path.display().to_string();
            if let Some(first) = seen.insert(summary.slug.clone(), current.clone()) {
                return Err(ContentError::DuplicateSlug {
                    slug: summary.slug,
                    first,
                    second: current,
                });
            }
            entries.push(summary);
        }

        entries.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        tracing::info!(projects = entries.len(), skipped = skipped.len(), "project index built");
        Ok(Self { entries, skipped })
    }

    /// Index from prepared rows
    #[must_use]
    pub fn from_entries(mut entries: Vec<ProjectSummary>) -> Self {
        entries.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Self {
            entries,
            skipped: Vec::new(),
        }
    }

    /// All rows
    #[must_use]
    pub fn entries(&self) -> &[ProjectSummary] {
        &self.entries
    }

    /// Projects that failed to load
    #[must_use]
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Look up one row by slug
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&ProjectSummary> {
        self.entries.iter().find(|e| e.slug == slug)
    }

    /// Rows for one builder, in index order
    #[must_use]
    pub fn by_builder(&self, builder: &BuilderId) -> Vec<&ProjectSummary> {
        self.entries
            .iter()
            .filter(|e| e.builder == builder.as_str())
            .collect()
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the rows as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fixtures::{sample, write};
    use serde_json::json;
    use tempfile::TempDir;

    fn build() -> (TempDir, ContentResult<ProjectIndex>) {
        let dir = TempDir::new().unwrap();
        sample(dir.path());
        let store = ContentStore::open(dir.path()).unwrap();
        let index = ProjectIndex::build(&store);
        (dir, index)
    }

    #[test]
    fn test_sorted_by_display_name() {
        let (_dir, index) = build();
        let index = index.unwrap();
        let names: Vec<&str> = index.entries().iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Hillcrest", "Lakeview", "Meadows"]);
    }

    #[test]
    fn test_summary_fields() {
        let (_dir, index) = build();
        let index = index.unwrap();
        let lakeview = index.get("acme-lakeview").unwrap();
        assert_eq!(lakeview.builder, "acme");
        assert_eq!(lakeview.hero_image.as_deref(), Some("/img/lakeview.jpg"));
        assert_eq!(lakeview.price_range.as_deref(), Some("₹85 L – ₹1.2 Cr"));
        assert_eq!(lakeview.kind.as_deref(), Some("Apartment"));

        let meadows = index.get("zen-meadows").unwrap();
        assert_eq!(meadows.price_range.as_deref(), Some("₹60 L onwards"));
        assert_eq!(index.by_builder(&BuilderId::parse("acme").unwrap()).len(), 2);
    }

    #[test]
    fn test_broken_project_is_skipped() {
        let dir = TempDir::new().unwrap();
        sample(dir.path());
        std::fs::create_dir_all(dir.path().join("projects/zen/broken")).unwrap();
        std::fs::write(dir.path().join("projects/zen/broken/index.json"), "{ nope").unwrap();
        let store = ContentStore::open(dir.path()).unwrap();
        let index = ProjectIndex::build(&store).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.skipped().len(), 1);
    }

    #[test]
    fn test_duplicate_slug_is_fatal() {
        let dir = TempDir::new().unwrap();
        sample(dir.path());
        write(
            dir.path(),
            "projects/acme/lakeview-copy/index.json",
            &json!({"slug": "lakeview", "projectName": "Lakeview Copy"}),
        );
        let store = ContentStore::open(dir.path()).unwrap();
        assert!(matches!(
            ProjectIndex::build(&store),
            Err(ContentError::DuplicateSlug { .. })
        ));
    }

    #[test]
    fn test_price_range_rules() {
        assert_eq!(price_range(Some("On request"), None).as_deref(), Some("On request"));
        let single = json!([{"type": "Villa", "price": 25000000}]);
        assert_eq!(price_range(None, Some(&single)).as_deref(), Some("25000000"));
        let unpriced = json!([{"type": "Villa"}]);
        assert_eq!(price_range(Some("  "), Some(&unpriced)), None);
    }

    #[test]
    fn test_index_json_rows() {
        let (_dir, index) = build();
        let json: Value = serde_json::from_str(&index.unwrap().to_json_pretty().unwrap()).unwrap();
        assert_eq!(json[0]["slug"], json!("acme-hillcrest"));
        assert_eq!(json[0]["displayName"], json!("Hillcrest"));
        assert!(json[0].get("type").is_some());
    }
}
