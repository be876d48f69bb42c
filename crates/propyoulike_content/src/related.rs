//! Related-project lists.
//!
//! An explicit `relatedProjects` priority list wins. Without one, two
//! implicit lists are derived from the index: other projects by the same
//! builder, and other projects in the same city and locality.

use crate::index::{ProjectIndex, ProjectSummary};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// One related-project card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedEntry {
    /// Public slug
    pub slug: String,
    /// Display name
    pub display_name: String,
    /// Locality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// Hero image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

impl From<&ProjectSummary> for RelatedEntry {
    fn from(summary: &ProjectSummary) -> Self {
        Self {
            slug: summary.slug.clone(),
            display_name: summary.display_name.clone(),
            locality: summary.locality.clone(),
            hero_image: summary.hero_image.clone(),
        }
    }
}

/// Related projects attached to a resolved project as `related`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedProjects {
    /// Author-chosen order
    Priority {
        /// Entries in authored order, unknown slugs dropped
        priority: Vec<RelatedEntry>,
    },
    /// Derived from the index
    Implicit {
        /// Other projects by the same builder
        #[serde(rename = "sameBuilder")]
        same_builder: Vec<RelatedEntry>,
        /// Other projects in the same city and locality, any builder
        #[serde(rename = "sameLocality")]
        same_locality: Vec<RelatedEntry>,
    },
}

impl RelatedProjects {
    /// Every entry across all lists
    #[must_use]
    pub fn entries(&self) -> Vec<&RelatedEntry> {
        match self {
            Self::Priority { priority } => priority.iter().collect(),
            Self::Implicit {
                same_builder,
                same_locality,
            } => same_builder.iter().chain(same_locality).collect(),
        }
    }
}

/// The project related lists are computed for
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    /// Public slug
    pub slug: &'a str,
    /// Builder id
    pub builder: &'a str,
    /// City
    pub city: Option<&'a str>,
    /// Locality
    pub locality: Option<&'a str>,
}

fn same_place(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
        (None, None) => true,
        _ => false,
    }
}

/// Compute related projects, each list truncated to `max`
#[must_use]
pub fn compute(index: &ProjectIndex, subject: &Subject<'_>, priority: &[String], max: usize) -> RelatedProjects {
    if !priority.is_empty() {
        let mut seen = IndexSet::new();
        let priority = priority
            .iter()
            .filter(|slug| slug.as_str() != subject.slug)
            .filter(|slug| seen.insert(slug.to_string()))
            .filter_map(|slug| {
                let found = index.get(slug);
                if found.is_none() {
                    tracing::debug!(project = subject.slug, related = %slug, "related slug not indexed");
                }
                found
            })
            .take(max)
            .map(RelatedEntry::from)
            .collect();
        return RelatedProjects::Priority { priority };
    }

    let others = || index.entries().iter().filter(|e| e.slug != subject.slug);
    let same_builder = others()
        .filter(|e| e.builder == subject.builder)
        .take(max)
        .map(RelatedEntry::from)
        .collect();
    let same_locality = match subject.locality {
        Some(locality) => others()
            .filter(|e| same_place(e.locality.as_deref(), Some(locality)))
            .filter(|e| same_place(e.city.as_deref(), subject.city))
            .take(max)
            .map(RelatedEntry::from)
            .collect(),
        None => Vec::new(),
    };
    RelatedProjects::Implicit {
        same_builder,
        same_locality,
    }
}
