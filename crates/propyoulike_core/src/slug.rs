//! Public slugs for builders and projects.
//!
//! A project's public slug is `normalize(builder) + "-" + normalize(project)`.
//! Builder ids never contain a dash, so the first dash of a public slug always
//! separates the builder token from the project token.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slug error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    /// Nothing left after normalization
    #[error("slug is empty after normalization: {raw:?}")]
    Empty {
        /// Raw input
        raw: String,
    },
    /// Builder ids must be dash-free
    #[error("builder id {id:?} contains a dash")]
    BuilderContainsDash {
        /// Offending builder id
        id: String,
    },
    /// Public slug has no builder/project boundary
    #[error("slug {slug:?} has no builder-project separator")]
    MissingSeparator {
        /// Offending slug
        slug: String,
    },
    /// Slug is not in canonical lowercase form
    #[error("slug {slug:?} is not canonical (expected {expected:?})")]
    NotCanonical {
        /// Offending slug
        slug: String,
        /// Canonical form
        expected: String,
    },
}

/// Normalize a raw identifier into slug form.
///
/// Lowercases ASCII alphanumerics and collapses every run of other
/// characters into a single dash. Leading and trailing separators are dropped.
#[must_use]
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Builder identifier (normalized, dash-free)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuilderId(String);

impl BuilderId {
    /// Parse and normalize a builder id
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or contains a dash after normalization
    pub fn parse(raw: &str) -> Result<Self, SlugError> {
        let id = normalize(raw);
        if id.is_empty() {
            return Err(SlugError::Empty {
                raw: raw.to_string(),
            });
        }
        if id.contains('-') {
            return Err(SlugError::BuilderContainsDash { id });
        }
        Ok(Self(id))
    }

    /// Get as string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BuilderId {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BuilderId> for String {
    fn from(id: BuilderId) -> Self {
        id.0
    }
}

impl fmt::Display for BuilderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public project slug: `<builder>-<project>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectSlug {
    builder: BuilderId,
    project: String,
}

impl ProjectSlug {
    /// Build a slug from a builder id and a raw project token
    ///
    /// A project token that already carries the `<builder>-` prefix is
    /// accepted and the prefix is not repeated.
    ///
    /// # Errors
    ///
    /// Returns error if the project token normalizes to nothing
    pub fn new(builder: BuilderId, project: &str) -> Result<Self, SlugError> {
        let normalized = normalize(project);
        let prefix = format!("{}-", builder.as_str());
        let token = normalized
            .strip_prefix(&prefix)
            .map_or(normalized.clone(), str::to_string);
        if token.is_empty() {
            return Err(SlugError::Empty {
                raw: project.to_string(),
            });
        }
        Ok(Self {
            builder,
            project: token,
        })
    }

    /// Split a public slug on its first dash
    ///
    /// # Errors
    ///
    /// Returns error if the slug is not canonical or has no separator
    pub fn parse(public: &str) -> Result<Self, SlugError> {
        let expected = normalize(public);
        if expected != public {
            return Err(SlugError::NotCanonical {
                slug: public.to_string(),
                expected,
            });
        }
        let (builder, project) =
            public
                .split_once('-')
                .ok_or_else(|| SlugError::MissingSeparator {
                    slug: public.to_string(),
                })?;
        if project.is_empty() {
            return Err(SlugError::MissingSeparator {
                slug: public.to_string(),
            });
        }
        Ok(Self {
            builder: BuilderId::parse(builder)?,
            project: project.to_string(),
        })
    }

    /// Builder half of the slug
    #[must_use]
    pub fn builder(&self) -> &BuilderId {
        &self.builder
    }

    /// Project half of the slug
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Public URL path for this slug: `/<slug>/`
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/{}/", self)
    }
}

impl TryFrom<String> for ProjectSlug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProjectSlug> for String {
    fn from(slug: ProjectSlug) -> Self {
        slug.to_string()
    }
}

impl fmt::Display for ProjectSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.builder, self.project)
    }
}
