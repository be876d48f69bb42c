//! Core error types and the pipeline-wide failure classes.

use crate::{DigestError, SlugError};

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Invalid slug
    #[error("invalid slug: {0}")]
    Slug(#[from] SlugError),

    /// Invalid digest
    #[error("invalid digest: {0}")]
    Digest(#[from] DigestError),

    /// Invalid JSON payload
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// Parser message
        message: String,
    },
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson {
            message: err.to_string(),
        }
    }
}

/// Failure class of a pipeline error.
///
/// Resolution-time classes are local to one slug; build-time classes
/// are global gates that abort the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Identity or required section file missing
    ContentNotFound,
    /// Merged object fails required-field/type checks
    SchemaValidation,
    /// Content is present but unusable (bad JSON, bad id, bad template)
    InvalidContent,
    /// A post-build gate found a required file, tag, or block absent
    BuildArtifactMissing,
    /// A JSON-LD block is present but does not parse
    MalformedStructuredData,
    /// Filesystem failure
    Io,
}

impl ErrorClass {
    /// Stable label used in log lines and CLI output
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ContentNotFound => "ContentNotFoundError",
            Self::SchemaValidation => "SchemaValidationError",
            Self::InvalidContent => "InvalidContentError",
            Self::BuildArtifactMissing => "BuildArtifactMissingError",
            Self::MalformedStructuredData => "MalformedStructuredDataError",
            Self::Io => "IoError",
        }
    }

    /// Whether a batch loop over slugs may log this error and continue
    #[must_use]
    pub fn is_slug_local(&self) -> bool {
        matches!(
            self,
            Self::ContentNotFound | Self::SchemaValidation | Self::InvalidContent
        )
    }
}

/// Errors that know their failure class
pub trait Classify {
    /// Failure class of this error
    fn class(&self) -> ErrorClass;
}

impl Classify for CoreError {
    fn class(&self) -> ErrorClass {
        ErrorClass::InvalidContent
    }
}
