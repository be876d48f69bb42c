//! Content store and resolver errors.

use propyoulike_core::{Classify, CoreError, ErrorClass, SlugError};
use propyoulike_schema::SchemaValidationError;

/// Content result type
pub type ContentResult<T> = Result<T, ContentError>;

/// Content error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    /// Identity or section file missing
    #[error("{kind} not found: {path}")]
    NotFound {
        /// What was looked up (identity, section, builder config, ...)
        kind: String,
        /// Path or slug that missed
        path: String,
    },

    /// Project slug did not match any identity file
    #[error("project not found: {slug}")]
    ProjectNotFound {
        /// Requested slug
        slug: String,
    },

    /// File is not valid JSON
    #[error("invalid JSON in {path}: {source}")]
    InvalidJson {
        /// File path
        path: String,
        /// Parse failure
        source: CoreError,
    },

    /// Bad slug or builder id
    #[error("invalid id at {path}: {source}")]
    InvalidId {
        /// Where the id came from
        path: String,
        /// Slug failure
        source: SlugError,
    },

    /// Identity declares a different builder than its directory
    #[error("identity {path} declares builder {declared:?} but lives under {directory:?}")]
    BuilderMismatch {
        /// Identity file path
        path: String,
        /// Builder field value
        declared: String,
        /// Directory builder id
        directory: String,
    },

    /// Two projects derive the same public slug
    #[error("duplicate slug {slug}: {first} and {second}")]
    DuplicateSlug {
        /// Colliding slug
        slug: String,
        /// First identity path
        first: String,
        /// Second identity path
        second: String,
    },

    /// Default template cannot be evaluated
    #[error("invalid template: {reason}")]
    InvalidTemplate {
        /// Reason
        reason: String,
    },

    /// Merged object failed its schema
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// Filesystem failure
    #[error("IO error at {path}: {reason}")]
    Io {
        /// Path
        path: String,
        /// OS message
        reason: String,
    },
}

impl Classify for ContentError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::NotFound { .. } | Self::ProjectNotFound { .. } => ErrorClass::ContentNotFound,
            Self::Schema(_) => ErrorClass::SchemaValidation,
            Self::InvalidJson { .. }
            | Self::InvalidId { .. }
            | Self::BuilderMismatch { .. }
            | Self::DuplicateSlug { .. }
            | Self::InvalidTemplate { .. } => ErrorClass::InvalidContent,
            Self::Io { .. } => ErrorClass::Io,
        }
    }
}
