//! Render errors.

use propyoulike_content::ContentError;
use propyoulike_core::{Classify, ErrorClass};

/// Render result type
pub type RenderResult<T> = Result<T, RenderError>;

/// Page generation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Content could not be loaded or resolved
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Shell has no place to inject into
    #[error("invalid shell: {reason}")]
    InvalidShell {
        /// Reason
        reason: String,
    },

    /// Structured data could not be serialized
    #[error("JSON serialization failed: {reason}")]
    Json {
        /// Serializer message
        reason: String,
    },

    /// `site.buildDate` is not an ISO date
    #[error("invalid build date {value:?}: expected YYYY-MM-DD")]
    InvalidDate {
        /// Raw value
        value: String,
    },

    /// Write failure
    #[error("IO error at {path}: {reason}")]
    Io {
        /// Path
        path: String,
        /// OS message
        reason: String,
    },
}

impl RenderError {
    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for RenderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            reason: err.to_string(),
        }
    }
}

impl Classify for RenderError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Content(inner) => inner.class(),
            Self::InvalidShell { .. } | Self::Json { .. } | Self::InvalidDate { .. } => {
                ErrorClass::InvalidContent
            }
            Self::Io { .. } => ErrorClass::Io,
        }
    }
}
