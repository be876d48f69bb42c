//! Gate failures.

use propyoulike_core::{Classify, ErrorClass};

/// Gate result type
pub type GateResult<T> = Result<T, GateError>;

/// A failed gate. Always fatal for the build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// Required file, tag, or structured-data block absent
    #[error("{reason}")]
    ArtifactMissing {
        /// Gate label
        gate: &'static str,
        /// What is missing, and where
        reason: String,
    },

    /// Tag present but its value is not what the page requires
    #[error("{reason}")]
    Mismatch {
        /// Gate label
        gate: &'static str,
        /// Expected versus found
        reason: String,
    },

    /// JSON-LD block does not parse
    #[error("{path}: JSON-LD block {block} does not parse: {reason}")]
    MalformedStructuredData {
        /// Gate label
        gate: &'static str,
        /// Page path
        path: String,
        /// 1-based block index on the page
        block: usize,
        /// Parser message
        reason: String,
    },

    /// Output directory could not be read
    #[error("IO error at {path}: {reason}")]
    Io {
        /// Gate label
        gate: &'static str,
        /// Path
        path: String,
        /// OS message
        reason: String,
    },
}

impl GateError {
    /// Label of the gate that failed
    #[must_use]
    pub fn gate(&self) -> &'static str {
        match self {
            Self::ArtifactMissing { gate, .. }
            | Self::Mismatch { gate, .. }
            | Self::MalformedStructuredData { gate, .. }
            | Self::Io { gate, .. } => gate,
        }
    }

    pub(crate) fn missing(gate: &'static str, reason: impl Into<String>) -> Self {
        Self::ArtifactMissing {
            gate,
            reason: reason.into(),
        }
    }
}

impl Classify for GateError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::ArtifactMissing { .. } | Self::Mismatch { .. } => ErrorClass::BuildArtifactMissing,
            Self::MalformedStructuredData { .. } => ErrorClass::MalformedStructuredData,
            Self::Io { .. } => ErrorClass::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_label_and_class() {
        let err = GateError::MalformedStructuredData {
            gate: "STRUCTURED_DATA",
            path: "acme-lakeview/index.html".to_string(),
            block: 2,
            reason: "EOF while parsing".to_string(),
        };
        assert_eq!(err.gate(), "STRUCTURED_DATA");
        assert_eq!(err.class(), ErrorClass::MalformedStructuredData);
        assert!(err.to_string().contains("block 2"));
        assert!(!err.class().is_slug_local());
    }
}
