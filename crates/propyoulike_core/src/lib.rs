//! PropYouLike Core Types
//!
//! This crate contains pure types and logic with no I/O: public slugs,
//! content digests, and the error classes shared by every pipeline stage.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod digest;
pub mod error;
pub mod slug;

// Re-exports
pub use digest::{Digest, DigestError};
pub use error::{Classify, CoreError, CoreResult, ErrorClass};
pub use slug::{BuilderId, ProjectSlug, SlugError, normalize};
