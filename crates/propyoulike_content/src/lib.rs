//! PropYouLike Content
//!
//! Reads the on-disk content store and resolves projects:
//!
//! - [`ContentStore`] loads identities, sections, builder configs and FAQ tiers
//! - [`ProjectIndex`] summarizes every project for listings and related links
//! - [`Resolver`] merges global, builder and project tiers into one validated
//!   object per slug
//!
//! All I/O is synchronous; a build is a single pass over the store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod expr;
pub mod faq;
pub mod index;
pub mod merge;
pub mod related;
pub mod resolve;
pub mod store;

pub use config::{BuilderConfig, SiteConfig};
pub use error::{ContentError, ContentResult};
pub use expr::{Ref, Scope, Template, interpret};
pub use faq::{FaqEntry, FaqLevel};
pub use index::{ProjectIndex, ProjectSummary, Skipped, price_range};
pub use merge::{deep_merge, merge_tiers};
pub use related::{RelatedEntry, RelatedProjects, Subject};
pub use resolve::{ResolveCache, ResolvedProject, Resolver};
pub use store::{ContentStore, Identity, LegalPage, read_json};
