//! PropYouLike Render
//!
//! Turns resolved projects and builder configs into static HTML entry
//! points with SEO metadata and JSON-LD, then post-processes the output:
//! internal links, sitemap, build manifest.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod html;
pub mod jsonld;
pub mod links;
pub mod manifest;
pub mod page;
pub mod seo;
pub mod sitemap;

pub use error::{RenderError, RenderResult};
pub use html::{DEFAULT_SHELL, Shell, escape, script_json};
pub use links::{LINKS_END, LINKS_START, Link};
pub use manifest::{BuildManifest, MANIFEST_PATH};
pub use page::{BUILDER_DATA_ID, BuilderHub, GeneratedPage, PROJECT_DATA_ID, PageGenerator, PageKind};
pub use seo::{SEO_END, SEO_START, SeoMeta};
pub use sitemap::{SITEMAP_FILE, Sitemap};
