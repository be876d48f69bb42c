//! Internal link injection into generated pages.
//!
//! Each page gets one `<nav data-internal-links>` block before `</body>`,
//! delimited by markers so that re-injection replaces it.

use crate::error::{RenderError, RenderResult};
use crate::html::{escape, replace_block};
use std::fs;
use std::path::Path;

/// Opening marker of the link block
pub const LINKS_START: &str = "<!-- links:start -->";
/// Closing marker of the link block
pub const LINKS_END: &str = "<!-- links:end -->";

/// One internal link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Site path (`/x/`)
    pub href: String,
    /// Anchor text
    pub label: String,
}

impl Link {
    /// Link to a site path
    #[must_use]
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }
}

/// Render the nav block body
#[must_use]
pub fn render_nav(links: &[Link]) -> String {
    let mut nav = String::from("<nav data-internal-links>\n");
    for link in links {
        nav.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape(&link.href),
            escape(&link.label)
        ));
    }
    nav.push_str("</nav>");
    nav
}

/// Insert or replace the link block
#[must_use]
pub fn inject(html: &str, links: &[Link]) -> String {
    replace_block(html, LINKS_START, LINKS_END, &render_nav(links), "</body>")
}

/// Inject links into a page on disk; returns whether the file changed
///
/// # Errors
///
/// Returns error if the page cannot be read or written
pub fn inject_file(path: &Path, links: &[Link]) -> RenderResult<bool> {
    let html = fs::read_to_string(path).map_err(|e| RenderError::io(path, &e))?;
    let updated = inject(&html, links);
    if updated == html {
        return Ok(false);
    }
    fs::write(path, updated).map_err(|e| RenderError::io(path, &e))?;
    Ok(true)
}
