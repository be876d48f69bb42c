//! SEO head block: description, canonical, Open Graph, Twitter.

use crate::html::escape;

/// Opening marker of the generated head block
pub const SEO_START: &str = "<!-- seo:start -->";
/// Closing marker of the generated head block
pub const SEO_END: &str = "<!-- seo:end -->";

/// Per-page metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoMeta {
    /// Full `<title>` text
    pub title: String,
    /// Meta description
    pub description: String,
    /// Absolute canonical URL
    pub canonical: String,
    /// Absolute social image URL
    pub image: String,
    /// `og:type`
    pub og_type: &'static str,
    /// `og:site_name`
    pub site_name: String,
}

impl SeoMeta {
    /// Render the meta and link tags, one per line
    #[must_use]
    pub fn render(&self) -> String {
        let title = escape(&self.title);
        let description = escape(&self.description);
        let canonical = escape(&self.canonical);
        let image = escape(&self.image);

        let lines = [
            format!(r#"<meta name="description" content="{}">"#, description),
            format!(r#"<link rel="canonical" href="{}">"#, canonical),
            format!(r#"<meta property="og:type" content="{}">"#, self.og_type),
            format!(r#"<meta property="og:site_name" content="{}">"#, escape(&self.site_name)),
            format!(r#"<meta property="og:title" content="{}">"#, title),
            format!(r#"<meta property="og:description" content="{}">"#, description),
            format!(r#"<meta property="og:url" content="{}">"#, canonical),
            format!(r#"<meta property="og:image" content="{}">"#, image),
            r#"<meta name="twitter:card" content="summary_large_image">"#.to_string(),
            format!(r#"<meta name="twitter:title" content="{}">"#, title),
            format!(r#"<meta name="twitter:description" content="{}">"#, description),
            format!(r#"<meta name="twitter:url" content="{}">"#, canonical),
            format!(r#"<meta name="twitter:image" content="{}">"#, image),
        ];
        lines.join("\n")
    }
}

/// First non-blank candidate
#[must_use]
pub fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> SeoMeta {
        SeoMeta {
            title: "Lakeview | PropYouLike".to_string(),
            description: "Lakes & views".to_string(),
            canonical: "https://propyoulike.com/acme-lakeview/".to_string(),
            image: "https://propyoulike.com/img/lakeview.jpg".to_string(),
            og_type: "website",
            site_name: "PropYouLike".to_string(),
        }
    }

    #[test]
    fn test_canonical_and_og_url_agree() {
        let html = meta().render();
        assert!(html.contains(r#"<link rel="canonical" href="https://propyoulike.com/acme-lakeview/">"#));
        assert!(html.contains(r#"<meta property="og:url" content="https://propyoulike.com/acme-lakeview/">"#));
        assert!(html.contains(r#"<meta name="twitter:url" content="https://propyoulike.com/acme-lakeview/">"#));
    }

    #[test]
    fn test_attributes_escaped() {
        let html = meta().render();
        assert!(html.contains(r#"content="Lakes &amp; views""#));
    }

    #[test]
    fn test_first_present_skips_blanks() {
        assert_eq!(first_present(&[None, Some("  "), Some("b"), Some("c")]), Some("b"));
        assert_eq!(first_present(&[None]), None);
    }
}
