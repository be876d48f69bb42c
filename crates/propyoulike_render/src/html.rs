//! HTML shell handling: escaping, title replacement, marked blocks.

use crate::error::{RenderError, RenderResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Shell used when the content store has no `global/shell.html`
pub const DEFAULT_SHELL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>PropYouLike</title>
</head>
<body>
<div id="root"></div>
</body>
</html>
"#;

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>.*?</title>").expect("title regex must compile"));

/// Escape text for element content and quoted attribute values
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Serialize for embedding inside `<script>`: sorted keys, `</` escaped
///
/// # Errors
///
/// Returns error if the value cannot be serialized
pub fn script_json<T: Serialize>(value: &T) -> RenderResult<String> {
    let value = serde_json::to_value(value)?;
    let text = serde_json::to_string(&value)?;
    Ok(text.replace("</", "<\\/"))
}

/// A page shell being filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    html: String,
}

impl Shell {
    /// Wrap shell HTML
    ///
    /// # Errors
    ///
    /// Returns error if the shell lacks `</head>` or `</body>`
    pub fn parse(html: &str) -> RenderResult<Self> {
        for tag in ["</head>", "</body>"] {
            if !html.contains(tag) {
                return Err(RenderError::InvalidShell {
                    reason: format!("missing {}", tag),
                });
            }
        }
        Ok(Self {
            html: html.to_string(),
        })
    }

    /// Replace the document title, inserting one if absent
    #[must_use]
    pub fn with_title(self, title: &str) -> Self {
        let tag = format!("<title>{}</title>", escape(title));
        let html = if TITLE.is_match(&self.html) {
            TITLE.replace(&self.html, regex::NoExpand(&tag)).into_owned()
        } else {
            self.html.replacen("</head>", &format!("{}\n</head>", tag), 1)
        };
        Self { html }
    }

    /// Place `content` between markers just before `</head>`
    #[must_use]
    pub fn with_head_block(self, start: &str, end: &str, content: &str) -> Self {
        Self {
            html: replace_block(&self.html, start, end, content, "</head>"),
        }
    }

    /// Place `content` between markers just before `</body>`
    #[must_use]
    pub fn with_body_block(self, start: &str, end: &str, content: &str) -> Self {
        Self {
            html: replace_block(&self.html, start, end, content, "</body>"),
        }
    }

    /// Finished HTML
    #[must_use]
    pub fn into_html(self) -> String {
        self.html
    }
}

/// Replace the block delimited by `start`/`end`, or insert it before `anchor`.
///
/// Re-applying with the same content is a no-op.
#[must_use]
pub fn replace_block(html: &str, start: &str, end: &str, content: &str, anchor: &str) -> String {
    let block = format!("{}\n{}\n{}", start, content.trim_end(), end);
    if let Some(from) = html.find(start) {
        if let Some(to) = html[from..].find(end) {
            let to = from + to + end.len();
            return format!("{}{}{}", &html[..from], block, &html[to..]);
        }
    }
    match html.rfind(anchor) {
        Some(at) => format!("{}{}\n{}", &html[..at], block, &html[at..]),
        None => format!("{}\n{}", html, block),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"Tom & "Jerry" <b>"#), "Tom &amp; &quot;Jerry&quot; &lt;b&gt;");
    }

    #[test]
    fn test_script_json_escapes_closing_tags_and_sorts() {
        let text = script_json(&json!({"z": 1, "a": "</script><b>"})).unwrap();
        assert_eq!(text, r#"{"a":"<\/script><b>","z":1}"#);
    }

    #[test]
    fn test_shell_requires_head_and_body() {
        assert!(Shell::parse("<html><body></body></html>").is_err());
        assert!(Shell::parse(DEFAULT_SHELL).is_ok());
    }

    #[test]
    fn test_title_replaced_once() {
        let html = Shell::parse(DEFAULT_SHELL)
            .unwrap()
            .with_title("Lakeview | PropYouLike")
            .into_html();
        assert!(html.contains("<title>Lakeview | PropYouLike</title>"));
        assert_eq!(html.matches("<title>").count(), 1);
    }

    #[test]
    fn test_title_inserted_when_missing() {
        let html = Shell::parse("<html><head></head><body></body></html>")
            .unwrap()
            .with_title("A & B")
            .into_html();
        assert!(html.contains("<title>A &amp; B</title>\n</head>"));
    }

    #[test]
    fn test_replace_block_is_idempotent() {
        let once = replace_block(DEFAULT_SHELL, "<!-- x:start -->", "<!-- x:end -->", "<p>hi</p>", "</body>");
        let twice = replace_block(&once, "<!-- x:start -->", "<!-- x:end -->", "<p>hi</p>", "</body>");
        assert_eq!(once, twice);
        assert!(once.contains("<!-- x:start -->\n<p>hi</p>\n<!-- x:end -->\n</body>"));

        let changed = replace_block(&once, "<!-- x:start -->", "<!-- x:end -->", "<p>bye</p>", "</body>");
        assert!(!changed.contains("hi"));
        assert_eq!(changed.matches("x:start").count(), 1);
    }

    proptest::proptest! {
        #[test]
        fn prop_replace_block_idempotent(content in "[a-z<>/ =\"]{0,40}", other in "[a-z<>/ ]{0,40}") {
            let (start, end) = ("<!-- x:start -->", "<!-- x:end -->");
            let once = replace_block(DEFAULT_SHELL, start, end, &other, "</body>");
            let replaced = replace_block(&once, start, end, &content, "</body>");
            proptest::prop_assert_eq!(replace_block(&replaced, start, end, &content, "</body>"), replaced.clone());
            proptest::prop_assert_eq!(replaced.matches(start).count(), 1);
        }
    }
}
