//! schema.org structured data blocks.
//!
//! Every block is one JSON object with `@context` and `@type`. Keys are
//! emitted sorted (serde_json's default `Map`), which keeps output stable.

use crate::error::RenderResult;
use crate::html::script_json;
use propyoulike_content::{ResolvedProject, SiteConfig};
use serde_json::{Map, Value, json};

const CONTEXT: &str = "https://schema.org";

/// A list entry on a builder hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// Absolute URL
    pub url: String,
    /// Display name
    pub name: String,
}

fn block(kind: &str, fields: Map<String, Value>) -> Value {
    let mut map = Map::new();
    map.insert("@context".to_string(), Value::String(CONTEXT.to_string()));
    map.insert("@type".to_string(), Value::String(kind.to_string()));
    map.extend(fields);
    Value::Object(map)
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// `Residence` block for a project page
///
/// `address` always carries the site country, so it is never empty.
#[must_use]
pub fn residence(project: &ResolvedProject, site: &SiteConfig, url: &str, image: &str) -> Value {
    let mut address = Map::new();
    address.insert("@type".to_string(), json!("PostalAddress"));
    put(&mut address, "streetAddress", project.text("location.address"));
    put(&mut address, "addressLocality", project.text("locality"));
    put(&mut address, "addressRegion", project.text("city"));
    address.insert("addressCountry".to_string(), Value::String(site.country.clone()));

    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(project.display_name()));
    fields.insert("url".to_string(), json!(url));
    fields.insert("image".to_string(), json!(image));
    fields.insert("address".to_string(), Value::Object(address));
    put(&mut fields, "description", project.text("summary.description"));
    block("Residence", fields)
}

fn numeric_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let digits: String = s.chars().filter(|c| *c != ',').collect();
            digits.trim().parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Lowest machine-readable configuration price, if any
#[must_use]
pub fn lowest_price(project: &ResolvedProject) -> Option<f64> {
    project
        .data()
        .get("configurations")?
        .as_array()?
        .iter()
        .filter_map(|c| c.get("price").and_then(numeric_price))
        .filter(|p| p.is_finite() && *p > 0.0)
        .min_by(f64::total_cmp)
}

/// `Offer` block, only when a numeric price is known
#[must_use]
pub fn offer(project: &ResolvedProject, site: &SiteConfig, url: &str) -> Option<Value> {
    let price = lowest_price(project)?;
    let mut fields = Map::new();
    fields.insert("price".to_string(), json!(price));
    fields.insert("priceCurrency".to_string(), json!(site.currency));
    fields.insert("url".to_string(), json!(url));
    Some(block("Offer", fields))
}

/// `FAQPage` block, only when the merged FAQ is non-empty
#[must_use]
pub fn faq_page(project: &ResolvedProject) -> Option<Value> {
    let entries = project.data().get("faq")?.as_array()?;
    let questions: Vec<Value> = entries
        .iter()
        .filter_map(|entry| {
            let question = entry.get("question")?.as_str()?;
            let answer = entry.get("answer")?.as_str()?;
            Some(json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": {"@type": "Answer", "text": answer},
            }))
        })
        .collect();
    if questions.is_empty() {
        return None;
    }
    let mut fields = Map::new();
    fields.insert("mainEntity".to_string(), Value::Array(questions));
    Some(block("FAQPage", fields))
}

/// Builder identity for an `Organization` block
#[derive(Debug, Clone, Copy)]
pub struct Organization<'a> {
    /// Display name
    pub name: &'a str,
    /// Hub URL
    pub url: &'a str,
    /// Logo URL
    pub logo: Option<&'a str>,
    /// Description
    pub description: Option<&'a str>,
    /// External website
    pub website: Option<&'a str>,
}

/// `Organization` block for a builder hub
#[must_use]
pub fn organization(org: &Organization<'_>) -> Value {
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(org.name));
    fields.insert("url".to_string(), json!(org.url));
    put(&mut fields, "logo", org.logo);
    put(&mut fields, "description", org.description);
    if let Some(website) = org.website {
        fields.insert("sameAs".to_string(), json!([website]));
    }
    block("Organization", fields)
}

/// `ItemList` block, positions starting at 1
#[must_use]
pub fn item_list(name: &str, entries: &[ListEntry]) -> Value {
    let items: Vec<Value> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "url": entry.url,
                "name": entry.name,
            })
        })
        .collect();
    let mut fields = Map::new();
    fields.insert("name".to_string(), json!(name));
    fields.insert("numberOfItems".to_string(), json!(items.len()));
    fields.insert("itemListElement".to_string(), Value::Array(items));
    block("ItemList", fields)
}

/// Wrap a block in its `<script>` element
///
/// # Errors
///
/// Returns error if the block cannot be serialized
pub fn script(value: &Value) -> RenderResult<String> {
    Ok(format!(
        r#"<script type="application/ld+json">{}</script>"#,
        script_json(value)?
    ))
}
