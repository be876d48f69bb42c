//! Global brand config and builder configs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Global brand configuration (`global/site.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteConfig {
    /// Brand name
    pub site_name: String,
    /// Public origin, no trailing slash
    pub origin: String,
    /// Appended to every page title after `" | "`
    pub title_suffix: String,
    /// Fallback meta description
    pub default_description: String,
    /// Last link of the social image fallback chain
    pub default_image: String,
    /// ISO 4217 currency for offers
    pub currency: String,
    /// ISO 3166 country for postal addresses
    pub country: String,
    /// Legal page slugs that must exist in every build
    pub legal_pages: Vec<String>,
    /// Maximum related projects per list
    pub max_related: usize,
    /// Optional ISO date used as sitemap `lastmod`
    pub build_date: Option<String>,
    /// Global tier of section defaults
    pub section_defaults: Map<String, Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "PropYouLike".to_string(),
            origin: "https://propyoulike.com".to_string(),
            title_suffix: "PropYouLike".to_string(),
            default_description: "Explore new residential projects from trusted builders."
                .to_string(),
            default_image: "/og-default.jpg".to_string(),
            currency: "INR".to_string(),
            country: "IN".to_string(),
            legal_pages: vec![
                "privacy-policy".to_string(),
                "terms-and-conditions".to_string(),
                "disclaimer".to_string(),
            ],
            max_related: 4,
            build_date: None,
            section_defaults: Map::new(),
        }
    }
}

impl SiteConfig {
    /// Origin without any trailing slash
    #[must_use]
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    /// Absolute URL for a site path (`/x/` style)
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.origin(), path)
        } else {
            format!("{}/{}", self.origin(), path)
        }
    }

    /// Set the origin, normalizing away trailing slashes
    #[must_use]
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = normalize_origin(origin);
        self
    }

    /// Re-normalize the configured origin after loading
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.origin = normalize_origin(&self.origin);
        self
    }
}

/// Lowercase scheme and host, drop trailing slashes; the path keeps its case
fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim().trim_end_matches('/');
    let authority_start = origin.find("://").map_or(0, |at| at + 3);
    let authority_end = origin[authority_start..]
        .find('/')
        .map_or(origin.len(), |at| authority_start + at);
    format!(
        "{}{}",
        origin[..authority_end].to_ascii_lowercase(),
        &origin[authority_end..]
    )
}

/// Builder configuration (`projects/<builder>/aboutbuilder.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderConfig {
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Builder website
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Brand theming
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub theme: Map<String, Value>,
    /// Section display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub section_order: Vec<String>,
    /// Feature toggles
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub features: Map<String, Value>,
    /// Component overrides
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub components: Map<String, Value>,
    /// Builder tier of section defaults
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub section_defaults: Map<String, Value>,
}

impl BuilderConfig {
    /// Presentation settings exposed to the client as `builderConfig`
    #[must_use]
    pub fn presentation(&self) -> Value {
        let mut map = Map::new();
        map.insert("theme".to_string(), Value::Object(self.theme.clone()));
        map.insert(
            "sectionOrder".to_string(),
            Value::Array(self.section_order.iter().cloned().map(Value::String).collect()),
        );
        map.insert("features".to_string(), Value::Object(self.features.clone()));
        map.insert("components".to_string(), Value::Object(self.components.clone()));
        Value::Object(map)
    }

    /// Seed for a project's `aboutBuilder` section
    #[must_use]
    pub fn about(&self) -> Value {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(self.name.clone()));
        for (key, value) in [
            ("description", &self.description),
            ("logo", &self.logo),
            ("website", &self.website),
        ] {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_site_config_defaults_fill_missing_fields() {
        let config: SiteConfig =
            serde_json::from_value(json!({"siteName": "Acme Homes", "maxRelated": 3})).unwrap();
        assert_eq!(config.site_name, "Acme Homes");
        assert_eq!(config.max_related, 3);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.legal_pages.len(), 3);
    }

    #[test]
    fn test_absolute_url() {
        let config = SiteConfig::default().with_origin("https://propyoulike.com/");
        assert_eq!(config.origin(), "https://propyoulike.com");
        assert_eq!(
            config.absolute_url("/acme-lakeview/"),
            "https://propyoulike.com/acme-lakeview/"
        );
        assert_eq!(config.absolute_url("img/a.jpg"), "https://propyoulike.com/img/a.jpg");
        assert_eq!(config.absolute_url("https://cdn.example/a.jpg"), "https://cdn.example/a.jpg");
    }

    #[test]
    fn test_origin_scheme_and_host_lowercased() {
        let config = SiteConfig::default().with_origin("HTTPS://PropYouLike.COM/");
        assert_eq!(config.origin(), "https://propyoulike.com");
        assert_eq!(
            config.absolute_url("/acme-lakeview/"),
            "https://propyoulike.com/acme-lakeview/"
        );

        let config = SiteConfig::default().with_origin("Https://Example.ORG/Preview/");
        assert_eq!(config.origin(), "https://example.org/Preview");

        let loaded: SiteConfig =
            serde_json::from_value(json!({"origin": "https://PROPYOULIKE.com"})).unwrap();
        assert_eq!(loaded.normalized().origin(), "https://propyoulike.com");
    }

    #[test]
    fn test_builder_about_seed() {
        let builder = BuilderConfig {
            name: "Acme Developers".to_string(),
            logo: Some("/acme.png".to_string()),
            ..BuilderConfig::default()
        };
        assert_eq!(builder.about(), json!({"name": "Acme Developers", "logo": "/acme.png"}));
        assert_eq!(
            builder.presentation(),
            json!({"theme": {}, "sectionOrder": [], "features": {}, "components": {}})
        );
    }
}
