//! Built-in schemas for resolved projects and builder configs.

use crate::schema::{FieldSpec, FieldType, Schema};

/// Section names the resolver looks for by convention
///
/// Each is loaded from `<name>.json` beside the project identity even when
/// the `sections` manifest does not list it; manifest entries come first.
pub const KNOWN_SECTIONS: &[&str] = &[
    "hero",
    "summary",
    "amenities",
    "views",
    "location",
    "construction",
    "configurations",
    "paymentPlans",
    "testimonials",
    "brochure",
    "aboutBuilder",
    "seo",
];

fn text() -> FieldType {
    FieldType::String
}

fn required_text() -> FieldSpec {
    FieldSpec::required(FieldType::String).non_empty()
}

/// Schema of a single FAQ entry after tier tagging
#[must_use]
pub fn faq_entry_schema() -> Schema {
    Schema::new("faqEntry")
        .field("question", required_text())
        .field("answer", required_text())
        .optional("category", text())
        .required("level", text())
}

fn hero_schema() -> Schema {
    Schema::new("hero")
        .field("title", required_text())
        .optional("subtitle", text())
        .optional("tagline", text())
        .optional("image", text())
}

fn summary_schema() -> Schema {
    Schema::new("summary")
        .optional("description", text())
        .optional("highlights", FieldType::array(text()))
        .optional("reraId", text())
        .optional("landArea", FieldType::Any)
        .optional("units", FieldType::Any)
}

fn location_schema() -> Schema {
    Schema::new("location")
        .optional("address", text())
        .optional("mapUrl", text())
        .optional(
            "landmarks",
            FieldType::array_of(
                Schema::new("landmark")
                    .field("name", required_text())
                    .optional("distance", FieldType::Any),
            ),
        )
}

fn about_builder_schema() -> Schema {
    Schema::new("aboutBuilder")
        .field("name", required_text())
        .optional("description", text())
        .optional("logo", text())
        .optional("website", text())
}

fn seo_schema() -> Schema {
    Schema::new("seo")
        .optional("title", text())
        .optional("description", text())
        .optional("socialImage", text())
}

/// Schema of a fully merged project
#[must_use]
pub fn project_schema() -> Schema {
    Schema::new("project")
        .field("slug", required_text())
        .field("builder", required_text())
        .field("projectName", required_text())
        .optional("type", text())
        .optional("city", text())
        .optional("locality", text())
        .optional("zone", text())
        .optional("status", text())
        .optional("priceRange", text())
        .required("hero", FieldType::object(hero_schema()))
        .optional("summary", FieldType::object(summary_schema()))
        .field(
            "amenities",
            FieldSpec::optional(FieldType::array_of(
                Schema::new("amenity")
                    .field("name", required_text())
                    .optional("icon", text())
                    .optional("category", text()),
            ))
            .non_empty(),
        )
        .field(
            "configurations",
            FieldSpec::optional(FieldType::array_of(
                Schema::new("configuration")
                    .field("type", required_text())
                    .optional("size", FieldType::Any)
                    .optional("price", FieldType::Any),
            ))
            .non_empty(),
        )
        .optional("views", FieldType::Any)
        .optional("location", FieldType::object(location_schema()))
        .optional("construction", FieldType::Any)
        .optional(
            "paymentPlans",
            FieldType::array_of(
                Schema::new("paymentPlan")
                    .field("name", required_text())
                    .optional("description", text()),
            ),
        )
        .optional(
            "testimonials",
            FieldType::array_of(
                Schema::new("testimonial")
                    .field("author", required_text())
                    .field("quote", required_text()),
            ),
        )
        .optional(
            "brochure",
            FieldType::object(Schema::new("brochure").field("url", required_text())),
        )
        .optional("aboutBuilder", FieldType::object(about_builder_schema()))
        .optional("faq", FieldType::array_of(faq_entry_schema()))
        .optional("seo", FieldType::object(seo_schema().strict()))
        .optional("relatedProjects", FieldType::array(text()))
        .optional("builderConfig", FieldType::Any)
}

/// Schema of a builder config (`aboutbuilder.json`)
#[must_use]
pub fn builder_schema() -> Schema {
    Schema::new("builder")
        .field("name", required_text())
        .optional("description", text())
        .optional("logo", text())
        .optional("website", text())
        .optional("theme", FieldType::Any)
        .optional("sectionOrder", FieldType::array(text()))
        .optional("features", FieldType::Any)
        .optional("components", FieldType::Any)
        .optional("sectionDefaults", FieldType::Any)
}

/// Look up a built-in schema by name
#[must_use]
pub fn by_name(name: &str) -> Option<Schema> {
    match name {
        "project" => Some(project_schema()),
        "builder" => Some(builder_schema()),
        "faqEntry" => Some(faq_entry_schema()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Validator;
    use serde_json::json;

    #[test]
    fn test_minimal_project_is_valid() {
        let project = json!({
            "slug": "acme-lakeview",
            "builder": "acme",
            "projectName": "Lakeview",
            "hero": {"title": "Lakeview Residences"}
        });
        assert!(Validator::publish().validate(&project_schema(), &project).is_valid());
    }

    #[test]
    fn test_project_without_hero_is_invalid() {
        let project = json!({
            "slug": "acme-lakeview",
            "builder": "acme",
            "projectName": "Lakeview"
        });
        let err = Validator::publish().parse(&project_schema(), project).unwrap_err();
        assert!(err.issues.iter().any(|i| i.path == "hero"));
    }

    #[test]
    fn test_faq_entries_need_level() {
        let project = json!({
            "slug": "acme-lakeview",
            "builder": "acme",
            "projectName": "Lakeview",
            "hero": {"title": "Lakeview"},
            "faq": [{"question": "Q?", "answer": "A."}]
        });
        let err = Validator::publish().parse(&project_schema(), project).unwrap_err();
        assert_eq!(err.issues[0].path, "faq[0].level");
    }

    #[test]
    fn test_templates_validate_in_template_mode() {
        for name in ["project", "builder", "faqEntry"] {
            let schema = by_name(name).unwrap();
            let template = schema.template();
            assert!(
                Validator::template().validate(&schema, &template).is_valid(),
                "{} template should validate",
                name
            );
        }
        assert!(by_name("unknown").is_none());
    }

    #[test]
    fn test_builder_requires_name() {
        assert!(!Validator::publish()
            .validate(&builder_schema(), &json!({"description": "x"}))
            .is_valid());
        assert!(Validator::publish()
            .validate(&builder_schema(), &json!({"name": "Acme Developers"}))
            .is_valid());
    }
}
