//! Declarative schemas: field name -> {required, type, nested schema}.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Type of a schema field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldType {
    /// JSON string
    String,
    /// JSON number
    Number,
    /// JSON boolean
    Boolean,
    /// Any JSON value
    Any,
    /// Nested object with its own schema
    Object {
        /// Sub-schema
        schema: Schema,
    },
    /// Array whose items all have the given type
    Array {
        /// Item type
        items: Box<FieldType>,
    },
}

impl FieldType {
    /// Nested object type
    #[must_use]
    pub fn object(schema: Schema) -> Self {
        Self::Object { schema }
    }

    /// Array of items
    #[must_use]
    pub fn array(items: FieldType) -> Self {
        Self::Array {
            items: Box::new(items),
        }
    }

    /// Array of objects with their own sub-schema
    #[must_use]
    pub fn array_of(schema: Schema) -> Self {
        Self::array(Self::object(schema))
    }

    /// Name used in issue messages
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Any => "any",
            Self::Object { .. } => "object",
            Self::Array { .. } => "array",
        }
    }

    /// Authoring placeholder for this type
    #[must_use]
    pub fn template(&self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Number => Value::from(0),
            Self::Boolean => Value::Bool(false),
            Self::Any => Value::Null,
            Self::Object { schema } => schema.template(),
            Self::Array { items } => match items.as_ref() {
                Self::Object { schema } => Value::Array(vec![schema.template()]),
                _ => Value::Array(Vec::new()),
            },
        }
    }
}

/// Constraint checked only when content is published.
///
/// Authoring templates tolerate these; final content does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    /// String or array must not be empty
    NonEmpty,
}

/// Specification of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field type
    pub kind: FieldType,
    /// Whether the field must be present and non-null
    pub required: bool,
    /// Publish-time constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    /// Required field of the given type
    #[must_use]
    pub fn required(kind: FieldType) -> Self {
        Self {
            kind,
            required: true,
            constraints: Vec::new(),
        }
    }

    /// Optional field of the given type
    #[must_use]
    pub fn optional(kind: FieldType) -> Self {
        Self {
            kind,
            required: false,
            constraints: Vec::new(),
        }
    }

    /// Add the non-empty publish-time constraint
    #[must_use]
    pub fn non_empty(mut self) -> Self {
        self.constraints.push(Constraint::NonEmpty);
        self
    }
}

/// Declarative schema for a JSON object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Schema name
    pub name: String,
    /// Fields in declaration order
    pub fields: IndexMap<String, FieldSpec>,
    /// Whether keys not declared in `fields` are accepted
    pub allow_unknown: bool,
}

impl Schema {
    /// Create an empty schema that accepts unknown keys
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            allow_unknown: true,
        }
    }

    /// Reject keys not declared in the schema
    #[must_use]
    pub fn strict(mut self) -> Self {
        self.allow_unknown = false;
        self
    }

    /// Add a field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Add a required field
    #[must_use]
    pub fn required(self, name: impl Into<String>, kind: FieldType) -> Self {
        self.field(name, FieldSpec::required(kind))
    }

    /// Add an optional field
    #[must_use]
    pub fn optional(self, name: impl Into<String>, kind: FieldType) -> Self {
        self.field(name, FieldSpec::optional(kind))
    }

    /// Look up a field
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Generate an authoring template: every declared field with a placeholder
    #[must_use]
    pub fn template(&self) -> Value {
        let mut map = Map::new();
        for (name, spec) in &self.fields {
            map.insert(name.clone(), spec.kind.template());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hero() -> Schema {
        Schema::new("hero")
            .field("title", FieldSpec::required(FieldType::String).non_empty())
            .optional("image", FieldType::String)
    }

    #[test]
    fn test_schema_builder() {
        let schema = hero();
        assert_eq!(schema.name, "hero");
        assert_eq!(schema.fields.len(), 2);
        assert!(schema.get("title").unwrap().required);
        assert!(!schema.get("image").unwrap().required);
        assert!(schema.allow_unknown);
        assert!(!schema.clone().strict().allow_unknown);
    }

    #[test]
    fn test_template_covers_nested_shapes() {
        let schema = Schema::new("project")
            .required("hero", FieldType::object(hero()))
            .optional(
                "amenities",
                FieldType::array_of(Schema::new("amenity").required("name", FieldType::String)),
            )
            .optional("highlights", FieldType::array(FieldType::String))
            .optional("featured", FieldType::Boolean);

        assert_eq!(
            schema.template(),
            json!({
                "hero": {"title": "", "image": ""},
                "amenities": [{"name": ""}],
                "highlights": [],
                "featured": false,
            })
        );
    }

    #[test]
    fn test_field_type_describe() {
        assert_eq!(FieldType::array(FieldType::Number).describe(), "array");
        assert_eq!(FieldType::object(hero()).describe(), "object");
    }
}
