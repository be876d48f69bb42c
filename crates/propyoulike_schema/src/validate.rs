//! Structural validation of JSON content against a [`Schema`].
//!
//! Two entry points share one walker:
//! - [`Validator::parse`] is parse-or-throw and is what the resolver uses;
//! - [`Validator::report`] collects every issue across a batch and never aborts.

use crate::schema::{Constraint, FieldSpec, FieldType, Schema};
use propyoulike_core::{Classify, ErrorClass};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// How serious an issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    /// Missing required field or wrong type
    Blocking,
    /// Publish-time constraint seen while validating a template
    Advisory,
}

/// A single validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Field path, e.g. `amenities[2].name`
    pub path: String,
    /// Human-readable message
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        };
        write!(f, "{}: {}", path, self.message)
    }
}

/// What kind of content is being validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Final content: publish-time constraints are blocking
    #[default]
    Publish,
    /// Authoring templates: publish-time constraints are advisory
    Template,
}

/// Outcome of validating one object
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// No blocking issues
    Valid {
        /// The validated data
        data: Value,
        /// Tolerated advisory issues
        advisories: Vec<Issue>,
    },
    /// At least one blocking issue
    Invalid {
        /// Every issue found
        issues: Vec<Issue>,
    },
}

impl Validation {
    /// Whether validation passed
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// All issues regardless of outcome
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Valid { advisories, .. } => advisories,
            Self::Invalid { issues } => issues,
        }
    }
}

/// Merged object failed its schema
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{schema} failed validation with {} blocking issue(s): {}", blocking_count(.issues), first_blocking(.issues))]
pub struct SchemaValidationError {
    /// Schema name
    pub schema: String,
    /// Full structured issue list
    pub issues: Vec<Issue>,
}

fn blocking_count(issues: &[Issue]) -> usize {
    issues
        .iter()
        .filter(|i| i.severity == Severity::Blocking)
        .count()
}

fn first_blocking(issues: &[Issue]) -> String {
    issues
        .iter()
        .find(|i| i.severity == Severity::Blocking)
        .map_or_else(String::new, ToString::to_string)
}

impl Classify for SchemaValidationError {
    fn class(&self) -> ErrorClass {
        ErrorClass::SchemaValidation
    }
}

/// One row of a batch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// Row identifier (usually a slug)
    pub id: String,
    /// Whether the row validated
    pub valid: bool,
    /// Issues demoted to warning strings
    pub warnings: Vec<String>,
}

/// Result of validating a batch in report mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Per-row results in input order
    pub rows: Vec<ReportRow>,
}

impl BatchReport {
    /// Number of valid rows
    #[must_use]
    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.valid).count()
    }

    /// Number of invalid rows
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.rows.len() - self.valid_count()
    }

    /// Add a row that could not even be loaded
    pub fn push_failure(&mut self, id: impl Into<String>, warning: impl Into<String>) {
        self.rows.push(ReportRow {
            id: id.into(),
            valid: false,
            warnings: vec![warning.into()],
        });
    }

    /// Get summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}/{} valid, {} with errors",
            self.valid_count(),
            self.rows.len(),
            self.invalid_count()
        )
    }
}

/// Schema validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    mode: Mode,
}

impl Validator {
    /// Validator for final content
    #[must_use]
    pub fn publish() -> Self {
        Self {
            mode: Mode::Publish,
        }
    }

    /// Validator for authoring templates
    #[must_use]
    pub fn template() -> Self {
        Self {
            mode: Mode::Template,
        }
    }

    /// Validation mode
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Validate a candidate object and collect every issue
    #[must_use]
    pub fn validate(&self, schema: &Schema, candidate: &Value) -> Validation {
        let mut issues = Vec::new();
        self.check_object(schema, candidate, "", &mut issues);
        if issues.iter().any(|i| i.severity == Severity::Blocking) {
            Validation::Invalid { issues }
        } else {
            Validation::Valid {
                data: candidate.clone(),
                advisories: issues,
            }
        }
    }

    /// Parse-or-throw
    ///
    /// # Errors
    ///
    /// Returns the full issue list if any issue is blocking
    pub fn parse(&self, schema: &Schema, candidate: Value) -> Result<Value, SchemaValidationError> {
        let mut issues = Vec::new();
        self.check_object(schema, &candidate, "", &mut issues);
        if issues.iter().any(|i| i.severity == Severity::Blocking) {
            return Err(SchemaValidationError {
                schema: schema.name.clone(),
                issues,
            });
        }
        for advisory in &issues {
            tracing::debug!(schema = %schema.name, "advisory: {}", advisory);
        }
        Ok(candidate)
    }

    /// Parse-and-report over a batch; never aborts
    #[must_use]
    pub fn report<I>(&self, schema: &Schema, rows: I) -> BatchReport
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut report = BatchReport::default();
        for (id, candidate) in rows {
            let validation = self.validate(schema, &candidate);
            report.rows.push(ReportRow {
                id,
                valid: validation.is_valid(),
                warnings: validation.issues().iter().map(ToString::to_string).collect(),
            });
        }
        report
    }

    fn check_object(&self, schema: &Schema, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        let Some(map) = value.as_object() else {
            issues.push(blocking(path, format!("expected object, found {}", kind_of(value))));
            return;
        };

        for (name, spec) in &schema.fields {
            let field_path = join(path, name);
            match map.get(name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        issues.push(blocking(&field_path, "required field missing".to_string()));
                    }
                }
                Some(field) => self.check_field(spec, field, &field_path, issues),
            }
        }

        if !schema.allow_unknown {
            for key in map.keys().filter(|k| !schema.fields.contains_key(*k)) {
                issues.push(blocking(&join(path, key), "unknown field".to_string()));
            }
        }
    }

    fn check_field(&self, spec: &FieldSpec, value: &Value, path: &str, issues: &mut Vec<Issue>) {
        if !self.check_type(&spec.kind, value, path, issues) {
            return;
        }
        for constraint in &spec.constraints {
            match constraint {
                Constraint::NonEmpty => {
                    let empty = match value {
                        Value::String(s) => s.trim().is_empty(),
                        Value::Array(a) => a.is_empty(),
                        _ => false,
                    };
                    if empty {
                        issues.push(Issue {
                            path: path.to_string(),
                            message: "must not be empty at publish time".to_string(),
                            severity: match self.mode {
                                Mode::Publish => Severity::Blocking,
                                Mode::Template => Severity::Advisory,
                            },
                        });
                    }
                }
            }
        }
    }

    /// Returns whether the value had the expected type
    fn check_type(&self, kind: &FieldType, value: &Value, path: &str, issues: &mut Vec<Issue>) -> bool {
        let matches = match (kind, value) {
            (FieldType::Any, _)
            | (FieldType::String, Value::String(_))
            | (FieldType::Number, Value::Number(_))
            | (FieldType::Boolean, Value::Bool(_)) => true,
            (FieldType::Object { schema }, Value::Object(_)) => {
                self.check_object(schema, value, path, issues);
                true
            }
            (FieldType::Array { items }, Value::Array(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    let element_path = format!("{}[{}]", path, index);
                    if element.is_null() {
                        issues.push(blocking(&element_path, "null array element".to_string()));
                        continue;
                    }
                    self.check_type(items, element, &element_path, issues);
                }
                true
            }
            _ => false,
        };
        if !matches {
            issues.push(blocking(
                path,
                format!("expected {}, found {}", kind.describe(), kind_of(value)),
            ));
        }
        matches
    }
}

fn blocking(path: &str, message: String) -> Issue {
    Issue {
        path: path.to_string(),
        message,
        severity: Severity::Blocking,
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new("project")
            .field("projectName", FieldSpec::required(FieldType::String).non_empty())
            .required(
                "hero",
                FieldType::object(
                    Schema::new("hero")
                        .field("title", FieldSpec::required(FieldType::String).non_empty()),
                ),
            )
            .field(
                "amenities",
                FieldSpec::optional(FieldType::array_of(
                    Schema::new("amenity").required("name", FieldType::String),
                ))
                .non_empty(),
            )
            .optional("featured", FieldType::Boolean)
    }

    #[test]
    fn test_valid_object() {
        let candidate = json!({
            "projectName": "Lakeview",
            "hero": {"title": "Live by the lake"},
            "amenities": [{"name": "Pool"}],
            "extra": "carried through"
        });
        let validation = Validator::publish().validate(&schema(), &candidate);
        assert!(validation.is_valid());
        assert!(validation.issues().is_empty());
    }

    #[test]
    fn test_missing_required_is_blocking() {
        let candidate = json!({"projectName": "Lakeview"});
        let err = Validator::publish().parse(&schema(), candidate).unwrap_err();
        assert_eq!(err.schema, "project");
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].path, "hero");
        assert_eq!(err.issues[0].severity, Severity::Blocking);
        assert!(err.to_string().contains("hero: required field missing"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let candidate = json!({"projectName": "Lakeview", "hero": null});
        assert!(!Validator::publish().validate(&schema(), &candidate).is_valid());
    }

    #[test]
    fn test_wrong_type_paths() {
        let candidate = json!({
            "projectName": 7,
            "hero": {"title": "ok"},
            "amenities": [{"name": "Pool"}, {"name": 3}],
            "featured": "yes"
        });
        let Validation::Invalid { issues } = Validator::publish().validate(&schema(), &candidate) else {
            panic!("expected invalid");
        };
        let paths: Vec<&str> = issues.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["projectName", "amenities[1].name", "featured"]);
        assert_eq!(issues[0].message, "expected string, found number");
    }

    #[test]
    fn test_non_empty_depends_on_mode() {
        let candidate = json!({
            "projectName": "",
            "hero": {"title": ""},
            "amenities": []
        });

        let publish = Validator::publish().validate(&schema(), &candidate);
        assert!(!publish.is_valid());
        assert_eq!(publish.issues().len(), 3);

        let template = Validator::template().validate(&schema(), &candidate);
        assert!(template.is_valid());
        assert!(template
            .issues()
            .iter()
            .all(|i| i.severity == Severity::Advisory));
    }

    #[test]
    fn test_generated_template_validates_in_template_mode() {
        let template = schema().template();
        assert!(Validator::template().validate(&schema(), &template).is_valid());
        assert!(!Validator::publish().validate(&schema(), &template).is_valid());
    }

    #[test]
    fn test_strict_schema_rejects_unknown() {
        let strict = Schema::new("seo").optional("title", FieldType::String).strict();
        let validation = Validator::publish().validate(&strict, &json!({"titel": "typo"}));
        assert_eq!(validation.issues()[0].path, "titel");
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_root_must_be_object() {
        let validation = Validator::publish().validate(&schema(), &json!([1, 2]));
        assert_eq!(validation.issues()[0].to_string(), "(root): expected object, found array");
    }

    #[test]
    fn test_report_never_aborts() {
        let rows = vec![
            ("acme-one".to_string(), json!({"projectName": "One", "hero": {"title": "One"}})),
            ("acme-two".to_string(), json!({"projectName": "Two"})),
            ("acme-three".to_string(), json!("not an object")),
        ];
        let mut report = Validator::publish().report(&schema(), rows);
        report.push_failure("acme-four", "identity file missing");

        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.valid_count(), 1);
        assert_eq!(report.invalid_count(), 3);
        assert_eq!(report.rows[1].warnings, vec!["hero: required field missing"]);
        assert_eq!(report.summary(), "1/4 valid, 3 with errors");
    }
}
