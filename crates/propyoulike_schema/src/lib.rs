//! PropYouLike Content Schemas
//!
//! Declarative schemas interpreted by a small generic validator.
//! Used to gate merged projects and to generate authoring templates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod schema;
pub mod validate;

pub use catalog::{KNOWN_SECTIONS, builder_schema, faq_entry_schema, project_schema};
pub use schema::{Constraint, FieldSpec, FieldType, Schema};
pub use validate::{
    BatchReport, Issue, Mode, ReportRow, SchemaValidationError, Severity, Validation, Validator,
};
