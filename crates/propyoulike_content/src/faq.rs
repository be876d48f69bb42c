//! Three-tier FAQ merge.
//!
//! Tiers are concatenated universal, then builder, then project. Entries are
//! never de-duplicated: the same question may appear in several tiers.

use crate::error::{ContentError, ContentResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Authoring tier of a FAQ entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqLevel {
    /// `global/faq.json`
    Universal,
    /// `projects/<builder>/faq.json`
    Builder,
    /// The project's own FAQ file
    Project,
}

impl fmt::Display for FaqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Universal => "universal",
            Self::Builder => "builder",
            Self::Project => "project",
        })
    }
}

/// One FAQ entry with its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Optional grouping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Tier the entry came from
    pub level: FaqLevel,
}

#[derive(Deserialize)]
struct RawEntry {
    question: String,
    answer: String,
    #[serde(default)]
    category: Option<String>,
}

/// Parse one tier file, tagging entries with `level`.
///
/// Accepts a bare array or an object wrapping the array under `faq`.
///
/// # Errors
///
/// Returns error if entries do not have `question`/`answer` strings
pub fn parse_tier(value: Value, level: FaqLevel, path: &str) -> ContentResult<Vec<FaqEntry>> {
    let items = match value {
        Value::Object(mut map) if map.contains_key("faq") => map.remove("faq").unwrap_or_default(),
        Value::Null => return Ok(Vec::new()),
        other => other,
    };
    let raw: Vec<RawEntry> =
        serde_json::from_value(items).map_err(|e| ContentError::InvalidJson {
            path: path.to_string(),
            source: e.into(),
        })?;
    Ok(raw
        .into_iter()
        .map(|entry| FaqEntry {
            question: entry.question,
            answer: entry.answer,
            category: entry.category,
            level,
        })
        .collect())
}

/// Concatenate tiers in universal, builder, project order
#[must_use]
pub fn merge(universal: Vec<FaqEntry>, builder: Vec<FaqEntry>, project: Vec<FaqEntry>) -> Vec<FaqEntry> {
    let mut merged = Vec::with_capacity(universal.len() + builder.len() + project.len());
    merged.extend(universal);
    merged.extend(builder);
    merged.extend(project);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tier(level: FaqLevel, questions: &[&str]) -> Vec<FaqEntry> {
        let items: Vec<Value> = questions
            .iter()
            .map(|q| json!({"question": q, "answer": "yes"}))
            .collect();
        parse_tier(Value::Array(items), level, "test").unwrap()
    }

    #[test]
    fn test_merge_is_additive_in_tier_order() {
        let merged = merge(
            tier(FaqLevel::Universal, &["Is it RERA approved?", "Loans?"]),
            tier(FaqLevel::Builder, &["Is it RERA approved?"]),
            tier(FaqLevel::Project, &["Possession date?", "Parking?", "Loans?"]),
        );
        assert_eq!(merged.len(), 2 + 1 + 3);
        let levels: Vec<FaqLevel> = merged.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![
                FaqLevel::Universal,
                FaqLevel::Universal,
                FaqLevel::Builder,
                FaqLevel::Project,
                FaqLevel::Project,
                FaqLevel::Project,
            ]
        );
        assert_eq!(merged[2].question, "Is it RERA approved?");
    }

    #[test]
    fn test_parse_tier_envelope_and_null() {
        let entries = parse_tier(
            json!({"faq": [{"question": "Q", "answer": "A", "category": "legal"}]}),
            FaqLevel::Builder,
            "test",
        )
        .unwrap();
        assert_eq!(entries[0].category.as_deref(), Some("legal"));
        assert_eq!(entries[0].level, FaqLevel::Builder);
        assert!(parse_tier(Value::Null, FaqLevel::Project, "test").unwrap().is_empty());
    }

    #[test]
    fn test_parse_tier_rejects_bad_entries() {
        let err = parse_tier(json!([{"question": "Q"}]), FaqLevel::Project, "p/faq.json").unwrap_err();
        assert!(matches!(err, ContentError::InvalidJson { .. }));
    }

    #[test]
    fn test_serialized_level() {
        let entry = &tier(FaqLevel::Universal, &["Q"])[0];
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            json!({"question": "Q", "answer": "yes", "level": "universal"})
        );
    }
}
