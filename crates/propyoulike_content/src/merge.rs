//! Precedence merge of section payloads.

use serde_json::Value;

/// Deep-merge `overlay` onto `base`.
///
/// Objects merge key by key, recursively. Any other value on the overlay
/// side, arrays included, replaces the base value. A `null` overlay leaves
/// the base untouched.
#[must_use]
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers from least to most specific
#[must_use]
pub fn merge_tiers<I>(tiers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    tiers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_more_specific_scalar_wins() {
        let merged = merge_tiers([
            json!({"title": "global", "cta": "Enquire"}),
            json!({"title": "builder"}),
            json!({"title": "project"}),
        ]);
        assert_eq!(merged, json!({"title": "project", "cta": "Enquire"}));
    }

    #[test]
    fn test_nested_objects_merge() {
        let merged = deep_merge(
            json!({"contact": {"phone": "1", "email": "a@b"}}),
            json!({"contact": {"phone": "2"}}),
        );
        assert_eq!(merged, json!({"contact": {"phone": "2", "email": "a@b"}}));
    }

    #[test]
    fn test_arrays_replace() {
        let merged = deep_merge(json!({"items": [1, 2, 3]}), json!({"items": [4]}));
        assert_eq!(merged, json!({"items": [4]}));
    }

    #[test]
    fn test_null_overlay_keeps_base() {
        assert_eq!(deep_merge(json!({"a": 1}), Value::Null), json!({"a": 1}));
        assert_eq!(merge_tiers([Value::Null, Value::Null]), Value::Null);
    }

    proptest::proptest! {
        #[test]
        fn prop_project_tier_wins(
            global in "[a-z]{0,8}",
            builder in "[a-z]{0,8}",
            project in "[a-z]{1,8}",
        ) {
            let merged = merge_tiers([
                json!({"hero": {"title": global, "tagline": "g"}}),
                json!({"hero": {"title": builder}}),
                json!({"hero": {"title": project.clone()}}),
            ]);
            proptest::prop_assert_eq!(&merged["hero"]["title"], &json!(project));
            proptest::prop_assert_eq!(&merged["hero"]["tagline"], &json!("g"));
        }
    }
}
