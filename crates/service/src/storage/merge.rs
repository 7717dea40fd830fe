//! Deep merge over JSON trees.
//!
//! Objects recurse key by key, everything else overwrites. Arrays are leaves:
//! they replace whatever was stored and are never merged element-wise.

use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Merge `source` into `target` in place. Keys of `target` missing from
/// `source` are kept at every level.
pub fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match incoming {
            Value::Object(nested) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(child) = slot {
                    deep_merge(child, nested);
                }
            }
            Value::Array(items) => {
                target.insert(key.clone(), Value::Array(items.clone()));
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

/// Accept only a plain object as a mutation payload.
pub fn into_payload(value: Value) -> Result<Map<String, Value>, ServiceError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(ServiceError::Validation("payload must be an object, got array".into())),
        Value::Null => Err(ServiceError::Validation("payload must be an object, got null".into())),
        _ => Err(ServiceError::Validation("payload must be an object, got scalar".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        into_payload(v).unwrap()
    }

    #[test]
    fn nested_objects_merge_and_preserve_siblings() {
        let mut target = obj(json!({"a": {"b": 1, "c": {"d": true}}, "keep": "me"}));
        deep_merge(&mut target, &obj(json!({"a": {"c": {"e": null}, "f": "x"}})));
        assert_eq!(
            Value::Object(target),
            json!({"a": {"b": 1, "c": {"d": true, "e": null}, "f": "x"}, "keep": "me"})
        );
    }

    #[test]
    fn arrays_replace_wholesale() {
        let mut target = obj(json!({"a": [1, 2, 3]}));
        deep_merge(&mut target, &obj(json!({"a": [4]})));
        assert_eq!(target["a"], json!([4]));

        deep_merge(&mut target, &obj(json!({"a": {"x": 1}})));
        assert_eq!(target["a"], json!({"x": 1}));
    }

    #[test]
    fn array_or_scalar_overwrites_nested_object() {
        let mut target = obj(json!({"a": {"x": 1}, "b": {"y": 2}}));
        deep_merge(&mut target, &obj(json!({"a": [1], "b": null})));
        assert_eq!(Value::Object(target), json!({"a": [1], "b": null}));
    }

    #[test]
    fn object_replaces_scalar() {
        let mut target = obj(json!({"a": 5}));
        deep_merge(&mut target, &obj(json!({"a": {"b": 1}})));
        assert_eq!(target["a"], json!({"b": 1}));
    }

    #[test]
    fn empty_object_creates_empty_node_without_clearing() {
        let mut target = obj(json!({"a": {"b": 1}}));
        deep_merge(&mut target, &obj(json!({"a": {}, "n": {}})));
        assert_eq!(Value::Object(target), json!({"a": {"b": 1}, "n": {}}));
    }

    #[test]
    fn repeated_merge_is_idempotent() {
        let base = obj(json!({"a": {"b": 1, "l": [1]}, "z": "q"}));
        let patch = obj(json!({"a": {"c": {"d": [1, {"e": 2}]}, "l": {"k": 1}}, "y": 3.5}));

        let mut once = base.clone();
        deep_merge(&mut once, &patch);
        let mut twice = once.clone();
        deep_merge(&mut twice, &patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn sequential_merges_from_empty_match_direct_merge() {
        let a = obj(json!({"a": {"b": 1}, "arr": [1, 2]}));
        let b = obj(json!({"a": {"c": 2}, "arr": [3]}));

        let mut from_empty = Map::new();
        deep_merge(&mut from_empty, &a);
        deep_merge(&mut from_empty, &b);

        let mut direct = a.clone();
        deep_merge(&mut direct, &b);
        assert_eq!(from_empty, direct);
        assert_eq!(Value::Object(direct), json!({"a": {"b": 1, "c": 2}, "arr": [3]}));
    }

    #[test]
    fn payload_must_be_plain_object() {
        assert!(into_payload(json!({})).is_ok());
        for bad in [json!([1]), json!(null), json!(1), json!("s"), json!(true)] {
            assert!(matches!(into_payload(bad), Err(ServiceError::Validation(_))));
        }
    }
}
