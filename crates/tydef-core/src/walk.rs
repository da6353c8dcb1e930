//! # Schema Reference Walk
//!
//! Structural traversal of a JSON Schema tree that visits every `$ref`
//! string in a subschema position.
//!
//! Keys of `properties`-like maps are author-chosen names, not keywords, so
//! a property called `default` is still entered. Values of data keywords
//! (`const`, `enum`, `default`, `examples`) are instance literals and are
//! never entered.

use serde_json::Value;

/// Keywords whose values are instance data.
const DATA_KEYWORDS: &[&str] = &["const", "enum", "default", "examples"];

/// Keywords whose values map author-chosen names to subschemas.
const SCHEMA_MAP_KEYWORDS: &[&str] = &[
    "properties",
    "patternProperties",
    "definitions",
    "$defs",
    "dependencies",
];

/// Visit every `$ref` string in `schema`.
pub fn for_each_ref(schema: &Value, visit: &mut impl FnMut(&str)) {
    match schema {
        Value::Object(map) => {
            for (key, value) in map {
                match (key.as_str(), value) {
                    ("$ref", Value::String(reference)) => visit(reference),
                    (k, _) if DATA_KEYWORDS.contains(&k) => {}
                    (k, Value::Object(entries)) if SCHEMA_MAP_KEYWORDS.contains(&k) => {
                        for entry in entries.values() {
                            for_each_ref(entry, visit);
                        }
                    }
                    _ => for_each_ref(value, visit),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                for_each_ref(item, visit);
            }
        }
        _ => {}
    }
}

/// Visit every `$ref` string in `schema`, allowing it to be rewritten.
pub fn for_each_ref_mut(schema: &mut Value, visit: &mut impl FnMut(&mut String)) {
    match schema {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                match (key.as_str(), value) {
                    ("$ref", Value::String(reference)) => visit(reference),
                    (k, _) if DATA_KEYWORDS.contains(&k) => {}
                    (k, Value::Object(entries)) if SCHEMA_MAP_KEYWORDS.contains(&k) => {
                        for entry in entries.values_mut() {
                            for_each_ref_mut(entry, visit);
                        }
                    }
                    (_, value) => for_each_ref_mut(value, visit),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                for_each_ref_mut(item, visit);
            }
        }
        _ => {}
    }
}

/// Collect every `$ref` string in `schema`, in traversal order.
pub fn collect_refs(schema: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    for_each_ref(schema, &mut |r| refs.push(r.to_string()));
    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collects_nested_refs() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "$ref": "#/definitions/a" },
                "b": { "type": "array", "items": { "$ref": "#/definitions/b" } },
                "c": { "oneOf": [{ "type": "null" }, { "$ref": "#/definitions/c" }] }
            }
        });
        let mut refs = collect_refs(&schema);
        refs.sort();
        assert_eq!(refs, vec!["#/definitions/a", "#/definitions/b", "#/definitions/c"]);
    }

    #[test]
    fn test_property_named_like_data_keyword_is_entered() {
        let schema = json!({
            "properties": {
                "default": { "$ref": "#/definitions/x" },
                "enum": { "$ref": "#/definitions/y" }
            }
        });
        let mut refs = collect_refs(&schema);
        refs.sort();
        assert_eq!(refs, vec!["#/definitions/x", "#/definitions/y"]);
    }

    #[test]
    fn test_data_keywords_are_skipped() {
        let schema = json!({
            "const": { "$ref": "#/definitions/no" },
            "enum": [{ "$ref": "#/definitions/no" }],
            "default": { "$ref": "#/definitions/no" },
            "examples": [{ "$ref": "#/definitions/no" }]
        });
        assert!(collect_refs(&schema).is_empty());
    }

    #[test]
    fn test_non_string_ref_is_walked_as_schema() {
        let schema = json!({ "properties": { "$ref": { "$ref": "#/definitions/z" } } });
        assert_eq!(collect_refs(&schema), vec!["#/definitions/z"]);
    }

    #[test]
    fn test_rewrite_in_place() {
        let mut schema = json!({ "items": { "$ref": "old" } });
        for_each_ref_mut(&mut schema, &mut |r| *r = "new".to_string());
        assert_eq!(schema, json!({ "items": { "$ref": "new" } }));
    }
}
