//! # Meta-Schemas
//!
//! Structural validation of authored resources, before anything is
//! deserialized. Every resource is first checked against an envelope
//! schema (`kind`, `system`, `name`) and then against the closed Draft-07
//! schema for its kind. Unknown fields are rejected.

use std::collections::BTreeMap;

use jsonschema::Validator;
use serde_json::{json, Map, Value};
use tydef_core::TypeKind;

use crate::error::{InvalidType, LibraryError};
use crate::options::LibraryOptions;
use crate::validate::{compile_validator, evaluate};

/// Names of systems, types, properties and variants.
pub const NAME_PATTERN: &str = "^[a-z][a-zA-Z0-9]*$";

/// A type reference: a bare or `system/`-qualified name.
pub const REFERENCE_PATTERN: &str = "^([a-z][a-zA-Z0-9]*/)?[a-z][a-zA-Z0-9]*$";

/// Compiled meta-schemas for every kind.
pub struct MetaSchemas {
    envelope: Validator,
    kinds: BTreeMap<TypeKind, Validator>,
}

impl std::fmt::Debug for MetaSchemas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaSchemas")
            .field("kinds", &self.kinds.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MetaSchemas {
    /// Compile the envelope and every per-kind meta-schema.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::MetaSchema`] if a built-in schema does not
    /// compile.
    pub fn new() -> Result<Self, LibraryError> {
        let options = LibraryOptions::default();
        let compile = |label: &str, schema: &Value| {
            compile_validator(label, schema, &options).map_err(|e| LibraryError::MetaSchema {
                kind: label.to_string(),
                reason: e.to_string(),
            })
        };
        let envelope = compile("envelope", &envelope_schema())?;
        let mut kinds = BTreeMap::new();
        for kind in TypeKind::ALL {
            kinds.insert(kind, compile(kind.as_str(), &kind_schema(kind))?);
        }
        Ok(Self { envelope, kinds })
    }

    /// Check one parsed resource.
    ///
    /// `index` is the resource's position in the input and names the
    /// resource when it carries no usable `system`/`name`.
    ///
    /// # Errors
    ///
    /// Returns the [`InvalidType`] describing every violation found.
    pub fn check(&self, index: usize, resource: &Value) -> Result<(), InvalidType> {
        let type_name = match (
            resource.get("system").and_then(Value::as_str),
            resource.get("name").and_then(Value::as_str),
        ) {
            (Some(system), Some(name)) => format!("{system}/{name}"),
            _ => format!("resource[{index}]"),
        };
        let kind_label = resource
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let invalid = |violations| InvalidType {
            type_name: type_name.clone(),
            kind: kind_label.clone(),
            violations,
        };

        let envelope = evaluate(&self.envelope, resource);
        if !envelope.is_empty() {
            return Err(invalid(envelope));
        }
        let kind: Option<TypeKind> = kind_label.parse().ok();
        let validator = kind.and_then(|k| self.kinds.get(&k));
        match validator {
            Some(validator) => {
                let violations = evaluate(validator, resource);
                if violations.is_empty() {
                    Ok(())
                } else {
                    Err(invalid(violations))
                }
            }
            // The envelope restricts `kind` to the known kinds.
            None => Ok(()),
        }
    }
}

fn envelope_schema() -> Value {
    let kinds: Vec<&str> = TypeKind::ALL.iter().map(TypeKind::as_str).collect();
    json!({
        "type": "object",
        "required": ["kind", "system", "name"],
        "properties": {
            "kind": { "enum": kinds },
            "system": { "type": "string", "pattern": NAME_PATTERN },
            "name": { "type": "string", "pattern": NAME_PATTERN }
        }
    })
}

fn name_schema() -> Value {
    json!({ "type": "string", "pattern": NAME_PATTERN })
}

fn reference_schema() -> Value {
    json!({ "type": "string", "pattern": REFERENCE_PATTERN })
}

fn length_schema() -> Value {
    json!({ "type": "integer", "minimum": 0 })
}

fn name_list_schema() -> Value {
    json!({ "type": "array", "items": name_schema() })
}

/// A closed object schema with the common fields, the test-case fields
/// and `extra`.
fn closed(kind: TypeKind, required: &[&str], extra: Value, test_cases: bool) -> Value {
    let mut properties = Map::new();
    properties.insert("kind".into(), json!({ "const": kind.as_str() }));
    properties.insert("system".into(), name_schema());
    properties.insert("name".into(), name_schema());
    properties.insert("summary".into(), json!({ "type": "string" }));
    properties.insert("deprecated".into(), json!({ "type": "boolean" }));
    properties.insert(
        "tags".into(),
        json!({ "type": "array", "items": { "type": "string" } }),
    );
    properties.insert(
        "labels".into(),
        json!({ "type": "object", "additionalProperties": { "type": "string" } }),
    );
    if test_cases {
        properties.insert("validTestCases".into(), json!({ "type": "array" }));
        properties.insert("invalidTestCases".into(), json!({ "type": "array" }));
    }
    if let Value::Object(extra) = extra {
        properties.extend(extra);
    }
    let mut all_required = vec!["kind", "system", "name"];
    all_required.extend_from_slice(required);
    json!({
        "type": "object",
        "required": all_required,
        "properties": properties,
        "additionalProperties": false
    })
}

fn kind_schema(kind: TypeKind) -> Value {
    match kind {
        TypeKind::Bool => closed(kind, &[], json!({}), false),
        TypeKind::Int => closed(
            kind,
            &[],
            json!({
                "minimum": { "type": "integer" },
                "maximum": { "type": "integer" },
                "isMinimumExclusive": { "type": "boolean" },
                "isMaximumExclusive": { "type": "boolean" }
            }),
            true,
        ),
        TypeKind::Float => closed(
            kind,
            &[],
            json!({
                "minimum": { "type": "number" },
                "maximum": { "type": "number" },
                "isMinimumExclusive": { "type": "boolean" },
                "isMaximumExclusive": { "type": "boolean" }
            }),
            true,
        ),
        TypeKind::String => closed(
            kind,
            &[],
            json!({
                "minimumLength": length_schema(),
                "maximumLength": length_schema(),
                "regex": { "type": "string", "format": "regex" },
                "format": { "type": "string", "minLength": 1 }
            }),
            true,
        ),
        TypeKind::Enum => closed(
            kind,
            &["items"],
            json!({
                "items": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["value"],
                        "properties": {
                            "value": { "type": ["string", "integer", "boolean"] },
                            "text": { "type": "string" },
                            "summary": { "type": "string" },
                            "symbol": { "type": "string" },
                            "deprecated": { "type": "boolean" },
                            "data": {}
                        },
                        "additionalProperties": false
                    }
                },
                "dataType": reference_schema()
            }),
            true,
        ),
        TypeKind::Array => closed(
            kind,
            &["elementType"],
            json!({
                "elementType": reference_schema(),
                "minimumLength": length_schema(),
                "maximumLength": length_schema()
            }),
            true,
        ),
        TypeKind::Object => closed(
            kind,
            &["jsonSchema"],
            json!({
                "jsonSchema": {
                    "type": "object",
                    "propertyNames": {
                        "not": { "enum": ["definitions", "$defs", "$id", "$schema"] }
                    }
                }
            }),
            true,
        ),
        TypeKind::Record => closed(
            kind,
            &["properties"],
            json!({
                "properties": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "propertyType"],
                        "properties": {
                            "name": name_schema(),
                            "propertyType": reference_schema(),
                            "isArray": { "type": "boolean" },
                            "isNullable": { "type": "boolean" },
                            "default": {},
                            "summary": { "type": "string" },
                            "deprecated": { "type": "boolean" }
                        },
                        "additionalProperties": false
                    }
                },
                "required": name_list_schema(),
                "variants": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": name_schema(),
                            "summary": { "type": "string" },
                            "includeProperties": name_list_schema(),
                            "excludeProperties": name_list_schema()
                        },
                        "additionalProperties": false,
                        "oneOf": [
                            { "required": ["includeProperties"] },
                            { "required": ["excludeProperties"] }
                        ]
                    }
                },
                "calculatedProperties": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["name", "propertyType"],
                        "properties": {
                            "name": name_schema(),
                            "propertyType": reference_schema(),
                            "inputProperties": name_list_schema(),
                            "summary": { "type": "string" }
                        },
                        "additionalProperties": false
                    }
                }
            }),
            true,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> MetaSchemas {
        MetaSchemas::new().unwrap()
    }

    #[test]
    fn test_all_meta_schemas_compile() {
        let m = meta();
        assert_eq!(m.kinds.len(), TypeKind::ALL.len());
    }

    #[test]
    fn test_minimal_resources_pass() {
        let m = meta();
        let ok = [
            json!({ "kind": "bool", "system": "test", "name": "flag" }),
            json!({ "kind": "int", "system": "test", "name": "smallInt", "minimum": -128, "maximum": 128 }),
            json!({ "kind": "float", "system": "test", "name": "ratio", "minimum": 0.5 }),
            json!({ "kind": "string", "system": "test", "name": "code", "regex": "^[A-Z]+$" }),
            json!({ "kind": "enum", "system": "test", "name": "lang", "items": [{ "value": "en" }] }),
            json!({ "kind": "array", "system": "test", "name": "ints", "elementType": "core/smallInt" }),
            json!({ "kind": "object", "system": "test", "name": "point", "jsonSchema": { "type": "object" } }),
            json!({
                "kind": "record", "system": "test", "name": "rec",
                "properties": [{ "name": "one", "propertyType": "smallInt" }],
                "required": ["one"],
                "variants": [{ "name": "recPatch", "excludeProperties": ["one"] }]
            }),
        ];
        for resource in &ok {
            m.check(0, resource).unwrap();
        }
    }

    #[test]
    fn test_missing_envelope_uses_positional_name() {
        let err = meta().check(3, &json!({ "kind": "int" })).unwrap_err();
        assert_eq!(err.type_name, "resource[3]");
        assert_eq!(err.kind, "int");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = meta()
            .check(0, &json!({ "kind": "map", "system": "test", "name": "m" }))
            .unwrap_err();
        assert_eq!(err.type_name, "test/m");
        assert_eq!(err.kind, "map");
    }

    #[test]
    fn test_bad_name_rejected() {
        let err = meta()
            .check(0, &json!({ "kind": "bool", "system": "test", "name": "Flag" }))
            .unwrap_err();
        assert!(!err.violations.is_empty());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = meta()
            .check(0, &json!({ "kind": "bool", "system": "test", "name": "flag", "minimum": 1 }))
            .unwrap_err();
        assert_eq!(err.kind, "bool");
    }

    #[test]
    fn test_property_without_type_rejected() {
        let err = meta()
            .check(
                0,
                &json!({
                    "kind": "record", "system": "test", "name": "rec",
                    "properties": [{ "name": "one" }]
                }),
            )
            .unwrap_err();
        assert!(err
            .violations
            .violations()
            .iter()
            .any(|v| v.instance_path == "/properties/0"));
    }

    #[test]
    fn test_variant_needs_exactly_one_selection() {
        let m = meta();
        let both = json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [],
            "variants": [{ "name": "v", "includeProperties": [], "excludeProperties": [] }]
        });
        let neither = json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [],
            "variants": [{ "name": "v" }]
        });
        assert!(m.check(0, &both).is_err());
        assert!(m.check(0, &neither).is_err());
    }

    #[test]
    fn test_object_fragment_may_not_carry_definitions() {
        let err = meta()
            .check(
                0,
                &json!({
                    "kind": "object", "system": "test", "name": "point",
                    "jsonSchema": { "definitions": {} }
                }),
            )
            .unwrap_err();
        assert_eq!(err.type_name, "test/point");
    }

    #[test]
    fn test_empty_enum_rejected() {
        assert!(meta()
            .check(0, &json!({ "kind": "enum", "system": "test", "name": "e", "items": [] }))
            .is_err());
    }
}
