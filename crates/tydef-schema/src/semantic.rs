//! # Semantic Checks
//!
//! Cross-cutting checks run on each patched definition once the whole
//! registry is known. Each check raises its own named error and the first
//! failure ends validation of the definition.
//!
//! Value-level checks (test cases, enum data, property defaults) need
//! compiled documents and live in [`crate::selftest`].

use std::collections::BTreeSet;

use tydef_core::{
    ArrayDef, DefinitionBody, EnumDef, NumericDef, ObjectDef, QualifiedName, RecordDef,
    StringDef, TypeDefinition,
};

use crate::error::LibraryError;
use crate::options::LibraryOptions;
use crate::registry::TypeRegistry;

/// Run every semantic check that applies to `def`.
///
/// # Errors
///
/// Returns the first [`LibraryError`] found.
pub fn check_definition(
    def: &TypeDefinition,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<(), LibraryError> {
    let name = def.name();
    match &def.body {
        DefinitionBody::Bool => Ok(()),
        DefinitionBody::Int(d) => check_numeric(name, d),
        DefinitionBody::Float(d) => check_numeric(name, d),
        DefinitionBody::String(d) => check_string(name, d),
        DefinitionBody::Enum(d) => check_enum(name, d, registry),
        DefinitionBody::Array(d) => check_array(name, d, registry),
        DefinitionBody::Object(d) => check_object(name, d, registry),
        DefinitionBody::Record(d) => check_record(name, d, registry, options),
    }
}

fn require_known(name: &QualifiedName, registry: &TypeRegistry) -> Result<(), LibraryError> {
    if registry.contains(name) {
        Ok(())
    } else {
        Err(LibraryError::UnrecognisedType {
            type_name: name.to_string(),
        })
    }
}

fn check_numeric<T>(name: &QualifiedName, d: &NumericDef<T>) -> Result<(), LibraryError>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    match (d.minimum, d.maximum) {
        (Some(min), Some(max)) if !d.bounds_are_satisfiable() => {
            let exclusive = if d.minimum_exclusive || d.maximum_exclusive {
                " with an exclusive bound"
            } else {
                ""
            };
            Err(LibraryError::InvalidBounds {
                type_name: name.clone(),
                reason: format!("minimum {min} and maximum {max} admit no value{exclusive}"),
            })
        }
        _ => Ok(()),
    }
}

fn check_lengths(
    name: &QualifiedName,
    minimum: Option<u64>,
    maximum: Option<u64>,
) -> Result<(), LibraryError> {
    match (minimum, maximum) {
        (Some(min), Some(max)) if min > max => Err(LibraryError::InvalidBounds {
            type_name: name.clone(),
            reason: format!("minimumLength {min} exceeds maximumLength {max}"),
        }),
        _ => Ok(()),
    }
}

fn check_string(name: &QualifiedName, d: &StringDef) -> Result<(), LibraryError> {
    check_lengths(name, d.minimum_length, d.maximum_length)
}

fn check_enum(
    name: &QualifiedName,
    d: &EnumDef,
    registry: &TypeRegistry,
) -> Result<(), LibraryError> {
    let mut seen = BTreeSet::new();
    for item in &d.items {
        if !seen.insert(&item.value) {
            return Err(LibraryError::DuplicateEnumItemValue {
                type_name: name.clone(),
                value: item.value.to_string(),
            });
        }
    }
    if let Some(data_type) = &d.data_type {
        require_known(data_type, registry)?;
    }
    Ok(())
}

fn check_array(
    name: &QualifiedName,
    d: &ArrayDef,
    registry: &TypeRegistry,
) -> Result<(), LibraryError> {
    check_lengths(name, d.minimum_length, d.maximum_length)?;
    require_known(&d.element_type, registry)
}

fn check_object(
    name: &QualifiedName,
    d: &ObjectDef,
    registry: &TypeRegistry,
) -> Result<(), LibraryError> {
    if let Some(reference) = d.foreign_references.first() {
        return Err(LibraryError::UnsupportedReference {
            type_name: name.clone(),
            reference: reference.clone(),
        });
    }
    d.references
        .iter()
        .try_for_each(|r| require_known(r, registry))
}

fn check_record(
    name: &QualifiedName,
    d: &RecordDef,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<(), LibraryError> {
    let mut declared = BTreeSet::new();
    for p in &d.properties {
        if options.is_reserved(&p.name) {
            return Err(LibraryError::ReservedPropertyName {
                type_name: name.clone(),
                property: p.name.clone(),
            });
        }
        if !declared.insert(p.name.as_str()) {
            return Err(LibraryError::DuplicatePropertyName {
                type_name: name.clone(),
                property: p.name.clone(),
            });
        }
    }

    let unknown_in = |names: &[String], context: String| {
        names
            .iter()
            .find(|n| !declared.contains(n.as_str()))
            .map(|n| LibraryError::UnrecognisedPropertyName {
                type_name: name.clone(),
                property: n.clone(),
                context,
            })
    };

    if let Some(err) = unknown_in(d.required.as_slice(), "required".to_string()) {
        return Err(err);
    }
    for variant in &d.variants {
        if let Some(err) = unknown_in(
            variant.selection.listed(),
            format!("variant '{}'", variant.name),
        ) {
            return Err(err);
        }
    }

    for p in &d.properties {
        if !registry.contains(&p.property_type) {
            return Err(LibraryError::UnrecognisedPropertyType {
                type_name: name.clone(),
                property: p.name.clone(),
                property_type: p.property_type.clone(),
            });
        }
    }

    let mut calculated = BTreeSet::new();
    for c in &d.calculated_properties {
        let clash = |clashes_with: String| LibraryError::CalculatedPropertyNamesClash {
            type_name: name.clone(),
            property: c.name.clone(),
            clashes_with,
        };
        if options.is_reserved(&c.name) {
            return Err(clash("a reserved name".to_string()));
        }
        if declared.contains(c.name.as_str()) {
            return Err(clash(format!("property '{}'", c.name)));
        }
        if !calculated.insert(c.name.as_str()) {
            return Err(clash("another calculated property".to_string()));
        }
        if let Some(err) = unknown_in(
            c.input_properties.as_slice(),
            format!("calculated property '{}'", c.name),
        ) {
            return Err(err);
        }
        if !registry.contains(&c.property_type) {
            return Err(LibraryError::UnrecognisedPropertyType {
                type_name: name.clone(),
                property: c.name.clone(),
                property_type: c.property_type.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tydef_core::{patch::patch, RawDefinition};

    fn build(resources: Vec<Value>) -> TypeRegistry {
        let mut base = vec![json!({ "kind": "int", "system": "test", "name": "smallInt" })];
        base.extend(resources);
        let defs = base.into_iter().flat_map(|r| {
            let raw: RawDefinition = serde_json::from_value(r).unwrap();
            patch(raw)
        });
        TypeRegistry::from_definitions(defs).unwrap()
    }

    fn check(registry: &TypeRegistry, name: &str) -> Result<(), LibraryError> {
        let def = registry.lookup_str(name).unwrap();
        check_definition(def, registry, &LibraryOptions::default())
    }

    fn record(extra: Value) -> Value {
        let mut base = json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [{ "name": "one", "propertyType": "smallInt" }]
        });
        if let (Some(map), Value::Object(extra)) = (base.as_object_mut(), extra) {
            map.extend(extra);
        }
        base
    }

    #[test]
    fn test_valid_record_passes() {
        let reg = build(vec![record(json!({
            "required": ["one"],
            "variants": [{ "name": "recPatch", "excludeProperties": ["one"] }],
            "calculatedProperties": [
                { "name": "doubled", "propertyType": "smallInt", "inputProperties": ["one"] }
            ]
        }))]);
        check(&reg, "test/rec").unwrap();
        check(&reg, "test/recPatch").unwrap();
    }

    #[test]
    fn test_required_names_unknown_property() {
        let reg = build(vec![record(json!({ "required": ["two"] }))]);
        match check(&reg, "test/rec").unwrap_err() {
            LibraryError::UnrecognisedPropertyName {
                property, context, ..
            } => {
                assert_eq!(property, "two");
                assert_eq!(context, "required");
            }
            other => panic!("expected UnrecognisedPropertyName, got {other}"),
        }
    }

    #[test]
    fn test_variant_names_unknown_property() {
        let reg = build(vec![record(json!({
            "variants": [{ "name": "recPatch", "includeProperties": ["three"] }]
        }))]);
        let err = check(&reg, "test/rec").unwrap_err();
        assert!(err.to_string().contains("variant 'test/recPatch'"));
    }

    #[test]
    fn test_reserved_property_name() {
        let reg = build(vec![json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [{ "name": "id", "propertyType": "smallInt" }]
        })]);
        assert!(matches!(
            check(&reg, "test/rec"),
            Err(LibraryError::ReservedPropertyName { ref property, .. }) if property == "id"
        ));
    }

    #[test]
    fn test_duplicate_property_name() {
        let reg = build(vec![json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [
                { "name": "one", "propertyType": "smallInt" },
                { "name": "one", "propertyType": "smallInt" }
            ]
        })]);
        assert!(matches!(
            check(&reg, "test/rec"),
            Err(LibraryError::DuplicatePropertyName { .. })
        ));
    }

    #[test]
    fn test_unknown_property_type() {
        let reg = build(vec![json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [{ "name": "one", "propertyType": "doesNotExist" }]
        })]);
        let err = check(&reg, "test/rec").unwrap_err();
        assert_eq!(err.unrecognised_type_name().as_deref(), Some("test/doesNotExist"));
    }

    #[test]
    fn test_calculated_property_clashes() {
        let clash_with_property = build(vec![record(json!({
            "calculatedProperties": [{ "name": "one", "propertyType": "smallInt" }]
        }))]);
        let reserved = build(vec![record(json!({
            "calculatedProperties": [{ "name": "sys", "propertyType": "smallInt" }]
        }))]);
        let repeated = build(vec![record(json!({
            "calculatedProperties": [
                { "name": "calc", "propertyType": "smallInt" },
                { "name": "calc", "propertyType": "smallInt" }
            ]
        }))]);
        for reg in [clash_with_property, reserved, repeated] {
            assert!(matches!(
                check(&reg, "test/rec"),
                Err(LibraryError::CalculatedPropertyNamesClash { .. })
            ));
        }
    }

    #[test]
    fn test_calculated_property_unknown_input() {
        let reg = build(vec![record(json!({
            "calculatedProperties": [
                { "name": "calc", "propertyType": "smallInt", "inputProperties": ["nope"] }
            ]
        }))]);
        assert!(matches!(
            check(&reg, "test/rec"),
            Err(LibraryError::UnrecognisedPropertyName { ref property, .. }) if property == "nope"
        ));
    }

    #[test]
    fn test_numeric_bounds() {
        let reg = build(vec![
            json!({ "kind": "int", "system": "test", "name": "bad", "minimum": 5, "maximum": 1 }),
            json!({
                "kind": "float", "system": "test", "name": "empty",
                "minimum": 1.0, "maximum": 1.0, "isMaximumExclusive": true
            }),
            json!({ "kind": "string", "system": "test", "name": "str", "minimumLength": 3, "maximumLength": 2 }),
        ]);
        for name in ["test/bad", "test/empty", "test/str"] {
            assert!(matches!(check(&reg, name), Err(LibraryError::InvalidBounds { .. })));
        }
    }

    #[test]
    fn test_numeric_bounds_edges() {
        let reg = build(vec![
            json!({ "kind": "int", "system": "test", "name": "open", "minimum": 5 }),
            json!({ "kind": "int", "system": "test", "name": "point", "minimum": 3, "maximum": 3 }),
            json!({
                "kind": "int", "system": "test", "name": "gap",
                "minimum": 3, "maximum": 3, "isMinimumExclusive": true
            }),
        ]);
        check(&reg, "test/open").unwrap();
        check(&reg, "test/point").unwrap();
        let err = check(&reg, "test/gap").unwrap_err();
        assert!(err.to_string().contains("exclusive bound"), "{err}");
    }

    #[test]
    fn test_duplicate_enum_value() {
        let reg = build(vec![json!({
            "kind": "enum", "system": "test", "name": "lang",
            "items": [{ "value": "en" }, { "value": "fr" }, { "value": "en" }]
        })]);
        assert!(matches!(
            check(&reg, "test/lang"),
            Err(LibraryError::DuplicateEnumItemValue { ref value, .. }) if value == "en"
        ));
    }

    #[test]
    fn test_enum_unknown_data_type() {
        let reg = build(vec![json!({
            "kind": "enum", "system": "test", "name": "lang",
            "items": [{ "value": "en" }], "dataType": "missing"
        })]);
        assert!(matches!(
            check(&reg, "test/lang"),
            Err(LibraryError::UnrecognisedType { .. })
        ));
    }

    #[test]
    fn test_array_unknown_element_type() {
        let reg = build(vec![json!({
            "kind": "array", "system": "test", "name": "list", "elementType": "missing"
        })]);
        assert!(check(&reg, "test/list").is_err());
    }

    #[test]
    fn test_object_foreign_reference() {
        let reg = build(vec![json!({
            "kind": "object", "system": "test", "name": "obj",
            "jsonSchema": { "properties": { "a": { "$ref": "https://example.com/a.json" } } }
        })]);
        assert!(matches!(
            check(&reg, "test/obj"),
            Err(LibraryError::UnsupportedReference { ref reference, .. })
                if reference == "https://example.com/a.json"
        ));
    }

    #[test]
    fn test_object_local_reference_must_resolve() {
        let ok = build(vec![json!({
            "kind": "object", "system": "test", "name": "obj",
            "jsonSchema": { "properties": { "a": { "$ref": "#/definitions/smallInt" } } }
        })]);
        check(&ok, "test/obj").unwrap();
        let bad = build(vec![json!({
            "kind": "object", "system": "test", "name": "obj",
            "jsonSchema": { "properties": { "a": { "$ref": "#/definitions/missing" } } }
        })]);
        assert!(matches!(
            check(&bad, "test/obj"),
            Err(LibraryError::UnrecognisedType { ref type_name }) if type_name == "test/missing"
        ));
    }
}
