//! # Patching
//!
//! Turns an authored [`RawDefinition`] into fully-populated
//! [`TypeDefinition`]s. The function is pure: the authored value is consumed
//! and nothing the caller still holds is mutated.
//!
//! Patching fills every omitted optional attribute with its default,
//! qualifies every type reference with the definition's own system, infers
//! `is_required` on record properties, rewrites local `$ref`s in object
//! fragments to their canonical pointer, and expands each record variant
//! into a derived record of its own.
//!
//! Patching never fails. Problems it cannot resolve without a registry
//! (unknown names, unknown property names in variants) pass through
//! untouched and are reported by the semantic checks.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::definition::{
    ArrayDef, CalculatedProperty, DefinitionBody, DefinitionHeader, EnumDef, EnumItem,
    NumericDef, ObjectDef, Property, RecordDef, StringDef, TestCases, TypeDefinition, Variant,
    VariantSelection,
};
use crate::name::QualifiedName;
use crate::raw::{
    RawArray, RawCommon, RawDefinition, RawEnum, RawFloat, RawInt, RawObject, RawRecord,
    RawString, RawTestCases,
};
use crate::walk;

/// Patch one authored definition.
///
/// Returns the definition itself followed by one derived record per
/// declared variant (records only).
pub fn patch(raw: RawDefinition) -> Vec<TypeDefinition> {
    match raw {
        RawDefinition::Bool(d) => vec![TypeDefinition {
            header: patch_header(d.common),
            body: DefinitionBody::Bool,
        }],
        RawDefinition::Int(d) => vec![patch_int(d)],
        RawDefinition::Float(d) => vec![patch_float(d)],
        RawDefinition::String(d) => vec![patch_string(d)],
        RawDefinition::Enum(d) => vec![patch_enum(d)],
        RawDefinition::Array(d) => vec![patch_array(d)],
        RawDefinition::Object(d) => vec![patch_object(d)],
        RawDefinition::Record(d) => patch_record(d),
    }
}

fn patch_header(common: RawCommon) -> DefinitionHeader {
    DefinitionHeader {
        name: QualifiedName::new(common.system, common.name),
        summary: common.summary,
        deprecated: common.deprecated.unwrap_or(false),
        tags: common.tags.unwrap_or_default().into_iter().collect(),
        labels: common.labels.unwrap_or_default(),
    }
}

fn patch_test_cases(raw: RawTestCases) -> TestCases {
    TestCases {
        valid: raw.valid_test_cases.unwrap_or_default(),
        invalid: raw.invalid_test_cases.unwrap_or_default(),
    }
}

fn patch_int(d: RawInt) -> TypeDefinition {
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::Int(NumericDef {
            minimum: d.minimum,
            maximum: d.maximum,
            minimum_exclusive: d.is_minimum_exclusive.unwrap_or(false),
            maximum_exclusive: d.is_maximum_exclusive.unwrap_or(false),
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_float(d: RawFloat) -> TypeDefinition {
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::Float(NumericDef {
            minimum: d.minimum,
            maximum: d.maximum,
            minimum_exclusive: d.is_minimum_exclusive.unwrap_or(false),
            maximum_exclusive: d.is_maximum_exclusive.unwrap_or(false),
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_string(d: RawString) -> TypeDefinition {
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::String(StringDef {
            minimum_length: d.minimum_length,
            maximum_length: d.maximum_length,
            regex: d.regex,
            format: d.format,
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_enum(d: RawEnum) -> TypeDefinition {
    let system = d.common.system.clone();
    let items = d
        .items
        .into_iter()
        .map(|item| EnumItem {
            text: item.text.unwrap_or_else(|| item.value.to_string()),
            value: item.value,
            summary: item.summary,
            symbol: item.symbol,
            deprecated: item.deprecated.unwrap_or(false),
            data: item.data,
        })
        .collect();
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::Enum(EnumDef {
            items,
            data_type: d
                .data_type
                .map(|t| QualifiedName::qualify(&t, &system)),
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_array(d: RawArray) -> TypeDefinition {
    let element_type = QualifiedName::qualify(&d.element_type, &d.common.system);
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::Array(ArrayDef {
            element_type,
            minimum_length: d.minimum_length,
            maximum_length: d.maximum_length,
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_object(d: RawObject) -> TypeDefinition {
    let mut references = BTreeSet::new();
    let mut foreign = BTreeSet::new();
    let mut schema = Value::Object(d.json_schema);
    let system = d.common.system.as_str();
    walk::for_each_ref_mut(&mut schema, &mut |reference| {
        match QualifiedName::from_definitions_pointer(reference, system) {
            Some(name) => {
                *reference = name.definitions_pointer();
                references.insert(name);
            }
            None => {
                foreign.insert(reference.clone());
            }
        }
    });
    let json_schema = match schema {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    TypeDefinition {
        header: patch_header(d.common),
        body: DefinitionBody::Object(ObjectDef {
            json_schema,
            references: references.into_iter().collect(),
            foreign_references: foreign.into_iter().collect(),
            test_cases: patch_test_cases(d.test_cases),
        }),
    }
}

fn patch_record(d: RawRecord) -> Vec<TypeDefinition> {
    let system = d.common.system.clone();
    let required = dedup_preserving_order(d.required.unwrap_or_default());

    let properties: Vec<Property> = d
        .properties
        .into_iter()
        .map(|p| Property {
            is_required: required.contains(&p.name),
            property_type: QualifiedName::qualify(&p.property_type, &system),
            name: p.name,
            is_array: p.is_array.unwrap_or(false),
            is_nullable: p.is_nullable.unwrap_or(false),
            default: p.default,
            summary: p.summary,
            deprecated: p.deprecated.unwrap_or(false),
        })
        .collect();

    let calculated_properties: Vec<CalculatedProperty> = d
        .calculated_properties
        .unwrap_or_default()
        .into_iter()
        .map(|c| CalculatedProperty {
            property_type: QualifiedName::qualify(&c.property_type, &system),
            name: c.name,
            input_properties: c.input_properties.unwrap_or_default(),
            summary: c.summary,
        })
        .collect();

    let variants: Vec<Variant> = d
        .variants
        .unwrap_or_default()
        .into_iter()
        .map(|v| Variant {
            name: QualifiedName::new(system.clone(), v.name),
            summary: v.summary,
            selection: match v.include_properties {
                Some(include) => VariantSelection::Include(include),
                None => VariantSelection::Exclude(v.exclude_properties.unwrap_or_default()),
            },
        })
        .collect();

    let header = patch_header(d.common);
    let mut derived: Vec<TypeDefinition> = variants
        .iter()
        .map(|variant| derive_variant(&header, variant, &properties, &calculated_properties))
        .collect();

    let base = TypeDefinition {
        header,
        body: DefinitionBody::Record(RecordDef {
            properties,
            required,
            variants,
            calculated_properties,
            variant_of: None,
            test_cases: patch_test_cases(d.test_cases),
        }),
    };

    let mut out = Vec::with_capacity(derived.len() + 1);
    out.push(base);
    out.append(&mut derived);
    out
}

/// Build the derived record for one variant of `base`.
///
/// Calculated properties are kept only when all of their inputs survive the
/// selection. Tags and labels are inherited from the base record.
fn derive_variant(
    base: &DefinitionHeader,
    variant: &Variant,
    properties: &[Property],
    calculated: &[CalculatedProperty],
) -> TypeDefinition {
    let selected: Vec<Property> = properties
        .iter()
        .filter(|p| variant.selection.selects(&p.name))
        .cloned()
        .collect();
    let required = selected
        .iter()
        .filter(|p| p.is_required)
        .map(|p| p.name.clone())
        .collect();
    let calculated_properties = calculated
        .iter()
        .filter(|c| {
            c.input_properties
                .iter()
                .all(|input| selected.iter().any(|p| &p.name == input))
        })
        .cloned()
        .collect();

    TypeDefinition {
        header: DefinitionHeader {
            name: variant.name.clone(),
            summary: variant.summary.clone(),
            deprecated: base.deprecated,
            tags: base.tags.clone(),
            labels: base.labels.clone(),
        },
        body: DefinitionBody::Record(RecordDef {
            properties: selected,
            required,
            variants: Vec::new(),
            calculated_properties,
            variant_of: Some(base.name.clone()),
            test_cases: TestCases::default(),
        }),
    }
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|n| seen.insert(n.clone()))
        .collect()
}
