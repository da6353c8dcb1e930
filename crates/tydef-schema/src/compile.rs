//! # Schema Compiler
//!
//! Converts patched definitions into self-contained Draft-07 documents.
//!
//! Each definition has a *local fragment*: the JSON Schema it contributes
//! on its own, with every type reference written as a `$ref` into the
//! document's `definitions` map. A compiled document is the fragment plus
//! `$schema`, `$id` and a `definitions` map holding the fragment of every
//! name in the closure of the definition's direct references.
//!
//! Fragments are never expanded inline; the evaluator follows `$ref`s
//! inside `definitions` itself, which is what makes recursive types work.

use serde_json::{json, Map, Value};
use tracing::debug;
use tydef_core::{DefinitionBody, NumericDef, Property, QualifiedName, TypeDefinition};

use crate::error::LibraryError;
use crate::options::LibraryOptions;
use crate::registry::TypeRegistry;
use crate::resolver;

/// The dialect of every compiled document.
pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";

fn reference(name: &QualifiedName) -> Value {
    json!({ "$ref": name.definitions_pointer() })
}

fn insert_bounds<T: Into<Value> + Copy>(fragment: &mut Map<String, Value>, d: &NumericDef<T>) {
    if let Some(min) = d.minimum {
        let key = if d.minimum_exclusive {
            "exclusiveMinimum"
        } else {
            "minimum"
        };
        fragment.insert(key.to_string(), min.into());
    }
    if let Some(max) = d.maximum {
        let key = if d.maximum_exclusive {
            "exclusiveMaximum"
        } else {
            "maximum"
        };
        fragment.insert(key.to_string(), max.into());
    }
}

fn insert_opt(fragment: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        fragment.insert(key.to_string(), value.into());
    }
}

/// The schema of one record property.
///
/// | array | nullable | schema |
/// |-------|----------|--------|
/// | no    | no       | `{"$ref": p}` |
/// | no    | yes      | `{"oneOf": [{"type": "null"}, {"$ref": p}]}` |
/// | yes   | no       | `{"type": "array", "items": {"$ref": p}}` |
/// | yes   | yes      | `{"type": ["array", "null"], "items": {"$ref": p}}` |
pub fn property_schema(property: &Property) -> Value {
    let target = reference(&property.property_type);
    match (property.is_array, property.is_nullable) {
        (false, false) => target,
        (false, true) => json!({ "oneOf": [{ "type": "null" }, target] }),
        (true, false) => json!({ "type": "array", "items": target }),
        (true, true) => json!({ "type": ["array", "null"], "items": target }),
    }
}

/// The schema a definition contributes on its own.
pub fn local_fragment(def: &TypeDefinition) -> Value {
    let mut fragment = Map::new();
    match &def.body {
        DefinitionBody::Bool => {
            fragment.insert("type".into(), json!("boolean"));
        }
        DefinitionBody::Int(d) => {
            fragment.insert("type".into(), json!("integer"));
            insert_bounds(&mut fragment, d);
        }
        DefinitionBody::Float(d) => {
            fragment.insert("type".into(), json!("number"));
            insert_bounds(&mut fragment, d);
        }
        DefinitionBody::String(d) => {
            fragment.insert("type".into(), json!("string"));
            insert_opt(&mut fragment, "minLength", d.minimum_length);
            insert_opt(&mut fragment, "maxLength", d.maximum_length);
            insert_opt(&mut fragment, "pattern", d.regex.clone());
            insert_opt(&mut fragment, "format", d.format.clone());
        }
        DefinitionBody::Enum(d) => {
            let values: Vec<Value> = d.items.iter().map(|i| i.value.to_json()).collect();
            fragment.insert("enum".into(), Value::Array(values));
        }
        DefinitionBody::Array(d) => {
            fragment.insert("type".into(), json!("array"));
            fragment.insert("items".into(), reference(&d.element_type));
            insert_opt(&mut fragment, "minItems", d.minimum_length);
            insert_opt(&mut fragment, "maxItems", d.maximum_length);
        }
        DefinitionBody::Object(d) => {
            fragment = d.json_schema.clone();
        }
        DefinitionBody::Record(d) => {
            let properties: Map<String, Value> = d
                .properties
                .iter()
                .map(|p| (p.name.clone(), property_schema(p)))
                .collect();
            fragment.insert("type".into(), json!("object"));
            fragment.insert("properties".into(), Value::Object(properties));
            if !d.required.is_empty() {
                fragment.insert("required".into(), json!(d.required));
            }
            fragment.insert("additionalProperties".into(), Value::Bool(false));
        }
    }
    Value::Object(fragment)
}

/// The `definitions` map for the closure of `seeds`, or `None` when the
/// closure is empty.
fn definitions_for<'a>(
    seeds: impl IntoIterator<Item = &'a QualifiedName>,
    registry: &TypeRegistry,
) -> Result<Option<Map<String, Value>>, LibraryError> {
    let closure = resolver::resolve(seeds, registry)?;
    if closure.is_empty() {
        return Ok(None);
    }
    let mut definitions = Map::new();
    for name in closure.all_names() {
        let def = registry
            .lookup(&name)
            .ok_or_else(|| LibraryError::UnrecognisedType {
                type_name: name.to_string(),
            })?;
        definitions.insert(name.to_string(), local_fragment(def));
    }
    Ok(Some(definitions))
}

fn assemble(
    id: String,
    fragment: Value,
    definitions: Option<Map<String, Value>>,
) -> Value {
    let mut document = Map::new();
    document.insert("$schema".into(), json!(JSON_SCHEMA_DRAFT));
    document.insert("$id".into(), Value::String(id));
    if let Value::Object(fragment) = fragment {
        document.extend(fragment);
    }
    if let Some(definitions) = definitions {
        document.insert("definitions".into(), Value::Object(definitions));
    }
    Value::Object(document)
}

/// Compile the document for one definition.
///
/// # Errors
///
/// Returns [`LibraryError::UnrecognisedType`] if the closure of the
/// definition's references leaves the registry.
pub fn compile_document(
    def: &TypeDefinition,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<Value, LibraryError> {
    let references = def.direct_references();
    let definitions = definitions_for(&references, registry)?;
    debug!(
        type_name = %def.name(),
        definitions = definitions.as_ref().map_or(0, Map::len),
        "compiled schema document"
    );
    Ok(assemble(
        options.schema_id(def.name()),
        local_fragment(def),
        definitions,
    ))
}

/// Compile the document for a single property of `record`, used to check
/// its `default`.
///
/// # Errors
///
/// As [`compile_document`].
pub fn compile_property_document(
    record: &QualifiedName,
    property: &Property,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<Value, LibraryError> {
    let definitions = definitions_for(std::iter::once(&property.property_type), registry)?;
    Ok(assemble(
        format!("{}/properties/{}", options.schema_id(record), property.name),
        property_schema(property),
        definitions,
    ))
}
