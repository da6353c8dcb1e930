//! # Self-Tests
//!
//! Value-level checks that need compiled documents: bundled test cases,
//! enum item data and property defaults.

use jsonschema::Validator;
use serde_json::Value;
use tydef_core::{EnumDef, QualifiedName, RecordDef, TestCases};

use crate::compile::{compile_document, compile_property_document};
use crate::error::LibraryError;
use crate::options::LibraryOptions;
use crate::registry::TypeRegistry;
use crate::validate::{compile_validator, evaluate};

/// Assert every valid case passes and every invalid case fails.
///
/// # Errors
///
/// [`LibraryError::TestCaseValidation`] for the first valid case that
/// fails, [`LibraryError::TestCaseInvalidation`] for the first invalid case
/// that passes.
pub fn run_test_cases(
    type_name: &QualifiedName,
    cases: &TestCases,
    validator: &Validator,
) -> Result<(), LibraryError> {
    for (index, value) in cases.valid.iter().enumerate() {
        let violations = evaluate(validator, value);
        if !violations.is_empty() {
            return Err(LibraryError::TestCaseValidation {
                type_name: type_name.clone(),
                index,
                value: value.to_string(),
                violations,
            });
        }
    }
    for (index, value) in cases.invalid.iter().enumerate() {
        if validator.is_valid(value) {
            return Err(LibraryError::TestCaseInvalidation {
                type_name: type_name.clone(),
                index,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

/// Check every item's `data` against the enum's `dataType`.
///
/// The data type's validator is compiled here rather than taken from the
/// library cache, since enums are validated before the composites a data
/// type usually is. Items without `data` are checked as `null`.
///
/// # Errors
///
/// [`LibraryError::EnumItemDataValidation`] for the first failing item.
pub fn check_enum_data(
    type_name: &QualifiedName,
    def: &EnumDef,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<(), LibraryError> {
    let Some(data_type) = &def.data_type else {
        return Ok(());
    };
    let data_def = registry
        .lookup(data_type)
        .ok_or_else(|| LibraryError::UnrecognisedType {
            type_name: data_type.to_string(),
        })?;
    let document = compile_document(data_def, registry, options)?;
    let validator = compile_validator(&data_type.to_string(), &document, options)?;
    for item in &def.items {
        let data = item.data.clone().unwrap_or(Value::Null);
        let violations = evaluate(&validator, &data);
        if !violations.is_empty() {
            return Err(LibraryError::EnumItemDataValidation {
                type_name: type_name.clone(),
                item_value: item.value.to_string(),
                violations,
            });
        }
    }
    Ok(())
}

/// Check every property `default` against the property's own schema.
///
/// # Errors
///
/// [`LibraryError::DefaultValueValidation`] for the first failing default.
pub fn check_property_defaults(
    type_name: &QualifiedName,
    def: &RecordDef,
    registry: &TypeRegistry,
    options: &LibraryOptions,
) -> Result<(), LibraryError> {
    for property in &def.properties {
        let Some(default) = &property.default else {
            continue;
        };
        let document = compile_property_document(type_name, property, registry, options)?;
        let label = format!("{type_name}.{}", property.name);
        let validator = compile_validator(&label, &document, options)?;
        let violations = evaluate(&validator, default);
        if !violations.is_empty() {
            return Err(LibraryError::DefaultValueValidation {
                type_name: type_name.clone(),
                property: property.name.clone(),
                value: default.to_string(),
                violations,
            });
        }
    }
    Ok(())
}
