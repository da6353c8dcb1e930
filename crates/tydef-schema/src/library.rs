//! # Type Library
//!
//! The build entry point and the read-only value it produces.
//!
//! ## Build Phases
//!
//! 1. **Parse** every resource string (YAML or JSON). The first malformed
//!    resource fails the build.
//! 2. **Structural check** of every resource against its kind's
//!    meta-schema. Failures accumulate and are reported together.
//! 3. **Patch** each resource into typed definitions, expanding record
//!    variants, and register them. Duplicate names fail the build.
//! 4. **Per definition**, in validation order: semantic checks, document
//!    compilation, closure audit, validator compilation, then the
//!    value-level self-tests. The first failure ends the build.
//! 5. **Documentation** warnings are collected throughout and fail the
//!    build only under strict documentation.
//!
//! A built [`TypeLibrary`] is immutable and `Send + Sync`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};
use tydef_core::{
    parse_resource, patch::patch, DefinitionBody, QualifiedName, RawDefinition, TypeDefinition,
};

use crate::audit::audit_closure;
use crate::compile::compile_document;
use crate::documentation::{collect_warnings, DocumentationWarning};
use crate::error::{InvalidType, InvalidTypeList, LibraryError};
use crate::meta::MetaSchemas;
use crate::options::LibraryOptions;
use crate::registry::TypeRegistry;
use crate::resolver::{self, Resolution};
use crate::selftest;
use crate::semantic;
use crate::validate::{
    ValidationViolations, ValueReport, ValueValidationError, ValueValidator, Violation,
};

/// A fully validated and compiled set of type definitions.
#[derive(Debug)]
pub struct TypeLibrary {
    registry: TypeRegistry,
    schemas: BTreeMap<QualifiedName, Value>,
    validators: ValueValidator,
    warnings: Vec<DocumentationWarning>,
    options: LibraryOptions,
}

/// Build a type library from resource strings.
///
/// # Errors
///
/// See [`TypeLibrary::build`].
pub fn build_type_library<S: AsRef<str>>(
    resources: &[S],
    options: LibraryOptions,
) -> Result<TypeLibrary, LibraryError> {
    TypeLibrary::build(resources, options)
}

impl TypeLibrary {
    /// Parse, check, compile and self-test every resource.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::Parse`] for malformed text,
    /// [`LibraryError::InvalidTypes`] for structurally invalid resources,
    /// and the first semantic, resolution or self-test error otherwise.
    pub fn build<S: AsRef<str>>(
        resources: &[S],
        options: LibraryOptions,
    ) -> Result<Self, LibraryError> {
        let parsed = resources
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                parse_resource(raw.as_ref()).map_err(|source| LibraryError::Parse { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let raw_definitions = check_structure(parsed)?;
        let registry = TypeRegistry::from_definitions(raw_definitions.into_iter().flat_map(patch))?;
        debug!(definitions = registry.len(), "registry populated");

        let warnings = collect_warnings(&registry);
        for warning in &warnings {
            warn!(type_name = %warning.type_name, location = %warning.location, "missing documentation");
        }

        let mut schemas = BTreeMap::new();
        let mut validators = ValueValidator::new();
        for def in registry.in_validation_order() {
            validate_definition(def, &registry, &options, &mut schemas, &mut validators)?;
        }

        if options.strict_documentation && !warnings.is_empty() {
            return Err(LibraryError::MissingDocumentation { warnings });
        }

        info!(
            definitions = registry.len(),
            validators = validators.len(),
            documentation_warnings = warnings.len(),
            "type library built"
        );

        Ok(Self {
            registry,
            schemas,
            validators,
            warnings,
            options,
        })
    }

    /// The registry of patched definitions.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The options the library was built with.
    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    /// The compiled validator cache.
    pub fn validators(&self) -> &ValueValidator {
        &self.validators
    }

    /// Look up a definition by `system/name`.
    pub fn definition(&self, type_name: &str) -> Option<&TypeDefinition> {
        self.registry.lookup_str(type_name)
    }

    /// Every non-enum type name, sorted.
    pub fn type_names(&self) -> Vec<String> {
        self.registry
            .iter()
            .filter(|d| !d.kind().is_enum())
            .map(|d| d.name().to_string())
            .collect()
    }

    /// Every enum name, sorted.
    pub fn enum_names(&self) -> Vec<String> {
        self.registry
            .iter()
            .filter(|d| d.kind().is_enum())
            .map(|d| d.name().to_string())
            .collect()
    }

    /// The closure of `seeds`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::UnrecognisedType`] for an unknown seed.
    pub fn resolve<S: AsRef<str>>(&self, seeds: &[S]) -> Result<Resolution, LibraryError> {
        resolver::resolve_strs(seeds, &self.registry)
    }

    /// The compiled document for `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::UnrecognisedType`] for an unknown name.
    pub fn json_schema(&self, type_name: &str) -> Result<&Value, LibraryError> {
        QualifiedName::parse(type_name)
            .ok()
            .and_then(|name| self.schemas.get(&name))
            .ok_or_else(|| LibraryError::UnrecognisedType {
                type_name: type_name.to_string(),
            })
    }

    /// Validate `value` against `type_name`.
    ///
    /// # Errors
    ///
    /// See [`ValueValidator::validate_value`].
    pub fn validate_value(&self, type_name: &str, value: &Value) -> Result<(), ValueValidationError> {
        self.validators.validate_value(type_name, value)
    }

    /// Validate each element of `values` against `type_name`.
    ///
    /// # Errors
    ///
    /// See [`ValueValidator::validate_value_array`].
    pub fn validate_value_array(
        &self,
        type_name: &str,
        values: &[Value],
    ) -> Result<(), ValueValidationError> {
        self.validators.validate_value_array(type_name, values)
    }

    /// Validate without raising on a non-conforming value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueValidationError::UnrecognisedType`] for an unknown
    /// name.
    pub fn check_value(&self, type_name: &str, value: &Value) -> Result<ValueReport, ValueValidationError> {
        self.validators.check_value(type_name, value)
    }

    /// Every missing summary found during the build.
    pub fn documentation_warnings(&self) -> &[DocumentationWarning] {
        &self.warnings
    }
}

/// Run the meta-schema check over every parsed resource and deserialize
/// the ones that pass.
fn check_structure(parsed: Vec<Value>) -> Result<Vec<RawDefinition>, LibraryError> {
    let meta = MetaSchemas::new()?;
    let mut invalid = Vec::new();
    let mut definitions = Vec::with_capacity(parsed.len());
    for (index, resource) in parsed.into_iter().enumerate() {
        if let Err(e) = meta.check(index, &resource) {
            invalid.push(e);
            continue;
        }
        let kind = resource
            .get("kind")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        let type_name = format!(
            "{}/{}",
            resource.get("system").and_then(Value::as_str).unwrap_or_default(),
            resource.get("name").and_then(Value::as_str).unwrap_or_default()
        );
        match serde_json::from_value::<RawDefinition>(resource) {
            Ok(raw) => definitions.push(raw),
            Err(e) => invalid.push(InvalidType {
                type_name,
                kind,
                violations: ValidationViolations::new(vec![Violation {
                    instance_path: String::new(),
                    schema_path: String::new(),
                    message: e.to_string(),
                }]),
            }),
        }
    }
    if invalid.is_empty() {
        Ok(definitions)
    } else {
        Err(LibraryError::InvalidTypes(InvalidTypeList(invalid)))
    }
}

fn validate_definition(
    def: &TypeDefinition,
    registry: &TypeRegistry,
    options: &LibraryOptions,
    schemas: &mut BTreeMap<QualifiedName, Value>,
    validators: &mut ValueValidator,
) -> Result<(), LibraryError> {
    let name = def.name();
    debug!(type_name = %name, kind = %def.kind(), "validating definition");

    semantic::check_definition(def, registry, options)?;

    let document = compile_document(def, registry, options)?;
    let findings = audit_closure(&document);
    if !findings.is_empty() {
        return Err(LibraryError::ClosureViolation {
            type_name: name.clone(),
            findings,
        });
    }
    validators.insert(name, &document, options)?;

    if let (Some(cases), Some(validator)) = (def.test_cases(), validators.get(name)) {
        selftest::run_test_cases(name, cases, validator)?;
    }
    match &def.body {
        DefinitionBody::Enum(e) => selftest::check_enum_data(name, e, registry, options)?,
        DefinitionBody::Record(r) => selftest::check_property_defaults(name, r, registry, options)?,
        _ => {}
    }

    schemas.insert(name.clone(), document);
    Ok(())
}
