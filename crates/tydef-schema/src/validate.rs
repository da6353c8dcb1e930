//! # Value Validation
//!
//! Runtime validation of JSON values against the compiled documents of a
//! type library.
//!
//! ## Design
//!
//! [`ValueValidator`] holds one compiled `jsonschema` validator per
//! qualified type name. Validators are compiled once while the library is
//! built; after that the cache is never mutated, so a built library can be
//! shared across threads without locking.
//!
//! Failures are never flattened: every violation reported by the evaluator
//! is kept with its instance path, schema path and message, so callers and
//! tests can inspect exactly what failed.
//!
//! ## Schema Resolution
//!
//! Documents are self-contained: every `$ref` addresses the document's own
//! `definitions` map and is resolved by the `jsonschema` crate natively. The
//! retriever installed on every validator refuses all external retrieval,
//! so a stray absolute `$ref` fails compilation instead of reaching the
//! network.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;
use tydef_core::QualifiedName;

use crate::error::LibraryError;
use crate::options::LibraryOptions;

/// Retriever that resolves nothing.
///
/// Compiled documents never need external resources; anything that asks for
/// one is a defect in the document and must not trigger a network request.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema retrieval is disabled: {}", uri.as_str()).into())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Errors returned by runtime value validation.
#[derive(Error, Debug, Clone)]
pub enum ValueValidationError {
    /// No compiled validator exists for the requested name.
    #[error("type '{type_name}' is not recognised")]
    UnrecognisedType {
        /// The requested name.
        type_name: String,
    },

    /// The value did not conform to the type's schema.
    #[error("value {value} failed validation against '{type_name}':\n{violations}")]
    ValidationFailed {
        /// The type validated against.
        type_name: QualifiedName,
        /// The rejected value.
        value: Value,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },
}

impl ValueValidationError {
    /// The evaluator output, if the value was actually evaluated.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::UnrecognisedType { .. } => None,
            Self::ValidationFailed { violations, .. } => Some(violations),
        }
    }
}

/// Non-throwing validation outcome for batch and UI call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueReport {
    /// Whether the value conformed.
    pub validated: bool,
    /// Every violation; empty when `validated` is true.
    pub violations: ValidationViolations,
}

/// Build `ValidationOptions` for a compiled document.
///
/// Documents are Draft-07. The offline retriever is installed, format
/// assertion follows the library options, and every built-in and custom
/// format is registered.
fn build_options(options: &LibraryOptions) -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft7);
    opts.with_retriever(OfflineRetriever);
    opts.should_validate_formats(options.validate_formats);
    for (name, check) in options.all_formats() {
        opts.with_format(name, move |s: &str| check(s));
    }
    opts
}

/// Compile a document into a reusable validator.
///
/// # Errors
///
/// Returns [`LibraryError::SchemaCompile`] if the evaluator rejects the
/// document.
pub fn compile_validator(
    type_name: &str,
    document: &Value,
    options: &LibraryOptions,
) -> Result<Validator, LibraryError> {
    build_options(options)
        .build(document)
        .map_err(|e| LibraryError::SchemaCompile {
            type_name: type_name.to_string(),
            reason: e.to_string(),
        })
}

/// Run a validator and collect every violation.
pub fn evaluate(validator: &Validator, instance: &Value) -> ValidationViolations {
    ValidationViolations::new(
        validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect(),
    )
}

/// Compiled validators keyed by qualified type name.
#[derive(Default)]
pub struct ValueValidator {
    validators: HashMap<QualifiedName, Validator>,
}

impl fmt::Debug for ValueValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueValidator")
            .field("validator_count", &self.validators.len())
            .finish()
    }
}

impl ValueValidator {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and cache the validator for one document.
    ///
    /// Only called while a library is being built.
    pub(crate) fn insert(
        &mut self,
        type_name: &QualifiedName,
        document: &Value,
        options: &LibraryOptions,
    ) -> Result<(), LibraryError> {
        let validator = compile_validator(&type_name.to_string(), document, options)?;
        self.validators.insert(type_name.clone(), validator);
        Ok(())
    }

    /// The cached validator for `type_name`.
    pub(crate) fn get(&self, type_name: &QualifiedName) -> Option<&Validator> {
        self.validators.get(type_name)
    }

    /// Whether a validator is cached for `type_name`.
    pub fn contains(&self, type_name: &QualifiedName) -> bool {
        self.validators.contains_key(type_name)
    }

    /// Number of cached validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    fn lookup(&self, type_name: &str) -> Result<(QualifiedName, &Validator), ValueValidationError> {
        let unrecognised = || ValueValidationError::UnrecognisedType {
            type_name: type_name.to_string(),
        };
        let name = QualifiedName::parse(type_name).map_err(|_| unrecognised())?;
        let validator = self.validators.get(&name).ok_or_else(unrecognised)?;
        Ok((name, validator))
    }

    /// Evaluate `value` against a cached validator without raising.
    ///
    /// # Errors
    ///
    /// Returns [`ValueValidationError::UnrecognisedType`] if nothing is
    /// cached for `type_name`.
    pub fn check_value(
        &self,
        type_name: &str,
        value: &Value,
    ) -> Result<ValueReport, ValueValidationError> {
        let (_, validator) = self.lookup(type_name)?;
        let violations = evaluate(validator, value);
        Ok(ValueReport {
            validated: violations.is_empty(),
            violations,
        })
    }

    /// Validate `value` against the type `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueValidationError::UnrecognisedType`] if nothing is
    /// cached for `type_name`, and [`ValueValidationError::ValidationFailed`]
    /// with every violation if the value does not conform.
    pub fn validate_value(&self, type_name: &str, value: &Value) -> Result<(), ValueValidationError> {
        let (name, validator) = self.lookup(type_name)?;
        let violations = evaluate(validator, value);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValueValidationError::ValidationFailed {
                type_name: name,
                value: value.clone(),
                violations,
            })
        }
    }

    /// Validate every element of `values` against the type `type_name`.
    ///
    /// Violations from all failing elements are reported together; each
    /// instance path is prefixed with the element's index.
    ///
    /// # Errors
    ///
    /// As [`ValueValidator::validate_value`]; on failure `value` is the whole
    /// array.
    pub fn validate_value_array(
        &self,
        type_name: &str,
        values: &[Value],
    ) -> Result<(), ValueValidationError> {
        let (name, validator) = self.lookup(type_name)?;
        let mut all = Vec::new();
        for (index, value) in values.iter().enumerate() {
            for v in evaluate(validator, value).into_inner() {
                all.push(Violation {
                    instance_path: format!("/{index}{}", v.instance_path),
                    ..v
                });
            }
        }
        if all.is_empty() {
            Ok(())
        } else {
            Err(ValueValidationError::ValidationFailed {
                type_name: name,
                value: Value::Array(values.to_vec()),
                violations: ValidationViolations::new(all),
            })
        }
    }
}
