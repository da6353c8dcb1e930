//! # Error Types: Build-Time Error Hierarchy
//!
//! Every way a type library build can fail, one named variant per failure.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Structural errors accumulate across resources and are reported together
//!   in [`LibraryError::InvalidTypes`].
//! - Every other error is fatal on first detection and names the offending
//!   definition, the field involved, and the offending value where there is
//!   one, so the fix can be located without re-running the build.
//! - Errors carrying evaluator output keep the full
//!   [`ValidationViolations`] list rather than a flattened message.

use std::fmt;

use thiserror::Error;
use tydef_core::{ParseError, QualifiedName};

use crate::audit::ClosureFinding;
use crate::documentation::DocumentationWarning;
use crate::validate::ValidationViolations;

/// A resource that does not match its kind's meta-schema.
#[derive(Debug, Clone)]
pub struct InvalidType {
    /// `system/name` as written, or a positional placeholder when the
    /// resource does not even carry a name.
    pub type_name: String,
    /// The `kind` as written, or `unknown`.
    pub kind: String,
    /// Meta-schema violations.
    pub violations: ValidationViolations,
}

impl fmt::Display for InvalidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}):\n{}", self.type_name, self.kind, self.violations)
    }
}

/// Every structurally invalid resource of one build.
#[derive(Debug, Clone)]
pub struct InvalidTypeList(pub Vec<InvalidType>);

impl InvalidTypeList {
    /// Names of the invalid definitions, in input order.
    pub fn type_names(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.type_name.as_str()).collect()
    }
}

impl fmt::Display for InvalidTypeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} definition(s) failed structural validation", self.0.len())?;
        for invalid in &self.0 {
            write!(f, "\n{invalid}")?;
        }
        Ok(())
    }
}

/// Errors returned while building a type library.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// A resource string is not valid YAML or JSON.
    #[error("resource {index} could not be parsed: {source}")]
    Parse {
        /// Position of the resource in the input.
        index: usize,
        /// The parser failure, carrying the raw text.
        #[source]
        source: ParseError,
    },

    /// One or more resources do not match their kind's meta-schema.
    #[error("{0}")]
    InvalidTypes(InvalidTypeList),

    /// Two definitions claim the same qualified name.
    #[error("type name '{type_name}' is declared more than once")]
    DuplicateTypeName {
        /// The contested name.
        type_name: QualifiedName,
    },

    /// A referenced type name is not in the registry.
    #[error("type '{type_name}' is not recognised")]
    UnrecognisedType {
        /// The missing name.
        type_name: String,
    },

    /// An object fragment uses a `$ref` that does not address a type.
    #[error("type '{type_name}' uses unsupported reference '{reference}'; only '#/definitions/<type>' is allowed")]
    UnsupportedReference {
        /// The object definition.
        type_name: QualifiedName,
        /// The offending `$ref` value.
        reference: String,
    },

    /// A property or calculated property uses a reserved name.
    #[error("type '{type_name}' declares property '{property}' which is a reserved name")]
    ReservedPropertyName {
        /// The record.
        type_name: QualifiedName,
        /// The offending property name.
        property: String,
    },

    /// A record declares the same property name twice.
    #[error("type '{type_name}' declares property '{property}' more than once")]
    DuplicatePropertyName {
        /// The record.
        type_name: QualifiedName,
        /// The repeated property name.
        property: String,
    },

    /// A property list names a property the record does not declare.
    #[error("type '{type_name}' refers to unknown property '{property}' in {context}")]
    UnrecognisedPropertyName {
        /// The record.
        type_name: QualifiedName,
        /// The unknown property name.
        property: String,
        /// Where the name was found, e.g. `required` or `variant 'x'`.
        context: String,
    },

    /// A property's type is not in the registry.
    #[error("type '{type_name}' property '{property}' has unrecognised type '{property_type}'")]
    UnrecognisedPropertyType {
        /// The record.
        type_name: QualifiedName,
        /// The property.
        property: String,
        /// The missing type.
        property_type: QualifiedName,
    },

    /// An enum declares the same item value twice.
    #[error("enum '{type_name}' declares item value '{value}' more than once")]
    DuplicateEnumItemValue {
        /// The enum.
        type_name: QualifiedName,
        /// The repeated value.
        value: String,
    },

    /// An enum item's `data` does not match the enum's `dataType`.
    #[error("enum '{type_name}' item '{item_value}' data does not match its data type:\n{violations}")]
    EnumItemDataValidation {
        /// The enum.
        type_name: QualifiedName,
        /// The item whose data failed.
        item_value: String,
        /// Evaluator output.
        violations: ValidationViolations,
    },

    /// A calculated property name clashes with another declared name.
    #[error("type '{type_name}' calculated property '{property}' clashes with {clashes_with}")]
    CalculatedPropertyNamesClash {
        /// The record.
        type_name: QualifiedName,
        /// The calculated property.
        property: String,
        /// What it clashes with.
        clashes_with: String,
    },

    /// Numeric or length bounds admit no value.
    #[error("type '{type_name}' has unsatisfiable bounds: {reason}")]
    InvalidBounds {
        /// The definition.
        type_name: QualifiedName,
        /// Which bounds conflict.
        reason: String,
    },

    /// A valid test case failed the definition's own schema.
    #[error("type '{type_name}' valid test case {index} ({value}) failed validation:\n{violations}")]
    TestCaseValidation {
        /// The definition.
        type_name: QualifiedName,
        /// Index into `validTestCases`.
        index: usize,
        /// The test case, serialized.
        value: String,
        /// Evaluator output.
        violations: ValidationViolations,
    },

    /// An invalid test case unexpectedly passed the definition's own schema.
    #[error("type '{type_name}' invalid test case {index} ({value}) unexpectedly passed validation")]
    TestCaseInvalidation {
        /// The definition.
        type_name: QualifiedName,
        /// Index into `invalidTestCases`.
        index: usize,
        /// The test case, serialized.
        value: String,
    },

    /// A property `default` does not match the property's own schema.
    #[error("type '{type_name}' property '{property}' default ({value}) failed validation:\n{violations}")]
    DefaultValueValidation {
        /// The record.
        type_name: QualifiedName,
        /// The property.
        property: String,
        /// The default, serialized.
        value: String,
        /// Evaluator output.
        violations: ValidationViolations,
    },

    /// A compiled document was rejected by the JSON Schema evaluator.
    #[error("failed to compile schema for '{type_name}': {reason}")]
    SchemaCompile {
        /// The definition whose document failed.
        type_name: String,
        /// Evaluator message.
        reason: String,
    },

    /// A compiled document has dangling or superfluous `definitions`.
    #[error("schema for '{type_name}' is not self-contained: {}", render_findings(.findings))]
    ClosureViolation {
        /// The definition whose document failed the audit.
        type_name: QualifiedName,
        /// What the audit found.
        findings: Vec<ClosureFinding>,
    },

    /// Documentation is incomplete and strict documentation is enabled.
    #[error("{} definition(s) lack documentation: {}", .warnings.len(), render_warnings(.warnings))]
    MissingDocumentation {
        /// Every missing piece of prose.
        warnings: Vec<DocumentationWarning>,
    },

    /// A built-in meta-schema failed to compile.
    #[error("meta-schema for kind '{kind}' failed to compile: {reason}")]
    MetaSchema {
        /// The kind whose meta-schema is broken.
        kind: String,
        /// Evaluator message.
        reason: String,
    },
}

impl LibraryError {
    /// The missing type name for either flavour of unresolved reference.
    ///
    /// Returns the name for [`LibraryError::UnrecognisedType`] and for
    /// [`LibraryError::UnrecognisedPropertyType`], so callers can treat an
    /// unknown property type like any other unknown type.
    pub fn unrecognised_type_name(&self) -> Option<String> {
        match self {
            Self::UnrecognisedType { type_name } => Some(type_name.clone()),
            Self::UnrecognisedPropertyType { property_type, .. } => {
                Some(property_type.to_string())
            }
            _ => None,
        }
    }
}

fn render_findings(findings: &[ClosureFinding]) -> String {
    findings
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_warnings(warnings: &[DocumentationWarning]) -> String {
    warnings
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Violation;

    #[test]
    fn test_unrecognised_type_name_for_both_variants() {
        let plain = LibraryError::UnrecognisedType {
            type_name: "test/doesNotExist".to_string(),
        };
        assert_eq!(plain.unrecognised_type_name().as_deref(), Some("test/doesNotExist"));

        let property = LibraryError::UnrecognisedPropertyType {
            type_name: QualifiedName::new("test", "rec"),
            property: "one".to_string(),
            property_type: QualifiedName::new("test", "doesNotExist"),
        };
        assert_eq!(
            property.unrecognised_type_name().as_deref(),
            Some("test/doesNotExist")
        );

        let other = LibraryError::DuplicateTypeName {
            type_name: QualifiedName::new("test", "rec"),
        };
        assert!(other.unrecognised_type_name().is_none());
    }

    #[test]
    fn test_invalid_type_list_display() {
        let list = InvalidTypeList(vec![InvalidType {
            type_name: "test/bad".to_string(),
            kind: "record".to_string(),
            violations: ValidationViolations::new(vec![Violation {
                instance_path: "/properties/0".to_string(),
                schema_path: "/properties/properties/items/required".to_string(),
                message: "\"propertyType\" is a required property".to_string(),
            }]),
        }]);
        let rendered = LibraryError::InvalidTypes(list).to_string();
        assert!(rendered.starts_with("1 definition(s) failed structural validation"));
        assert!(rendered.contains("test/bad (record)"));
        assert!(rendered.contains("/properties/0"));
    }

    #[test]
    fn test_display_names_offender() {
        let err = LibraryError::UnrecognisedPropertyName {
            type_name: QualifiedName::new("test", "rec"),
            property: "two".to_string(),
            context: "required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type 'test/rec' refers to unknown property 'two' in required"
        );
    }
}
