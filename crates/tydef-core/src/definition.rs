//! # Typed Definitions
//!
//! The fully-populated, immutable form of a definition after patching.
//! Every optional attribute has been defaulted and every type reference has
//! been qualified, so downstream phases never check for missing fields.
//!
//! A [`TypeDefinition`] is a header of attributes shared by all kinds plus a
//! [`DefinitionBody`] holding the kind-specific attributes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::TypeKind;
use crate::name::QualifiedName;

/// Attributes shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionHeader {
    pub name: QualifiedName,
    pub summary: Option<String>,
    pub deprecated: bool,
    pub tags: BTreeSet<String>,
    pub labels: BTreeMap<String, String>,
}

/// Literal values asserted at build time to pass (valid) or fail (invalid)
/// the definition's own compiled schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCases {
    pub valid: Vec<Value>,
    pub invalid: Vec<Value>,
}

impl TestCases {
    /// Whether there is nothing to assert.
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }
}

/// A patched definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub header: DefinitionHeader,
    pub body: DefinitionBody,
}

impl TypeDefinition {
    /// The definition's qualified name.
    pub fn name(&self) -> &QualifiedName {
        &self.header.name
    }

    /// The definition's kind.
    pub fn kind(&self) -> TypeKind {
        self.body.kind()
    }

    /// The bundled self-test literals, for kinds that carry them.
    pub fn test_cases(&self) -> Option<&TestCases> {
        match &self.body {
            DefinitionBody::Bool => None,
            DefinitionBody::Enum(d) => Some(&d.test_cases),
            DefinitionBody::Int(d) => Some(&d.test_cases),
            DefinitionBody::Float(d) => Some(&d.test_cases),
            DefinitionBody::String(d) => Some(&d.test_cases),
            DefinitionBody::Array(d) => Some(&d.test_cases),
            DefinitionBody::Object(d) => Some(&d.test_cases),
            DefinitionBody::Record(d) => Some(&d.test_cases),
        }
    }

    /// Names this definition's compiled schema refers to directly.
    ///
    /// Sorted and de-duplicated. Enum `dataType`s and calculated property
    /// types are not part of the value schema and are not included.
    pub fn direct_references(&self) -> Vec<QualifiedName> {
        let names: BTreeSet<QualifiedName> = match &self.body {
            DefinitionBody::Bool
            | DefinitionBody::Int(_)
            | DefinitionBody::Float(_)
            | DefinitionBody::String(_)
            | DefinitionBody::Enum(_) => BTreeSet::new(),
            DefinitionBody::Array(d) => std::iter::once(d.element_type.clone()).collect(),
            DefinitionBody::Object(d) => d.references.iter().cloned().collect(),
            DefinitionBody::Record(d) => d
                .properties
                .iter()
                .map(|p| p.property_type.clone())
                .collect(),
        };
        names.into_iter().collect()
    }
}

/// Kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DefinitionBody {
    Bool,
    Int(NumericDef<i64>),
    Float(NumericDef<f64>),
    String(StringDef),
    Enum(EnumDef),
    Array(ArrayDef),
    Object(ObjectDef),
    Record(RecordDef),
}

impl DefinitionBody {
    /// The kind discriminator for this body.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Bool => TypeKind::Bool,
            Self::Int(_) => TypeKind::Int,
            Self::Float(_) => TypeKind::Float,
            Self::String(_) => TypeKind::String,
            Self::Enum(_) => TypeKind::Enum,
            Self::Array(_) => TypeKind::Array,
            Self::Object(_) => TypeKind::Object,
            Self::Record(_) => TypeKind::Record,
        }
    }
}

/// Bounds of an `int` or `float` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericDef<T> {
    pub minimum: Option<T>,
    pub maximum: Option<T>,
    pub minimum_exclusive: bool,
    pub maximum_exclusive: bool,
    pub test_cases: TestCases,
}

impl<T: PartialOrd + Copy> NumericDef<T> {
    /// Whether the bounds admit at least one value.
    pub fn bounds_are_satisfiable(&self) -> bool {
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => {
                if self.minimum_exclusive || self.maximum_exclusive {
                    min < max
                } else {
                    min <= max
                }
            }
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringDef {
    pub minimum_length: Option<u64>,
    pub maximum_length: Option<u64>,
    pub regex: Option<String>,
    pub format: Option<String>,
    pub test_cases: TestCases,
}

/// The value of an enum item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl EnumValue {
    /// The value as it appears in a compiled `enum` keyword.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub value: EnumValue,
    pub text: String,
    pub summary: Option<String>,
    pub symbol: Option<String>,
    pub deprecated: bool,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    pub items: Vec<EnumItem>,
    pub data_type: Option<QualifiedName>,
    pub test_cases: TestCases,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayDef {
    pub element_type: QualifiedName,
    pub minimum_length: Option<u64>,
    pub maximum_length: Option<u64>,
    pub test_cases: TestCases,
}

/// A definition carrying a hand-written JSON Schema fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// The fragment, with every local type reference rewritten to its
    /// canonical `#/definitions/...` pointer.
    pub json_schema: Map<String, Value>,
    /// Type names referenced from the fragment, sorted and de-duplicated.
    pub references: Vec<QualifiedName>,
    /// `$ref` values that do not address the local `definitions` map.
    pub foreign_references: Vec<String>,
    pub test_cases: TestCases,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub property_type: QualifiedName,
    pub is_array: bool,
    pub is_nullable: bool,
    /// Inferred from membership of the record's `required` list.
    pub is_required: bool,
    pub default: Option<Value>,
    pub summary: Option<String>,
    pub deprecated: bool,
}

/// How a variant picks its subset of the base record's properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantSelection {
    Include(Vec<String>),
    Exclude(Vec<String>),
}

impl VariantSelection {
    /// The property names listed by the selection.
    pub fn listed(&self) -> &[String] {
        match self {
            Self::Include(names) | Self::Exclude(names) => names,
        }
    }

    /// Whether a property of the base record belongs to the variant.
    pub fn selects(&self, property: &str) -> bool {
        match self {
            Self::Include(names) => names.iter().any(|n| n == property),
            Self::Exclude(names) => !names.iter().any(|n| n == property),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: QualifiedName,
    pub summary: Option<String>,
    pub selection: VariantSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedProperty {
    pub name: String,
    pub property_type: QualifiedName,
    pub input_properties: Vec<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDef {
    pub properties: Vec<Property>,
    /// Required property names in declaration order.
    pub required: Vec<String>,
    pub variants: Vec<Variant>,
    pub calculated_properties: Vec<CalculatedProperty>,
    /// Set on records derived from another record's variant.
    pub variant_of: Option<QualifiedName>,
    pub test_cases: TestCases,
}

impl RecordDef {
    /// Look up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Whether a property with this name is declared.
    pub fn has_property(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}
