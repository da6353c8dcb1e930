//! # Authored Definitions
//!
//! The shape of a definition exactly as an author writes it in a resource.
//! Every field the author may omit is an `Option` here; [`crate::patch`]
//! turns these into fully-populated [`crate::TypeDefinition`]s.
//!
//! These structs are deserialized only after a resource has passed its
//! kind's meta-schema, so deserialization failures indicate a meta-schema
//! that is looser than this model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::definition::EnumValue;

/// A definition as authored, discriminated by its `kind` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawDefinition {
    Bool(RawBool),
    Int(RawInt),
    Float(RawFloat),
    String(RawString),
    Enum(RawEnum),
    Array(RawArray),
    Object(RawObject),
    Record(RawRecord),
}

impl RawDefinition {
    /// The attributes shared by every kind.
    pub fn common(&self) -> &RawCommon {
        match self {
            Self::Bool(d) => &d.common,
            Self::Int(d) => &d.common,
            Self::Float(d) => &d.common,
            Self::String(d) => &d.common,
            Self::Enum(d) => &d.common,
            Self::Array(d) => &d.common,
            Self::Object(d) => &d.common,
            Self::Record(d) => &d.common,
        }
    }
}

/// Attributes shared by every kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommon {
    pub system: String,
    pub name: String,
    pub summary: Option<String>,
    pub deprecated: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub labels: Option<BTreeMap<String, String>>,
}

/// Self-test literals bundled with a definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTestCases {
    pub valid_test_cases: Option<Vec<Value>>,
    pub invalid_test_cases: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBool {
    #[serde(flatten)]
    pub common: RawCommon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInt {
    #[serde(flatten)]
    pub common: RawCommon,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
    pub is_minimum_exclusive: Option<bool>,
    pub is_maximum_exclusive: Option<bool>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFloat {
    #[serde(flatten)]
    pub common: RawCommon,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub is_minimum_exclusive: Option<bool>,
    pub is_maximum_exclusive: Option<bool>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawString {
    #[serde(flatten)]
    pub common: RawCommon,
    pub minimum_length: Option<u64>,
    pub maximum_length: Option<u64>,
    pub regex: Option<String>,
    pub format: Option<String>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnum {
    #[serde(flatten)]
    pub common: RawCommon,
    pub items: Vec<RawEnumItem>,
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnumItem {
    pub value: EnumValue,
    pub text: Option<String>,
    pub summary: Option<String>,
    pub symbol: Option<String>,
    pub deprecated: Option<bool>,
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArray {
    #[serde(flatten)]
    pub common: RawCommon,
    pub element_type: String,
    pub minimum_length: Option<u64>,
    pub maximum_length: Option<u64>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObject {
    #[serde(flatten)]
    pub common: RawCommon,
    pub json_schema: Map<String, Value>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(flatten)]
    pub common: RawCommon,
    pub properties: Vec<RawProperty>,
    pub required: Option<Vec<String>>,
    pub variants: Option<Vec<RawVariant>>,
    pub calculated_properties: Option<Vec<RawCalculatedProperty>>,
    #[serde(flatten)]
    pub test_cases: RawTestCases,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    pub name: String,
    pub property_type: String,
    pub is_array: Option<bool>,
    pub is_nullable: Option<bool>,
    pub default: Option<Value>,
    pub summary: Option<String>,
    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub name: String,
    pub summary: Option<String>,
    pub include_properties: Option<Vec<String>>,
    pub exclude_properties: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculatedProperty {
    pub name: String,
    pub property_type: String,
    pub input_properties: Option<Vec<String>>,
    pub summary: Option<String>,
}
