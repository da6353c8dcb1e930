//! # tydef-core: Data Model for Type Libraries
//!
//! Defines the vocabulary every other tydef crate speaks: system-qualified
//! type names, the eight definition kinds, definitions as authored in
//! resources, and the fully-populated typed definitions the engine works on.
//!
//! ## Key Design Principles
//!
//! 1. **Closed set of kinds.** [`TypeKind`] and [`DefinitionBody`] are
//!    exhaustive enums. Every phase matches on them; nothing checks for
//!    fields at runtime.
//!
//! 2. **Patching is a pure function.** [`patch::patch`] consumes an authored
//!    [`RawDefinition`] and returns new [`TypeDefinition`]s with every
//!    default filled in and every reference qualified.
//!
//! 3. **Qualified names everywhere.** After patching, every type reference is
//!    a [`QualifiedName`]; bare names exist only in authored resources.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tydef-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod definition;
pub mod error;
pub mod kind;
pub mod name;
pub mod patch;
pub mod raw;
pub mod resource;
pub mod walk;

pub use definition::{
    ArrayDef, CalculatedProperty, DefinitionBody, DefinitionHeader, EnumDef, EnumItem, EnumValue,
    NumericDef, ObjectDef, Property, RecordDef, StringDef, TestCases, TypeDefinition, Variant,
    VariantSelection,
};
pub use error::{NameError, ParseError};
pub use kind::TypeKind;
pub use name::{decode_definitions_pointer, QualifiedName, DEFINITIONS_POINTER_PREFIX};
pub use raw::RawDefinition;
pub use resource::parse_resource;
