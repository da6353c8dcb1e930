//! # tydef-schema: Type Resolution & Schema Compilation
//!
//! Turns a flat collection of authored type definitions into a validated,
//! compiled type library and validates JSON values against it.
//!
//! ## Building (`library`)
//!
//! [`TypeLibrary::build`] parses resource strings, checks each against its
//! kind's meta-schema ([`meta`]), patches and registers the definitions
//! ([`registry`]), then walks them in validation order running the
//! semantic checks ([`semantic`]), compiling a self-contained Draft-07
//! document per definition ([`compile`]), auditing its `definitions`
//! closure ([`audit`]) and asserting the bundled test cases, enum data and
//! property defaults ([`selftest`]).
//!
//! ## Resolution (`resolver`)
//!
//! [`resolver::resolve`] computes the transitive closure of a seed set.
//! The compiler uses it to build each document's `definitions` map, which
//! therefore holds exactly the referenced fragments.
//!
//! ## Validation (`validate`)
//!
//! [`ValueValidator`] caches one compiled validator per qualified type
//! name. Failures keep the evaluator's full violation list.
//!
//! ## Crate Policy
//!
//! - Depends only on `tydef-core` internally.
//! - No network access: the evaluator's retriever refuses every external
//!   `$ref`.
//! - A built library is immutable; rebuilding is the only way to change it.

pub mod audit;
pub mod compile;
pub mod documentation;
pub mod error;
pub mod formats;
pub mod library;
pub mod meta;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod selftest;
pub mod semantic;
pub mod validate;

pub use audit::{audit_closure, ClosureFinding};
pub use compile::{compile_document, local_fragment, property_schema, JSON_SCHEMA_DRAFT};
pub use documentation::DocumentationWarning;
pub use error::{InvalidType, InvalidTypeList, LibraryError};
pub use library::{build_type_library, TypeLibrary};
pub use options::{FormatFn, LibraryOptions};
pub use registry::TypeRegistry;
pub use resolver::Resolution;
pub use validate::{
    ValidationViolations, ValueReport, ValueValidationError, ValueValidator, Violation,
};
