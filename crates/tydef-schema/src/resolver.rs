//! # Reference Resolver
//!
//! Computes the transitive closure of the type names reachable from a set
//! of seeds.
//!
//! The walk is a breadth-first worklist over
//! [`TypeDefinition::direct_references`]. Enums are leaves and are reported
//! separately. A name is queued at most once, so diamonds are visited once
//! and self-reference terminates. An unknown name ends the walk with
//! [`LibraryError::UnrecognisedType`]; the resolver never reports a name it
//! could not find.

use std::collections::{BTreeSet, HashSet, VecDeque};

use tracing::trace;
use tydef_core::QualifiedName;

use crate::error::LibraryError;
use crate::registry::TypeRegistry;

/// The closure of a seed set, split into schema-bearing types and enums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Non-enum names, sorted.
    pub type_names: Vec<QualifiedName>,
    /// Enum names, sorted.
    pub enum_names: Vec<QualifiedName>,
}

impl Resolution {
    /// Every resolved name, sorted.
    pub fn all_names(&self) -> Vec<QualifiedName> {
        let all: BTreeSet<QualifiedName> = self
            .type_names
            .iter()
            .chain(&self.enum_names)
            .cloned()
            .collect();
        all.into_iter().collect()
    }

    /// Whether nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.type_names.is_empty() && self.enum_names.is_empty()
    }
}

/// Resolve the closure of `seeds` against `registry`.
///
/// The seeds themselves are part of the result.
///
/// # Errors
///
/// Returns [`LibraryError::UnrecognisedType`] for the first name, in
/// breadth-first order, that is not registered.
pub fn resolve<'a>(
    seeds: impl IntoIterator<Item = &'a QualifiedName>,
    registry: &TypeRegistry,
) -> Result<Resolution, LibraryError> {
    let mut seen: HashSet<QualifiedName> = HashSet::new();
    let mut queue: VecDeque<QualifiedName> = VecDeque::new();
    for seed in seeds {
        if seen.insert(seed.clone()) {
            queue.push_back(seed.clone());
        }
    }

    let mut type_names = BTreeSet::new();
    let mut enum_names = BTreeSet::new();

    while let Some(name) = queue.pop_front() {
        let Some(def) = registry.lookup(&name) else {
            return Err(LibraryError::UnrecognisedType {
                type_name: name.to_string(),
            });
        };
        if def.kind().is_enum() {
            trace!(type_name = %name, "resolved enum");
            enum_names.insert(name);
            continue;
        }
        for next in def.direct_references() {
            if seen.insert(next.clone()) {
                trace!(from = %name, to = %next, "queued reference");
                queue.push_back(next);
            }
        }
        type_names.insert(name);
    }

    Ok(Resolution {
        type_names: type_names.into_iter().collect(),
        enum_names: enum_names.into_iter().collect(),
    })
}

/// Resolve seeds given as `system/name` strings.
///
/// # Errors
///
/// As [`resolve`]; a string that is not a qualified name is reported as
/// unrecognised.
pub fn resolve_strs<S: AsRef<str>>(
    seeds: &[S],
    registry: &TypeRegistry,
) -> Result<Resolution, LibraryError> {
    let names = seeds
        .iter()
        .map(|s| {
            QualifiedName::parse(s.as_ref()).map_err(|_| LibraryError::UnrecognisedType {
                type_name: s.as_ref().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    resolve(&names, registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tydef_core::{patch::patch, RawDefinition};

    fn registry(resources: Vec<Value>) -> TypeRegistry {
        let defs = resources.into_iter().flat_map(|r| {
            let raw: RawDefinition = serde_json::from_value(r).unwrap();
            patch(raw)
        });
        TypeRegistry::from_definitions(defs).unwrap()
    }

    fn record(name: &str, property_types: &[&str]) -> Value {
        let properties: Vec<Value> = property_types
            .iter()
            .enumerate()
            .map(|(i, t)| json!({ "name": format!("p{i}"), "propertyType": t }))
            .collect();
        json!({ "kind": "record", "system": "test", "name": name, "properties": properties })
    }

    fn names(list: &[QualifiedName]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_diamond_visits_shared_leaf_once() {
        let reg = registry(vec![
            record("a", &["b", "c"]),
            record("b", &["d"]),
            record("c", &["d"]),
            json!({ "kind": "int", "system": "test", "name": "d" }),
        ]);
        let res = resolve_strs(&["test/a"], &reg).unwrap();
        assert_eq!(names(&res.type_names), vec!["test/a", "test/b", "test/c", "test/d"]);
        assert!(res.enum_names.is_empty());
    }

    #[test]
    fn test_enums_are_leaves() {
        let reg = registry(vec![
            record("a", &["lang"]),
            json!({
                "kind": "enum", "system": "test", "name": "lang",
                "items": [{ "value": "en" }], "dataType": "a"
            }),
        ]);
        let res = resolve_strs(&["test/a"], &reg).unwrap();
        assert_eq!(names(&res.type_names), vec!["test/a"]);
        assert_eq!(names(&res.enum_names), vec!["test/lang"]);
        assert_eq!(names(&res.all_names()), vec!["test/a", "test/lang"]);
    }

    #[test]
    fn test_self_reference_terminates() {
        let reg = registry(vec![record("node", &["node"])]);
        let res = resolve_strs(&["test/node"], &reg).unwrap();
        assert_eq!(names(&res.type_names), vec!["test/node"]);
    }

    #[test]
    fn test_unknown_name_fails() {
        let reg = registry(vec![record("a", &["doesNotExist"])]);
        let err = resolve_strs(&["test/a"], &reg).unwrap_err();
        assert_eq!(err.unrecognised_type_name().as_deref(), Some("test/doesNotExist"));
    }

    #[test]
    fn test_unqualified_seed_is_unrecognised() {
        let reg = registry(vec![record("a", &[])]);
        let err = resolve_strs(&["a"], &reg).unwrap_err();
        assert!(matches!(err, LibraryError::UnrecognisedType { ref type_name } if type_name == "a"));
    }

    #[test]
    fn test_duplicate_seeds_and_idempotence() {
        let reg = registry(vec![
            record("a", &["b"]),
            record("b", &[]),
        ]);
        let first = resolve_strs(&["test/b", "test/a", "test/b"], &reg).unwrap();
        let second = resolve_strs(&["test/a", "test/b"], &reg).unwrap();
        assert_eq!(first, second);
        assert!(resolve_strs::<&str>(&[], &reg).unwrap().is_empty());
    }
}
