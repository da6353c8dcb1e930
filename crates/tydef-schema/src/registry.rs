//! # Type Registry
//!
//! Holds every patched definition of a library keyed by qualified name,
//! with a per-kind index. The registry is populated once per build and is
//! read-only afterwards; every other component receives it by reference.

use std::collections::{BTreeMap, BTreeSet};

use tydef_core::{QualifiedName, TypeDefinition, TypeKind};

use crate::error::LibraryError;

/// All definitions of one type library.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    definitions: BTreeMap<QualifiedName, TypeDefinition>,
    by_kind: BTreeMap<TypeKind, BTreeSet<QualifiedName>>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of definitions.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicateTypeName`] for the first name that
    /// is claimed twice.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = TypeDefinition>,
    ) -> Result<Self, LibraryError> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Insert a definition.
    ///
    /// Uniqueness is checked across all kinds: an enum and a record may not
    /// share a qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DuplicateTypeName`] if the name is taken.
    pub fn register(&mut self, definition: TypeDefinition) -> Result<(), LibraryError> {
        let name = definition.name().clone();
        if self.definitions.contains_key(&name) {
            return Err(LibraryError::DuplicateTypeName { type_name: name });
        }
        self.by_kind
            .entry(definition.kind())
            .or_default()
            .insert(name.clone());
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Look up a definition by qualified name.
    pub fn lookup(&self, name: &QualifiedName) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    /// Look up a definition by its `system/name` string.
    pub fn lookup_str(&self, name: &str) -> Option<&TypeDefinition> {
        QualifiedName::parse(name)
            .ok()
            .and_then(|n| self.definitions.get(&n))
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.definitions.contains_key(name)
    }

    /// Every registered name rendered as `system/name`.
    pub fn all_qualified_names(&self) -> BTreeSet<String> {
        self.definitions.keys().map(|n| n.to_string()).collect()
    }

    /// Registered names of one kind, sorted.
    pub fn names_of_kind(&self, kind: TypeKind) -> impl Iterator<Item = &QualifiedName> {
        self.by_kind.get(&kind).into_iter().flatten()
    }

    /// Every definition, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.definitions.values()
    }

    /// Every definition in validation order.
    ///
    /// Leaf scalars first, then enums, arrays, objects and finally records;
    /// alphabetical within each group.
    pub fn in_validation_order(&self) -> Vec<&TypeDefinition> {
        let mut ordered: Vec<&TypeDefinition> = self.definitions.values().collect();
        ordered.sort_by(|a, b| {
            a.kind()
                .validation_rank()
                .cmp(&b.kind().validation_rank())
                .then_with(|| a.name().cmp(b.name()))
        });
        ordered
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use tydef_core::{DefinitionBody, DefinitionHeader, EnumDef, NumericDef, TestCases};

    fn header(system: &str, name: &str) -> DefinitionHeader {
        DefinitionHeader {
            name: QualifiedName::new(system, name),
            summary: None,
            deprecated: false,
            tags: BTreeSet::new(),
            labels: BTreeMap::new(),
        }
    }

    fn int_def(system: &str, name: &str) -> TypeDefinition {
        TypeDefinition {
            header: header(system, name),
            body: DefinitionBody::Int(NumericDef {
                minimum: None,
                maximum: None,
                minimum_exclusive: false,
                maximum_exclusive: false,
                test_cases: TestCases::default(),
            }),
        }
    }

    fn enum_def(system: &str, name: &str) -> TypeDefinition {
        TypeDefinition {
            header: header(system, name),
            body: DefinitionBody::Enum(EnumDef {
                items: vec![],
                data_type: None,
                test_cases: TestCases::default(),
            }),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = TypeRegistry::from_definitions(vec![int_def("test", "smallInt")]).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup(&QualifiedName::new("test", "smallInt")).is_some());
        assert!(registry.lookup_str("test/smallInt").is_some());
        assert!(registry.lookup_str("smallInt").is_none());
        assert!(registry.lookup_str("test/other").is_none());
    }

    #[test]
    fn test_duplicate_across_kinds_rejected() {
        let err = TypeRegistry::from_definitions(vec![
            int_def("test", "thing"),
            enum_def("test", "thing"),
        ])
        .unwrap_err();
        match err {
            LibraryError::DuplicateTypeName { type_name } => {
                assert_eq!(type_name.to_string(), "test/thing");
            }
            other => panic!("expected DuplicateTypeName, got {other}"),
        }
    }

    #[test]
    fn test_same_name_different_system_allowed() {
        let registry =
            TypeRegistry::from_definitions(vec![int_def("a", "thing"), int_def("b", "thing")])
                .unwrap();
        assert_eq!(
            registry.all_qualified_names().into_iter().collect::<Vec<_>>(),
            vec!["a/thing".to_string(), "b/thing".to_string()]
        );
    }

    #[test]
    fn test_names_of_kind() {
        let registry = TypeRegistry::from_definitions(vec![
            int_def("test", "b"),
            enum_def("test", "a"),
            int_def("test", "a2"),
        ])
        .unwrap();
        let ints: Vec<String> = registry
            .names_of_kind(TypeKind::Int)
            .map(|n| n.to_string())
            .collect();
        assert_eq!(ints, vec!["test/a2", "test/b"]);
        assert_eq!(registry.names_of_kind(TypeKind::Record).count(), 0);
    }

    #[test]
    fn test_validation_order_puts_leaves_first() {
        let registry = TypeRegistry::from_definitions(vec![
            enum_def("test", "a"),
            int_def("test", "z"),
            int_def("test", "m"),
        ])
        .unwrap();
        let order: Vec<String> = registry
            .in_validation_order()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(order, vec!["test/m", "test/z", "test/a"]);
    }
}
