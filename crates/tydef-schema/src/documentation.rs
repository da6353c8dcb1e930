//! # Documentation Completeness
//!
//! Collects every missing piece of prose in a registry. Missing
//! documentation never stops a build on its own; the warnings are gathered
//! into one list and only become an error under
//! [`LibraryOptions::strict_documentation`](crate::LibraryOptions).

use std::fmt;

use tydef_core::{DefinitionBody, QualifiedName, TypeDefinition};

use crate::registry::TypeRegistry;

/// One missing summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentationWarning {
    /// The definition the prose belongs to.
    pub type_name: QualifiedName,
    /// What lacks a summary, e.g. `definition` or `property 'one'`.
    pub location: String,
}

impl fmt::Display for DocumentationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} has no summary for {}", self.type_name, self.location)
    }
}

fn is_blank(summary: &Option<String>) -> bool {
    summary.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Every missing summary across the registry, sorted by type name.
///
/// Derived variant records are checked for their own summary only; their
/// properties are the base record's and are reported there.
pub fn collect_warnings(registry: &TypeRegistry) -> Vec<DocumentationWarning> {
    registry.iter().flat_map(definition_warnings).collect()
}

fn definition_warnings(def: &TypeDefinition) -> Vec<DocumentationWarning> {
    let mut locations = Vec::new();
    if is_blank(&def.header.summary) {
        locations.push("definition".to_string());
    }
    match &def.body {
        DefinitionBody::Enum(e) => {
            for item in e.items.iter().filter(|i| is_blank(&i.summary)) {
                locations.push(format!("enum item '{}'", item.value));
            }
        }
        DefinitionBody::Record(r) if r.variant_of.is_none() => {
            for p in r.properties.iter().filter(|p| is_blank(&p.summary)) {
                locations.push(format!("property '{}'", p.name));
            }
            for c in r.calculated_properties.iter().filter(|c| is_blank(&c.summary)) {
                locations.push(format!("calculated property '{}'", c.name));
            }
        }
        _ => {}
    }
    locations
        .into_iter()
        .map(|location| DocumentationWarning {
            type_name: def.name().clone(),
            location,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tydef_core::{patch::patch, RawDefinition};

    fn registry(resources: Vec<serde_json::Value>) -> TypeRegistry {
        let defs = resources.into_iter().flat_map(|r| {
            let raw: RawDefinition = serde_json::from_value(r).unwrap();
            patch(raw)
        });
        TypeRegistry::from_definitions(defs).unwrap()
    }

    #[test]
    fn test_documented_definitions_produce_no_warnings() {
        let reg = registry(vec![json!({
            "kind": "enum", "system": "test", "name": "lang", "summary": "A language.",
            "items": [{ "value": "en", "summary": "English." }]
        })]);
        assert!(collect_warnings(&reg).is_empty());
    }

    #[test]
    fn test_missing_summaries_are_collected() {
        let reg = registry(vec![json!({
            "kind": "record", "system": "test", "name": "rec",
            "properties": [
                { "name": "one", "propertyType": "smallInt", "summary": "One." },
                { "name": "two", "propertyType": "smallInt", "summary": "  " }
            ],
            "variants": [{ "name": "recPatch", "summary": "Patch.", "excludeProperties": ["one"] }]
        })]);
        let rendered: Vec<String> = collect_warnings(&reg).iter().map(|w| w.to_string()).collect();
        assert_eq!(
            rendered,
            vec![
                "test/rec has no summary for definition",
                "test/rec has no summary for property 'two'",
            ]
        );
    }
}
