//! # Build Options
//!
//! Configuration for a type library build. Every serializable field has a
//! default, so an empty YAML document is a valid configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tydef_core::QualifiedName;

use crate::formats;

/// A custom JSON Schema `format` checker.
pub type FormatFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Options controlling how a type library is built.
#[derive(Clone, Serialize, Deserialize)]
pub struct LibraryOptions {
    /// Prefix for the `$id` of every compiled document.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Property names no record may declare.
    #[serde(default = "default_reserved_property_names")]
    pub reserved_property_names: Vec<String>,
    /// Whether the evaluator asserts the `format` keyword.
    #[serde(default = "default_validate_formats")]
    pub validate_formats: bool,
    /// Whether missing documentation fails the build.
    #[serde(default)]
    pub strict_documentation: bool,
    /// Custom format checkers, merged over the built-in formats.
    #[serde(skip)]
    pub formats: BTreeMap<String, FormatFn>,
}

fn default_domain() -> String {
    "https://tydef.dev".to_string()
}

fn default_reserved_property_names() -> Vec<String> {
    ["id", "docType", "kind", "docVersion", "sys"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_validate_formats() -> bool {
    true
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            reserved_property_names: default_reserved_property_names(),
            validate_formats: default_validate_formats(),
            strict_documentation: false,
            formats: BTreeMap::new(),
        }
    }
}

impl fmt::Debug for LibraryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryOptions")
            .field("domain", &self.domain)
            .field("reserved_property_names", &self.reserved_property_names)
            .field("validate_formats", &self.validate_formats)
            .field("strict_documentation", &self.strict_documentation)
            .field("formats", &self.formats.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LibraryOptions {
    /// Register a custom format checker.
    pub fn with_format<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.formats.insert(name.into(), Arc::new(check));
        self
    }

    /// Whether `name` is reserved.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_property_names.iter().any(|r| r == name)
    }

    /// The `$id` of the compiled document for `name`.
    pub fn schema_id(&self, name: &QualifiedName) -> String {
        format!(
            "{}/schema/{}/{}",
            self.domain.trim_end_matches('/'),
            name.system(),
            name.name()
        )
    }

    /// Built-in formats overlaid with the custom ones.
    pub fn all_formats(&self) -> BTreeMap<String, FormatFn> {
        let mut all = formats::builtin_formats();
        for (name, check) in &self.formats {
            all.insert(name.clone(), Arc::clone(check));
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = LibraryOptions::default();
        assert_eq!(opts.domain, "https://tydef.dev");
        assert!(opts.is_reserved("id"));
        assert!(opts.is_reserved("sys"));
        assert!(opts.is_reserved("kind"));
        assert!(!opts.is_reserved("name"));
        assert!(opts.validate_formats);
        assert!(!opts.strict_documentation);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let opts: LibraryOptions = serde_yaml::from_str("{}").unwrap();
        assert_eq!(opts.domain, LibraryOptions::default().domain);
        assert_eq!(opts.reserved_property_names.len(), 5);
    }

    #[test]
    fn test_yaml_overrides() {
        let opts: LibraryOptions = serde_yaml::from_str(
            "domain: https://example.com/\nreserved_property_names: [sys]\nstrict_documentation: true\n",
        )
        .unwrap();
        assert!(opts.is_reserved("sys"));
        assert!(!opts.is_reserved("kind"));
        assert!(!opts.is_reserved("id"));
        assert!(opts.strict_documentation);
        assert_eq!(
            opts.schema_id(&QualifiedName::new("test", "smallInt")),
            "https://example.com/schema/test/smallInt"
        );
    }

    #[test]
    fn test_custom_format_overrides_builtin() {
        let opts = LibraryOptions::default().with_format("luhn", |_| false);
        let all = opts.all_formats();
        assert!(!(all["luhn"])("4111111111111111"));
        assert!(all.contains_key("utc-date-time"));
    }

    #[test]
    fn test_debug_lists_format_names() {
        let opts = LibraryOptions::default().with_format("even", |s| s.len() % 2 == 0);
        assert!(format!("{opts:?}").contains("even"));
    }
}
