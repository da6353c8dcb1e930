//! # Qualified Type Names
//!
//! Every definition in a type library is identified by the pair
//! `(system, name)`, written `system/name`. References inside a definition
//! may use the bare local name; those are qualified with the referring
//! definition's own system.
//!
//! Compiled schemas address their `definitions` entries with RFC 6901
//! JSON Pointers. Because a qualified name always contains `/`, the key
//! `test/smallInt` is addressed as `#/definitions/test~1smallInt`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::NameError;

/// Prefix of every local `$ref` emitted by the schema compiler.
pub const DEFINITIONS_POINTER_PREFIX: &str = "#/definitions/";

/// A system-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QualifiedName {
    system: String,
    name: String,
}

impl QualifiedName {
    /// Build a qualified name from its two segments.
    pub fn new(system: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            name: name.into(),
        }
    }

    /// Parse a name that must already be qualified.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Unqualified`] if `value` has no `/`, and
    /// [`NameError::EmptySegment`] if either side of the first `/` is empty.
    pub fn parse(value: &str) -> Result<Self, NameError> {
        let (system, name) = value
            .split_once('/')
            .ok_or_else(|| NameError::Unqualified(value.to_string()))?;
        if system.is_empty() || name.is_empty() {
            return Err(NameError::EmptySegment(value.to_string()));
        }
        Ok(Self::new(system, name))
    }

    /// Qualify a reference written inside a definition of `default_system`.
    ///
    /// A reference containing `/` is taken as already qualified and split at
    /// its first `/`. Anything after that is kept in the name segment, so a
    /// malformed reference such as `a/b/c` survives qualification and is
    /// reported later as an unrecognised type rather than silently rewritten.
    pub fn qualify(reference: &str, default_system: &str) -> Self {
        match reference.split_once('/') {
            Some((system, name)) => Self::new(system, name),
            None => Self::new(default_system, reference),
        }
    }

    /// The system segment.
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The local name segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `$ref` pointer addressing this name inside a `definitions` map.
    pub fn definitions_pointer(&self) -> String {
        format!(
            "{DEFINITIONS_POINTER_PREFIX}{}",
            escape_pointer_token(&self.to_string())
        )
    }

    /// Recover the referenced name from a `#/definitions/...` pointer.
    ///
    /// Returns `None` for any `$ref` that does not address the local
    /// `definitions` map. The pointer token is unescaped per RFC 6901, and
    /// an unescaped `/` inside the token is accepted as authoring shorthand.
    /// Bare names are qualified with `default_system`.
    pub fn from_definitions_pointer(pointer: &str, default_system: &str) -> Option<Self> {
        decode_definitions_pointer(pointer).map(|key| Self::qualify(&key, default_system))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.system, self.name)
    }
}

impl Serialize for QualifiedName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// The `definitions` key addressed by a `#/definitions/...` pointer.
///
/// Returns `None` for pointers into anything other than the local
/// `definitions` map, and for an empty key.
pub fn decode_definitions_pointer(pointer: &str) -> Option<String> {
    let token = pointer.strip_prefix(DEFINITIONS_POINTER_PREFIX)?;
    if token.is_empty() {
        return None;
    }
    Some(unescape_pointer_token(token))
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// A compiled pointer always leads back to the name it was built from.
        #[test]
        fn pointer_recovers_name(system in "[a-z][a-zA-Z0-9~]{0,8}", name in "[a-z][a-zA-Z0-9~/]{0,12}") {
            let qualified = QualifiedName::new(system, name);
            let pointer = qualified.definitions_pointer();
            prop_assert_eq!(
                decode_definitions_pointer(&pointer),
                Some(qualified.to_string())
            );
        }

        /// Qualifying a rendered qualified name is the identity.
        #[test]
        fn qualify_is_stable(system in "[a-z][a-zA-Z0-9]{0,8}", name in "[a-z][a-zA-Z0-9]{0,8}") {
            let qualified = QualifiedName::new(system, name);
            prop_assert_eq!(QualifiedName::qualify(&qualified.to_string(), "other"), qualified);
        }
    }
}
