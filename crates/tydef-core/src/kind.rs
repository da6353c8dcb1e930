//! # Definition Kinds
//!
//! The closed set of eight definition kinds. Every consumer matches on
//! [`TypeKind`] exhaustively, so adding a kind forces every phase
//! (meta-schema, patch, semantic checks, compiler) to handle it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discriminator carried in the `kind` field of every resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Bool,
    Int,
    Float,
    String,
    Enum,
    Array,
    Object,
    Record,
}

impl TypeKind {
    /// Every kind, in declaration order.
    pub const ALL: [TypeKind; 8] = [
        TypeKind::Bool,
        TypeKind::Int,
        TypeKind::Float,
        TypeKind::String,
        TypeKind::Enum,
        TypeKind::Array,
        TypeKind::Object,
        TypeKind::Record,
    ];

    /// The `kind` discriminator as written in resources.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Object => "object",
            Self::Record => "record",
        }
    }

    /// Validation order of the kind's category.
    ///
    /// Leaf scalars come first, then enums, then the composite kinds that
    /// reference other definitions. Definitions are validated in ascending
    /// category order so that composites are only checked once the leaves
    /// they reference are known to be good.
    pub fn validation_rank(&self) -> u8 {
        match self {
            Self::Bool | Self::Int | Self::Float | Self::String => 0,
            Self::Enum => 1,
            Self::Array => 2,
            Self::Object => 3,
            Self::Record => 4,
        }
    }

    /// Whether definitions of this kind are leaves of the reference graph.
    pub fn is_enum(&self) -> bool {
        matches!(self, Self::Enum)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown kind '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_kind() {
        for kind in TypeKind::ALL {
            assert_eq!(kind.as_str().parse::<TypeKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_unknown_kind() {
        assert!("docType".parse::<TypeKind>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let v = serde_json::to_value(TypeKind::Record).unwrap();
        assert_eq!(v, serde_json::json!("record"));
    }

    #[test]
    fn test_leaves_rank_before_composites() {
        assert!(TypeKind::Int.validation_rank() < TypeKind::Enum.validation_rank());
        assert!(TypeKind::Enum.validation_rank() < TypeKind::Record.validation_rank());
        assert!(TypeKind::Array.validation_rank() < TypeKind::Record.validation_rank());
    }
}
