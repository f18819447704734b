//! Static type tags for compiled expression fragments.
//!
//! [`TypeTag`] is the semantic type attached to every resolved expression.
//! It is deliberately small: the surrounding toolkit owns the real type
//! system, and this core only needs enough vocabulary to type-check
//! environment operations and to name the array types code generation
//! must materialize.

use serde::{Deserialize, Serialize};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// TypeTag
// ══════════════════════════════════════════════════════════════════════════════

/// The static type of a compiled expression fragment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// A lexical environment handle.
    LexicalEnv,
    /// A symbol, the key type for environment lookups.
    Symbol,
    /// One element bound in an environment (a node reference at runtime).
    Element,
    /// A boolean value.
    Bool,
    /// The generic AST node type of the generated language.
    Node,
    /// The sequence-container counterpart of an element type.
    Array(Box<TypeTag>),
}

impl TypeTag {
    /// Build the array tag for the given element type.
    pub fn array_of(elem: TypeTag) -> Self {
        Self::Array(Box::new(elem))
    }

    /// The element type if this is an array tag.
    pub fn element(&self) -> Option<&TypeTag> {
        match self {
            Self::Array(elem) => Some(elem),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexicalEnv => write!(f, "LexicalEnv"),
            Self::Symbol => write!(f, "Symbol"),
            Self::Element => write!(f, "Element"),
            Self::Bool => write!(f, "Bool"),
            Self::Node => write!(f, "Node"),
            Self::Array(elem) => write!(f, "Array<{elem}>"),
        }
    }
}
