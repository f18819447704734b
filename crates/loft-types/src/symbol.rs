use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbol: the key type for environment bindings.
///
/// Symbols compare by text. Interning is the host toolkit's concern; this
/// core only ever hashes and compares them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The symbol's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_equality_by_text() {
        assert_eq!(Symbol::new("x"), Symbol::from("x"));
        assert_ne!(Symbol::new("x"), Symbol::new("y"));
        assert_eq!(Symbol::new("item").to_string(), "item");
    }
}
