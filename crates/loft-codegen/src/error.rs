//! Construction error types.

use loft_types::TypeTag;
use thiserror::Error;

/// Errors raised while compiling an abstract expression tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructError {
    /// An operand resolved to a type other than the one its position
    /// requires. Never coerced.
    #[error("type mismatch in {position}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Which operand position was being checked.
        position: String,
        /// The type the position requires.
        expected: TypeTag,
        /// The type the operand actually resolved to.
        actual: TypeTag,
    },

    /// The current-environment placeholder was resolved outside of any
    /// active binding.
    #[error("the current-environment placeholder is not bound in this context")]
    UnboundCurrentEnv,
}

/// Construction result type alias.
pub type ConstructResult<T> = Result<T, ConstructError>;
