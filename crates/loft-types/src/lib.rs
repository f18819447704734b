//! Shared types for the Loft semantic core.
//!
//! This crate defines the static type vocabulary of compiled fragments
//! ([`TypeTag`]), the symbol type used as an environment key ([`Symbol`]),
//! and the lightweight references into the host toolkit's AST and
//! compilation-unit model ([`NodeRef`], [`UnitId`]).

mod node;
mod symbol;
mod ty;

pub use node::{NodeRef, UnitId};
pub use symbol::Symbol;
pub use ty::TypeTag;
