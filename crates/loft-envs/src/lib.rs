//! Loft lexical-environment runtime model.
//!
//! A [`LexicalEnv`] is one scope of the generated language: a mapping from
//! symbols to node references, optionally chained to a parent scope.
//! Environments compose without copying: [`LexicalEnv::group`] overlays
//! several environments, [`LexicalEnv::orphan`] severs a parent link, and
//! [`LexicalEnv::is_visible_from`] answers cross-unit visibility questions
//! through the host's [`UnitVisibility`] oracle.
//!
//! Handles are reference counted ([`std::rc::Rc`]): an environment keeps its
//! parent alive, a group keeps its members alive, and nothing else owns
//! anything. All operations are read-only over the graph; the only fallible
//! one is [`LexicalEnv::get_unique`].

mod env;
mod visibility;

pub use env::{EnvBuilder, LexicalEnv, LookupError, LookupResult};
pub use visibility::UnitVisibility;
