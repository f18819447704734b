//! Loft expression compiler: abstract environment operations to typed,
//! side-effect-annotated code fragments.
//!
//! # Architecture
//!
//! A property-definition front end builds an [`AbstractExpr`] tree — one
//! node per environment operation (lookup, grouping, orphaning, visibility,
//! node access, evaluate-in-environment). A single call to [`construct`]
//! then compiles the tree, children before parents, into a
//! [`ResolvedExpr`]: a static type tag, a preamble of side-effecting
//! statements, and a value fragment ready for the host's rendering back
//! end.
//!
//! The whole pass is compile-time, single-threaded, and synchronous. Its
//! only state is the [`ConstructCtx`] threaded through every call, which
//! carries the current-environment binding stack, the fresh-local
//! allocator, and the registry of array types the back end must
//! materialize.
//!
//! Failures are typed: an operand of the wrong static type or a
//! current-environment placeholder resolved outside any binding abort the
//! pass with a [`ConstructError`].

pub mod context;
pub mod error;
pub mod expr;
pub mod resolved;

pub use context::ConstructCtx;
pub use error::{ConstructError, ConstructResult};
pub use expr::{construct, AbstractExpr};
pub use resolved::ResolvedExpr;
