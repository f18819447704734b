//! Lexical environments: parent-linked, composable scope values.

use std::collections::HashMap;
use std::rc::Rc;

use loft_types::{NodeRef, Symbol};
use thiserror::Error;

use crate::visibility::UnitVisibility;

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

/// Errors raised by environment lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// A unique lookup found no element for the symbol.
    #[error("no element bound to symbol `{symbol}`")]
    EmptyResult {
        /// The symbol that was looked up.
        symbol: Symbol,
    },
}

/// Lookup result type alias.
pub type LookupResult<T> = Result<T, LookupError>;

// ══════════════════════════════════════════════════════════════════════════════
// LexicalEnv
// ══════════════════════════════════════════════════════════════════════════════

/// A shared handle to one lexical environment.
///
/// Cloning the handle is cheap and shares the underlying scope. Environments
/// are immutable once built (see [`EnvBuilder`]); every operation below is a
/// read-only walk of the graph.
#[derive(Debug, Clone)]
pub struct LexicalEnv(Rc<EnvKind>);

#[derive(Debug)]
enum EnvKind {
    /// A regular scope: optional owning node, optional parent, own bindings.
    Primary {
        node: Option<NodeRef>,
        parent: Option<LexicalEnv>,
        bindings: HashMap<Symbol, Vec<NodeRef>>,
    },
    /// A logical overlay of other environments, in precedence order.
    /// A group borrows its members; it never copies their contents.
    Group { members: Vec<LexicalEnv> },
}

thread_local! {
    // The core is single-threaded by contract, so a thread-local is the
    // process-wide singleton.
    static EMPTY_ENV: LexicalEnv = LexicalEnv(Rc::new(EnvKind::Primary {
        node: None,
        parent: None,
        bindings: HashMap::new(),
    }));
}

impl LexicalEnv {
    /// The distinguished empty environment: no node, no parent, no bindings.
    ///
    /// Always returns the same underlying environment, observable through
    /// [`LexicalEnv::ptr_eq`].
    pub fn empty() -> Self {
        EMPTY_ENV.with(Clone::clone)
    }

    /// Start building a new primary environment.
    pub fn builder() -> EnvBuilder {
        EnvBuilder::new()
    }

    /// Whether two handles refer to the same underlying environment.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// All elements bound to `symbol`, in precedence order.
    ///
    /// Own bindings come first (insertion order preserved), then the
    /// parent's, unless the parent link was severed. A group concatenates
    /// its members' results in member order.
    pub fn get(&self, symbol: &Symbol) -> Vec<NodeRef> {
        match &*self.0 {
            EnvKind::Primary {
                parent, bindings, ..
            } => {
                let mut elements = bindings.get(symbol).cloned().unwrap_or_default();
                if let Some(parent) = parent {
                    elements.extend(parent.get(symbol));
                }
                elements
            }
            EnvKind::Group { members } => {
                members.iter().flat_map(|member| member.get(symbol)).collect()
            }
        }
    }

    /// The first element bound to `symbol`, or an error if there is none.
    ///
    /// No disambiguation is applied when several elements match: the first
    /// one in precedence order wins. Filtering among overloads belongs to
    /// the host's resolution machinery, not to this core.
    pub fn get_unique(&self, symbol: &Symbol) -> LookupResult<NodeRef> {
        self.get(symbol)
            .into_iter()
            .next()
            .ok_or_else(|| LookupError::EmptyResult {
                symbol: symbol.clone(),
            })
    }

    /// A copy of this environment with the parent link severed.
    ///
    /// The copy keeps the same owning node and the same bindings. Orphaning
    /// a group yields a fresh group over the same members (a group has no
    /// parent to sever). `self` is not affected.
    pub fn orphan(&self) -> Self {
        match &*self.0 {
            EnvKind::Primary { node, bindings, .. } => Self(Rc::new(EnvKind::Primary {
                node: *node,
                parent: None,
                bindings: bindings.clone(),
            })),
            EnvKind::Group { members } => Self(Rc::new(EnvKind::Group {
                members: members.clone(),
            })),
        }
    }

    /// A composite environment overlaying `members` in the given order.
    ///
    /// Member order defines lookup precedence. An empty slice returns the
    /// empty-environment singleton itself. Groups may nest: a group can be
    /// a member of another group, and no flattening is performed.
    pub fn group(members: &[LexicalEnv]) -> Self {
        if members.is_empty() {
            return Self::empty();
        }
        Self(Rc::new(EnvKind::Group {
            members: members.to_vec(),
        }))
    }

    /// The AST node owning this environment, if any.
    ///
    /// Groups and the empty environment have no owning node.
    pub fn node(&self) -> Option<NodeRef> {
        match &*self.0 {
            EnvKind::Primary { node, .. } => *node,
            EnvKind::Group { .. } => None,
        }
    }

    /// Whether the unit owning this environment's node is visible from the
    /// unit owning `base`'s node, per the host's visibility relation.
    ///
    /// An environment with no owning node belongs to no unit; the relation
    /// is then `false` on either side.
    pub fn is_visible_from(&self, base: &LexicalEnv, units: &impl UnitVisibility) -> bool {
        match (self.node(), base.node()) {
            (Some(referenced), Some(base)) => {
                units.is_visible_from(referenced.unit, base.unit)
            }
            _ => false,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// EnvBuilder
// ══════════════════════════════════════════════════════════════════════════════

/// Builder for primary environments.
///
/// Front-end code assembles a scope once, then the built environment is
/// immutable for its whole life.
#[derive(Debug, Default)]
pub struct EnvBuilder {
    node: Option<NodeRef>,
    parent: Option<LexicalEnv>,
    bindings: HashMap<Symbol, Vec<NodeRef>>,
}

impl EnvBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Set the owning AST node.
    pub fn node(mut self, node: NodeRef) -> Self {
        self.node = Some(node);
        self
    }

    /// Set the parent environment (shared, kept alive by the child).
    pub fn parent(mut self, parent: &LexicalEnv) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Bind `symbol` to `element`. A symbol may be bound repeatedly; the
    /// elements accumulate in insertion order.
    pub fn add(mut self, symbol: impl Into<Symbol>, element: NodeRef) -> Self {
        self.bindings.entry(symbol.into()).or_default().push(element);
        self
    }

    /// Build the environment.
    pub fn build(self) -> LexicalEnv {
        LexicalEnv(Rc::new(EnvKind::Primary {
            node: self.node,
            parent: self.parent,
            bindings: self.bindings,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loft_types::UnitId;

    fn elem(index: u32) -> NodeRef {
        NodeRef::new(UnitId(0), index)
    }

    #[test]
    fn test_empty_env_is_a_singleton() {
        assert!(LexicalEnv::ptr_eq(&LexicalEnv::empty(), &LexicalEnv::empty()));
        assert_eq!(LexicalEnv::empty().node(), None);
        assert!(LexicalEnv::empty().get(&Symbol::new("x")).is_empty());
    }

    #[test]
    fn test_builder_preserves_insertion_order() {
        let env = LexicalEnv::builder()
            .add("f", elem(1))
            .add("f", elem(2))
            .add("f", elem(3))
            .build();
        assert_eq!(env.get(&Symbol::new("f")), vec![elem(1), elem(2), elem(3)]);
    }

    #[test]
    fn test_get_unique_takes_first_match() {
        let env = LexicalEnv::builder().add("f", elem(1)).add("f", elem(2)).build();
        assert_eq!(env.get_unique(&Symbol::new("f")), Ok(elem(1)));
        assert_eq!(
            env.get_unique(&Symbol::new("g")),
            Err(LookupError::EmptyResult {
                symbol: Symbol::new("g")
            })
        );
    }

    #[test]
    fn test_orphan_does_not_mutate_the_source() {
        let parent = LexicalEnv::builder().add("x", elem(1)).build();
        let child = LexicalEnv::builder().parent(&parent).add("x", elem(2)).build();

        let orphaned = child.orphan();
        assert_eq!(orphaned.get(&Symbol::new("x")), vec![elem(2)]);
        // The original still reaches its parent.
        assert_eq!(child.get(&Symbol::new("x")), vec![elem(2), elem(1)]);
    }
}
