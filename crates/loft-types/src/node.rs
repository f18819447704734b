//! References into the host toolkit's AST and compilation-unit model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a compilation unit.
///
/// The unit model itself (files, dependencies, with-clauses, ...) belongs to
/// the host toolkit; the core only compares unit identities and queries the
/// host's visibility relation with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u32);

/// Lightweight reference to an AST node owned by the host toolkit.
///
/// Environments bind symbols to node references; the nodes themselves are
/// never dereferenced by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    /// The compilation unit the node belongs to.
    pub unit: UnitId,
    /// Index of the node within its unit.
    pub index: u32,
}

impl NodeRef {
    /// Create a node reference.
    pub fn new(unit: UnitId, index: u32) -> Self {
        Self { unit, index }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit.0, self.index)
    }
}
