//! Integration tests for the lexical-environment runtime model.
//!
//! Tests validate:
//! - Lookup shadowing along the parent chain
//! - Orphaning severing parent reach
//! - Group precedence (member order is observable)
//! - Degenerate grouping returning the empty singleton
//! - Cross-unit visibility through a host oracle
//! - The full root/leaf scenario combining all of the above

use std::collections::HashSet;

use loft_envs::{LexicalEnv, LookupError, UnitVisibility};
use loft_types::{NodeRef, Symbol, UnitId};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn elem(index: u32) -> NodeRef {
    NodeRef::new(UnitId(0), index)
}

fn sym(text: &str) -> Symbol {
    Symbol::new(text)
}

/// Oracle backed by an explicit set of (referenced, base) unit pairs.
struct PairOracle(HashSet<(UnitId, UnitId)>);

impl UnitVisibility for PairOracle {
    fn is_visible_from(&self, referenced: UnitId, base: UnitId) -> bool {
        self.0.contains(&(referenced, base))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Lookup
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn local_bindings_shadow_parent_bindings() {
    let parent = LexicalEnv::builder().add("s", elem(10)).add("s", elem(11)).build();
    let child = LexicalEnv::builder().parent(&parent).add("s", elem(20)).build();

    assert_eq!(child.get(&sym("s")), vec![elem(20), elem(10), elem(11)]);
}

#[test]
fn lookup_walks_the_whole_parent_chain() {
    let grandparent = LexicalEnv::builder().add("s", elem(1)).build();
    let parent = LexicalEnv::builder().parent(&grandparent).build();
    let child = LexicalEnv::builder().parent(&parent).add("s", elem(3)).build();

    assert_eq!(child.get(&sym("s")), vec![elem(3), elem(1)]);
}

#[test]
fn lookup_of_unbound_symbol_is_empty() {
    let env = LexicalEnv::builder().add("x", elem(1)).build();
    assert!(env.get(&sym("y")).is_empty());
    assert_eq!(
        env.get_unique(&sym("y")),
        Err(LookupError::EmptyResult { symbol: sym("y") })
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// Orphan
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn orphan_removes_parent_reach_for_every_symbol() {
    let parent = LexicalEnv::builder().add("a", elem(1)).add("b", elem(2)).build();
    let child = LexicalEnv::builder().parent(&parent).add("a", elem(3)).build();

    let orphaned = child.orphan();
    assert_eq!(orphaned.get(&sym("a")), vec![elem(3)]);
    assert!(orphaned.get(&sym("b")).is_empty());
}

#[test]
fn orphan_keeps_the_owning_node() {
    let node = NodeRef::new(UnitId(4), 7);
    let parent = LexicalEnv::builder().build();
    let env = LexicalEnv::builder().node(node).parent(&parent).build();

    assert_eq!(env.orphan().node(), Some(node));
}

// ══════════════════════════════════════════════════════════════════════════════
// Group
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn group_member_order_defines_precedence() {
    let a = LexicalEnv::builder().add("s", elem(1)).add("s", elem(2)).build();
    let b = LexicalEnv::builder().add("s", elem(3)).build();

    let ab = LexicalEnv::group(&[a.clone(), b.clone()]);
    let ba = LexicalEnv::group(&[b, a]);

    assert_eq!(ab.get(&sym("s")), vec![elem(1), elem(2), elem(3)]);
    assert_eq!(ba.get(&sym("s")), vec![elem(3), elem(1), elem(2)]);
}

#[test]
fn group_of_nothing_is_the_empty_singleton() {
    let grouped = LexicalEnv::group(&[]);
    assert!(LexicalEnv::ptr_eq(&grouped, &LexicalEnv::empty()));
}

#[test]
fn groups_nest_without_flattening_surprises() {
    let a = LexicalEnv::builder().add("s", elem(1)).build();
    let b = LexicalEnv::builder().add("s", elem(2)).build();
    let c = LexicalEnv::builder().add("s", elem(3)).build();

    let inner = LexicalEnv::group(&[b, c]);
    let outer = LexicalEnv::group(&[a, inner]);

    assert_eq!(outer.get(&sym("s")), vec![elem(1), elem(2), elem(3)]);
    assert_eq!(outer.node(), None);
}

#[test]
fn group_members_follow_group_precedence_through_parents() {
    let parent = LexicalEnv::builder().add("s", elem(9)).build();
    let child = LexicalEnv::builder().parent(&parent).add("s", elem(1)).build();
    let other = LexicalEnv::builder().add("s", elem(5)).build();

    // The first member contributes all of its results (including its
    // parent's) before the second member is consulted.
    let grouped = LexicalEnv::group(&[child, other]);
    assert_eq!(grouped.get(&sym("s")), vec![elem(1), elem(9), elem(5)]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Visibility
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn visibility_queries_the_host_oracle() {
    let u1 = UnitId(1);
    let u2 = UnitId(2);
    let referenced = LexicalEnv::builder().node(NodeRef::new(u1, 0)).build();
    let base = LexicalEnv::builder().node(NodeRef::new(u2, 0)).build();

    let oracle = PairOracle([(u1, u2)].into_iter().collect());
    assert!(referenced.is_visible_from(&base, &oracle));
    // The relation is directional.
    assert!(!base.is_visible_from(&referenced, &oracle));
}

#[test]
fn visibility_is_false_without_an_owning_node() {
    let with_node = LexicalEnv::builder().node(NodeRef::new(UnitId(1), 0)).build();
    let nodeless = LexicalEnv::builder().build();
    let everything = |_: UnitId, _: UnitId| true;

    assert!(!nodeless.is_visible_from(&with_node, &everything));
    assert!(!with_node.is_visible_from(&nodeless, &everything));
    assert!(!with_node.is_visible_from(&LexicalEnv::group(&[with_node.clone()]), &everything));
}

// ══════════════════════════════════════════════════════════════════════════════
// End-to-end scenario
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn root_leaf_scenario() {
    let elem1 = elem(1);
    let elem2 = elem(2);
    let root = LexicalEnv::builder().add("x", elem1).build();
    let leaf = LexicalEnv::builder().parent(&root).add("x", elem2).build();

    assert_eq!(leaf.get(&sym("x")), vec![elem2, elem1]);
    assert_eq!(leaf.orphan().get(&sym("x")), vec![elem2]);
    assert!(LexicalEnv::group(&[leaf, root]).get(&sym("y")).is_empty());
}
