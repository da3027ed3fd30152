//! Canonical-empty simplification.
//!
//! An `and` built entirely from anonymous placeholder markers carries no real
//! constraint; it canonicalizes to `None`. The check is shallow: only the
//! top level of the given node is inspected, so `and(or(component(null)))`
//! is left as it is.

use sieve_types::{Node, Operator};

/// Collapse a vacuous `and` of placeholders to `None`; return anything else
/// unchanged.
pub fn simplify_condition(node: Option<&Node>) -> Option<&Node> {
    let node = node?;
    if is_placeholder_conjunction(node) {
        None
    } else {
        Some(node)
    }
}

/// Returns `true` if `node` imposes no constraint (`None`, or simplifies to it).
pub fn is_vacuous(node: Option<&Node>) -> bool {
    simplify_condition(node).is_none()
}

fn is_placeholder_conjunction(node: &Node) -> bool {
    match node {
        Node::Condition(c) if c.operator() == Operator::And => c
            .operands()
            .iter()
            .all(|operand| matches!(operand, Node::Component(m) if m.is_placeholder())),
        _ => false,
    }
}
