//! What changed between two composites, component by component.
//!
//! Markers are matched by id. A marker present on one side only is an
//! addition or removal; a marker whose condition differs structurally is a
//! change, and carries a line diff (via `similar`) of the two
//! [`Node::pretty`] renderings of its condition. A root that is not a
//! composite is treated as a single anonymous component.

use similar::{ChangeTag, TextDiff};

use sieve_types::Node;

use crate::compare::compare_conditions;

/// Rendering used for a tree that imposes no constraint.
pub const EMPTY_RENDERING: &str = "(no constraint)\n";

/// The component-level difference between two composites.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeDiff {
    /// Changes in the new composite's order, then removals in the old order.
    pub changes: Vec<ComponentChange>,
}

impl CompositeDiff {
    /// Returns `true` if no component was added, removed or changed.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of components only present in the new composite.
    pub fn added(&self) -> usize {
        self.count(|c| matches!(c, ComponentChange::Added { .. }))
    }

    /// Number of components only present in the old composite.
    pub fn removed(&self) -> usize {
        self.count(|c| matches!(c, ComponentChange::Removed { .. }))
    }

    /// Number of components whose condition changed.
    pub fn changed(&self) -> usize {
        self.count(|c| matches!(c, ComponentChange::Changed { .. }))
    }

    fn count(&self, pred: impl Fn(&ComponentChange) -> bool) -> usize {
        self.changes.iter().filter(|c| pred(*c)).count()
    }
}

/// One component's difference.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentChange {
    Added {
        id: Option<String>,
        condition: Option<Node>,
    },
    Removed {
        id: Option<String>,
        condition: Option<Node>,
    },
    Changed {
        id: Option<String>,
        /// Line diff of the old and new condition renderings.
        lines: Vec<DiffLine>,
    },
}

impl ComponentChange {
    /// The id of the component this change concerns.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Added { id, .. } | Self::Removed { id, .. } | Self::Changed { id, .. } => {
                id.as_deref()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Render a tree for display; `None` renders as [`EMPTY_RENDERING`].
pub fn render(node: Option<&Node>) -> String {
    match node {
        Some(node) => node.pretty(),
        None => EMPTY_RENDERING.to_string(),
    }
}

/// Diff two composites by component id.
///
/// Conditions are compared structurally with empty-as-equal semantics, so
/// clearing a component whose condition was already vacuous is no change.
pub fn diff_rendered(old: Option<&Node>, new: Option<&Node>) -> CompositeDiff {
    let old_slots = slots(old);
    let new_slots = slots(new);
    let mut changes = Vec::new();

    for &(id, condition) in &new_slots {
        match old_slots.iter().find(|(old_id, _)| *old_id == id) {
            None => changes.push(ComponentChange::Added {
                id: id.map(str::to_owned),
                condition: condition.cloned(),
            }),
            Some(&(_, previous)) if !compare_conditions(previous, condition, true) => {
                changes.push(ComponentChange::Changed {
                    id: id.map(str::to_owned),
                    lines: line_diff(&render(previous), &render(condition)),
                });
            }
            Some(_) => {}
        }
    }

    for &(id, condition) in &old_slots {
        if !new_slots.iter().any(|(new_id, _)| *new_id == id) {
            changes.push(ComponentChange::Removed {
                id: id.map(str::to_owned),
                condition: condition.cloned(),
            });
        }
    }

    CompositeDiff { changes }
}

type Slot<'a> = (Option<&'a str>, Option<&'a Node>);

/// The `(id, condition)` slots of a composite; first occurrence wins.
fn slots(root: Option<&Node>) -> Vec<Slot<'_>> {
    let Some(root) = root else {
        return Vec::new();
    };
    let operands = match root.as_condition() {
        Some(c) if c.is_logical() && c.operands().iter().all(|op| op.as_component().is_some()) => {
            c.operands()
        }
        _ => return vec![(None, Some(root))],
    };

    let mut out: Vec<Slot<'_>> = Vec::with_capacity(operands.len());
    for marker in operands.iter().filter_map(Node::as_component) {
        if !out.iter().any(|(id, _)| *id == marker.id()) {
            out.push((marker.id(), marker.condition()));
        }
    }
    out
}

fn line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .map(|change| {
            let text = change.value().trim_end_matches('\n').to_string();
            match change.tag() {
                ChangeTag::Equal => DiffLine::Context(text),
                ChangeTag::Delete => DiffLine::Removed(text),
                ChangeTag::Insert => DiffLine::Added(text),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_types::{and, component, field, value};

    fn age(n: i64) -> Node {
        field("age").unwrap().gte(value("Int", n))
    }

    fn composite(slots: &[(&str, Option<Node>)]) -> Node {
        and(slots
            .iter()
            .map(|(id, cond)| component(Some(*id)).with_condition(cond.clone())))
    }

    #[test]
    fn identical_composites_no_diff() {
        let tree = composite(&[("a", Some(age(18)))]);
        assert!(diff_rendered(Some(&tree), Some(&tree.clone())).is_empty());
        assert!(diff_rendered(None, None).is_empty());
    }

    #[test]
    fn none_to_composite_adds_every_component() {
        let tree = composite(&[("a", Some(age(18))), ("b", None)]);
        let diff = diff_rendered(None, Some(&tree));
        assert_eq!(diff.added(), 2);
        assert_eq!(
            diff.changes[0],
            ComponentChange::Added {
                id: Some("a".into()),
                condition: Some(age(18)),
            }
        );
        assert_eq!(diff.changes[1].id(), Some("b"));
    }

    #[test]
    fn changed_literal_is_one_line_pair() {
        let old = composite(&[("age", Some(age(18))), ("other", None)]);
        let new = composite(&[("age", Some(age(21))), ("other", None)]);

        let diff = diff_rendered(Some(&old), Some(&new));
        assert_eq!(diff.changed(), 1);
        assert_eq!(diff.added() + diff.removed(), 0);
        let ComponentChange::Changed { id, lines } = &diff.changes[0] else {
            panic!("expected a change");
        };
        assert_eq!(id.as_deref(), Some("age"));
        assert!(lines.contains(&DiffLine::Removed("  value Int 18".into())));
        assert!(lines.contains(&DiffLine::Added("  value Int 21".into())));
        assert!(lines.contains(&DiffLine::Context("  field age".into())));
    }

    #[test]
    fn cleared_component_is_a_change() {
        let old = composite(&[("age", Some(age(18)))]);
        let new = composite(&[("age", None)]);
        let diff = diff_rendered(Some(&old), Some(&new));
        let ComponentChange::Changed { lines, .. } = &diff.changes[0] else {
            panic!("expected a change");
        };
        assert!(lines.contains(&DiffLine::Added("(no constraint)".into())));
    }

    #[test]
    fn vacuous_to_none_is_not_a_change() {
        let old = composite(&[("a", Some(and([component(None)])))]);
        let new = composite(&[("a", None)]);
        assert!(diff_rendered(Some(&old), Some(&new)).is_empty());
    }

    #[test]
    fn removed_components_come_last() {
        let old = composite(&[("a", None), ("b", Some(age(1)))]);
        let new = composite(&[("c", None)]);
        let diff = diff_rendered(Some(&old), Some(&new));
        let ids: Vec<_> = diff.changes.iter().map(ComponentChange::id).collect();
        assert_eq!(ids, vec![Some("c"), Some("a"), Some("b")]);
        assert_eq!(diff.removed(), 2);
    }

    #[test]
    fn plain_root_is_an_anonymous_component() {
        let diff = diff_rendered(Some(&age(1)), Some(&age(2)));
        assert_eq!(diff.changed(), 1);
        assert_eq!(diff.changes[0].id(), None);
    }
}
