//! Folding one component's condition into the composite.
//!
//! A composite is an `and` (or `or`) whose operands are component markers,
//! one per widget. Merging a widget's new condition either replaces its
//! marker in place, appends a marker for an id not seen before, or, when the
//! condition is unchanged, hands back the caller's own `Arc`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use sieve_compare::{
    simplify_condition, ConditionComparator, RepresentationalEquality, ScalarEquality,
};
use sieve_types::{and, ComponentMarker, Condition, Node};

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};

/// What a merge did to the composite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeAction {
    /// No composite existed; a new one was created.
    Created,
    /// The component's condition was equal to the stored one.
    Unchanged,
    /// The component's marker was replaced in place.
    Replaced,
    /// The component was new and its marker was appended.
    Appended,
}

impl MergeAction {
    /// Lower-case name, as logged and reported.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Unchanged => "unchanged",
            Self::Replaced => "replaced",
            Self::Appended => "appended",
        }
    }

    /// Returns `true` if the merge produced a new composite.
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for MergeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a merge: the composite to use from now on, and how it was
/// obtained.
#[derive(Clone, Debug)]
pub struct Merged {
    pub composite: Arc<Node>,
    pub action: MergeAction,
}

/// Merges component conditions into composites.
///
/// Conditions are compared with the configured [`ScalarEquality`], so a
/// registry with semantic date or decimal equality suppresses updates that
/// only change a literal's spelling.
#[derive(Clone)]
pub struct CompositeMerger {
    scalars: Arc<dyn ScalarEquality>,
    config: MergeConfig,
}

impl CompositeMerger {
    /// A merger comparing literals representationally.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            scalars: Arc::new(RepresentationalEquality),
            config,
        }
    }

    /// Use `scalars` to compare literals.
    pub fn with_scalars(mut self, scalars: Arc<dyn ScalarEquality>) -> Self {
        self.scalars = scalars;
        self
    }

    /// The configuration this merger was built with.
    pub fn config(&self) -> MergeConfig {
        self.config
    }

    /// Merge and return the resulting composite.
    pub fn merge(
        &self,
        composite: Option<&Arc<Node>>,
        component_condition: Option<Node>,
        component_id: Option<&str>,
    ) -> MergeResult<Arc<Node>> {
        self.merge_detailed(composite, component_condition, component_id)
            .map(|merged| merged.composite)
    }

    /// Merge and also report which [`MergeAction`] was taken.
    ///
    /// The input composite is never modified. On [`MergeAction::Unchanged`]
    /// the returned composite is a clone of the input `Arc`.
    pub fn merge_detailed(
        &self,
        composite: Option<&Arc<Node>>,
        component_condition: Option<Node>,
        component_id: Option<&str>,
    ) -> MergeResult<Merged> {
        let new_marker = ComponentMarker::new(component_id.map(str::to_owned))
            .with_condition(component_condition);

        let Some(composite) = composite else {
            let created = Arc::new(and([new_marker]));
            debug!(
                component = ?component_id,
                outcome = "created",
                operands = 1,
                "merged component condition"
            );
            return Ok(Merged {
                composite: created,
                action: MergeAction::Created,
            });
        };

        let root = match &**composite {
            Node::Condition(root) if root.is_logical() => root,
            other => {
                let reason = format!("root must be a logical condition, found {}", describe(other));
                warn!(component = ?component_id, %reason, "rejected composite");
                return Err(MergeError::invalid_structure(reason));
            }
        };

        let mut operands = Vec::with_capacity(root.operands().len() + 1);
        let mut pending = Some(new_marker);

        for (index, operand) in root.operands().iter().enumerate() {
            let Node::Component(existing) = operand else {
                let reason = format!(
                    "operand {index} of '{}' must be a component, found {}",
                    root.name(),
                    describe(operand)
                );
                warn!(component = ?component_id, %reason, "rejected composite");
                return Err(MergeError::invalid_structure(reason));
            };

            let replacement = if existing.has_id(component_id) {
                pending.take()
            } else {
                None
            };
            match replacement {
                Some(marker) => {
                    if self.config.compare_update && self.same_condition(existing, &marker) {
                        debug!(
                            component = ?component_id,
                            outcome = "unchanged",
                            operands = root.operands().len(),
                            "merged component condition"
                        );
                        return Ok(Merged {
                            composite: Arc::clone(composite),
                            action: MergeAction::Unchanged,
                        });
                    }
                    operands.push(Node::Component(marker));
                }
                None => operands.push(operand.clone()),
            }
        }

        let action = match pending {
            Some(marker) => {
                operands.push(Node::Component(marker));
                MergeAction::Appended
            }
            None => MergeAction::Replaced,
        };

        let count = operands.len();
        let rebuilt = Condition::new(root.operator(), operands)?;
        debug!(
            component = ?component_id,
            outcome = %action,
            operands = count,
            "merged component condition"
        );
        Ok(Merged {
            composite: Arc::new(rebuilt.into()),
            action,
        })
    }

    fn same_condition(&self, existing: &ComponentMarker, updated: &ComponentMarker) -> bool {
        ConditionComparator::new(&*self.scalars)
            .treat_empty_as_equal(true)
            .equal(
                simplify_condition(existing.condition()),
                simplify_condition(updated.condition()),
            )
    }
}

impl Default for CompositeMerger {
    fn default() -> Self {
        Self::new(MergeConfig::default())
    }
}

impl fmt::Debug for CompositeMerger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeMerger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fold `component_condition` into `composite` under `component_id`.
///
/// Compares literals representationally; use [`CompositeMerger`] to plug in
/// per-type equality.
pub fn update_component_condition(
    composite: Option<&Arc<Node>>,
    component_condition: Option<Node>,
    component_id: Option<&str>,
    compare_update: bool,
) -> MergeResult<Arc<Node>> {
    CompositeMerger::new(MergeConfig { compare_update }).merge(
        composite,
        component_condition,
        component_id,
    )
}

fn describe(node: &Node) -> String {
    match node {
        Node::Condition(c) => format!("'{}' condition", c.name()),
        other => other.kind_name().to_string(),
    }
}
