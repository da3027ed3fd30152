use std::sync::{Arc, RwLock};

use sieve_types::{find_component_node, Node};

use crate::engine::{CompositeMerger, MergeAction};
use crate::error::MergeResult;

/// The outcome of [`CompositeFilter::update`].
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    pub action: MergeAction,
    /// `false` when the update was suppressed as unchanged.
    pub changed: bool,
    /// Revision after the update.
    pub revision: u64,
    pub composite: Arc<Node>,
}

#[derive(Default)]
struct FilterState {
    composite: Option<Arc<Node>>,
    revision: u64,
}

/// The composite filter of one view, shared by all of its widgets.
///
/// Updates hold the write lock across read, merge and store, so concurrent
/// widgets never merge against a stale snapshot. Readers get the current
/// `Arc` and never block a merge for longer than a clone.
pub struct CompositeFilter {
    merger: CompositeMerger,
    state: RwLock<FilterState>,
}

impl CompositeFilter {
    /// An empty filter at revision 0.
    pub fn new(merger: CompositeMerger) -> Self {
        Self {
            merger,
            state: RwLock::new(FilterState::default()),
        }
    }

    /// Merge `condition` as the current condition of `component_id`.
    ///
    /// The revision advances only when the composite changes.
    pub fn update(
        &self,
        component_id: Option<&str>,
        condition: Option<Node>,
    ) -> MergeResult<MergeOutcome> {
        let mut state = self.state.write().expect("lock poisoned");
        let merged = self
            .merger
            .merge_detailed(state.composite.as_ref(), condition, component_id)?;

        let changed = merged.action.is_change();
        if changed {
            state.revision += 1;
            state.composite = Some(Arc::clone(&merged.composite));
        }

        Ok(MergeOutcome {
            action: merged.action,
            changed,
            revision: state.revision,
            composite: merged.composite,
        })
    }

    /// The current composite, or `None` before the first update.
    pub fn snapshot(&self) -> Option<Arc<Node>> {
        self.state.read().expect("lock poisoned").composite.clone()
    }

    /// Counts changes to the composite, resets included.
    pub fn revision(&self) -> u64 {
        self.state.read().expect("lock poisoned").revision
    }

    /// The condition currently stored for `component_id`.
    pub fn component_condition(&self, component_id: Option<&str>) -> Option<Node> {
        let state = self.state.read().expect("lock poisoned");
        find_component_node(state.composite.as_deref(), component_id)
            .and_then(|marker| marker.condition())
            .cloned()
    }

    /// Drop the composite. Returns the composite that was dropped, if any;
    /// the revision advances only in that case.
    pub fn reset(&self) -> Option<Arc<Node>> {
        let mut state = self.state.write().expect("lock poisoned");
        let previous = state.composite.take();
        if previous.is_some() {
            state.revision += 1;
        }
        previous
    }

    pub fn merger(&self) -> &CompositeMerger {
        &self.merger
    }
}

impl Default for CompositeFilter {
    fn default() -> Self {
        Self::new(CompositeMerger::default())
    }
}

impl std::fmt::Debug for CompositeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("lock poisoned");
        f.debug_struct("CompositeFilter")
            .field("revision", &state.revision)
            .field("composite", &state.composite.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeConfig;
    use sieve_types::{and, component, field, value};
    use std::thread;

    fn age_gte(n: i64) -> Node {
        field("age").unwrap().gte(value("Int", n))
    }

    #[test]
    fn starts_empty() {
        let filter = CompositeFilter::default();
        assert!(filter.snapshot().is_none());
        assert_eq!(filter.revision(), 0);
        assert!(filter.component_condition(Some("a")).is_none());
    }

    #[test]
    fn update_creates_and_bumps_revision() {
        let filter = CompositeFilter::default();
        let outcome = filter.update(Some("age"), Some(age_gte(18))).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.action, MergeAction::Created);
        assert_eq!(outcome.revision, 1);
        assert!(Arc::ptr_eq(&outcome.composite, &filter.snapshot().unwrap()));
    }

    #[test]
    fn unchanged_update_keeps_revision_and_handle() {
        let filter = CompositeFilter::default();
        let first = filter.update(Some("age"), Some(age_gte(18))).unwrap();
        let second = filter.update(Some("age"), Some(age_gte(18))).unwrap();
        assert!(!second.changed);
        assert_eq!(second.revision, 1);
        assert!(Arc::ptr_eq(&first.composite, &second.composite));
    }

    #[test]
    fn always_replace_counts_every_update() {
        let filter = CompositeFilter::new(CompositeMerger::new(MergeConfig::always_replace()));
        filter.update(Some("age"), Some(age_gte(18))).unwrap();
        let second = filter.update(Some("age"), Some(age_gte(18))).unwrap();
        assert!(second.changed);
        assert_eq!(second.action, MergeAction::Replaced);
        assert_eq!(filter.revision(), 2);
    }

    #[test]
    fn component_condition_reads_back() {
        let filter = CompositeFilter::default();
        filter.update(Some("age"), Some(age_gte(18))).unwrap();
        filter.update(Some("name"), None).unwrap();
        assert_eq!(filter.component_condition(Some("age")), Some(age_gte(18)));
        assert_eq!(filter.component_condition(Some("name")), None);
        assert_eq!(filter.component_condition(Some("missing")), None);
    }

    #[test]
    fn reset_drops_composite() {
        let filter = CompositeFilter::default();
        filter.update(Some("age"), Some(age_gte(18))).unwrap();
        assert!(filter.reset().is_some());
        assert!(filter.snapshot().is_none());
        assert_eq!(filter.revision(), 2);

        assert!(filter.reset().is_none());
        assert_eq!(filter.revision(), 2);

        let outcome = filter.update(Some("age"), None).unwrap();
        assert_eq!(outcome.action, MergeAction::Created);
        assert_eq!(*outcome.composite, and([component(Some("age"))]));
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let filter = Arc::new(CompositeFilter::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    let id = format!("w{i}");
                    filter.update(Some(id.as_str()), Some(age_gte(i))).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let composite = filter.snapshot().unwrap();
        assert_eq!(composite.as_condition().unwrap().operands().len(), 8);
        assert_eq!(filter.revision(), 8);
        for i in 0..8 {
            let id = format!("w{i}");
            assert_eq!(filter.component_condition(Some(id.as_str())), Some(age_gte(i)));
        }
    }
}
