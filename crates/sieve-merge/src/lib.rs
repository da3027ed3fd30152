//! Composite merge engine for Sieve.
//!
//! Each widget of a view contributes one predicate, wrapped in a component
//! marker under a shared `and` root. [`update_component_condition`] folds a
//! widget's new predicate into that composite; an update equal to the stored
//! one returns the caller's own `Arc`, so `Arc::ptr_eq` tells a consumer
//! whether it needs to re-query.
//!
//! [`CompositeFilter`] wraps the engine for callers that share one composite
//! across threads.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;

pub use config::MergeConfig;
pub use engine::{update_component_condition, CompositeMerger, MergeAction, Merged};
pub use error::{MergeError, MergeResult};
pub use state::{CompositeFilter, MergeOutcome};
