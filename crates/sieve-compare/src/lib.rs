//! Structural comparison for Sieve filter trees.
//!
//! Decides whether two trees describe the same predicate, which is what lets
//! the merge engine suppress no-op updates.
//!
//! # Key Types
//!
//! - [`ConditionComparator`] / [`compare_conditions`] -- deep, order-sensitive equality
//! - [`ScalarEquality`] -- per-scalar-type literal equality seam
//! - [`simplify_condition`] -- canonical-empty simplification
//! - [`CompositeDiff`] / [`diff_rendered`] -- per-component diff of two composites

pub mod compare;
pub mod render_diff;
pub mod simplify;

pub use compare::{
    compare_conditions, ConditionComparator, RepresentationalEquality, ScalarEquality,
};
pub use render_diff::{diff_rendered, render, ComponentChange, CompositeDiff, DiffLine};
pub use simplify::{is_vacuous, simplify_condition};
