//! Foundation types for Sieve.
//!
//! Widgets each contribute a filter predicate over a shared dataset; Sieve
//! combines them into one boolean expression tree for a backend query layer.
//! This crate holds the tree itself and the builder API used to make it.
//!
//! # Key Types
//!
//! - [`Node`]: closed union of Field, Value, Values, Condition, Component
//! - [`Condition`]: operator application, arity-checked at construction
//! - [`ComponentMarker`]: one widget's predicate, tagged with the widget id
//! - [`Operator`] / [`Arity`]: the operator table
//! - [`ConditionBuilder`]: two-phase condition construction

pub mod builder;
pub mod error;
pub mod node;
pub mod operator;

pub use builder::{
    and, component, condition, field, find_component_node, is_logical_condition, not, or, value,
    value_named, values, ConditionBuilder,
};
pub use error::{NodeError, NodeResult};
pub use node::{
    ComponentMarker, Condition, FieldRef, Node, Scalar, ScalarType, ValueLeaf, ValuesLeaf,
};
pub use operator::{get_condition_arg_count, Arity, Operator};
