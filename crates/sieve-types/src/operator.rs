//! The operator table: every condition name the builder accepts, with its arity.
//!
//! Logical `and` / `or` take any number of operands. Every other operator has
//! a fixed operand count, checked whenever a condition is built.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};

/// Operand count accepted by an operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Any number of operands, including zero.
    Variadic,
    /// Exactly this many operands.
    Fixed(usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Variadic => write!(f, "variadic"),
            Arity::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// A condition operator, identified on the wire by its camelCase name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    Between,
    IsNull,
    IsNotNull,
}

impl Operator {
    /// Every operator, in table order.
    pub const ALL: [Operator; 17] = [
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Contains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// The operator's name as used in trees and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Between => "between",
            Operator::IsNull => "isNull",
            Operator::IsNotNull => "isNotNull",
        }
    }

    /// The operand count this operator accepts.
    pub fn arity(&self) -> Arity {
        match self {
            Operator::And | Operator::Or => Arity::Variadic,
            Operator::Not | Operator::IsNull | Operator::IsNotNull => Arity::Fixed(1),
            Operator::Between => Arity::Fixed(3),
            _ => Arity::Fixed(2),
        }
    }

    /// Returns `true` for `and` and `or`.
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// Check that `count` operands are acceptable for this operator.
    pub fn check_arity(&self, count: usize) -> NodeResult<()> {
        match self.arity() {
            Arity::Variadic => Ok(()),
            Arity::Fixed(expected) if expected == count => Ok(()),
            Arity::Fixed(expected) => Err(NodeError::invalid_operator(
                self.as_str(),
                format!("expected {expected} operand(s), got {count}"),
            )),
        }
    }
}

impl FromStr for Operator {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| NodeError::invalid_operator(s, "unknown operator"))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Required operand count for a non-logical operator, looked up by name.
///
/// Fails with [`NodeError::InvalidOperator`] for unknown names and for the
/// variadic logical operators, which have no fixed count.
///
/// ```
/// use sieve_types::get_condition_arg_count;
///
/// assert_eq!(get_condition_arg_count("gte").unwrap(), 2);
/// assert_eq!(get_condition_arg_count("between").unwrap(), 3);
/// assert!(get_condition_arg_count("and").is_err());
/// assert!(get_condition_arg_count("frobnicate").is_err());
/// ```
pub fn get_condition_arg_count(name: &str) -> NodeResult<usize> {
    let op: Operator = name.parse()?;
    match op.arity() {
        Arity::Fixed(n) => Ok(n),
        Arity::Variadic => Err(NodeError::invalid_operator(
            name,
            "logical operator has no fixed operand count",
        )),
    }
}
