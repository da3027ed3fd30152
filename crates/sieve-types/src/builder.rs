//! Builder API: the only way widgets construct filter nodes.
//!
//! ```
//! use sieve_types::builder::{and, field, not, value};
//!
//! let adult = field("age")?.gte(value("Int", 18));
//! let named = field("owner.name")?.is_not_null();
//! let filter = and([adult, not(named)]);
//! assert_eq!(
//!     filter.to_string(),
//!     "and(gte(field(age), value(Int, 18)), not(isNotNull(field(owner.name))))"
//! );
//! # Ok::<(), sieve_types::NodeError>(())
//! ```

use crate::error::NodeResult;
use crate::node::{
    ComponentMarker, Condition, FieldRef, Node, Scalar, ScalarType, ValueLeaf, ValuesLeaf,
};
use crate::operator::Operator;

/// A field reference. The name must be non-empty.
pub fn field(name: impl Into<String>) -> NodeResult<FieldRef> {
    FieldRef::new(name)
}

/// A single typed scalar literal.
pub fn value(scalar_type: impl Into<ScalarType>, value: impl Into<Scalar>) -> Node {
    Node::Value(ValueLeaf {
        scalar_type: scalar_type.into(),
        value: value.into(),
        name: None,
    })
}

/// A typed scalar literal that remembers the field it was taken from.
pub fn value_named(
    scalar_type: impl Into<ScalarType>,
    value: impl Into<Scalar>,
    name: impl Into<String>,
) -> Node {
    Node::Value(ValueLeaf {
        scalar_type: scalar_type.into(),
        value: value.into(),
        name: Some(name.into()),
    })
}

/// A typed literal list. An empty list is legal.
pub fn values<I, V>(scalar_type: impl Into<ScalarType>, values: I) -> Node
where
    I: IntoIterator<Item = V>,
    V: Into<Scalar>,
{
    Node::Values(ValuesLeaf {
        scalar_type: scalar_type.into(),
        values: values.into_iter().map(Into::into).collect(),
    })
}

/// Start a condition by operator name; operands are added to the builder.
pub fn condition(name: &str) -> NodeResult<ConditionBuilder> {
    Ok(ConditionBuilder::new(name.parse()?))
}

/// An empty component marker. Attach the widget's predicate with
/// [`ComponentMarker::with_condition`].
pub fn component(id: Option<&str>) -> ComponentMarker {
    ComponentMarker::new(id.map(str::to_string))
}

pub fn not(operand: impl Into<Node>) -> Node {
    Node::Condition(Condition::fixed(Operator::Not, vec![operand.into()]))
}

pub fn and<I, N>(operands: I) -> Node
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    logical(Operator::And, operands)
}

pub fn or<I, N>(operands: I) -> Node
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    logical(Operator::Or, operands)
}

fn logical<I, N>(operator: Operator, operands: I) -> Node
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    Node::Condition(Condition::logical(
        operator,
        operands.into_iter().map(Into::into).collect(),
    ))
}

/// Returns `true` iff `node` is a condition named `and` or `or`.
pub fn is_logical_condition(node: &Node) -> bool {
    node.is_logical()
}

/// Find the component marker with `id` among the direct operands of a
/// composite root. Returns `None` when there is no root, the root is not a
/// condition, or no marker carries that id.
pub fn find_component_node<'a>(
    root: Option<&'a Node>,
    id: Option<&str>,
) -> Option<&'a ComponentMarker> {
    root?
        .as_condition()?
        .operands()
        .iter()
        .filter_map(Node::as_component)
        .find(|marker| marker.has_id(id))
}

// ---------------------------------------------------------------------------
// ConditionBuilder
// ---------------------------------------------------------------------------

/// Two-phase condition construction: the operator is fixed up front,
/// operands are collected, and [`build`](Self::build) validates the arity.
#[derive(Clone, Debug)]
pub struct ConditionBuilder {
    operator: Operator,
    operands: Vec<Node>,
}

impl ConditionBuilder {
    pub fn new(operator: Operator) -> Self {
        Self {
            operator,
            operands: Vec::new(),
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Append one operand.
    pub fn operand(mut self, operand: impl Into<Node>) -> Self {
        self.operands.push(operand.into());
        self
    }

    /// Append several operands.
    pub fn operands<I, N>(mut self, operands: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.operands.extend(operands.into_iter().map(Into::into));
        self
    }

    /// Append one operand in place.
    pub fn push(&mut self, operand: impl Into<Node>) {
        self.operands.push(operand.into());
    }

    pub fn len(&self) -> usize {
        self.operands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.is_empty()
    }

    pub fn build_condition(self) -> NodeResult<Condition> {
        Condition::new(self.operator, self.operands)
    }

    pub fn build(self) -> NodeResult<Node> {
        self.build_condition().map(Node::Condition)
    }
}

// ---------------------------------------------------------------------------
// Fluent comparisons on fields
// ---------------------------------------------------------------------------

impl FieldRef {
    /// Apply an operator by name with this field as the first operand.
    ///
    /// The total operand count is validated against the operator table.
    pub fn apply<I, N>(self, name: &str, rest: I) -> NodeResult<Node>
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        condition(name)?.operand(self).operands(rest).build()
    }

    fn binary(self, operator: Operator, rhs: Node) -> Node {
        Node::Condition(Condition::fixed(operator, vec![self.into(), rhs]))
    }

    fn unary(self, operator: Operator) -> Node {
        Node::Condition(Condition::fixed(operator, vec![self.into()]))
    }

    pub fn equals(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Eq, rhs.into())
    }

    pub fn not_equals(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Ne, rhs.into())
    }

    pub fn gt(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Gt, rhs.into())
    }

    pub fn gte(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Gte, rhs.into())
    }

    pub fn lt(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Lt, rhs.into())
    }

    pub fn lte(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Lte, rhs.into())
    }

    pub fn contains(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::Contains, rhs.into())
    }

    pub fn starts_with(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::StartsWith, rhs.into())
    }

    pub fn ends_with(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::EndsWith, rhs.into())
    }

    /// Set membership; `rhs` is normally a `values(..)` list.
    pub fn in_values(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::In, rhs.into())
    }

    pub fn not_in(self, rhs: impl Into<Node>) -> Node {
        self.binary(Operator::NotIn, rhs.into())
    }

    /// Inclusive range check.
    pub fn between(self, low: impl Into<Node>, high: impl Into<Node>) -> Node {
        Node::Condition(Condition::fixed(
            Operator::Between,
            vec![self.into(), low.into(), high.into()],
        ))
    }

    pub fn is_null(self) -> Node {
        self.unary(Operator::IsNull)
    }

    pub fn is_not_null(self) -> Node {
        self.unary(Operator::IsNotNull)
    }
}
