//! Structural comparison of filter trees.
//!
//! Equality is syntactic: operand order matters, and `Values` lists compare
//! element by element rather than as sets. Scalar literals are compared
//! through a [`ScalarEquality`] so that types such as dates or decimals can
//! use semantic rather than representational equality.

use sieve_types::{Node, Scalar, ScalarType};

use crate::simplify::is_vacuous;

/// Per-scalar-type equality used when comparing `Value` / `Values` leaves.
pub trait ScalarEquality: Send + Sync {
    /// Compare two literals that both belong to `scalar_type`.
    fn scalar_eq(&self, scalar_type: &ScalarType, a: &Scalar, b: &Scalar) -> bool;
}

/// Plain `==` on the literal representation, for every scalar type.
#[derive(Clone, Copy, Debug, Default)]
pub struct RepresentationalEquality;

impl ScalarEquality for RepresentationalEquality {
    fn scalar_eq(&self, _scalar_type: &ScalarType, a: &Scalar, b: &Scalar) -> bool {
        a == b
    }
}

/// Deep equality over two optional trees.
#[derive(Clone, Copy)]
pub struct ConditionComparator<'a> {
    scalars: &'a dyn ScalarEquality,
    treat_empty_as_equal: bool,
}

impl<'a> ConditionComparator<'a> {
    /// A strict comparator: `None` only equals `None`.
    pub fn new(scalars: &'a dyn ScalarEquality) -> Self {
        Self {
            scalars,
            treat_empty_as_equal: false,
        }
    }

    /// When set, `None` also equals any tree that simplifies to `None`.
    pub fn treat_empty_as_equal(mut self, treat_empty_as_equal: bool) -> Self {
        self.treat_empty_as_equal = treat_empty_as_equal;
        self
    }

    pub fn equal(&self, a: Option<&Node>, b: Option<&Node>) -> bool {
        match (a, b) {
            (None, None) => true,
            (None, Some(node)) | (Some(node), None) => {
                self.treat_empty_as_equal && is_vacuous(Some(node))
            }
            (Some(a), Some(b)) => self.nodes_equal(a, b),
        }
    }

    fn nodes_equal(&self, a: &Node, b: &Node) -> bool {
        match (a, b) {
            (Node::Field(x), Node::Field(y)) => x.name() == y.name(),
            (Node::Value(x), Node::Value(y)) => {
                x.scalar_type == y.scalar_type
                    && self.scalars.scalar_eq(&x.scalar_type, &x.value, &y.value)
            }
            (Node::Values(x), Node::Values(y)) => {
                x.scalar_type == y.scalar_type
                    && x.values.len() == y.values.len()
                    && x
                        .values
                        .iter()
                        .zip(&y.values)
                        .all(|(p, q)| self.scalars.scalar_eq(&x.scalar_type, p, q))
            }
            (Node::Condition(x), Node::Condition(y)) => {
                x.operator() == y.operator()
                    && x.operands().len() == y.operands().len()
                    && x
                        .operands()
                        .iter()
                        .zip(y.operands())
                        .all(|(p, q)| self.nodes_equal(p, q))
            }
            (Node::Component(x), Node::Component(y)) => {
                x.id() == y.id() && self.equal(x.condition(), y.condition())
            }
            _ => false,
        }
    }
}

/// Compare two trees using representational scalar equality.
pub fn compare_conditions(a: Option<&Node>, b: Option<&Node>, treat_empty_as_equal: bool) -> bool {
    ConditionComparator::new(&RepresentationalEquality)
        .treat_empty_as_equal(treat_empty_as_equal)
        .equal(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_types::{and, component, field, not, or, value, value_named, values};

    fn adult() -> Node {
        field("age").unwrap().gte(value("Int", 18))
    }

    /// Treats every `CaseInsensitive` literal as a case-folded string.
    struct CaseInsensitive;

    impl ScalarEquality for CaseInsensitive {
        fn scalar_eq(&self, scalar_type: &ScalarType, a: &Scalar, b: &Scalar) -> bool {
            match (scalar_type.as_str(), a.as_str(), b.as_str()) {
                ("Text", Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                _ => a == b,
            }
        }
    }

    #[test]
    fn none_equals_none() {
        assert!(compare_conditions(None, None, false));
        assert!(compare_conditions(None, None, true));
    }

    #[test]
    fn none_vs_real_condition() {
        let node = adult();
        assert!(!compare_conditions(None, Some(&node), false));
        assert!(!compare_conditions(Some(&node), None, true));
    }

    #[test]
    fn none_vs_vacuous_only_when_flag_set() {
        let empty = and([component(None), component(None)]);
        assert!(compare_conditions(Some(&empty), None, true));
        assert!(compare_conditions(None, Some(&empty), true));
        assert!(!compare_conditions(Some(&empty), None, false));
    }

    #[test]
    fn independently_built_trees_are_equal() {
        assert!(compare_conditions(Some(&adult()), Some(&adult()), false));
    }

    #[test]
    fn operand_order_matters() {
        let a = and([adult(), field("x").unwrap().is_null()]);
        let b = and([field("x").unwrap().is_null(), adult()]);
        assert!(!compare_conditions(Some(&a), Some(&b), false));
    }

    #[test]
    fn operator_and_operand_count_matter() {
        let a = and([adult()]);
        let b = or([adult()]);
        let c = and([adult(), adult()]);
        assert!(!compare_conditions(Some(&a), Some(&b), false));
        assert!(!compare_conditions(Some(&a), Some(&c), false));
    }

    #[test]
    fn values_are_order_sensitive() {
        let a = values("String", ["a", "b"]);
        let b = values("String", ["b", "a"]);
        assert!(!compare_conditions(Some(&a), Some(&b), false));
        assert!(compare_conditions(Some(&a), Some(&a.clone()), false));
    }

    #[test]
    fn values_length_and_type_matter() {
        let a = values("String", ["a"]);
        let b = values("String", ["a", "a"]);
        let c = values("Text", ["a"]);
        assert!(!compare_conditions(Some(&a), Some(&b), false));
        assert!(!compare_conditions(Some(&a), Some(&c), false));
    }

    #[test]
    fn value_scalar_type_matters() {
        let a = value("Int", 1);
        let b = value("Long", 1);
        assert!(!compare_conditions(Some(&a), Some(&b), false));
    }

    #[test]
    fn value_diagnostic_name_ignored() {
        let a = value("Int", 1);
        let b = value_named("Int", 1, "age");
        assert!(compare_conditions(Some(&a), Some(&b), false));
    }

    #[test]
    fn kind_mismatch_is_unequal() {
        let a: Node = field("x").unwrap().into();
        let b = value("String", "x");
        assert!(!compare_conditions(Some(&a), Some(&b), false));
        let c: Node = component(Some("x")).into();
        assert!(!compare_conditions(Some(&a), Some(&c), true));
    }

    #[test]
    fn components_compare_id_and_condition() {
        let a: Node = component(Some("w")).with_condition(Some(adult())).into();
        let b: Node = component(Some("w")).with_condition(Some(adult())).into();
        let c: Node = component(Some("v")).with_condition(Some(adult())).into();
        let d: Node = component(Some("w")).into();
        assert!(compare_conditions(Some(&a), Some(&b), false));
        assert!(!compare_conditions(Some(&a), Some(&c), false));
        assert!(!compare_conditions(Some(&a), Some(&d), true));
    }

    #[test]
    fn component_condition_uses_flag_recursively() {
        let vacuous = and([component(None)]);
        let a: Node = component(Some("w")).with_condition(Some(vacuous)).into();
        let b: Node = component(Some("w")).into();
        assert!(compare_conditions(Some(&a), Some(&b), true));
        assert!(!compare_conditions(Some(&a), Some(&b), false));
    }

    #[test]
    fn pluggable_scalar_equality() {
        let a = not(field("name").unwrap().equals(value("Text", "Alice")));
        let b = not(field("name").unwrap().equals(value("Text", "ALICE")));
        assert!(!compare_conditions(Some(&a), Some(&b), false));
        assert!(ConditionComparator::new(&CaseInsensitive).equal(Some(&a), Some(&b)));

        let la = values("Text", ["x", "Y"]);
        let lb = values("Text", ["X", "y"]);
        assert!(ConditionComparator::new(&CaseInsensitive).equal(Some(&la), Some(&lb)));
    }
}
