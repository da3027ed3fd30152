//! The expression tree: a closed set of node kinds.
//!
//! Nodes are immutable once built. Conditions and fields can only be built
//! through validating constructors, and deserialization re-runs the same
//! validation, so a `Node` in hand always satisfies the operator arity table.

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::error::{NodeError, NodeResult};
use crate::operator::Operator;

/// Payload of a scalar literal. Interpreted by the scalar type named alongside it.
pub type Scalar = serde_json::Value;

// ---------------------------------------------------------------------------
// ScalarType
// ---------------------------------------------------------------------------

/// Name of a scalar type from the caller's type system (e.g. `"Int"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScalarType(String);

impl ScalarType {
    /// A scalar type by name; names are not validated until encoding.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name, e.g. `Int`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScalarType {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ScalarType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Any node of a filter expression tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Node {
    /// Reference to a (dotted) field path of the queried record.
    Field(FieldRef),
    /// A single typed scalar literal.
    Value(ValueLeaf),
    /// A typed literal list, used by set-membership operators.
    Values(ValuesLeaf),
    /// An operator application.
    Condition(Condition),
    /// The predicate contributed by one widget.
    Component(ComponentMarker),
}

impl Node {
    /// Lower-case name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Field(_) => "field",
            Node::Value(_) => "value",
            Node::Values(_) => "values",
            Node::Condition(_) => "condition",
            Node::Component(_) => "component",
        }
    }

    /// The condition, if this node is one.
    pub fn as_condition(&self) -> Option<&Condition> {
        match self {
            Node::Condition(c) => Some(c),
            _ => None,
        }
    }

    /// The component marker, if this node is one.
    pub fn as_component(&self) -> Option<&ComponentMarker> {
        match self {
            Node::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `true` if this is an `and` / `or` condition.
    pub fn is_logical(&self) -> bool {
        self.as_condition().is_some_and(Condition::is_logical)
    }

    /// Multi-line indented rendering, one node per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        // Writing into a String cannot fail.
        let _ = match self {
            Node::Field(f) => writeln!(out, "{indent}field {}", f.name),
            Node::Value(v) => writeln!(out, "{indent}value {} {}", v.scalar_type, v.value),
            Node::Values(v) => writeln!(
                out,
                "{indent}values {} [{}]",
                v.scalar_type,
                join_scalars(&v.values)
            ),
            Node::Condition(c) => {
                let _ = writeln!(out, "{indent}{}", c.operator);
                for operand in &c.operands {
                    operand.write_pretty(out, depth + 1);
                }
                Ok(())
            }
            Node::Component(m) => {
                let _ = writeln!(out, "{indent}component {}", DisplayId(m.id()));
                match m.condition() {
                    Some(condition) => condition.write_pretty(out, depth + 1),
                    None => {
                        let _ = writeln!(out, "{indent}  (empty)");
                    }
                }
                Ok(())
            }
        };
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Field(n) => n.fmt(f),
            Node::Value(n) => n.fmt(f),
            Node::Values(n) => n.fmt(f),
            Node::Condition(n) => n.fmt(f),
            Node::Component(n) => n.fmt(f),
        }
    }
}

fn join_scalars(values: &[Scalar]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

struct DisplayId<'a>(Option<&'a str>);

impl fmt::Display for DisplayId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{id:?}"),
            None => f.write_str("null"),
        }
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A reference into the queried record, e.g. `owner.name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawField")]
pub struct FieldRef {
    name: String,
}

impl FieldRef {
    /// Create a field reference. The name must be non-empty.
    pub fn new(name: impl Into<String>) -> NodeResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(NodeError::EmptyFieldName);
        }
        Ok(Self { name })
    }

    /// The full dotted field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The path segments of a dotted name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }
}

#[derive(Deserialize)]
struct RawField {
    name: String,
}

impl TryFrom<RawField> for FieldRef {
    type Error = NodeError;

    fn try_from(raw: RawField) -> Result<Self, Self::Error> {
        FieldRef::new(raw.name)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field({})", self.name)
    }
}

impl From<FieldRef> for Node {
    fn from(field: FieldRef) -> Self {
        Node::Field(field)
    }
}

// ---------------------------------------------------------------------------
// Value / Values
// ---------------------------------------------------------------------------

/// A single typed scalar literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueLeaf {
    pub scalar_type: ScalarType,
    pub value: Scalar,
    /// Originating field, kept for diagnostics only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Display for ValueLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value({}, {})", self.scalar_type, self.value)
    }
}

impl From<ValueLeaf> for Node {
    fn from(leaf: ValueLeaf) -> Self {
        Node::Value(leaf)
    }
}

/// A typed literal list. Order is preserved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesLeaf {
    pub scalar_type: ScalarType,
    #[serde(default)]
    pub values: Vec<Scalar>,
}

impl ValuesLeaf {
    /// Returns `true` if the list has no literals.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of literals in the list.
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Display for ValuesLeaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "values({}, [{}])", self.scalar_type, join_scalars(&self.values))
    }
}

impl From<ValuesLeaf> for Node {
    fn from(leaf: ValuesLeaf) -> Self {
        Node::Values(leaf)
    }
}

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// An operator applied to an ordered list of operands.
///
/// The operand count always satisfies the operator's arity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCondition")]
pub struct Condition {
    #[serde(rename = "name")]
    operator: Operator,
    operands: Vec<Node>,
}

impl Condition {
    /// Build a condition, checking the operand count against the operator.
    pub fn new(operator: Operator, operands: Vec<Node>) -> NodeResult<Self> {
        operator.check_arity(operands.len())?;
        Ok(Self { operator, operands })
    }

    /// Build a logical condition. Logical operators accept any operand count.
    pub(crate) fn logical(operator: Operator, operands: Vec<Node>) -> Self {
        debug_assert!(operator.is_logical());
        Self { operator, operands }
    }

    /// Build from a known-good operand list (arity fixed by the caller's signature).
    pub(crate) fn fixed(operator: Operator, operands: Vec<Node>) -> Self {
        debug_assert!(operator.check_arity(operands.len()).is_ok());
        Self { operator, operands }
    }

    /// The operator applied to the operands.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The operator's wire name, e.g. `gte`.
    pub fn name(&self) -> &'static str {
        self.operator.as_str()
    }

    /// Operands in order.
    pub fn operands(&self) -> &[Node] {
        &self.operands
    }

    pub fn into_operands(self) -> Vec<Node> {
        self.operands
    }

    pub fn is_logical(&self) -> bool {
        self.operator.is_logical()
    }
}

#[derive(Deserialize)]
struct RawCondition {
    name: Operator,
    #[serde(default)]
    operands: Vec<Node>,
}

impl TryFrom<RawCondition> for Condition {
    type Error = NodeError;

    fn try_from(raw: RawCondition) -> Result<Self, Self::Error> {
        Condition::new(raw.name, raw.operands)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator)?;
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            operand.fmt(f)?;
        }
        f.write_str(")")
    }
}

impl From<Condition> for Node {
    fn from(condition: Condition) -> Self {
        Node::Condition(condition)
    }
}

// ---------------------------------------------------------------------------
// ComponentMarker
// ---------------------------------------------------------------------------

/// Wraps the predicate contributed by one widget.
///
/// `id` is the widget's stable identity (`None` for an anonymous slot);
/// a `None` condition means the widget currently imposes no constraint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentMarker {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    condition: Option<Box<Node>>,
}

impl ComponentMarker {
    /// An empty marker for the given widget id.
    pub fn new(id: Option<String>) -> Self {
        Self {
            id,
            condition: None,
        }
    }

    /// An empty marker for a named widget.
    pub fn named(id: impl Into<String>) -> Self {
        Self::new(Some(id.into()))
    }

    /// An empty, unaddressed placeholder slot.
    pub fn anonymous() -> Self {
        Self::new(None)
    }

    /// The same marker carrying `condition`.
    pub fn with_condition(self, condition: Option<Node>) -> Self {
        Self {
            id: self.id,
            condition: condition.map(Box::new),
        }
    }

    /// The widget id; `None` for a placeholder.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The widget's condition; `None` when the widget imposes none.
    pub fn condition(&self) -> Option<&Node> {
        self.condition.as_deref()
    }

    /// Returns `true` for an anonymous marker (no id).
    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    /// Returns `true` if this marker's id equals `id`.
    pub fn has_id(&self, id: Option<&str>) -> bool {
        self.id() == id
    }
}

impl fmt::Display for ComponentMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component({}, ", DisplayId(self.id()))?;
        match self.condition() {
            Some(condition) => condition.fmt(f)?,
            None => f.write_str("null")?,
        }
        f.write_str(")")
    }
}

impl From<ComponentMarker> for Node {
    fn from(marker: ComponentMarker) -> Self {
        Node::Component(marker)
    }
}
