//! Query document encoding.
//!
//! Renders a composite tree into the JSON document sent to the backend:
//!
//! | node       | document                                   |
//! |------------|--------------------------------------------|
//! | Field      | `{"field": "owner.name"}`                  |
//! | Value      | `{"type": "Int", "value": 18}`             |
//! | Values     | `{"type": "String", "values": ["a", "b"]}` |
//! | Condition  | `{"op": "gte", "args": [...]}`             |
//!
//! Component markers do not appear on the wire. A marker renders as its
//! condition, and an empty marker is dropped from its logical parent; a
//! logical condition left with no operands renders as nothing at all.

use serde_json::json;

use sieve_types::{Condition, Node, Scalar};

use crate::error::{WireError, WireResult};
use crate::registry::ScalarTypeRegistry;

/// Encodes trees using the codecs of a scalar type registry.
#[derive(Clone, Copy, Debug)]
pub struct QueryEncoder<'a> {
    registry: &'a ScalarTypeRegistry,
}

impl<'a> QueryEncoder<'a> {
    /// An encoder resolving scalar types through `registry`.
    pub fn new(registry: &'a ScalarTypeRegistry) -> Self {
        Self { registry }
    }

    /// Encode a tree. Returns `None` when the tree imposes no constraint.
    pub fn encode(&self, root: Option<&Node>) -> WireResult<Option<Scalar>> {
        match root {
            Some(node) => self.encode_node(node),
            None => Ok(None),
        }
    }

    /// Encode a tree to compact JSON text; no constraint encodes as `null`.
    pub fn encode_to_string(&self, root: Option<&Node>) -> WireResult<String> {
        let document = self.encode(root)?.unwrap_or(Scalar::Null);
        serde_json::to_string(&document).map_err(|e| WireError::Serialization(e.to_string()))
    }

    /// BLAKE3 digest (hex) of the encoded document, for caching query results.
    ///
    /// `None` when the tree imposes no constraint. Trees that encode to the
    /// same document share a key.
    pub fn cache_key(&self, root: Option<&Node>) -> WireResult<Option<String>> {
        let Some(document) = self.encode(root)? else {
            return Ok(None);
        };
        let bytes =
            serde_json::to_vec(&document).map_err(|e| WireError::Serialization(e.to_string()))?;
        Ok(Some(hex::encode(blake3::hash(&bytes).as_bytes())))
    }

    fn encode_node(&self, node: &Node) -> WireResult<Option<Scalar>> {
        let document = match node {
            Node::Field(f) => json!({ "field": f.name() }),
            Node::Value(v) => json!({
                "type": v.scalar_type.as_str(),
                "value": self.registry.to_wire(&v.scalar_type, &v.value)?,
            }),
            Node::Values(v) => {
                // Resolved up front so an empty list still needs a known type.
                let codec = self.registry.get(&v.scalar_type)?;
                let values = v
                    .values
                    .iter()
                    .map(|value| codec.to_wire(&v.scalar_type, value))
                    .collect::<WireResult<Vec<_>>>()?;
                json!({ "type": v.scalar_type.as_str(), "values": values })
            }
            Node::Component(m) => return self.encode(m.condition()),
            Node::Condition(c) => return self.encode_condition(c),
        };
        Ok(Some(document))
    }

    fn encode_condition(&self, condition: &Condition) -> WireResult<Option<Scalar>> {
        let mut args = Vec::with_capacity(condition.operands().len());
        for operand in condition.operands() {
            match self.encode_node(operand)? {
                Some(arg) => args.push(arg),
                None if condition.is_logical() => {}
                None => {
                    return Err(WireError::UnresolvedOperand {
                        operator: condition.name().to_string(),
                    })
                }
            }
        }
        if condition.is_logical() && args.is_empty() {
            return Ok(None);
        }
        Ok(Some(json!({ "op": condition.name(), "args": args })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sieve_types::{and, component, field, not, or, value, values};

    fn encoder_test<F: FnOnce(QueryEncoder<'_>)>(f: F) {
        let registry = ScalarTypeRegistry::with_builtins();
        f(QueryEncoder::new(&registry));
    }

    fn age_filter() -> Node {
        and([component(Some("ageFilter"))
            .with_condition(Some(field("age").unwrap().gte(value("Int", 18))))])
    }

    #[test]
    fn encodes_composite_transparently() {
        encoder_test(|enc| {
            let doc = enc.encode(Some(&age_filter())).unwrap().unwrap();
            assert_eq!(
                doc,
                json!({
                    "op": "and",
                    "args": [{
                        "op": "gte",
                        "args": [
                            { "field": "age" },
                            { "type": "Int", "value": 18 }
                        ]
                    }]
                })
            );
        });
    }

    #[test]
    fn none_encodes_to_nothing() {
        encoder_test(|enc| {
            assert!(enc.encode(None).unwrap().is_none());
            assert_eq!(enc.encode_to_string(None).unwrap(), "null");
            assert!(enc.cache_key(None).unwrap().is_none());
        });
    }

    #[test]
    fn empty_markers_are_dropped() {
        encoder_test(|enc| {
            let root = and([
                component(Some("a")),
                component(Some("b")).with_condition(Some(field("x").unwrap().is_null())),
            ]);
            let doc = enc.encode(Some(&root)).unwrap().unwrap();
            assert_eq!(doc["args"].as_array().unwrap().len(), 1);
        });
    }

    #[test]
    fn all_empty_composite_encodes_to_nothing() {
        encoder_test(|enc| {
            let root = and([component(Some("a")), component(Some("b"))]);
            assert!(enc.encode(Some(&root)).unwrap().is_none());

            let nested = or([and([component(None)])]);
            assert!(enc.encode(Some(&nested)).unwrap().is_none());
        });
    }

    #[test]
    fn empty_marker_under_not_is_unresolved() {
        encoder_test(|enc| {
            let root = not(component(Some("a")));
            let err = enc.encode(Some(&root)).unwrap_err();
            assert!(
                matches!(err, WireError::UnresolvedOperand { ref operator } if operator == "not")
            );
        });
    }

    #[test]
    fn values_are_converted_per_element() {
        encoder_test(|enc| {
            let node = field("id")
                .unwrap()
                .in_values(values("UUID", ["67E55044-10B1-426F-9247-BB680E5FE0C8"]));
            let doc = enc.encode(Some(&node)).unwrap().unwrap();
            assert_eq!(
                doc["args"][1],
                json!({ "type": "UUID", "values": ["67e55044-10b1-426f-9247-bb680e5fe0c8"] })
            );
        });
    }

    #[test]
    fn unregistered_scalar_type_fails() {
        encoder_test(|enc| {
            let node = field("price").unwrap().gt(value("Money", 5));
            let err = enc.encode(Some(&node)).unwrap_err();
            assert!(matches!(err, WireError::InvalidScalarType(ref t) if t == "Money"));
        });
    }

    #[test]
    fn empty_values_of_unregistered_type_fails() {
        encoder_test(|enc| {
            let node = field("price")
                .unwrap()
                .in_values(values("Money", Vec::<i64>::new()));
            let err = enc.encode(Some(&node)).unwrap_err();
            assert!(matches!(err, WireError::InvalidScalarType(ref t) if t == "Money"));

            let known = field("price")
                .unwrap()
                .in_values(values("Decimal", Vec::<i64>::new()));
            let doc = enc.encode(Some(&known)).unwrap().unwrap();
            assert_eq!(doc["args"][1], json!({ "type": "Decimal", "values": [] }));
        });
    }

    #[test]
    fn invalid_scalar_value_fails() {
        encoder_test(|enc| {
            let node = field("born").unwrap().lt(value("Date", "last tuesday"));
            assert!(matches!(
                enc.encode(Some(&node)),
                Err(WireError::InvalidScalarValue { .. })
            ));
        });
    }

    #[test]
    fn cache_key_is_stable_and_content_sensitive() {
        encoder_test(|enc| {
            let a = enc.cache_key(Some(&age_filter())).unwrap().unwrap();
            let b = enc.cache_key(Some(&age_filter())).unwrap().unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), 64);

            let other = and([component(Some("ageFilter"))
                .with_condition(Some(field("age").unwrap().gte(value("Int", 21))))]);
            assert_ne!(a, enc.cache_key(Some(&other)).unwrap().unwrap());
        });
    }

    #[test]
    fn cache_key_ignores_empty_markers() {
        encoder_test(|enc| {
            let with_empty = and([
                component(Some("ageFilter"))
                    .with_condition(Some(field("age").unwrap().gte(value("Int", 18)))),
                component(Some("name")),
            ]);
            assert_eq!(
                enc.cache_key(Some(&age_filter())).unwrap(),
                enc.cache_key(Some(&with_empty)).unwrap()
            );
        });
    }

    #[test]
    fn encode_to_string_is_compact_json() {
        encoder_test(|enc| {
            let node: Node = field("a").unwrap().into();
            assert_eq!(enc.encode_to_string(Some(&node)).unwrap(), r#"{"field":"a"}"#);
        });
    }
}
