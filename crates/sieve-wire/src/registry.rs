use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use sieve_compare::ScalarEquality;
use sieve_types::{Scalar, ScalarType};

use crate::codec::{
    self, BooleanCodec, DateCodec, DateTimeCodec, DecimalCodec, FloatCodec, IntegerCodec,
    ScalarCodec, StringCodec, UuidCodec,
};
use crate::error::{WireError, WireResult};

/// Scalar types known to the serializer, keyed by name.
///
/// The registry also acts as the comparator's [`ScalarEquality`], so literals
/// of registered types compare semantically. Unregistered types fall back to
/// representational equality; they only fail once they are serialized.
#[derive(Clone, Default)]
pub struct ScalarTypeRegistry {
    codecs: HashMap<ScalarType, Arc<dyn ScalarCodec>>,
}

impl ScalarTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in scalar type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(codec::STRING, Arc::new(StringCodec));
        registry.register(codec::INT, Arc::new(IntegerCodec::INT));
        registry.register(codec::LONG, Arc::new(IntegerCodec::LONG));
        registry.register(codec::FLOAT, Arc::new(FloatCodec));
        registry.register(codec::DOUBLE, Arc::new(FloatCodec));
        registry.register(codec::BOOLEAN, Arc::new(BooleanCodec));
        registry.register(codec::DATE, Arc::new(DateCodec));
        registry.register(codec::DATE_TIME, Arc::new(DateTimeCodec));
        registry.register(codec::DECIMAL, Arc::new(DecimalCodec));
        registry.register(codec::UUID, Arc::new(UuidCodec));
        registry
    }

    /// Register (or replace) the codec for `name`. Returns the replaced codec.
    pub fn register(
        &mut self,
        name: impl Into<ScalarType>,
        codec: Arc<dyn ScalarCodec>,
    ) -> Option<Arc<dyn ScalarCodec>> {
        let name = name.into();
        debug!(scalar_type = %name, "registered scalar codec");
        self.codecs.insert(name, codec)
    }

    /// Make `name` share the codec already registered for `base`.
    pub fn alias(&mut self, name: impl Into<ScalarType>, base: &str) -> WireResult<()> {
        let name = name.into();
        let codec = self
            .codecs
            .get(&ScalarType::from(base))
            .cloned()
            .ok_or_else(|| WireError::InvalidScalarType(base.to_string()))?;
        debug!(scalar_type = %name, base, "aliased scalar type");
        self.codecs.insert(name, codec);
        Ok(())
    }

    /// Look up the codec for a scalar type.
    pub fn get(&self, scalar_type: &ScalarType) -> WireResult<&dyn ScalarCodec> {
        self.codecs
            .get(scalar_type)
            .map(|codec| &**codec)
            .ok_or_else(|| WireError::InvalidScalarType(scalar_type.to_string()))
    }

    /// Returns `true` if a codec is registered for `scalar_type`.
    pub fn contains(&self, scalar_type: &str) -> bool {
        self.codecs.contains_key(&ScalarType::from(scalar_type))
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.codecs.keys().map(ScalarType::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered type names, aliases included.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Convert a literal of `scalar_type` to its wire representation.
    pub fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        self.get(scalar_type)?.to_wire(scalar_type, value)
    }
}

impl ScalarEquality for ScalarTypeRegistry {
    fn scalar_eq(&self, scalar_type: &ScalarType, a: &Scalar, b: &Scalar) -> bool {
        match self.codecs.get(scalar_type) {
            Some(codec) => codec.values_equal(a, b),
            None => a == b,
        }
    }
}

impl fmt::Debug for ScalarTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarTypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sieve_compare::ConditionComparator;
    use sieve_types::{field, value};

    #[test]
    fn builtins_are_registered() {
        let registry = ScalarTypeRegistry::with_builtins();
        assert_eq!(registry.len(), 10);
        let builtins = [
            "String", "Int", "Long", "Float", "Double", "Boolean", "Date", "DateTime", "Decimal",
            "UUID",
        ];
        for name in builtins {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn unknown_type_is_invalid_scalar_type() {
        let registry = ScalarTypeRegistry::with_builtins();
        let err = registry.to_wire(&ScalarType::from("Money"), &json!(1)).unwrap_err();
        assert!(matches!(err, WireError::InvalidScalarType(ref name) if name == "Money"));
    }

    #[test]
    fn alias_reuses_base_codec() {
        let mut registry = ScalarTypeRegistry::with_builtins();
        registry.alias("Email", "String").unwrap();
        assert_eq!(
            registry.to_wire(&ScalarType::from("Email"), &json!("a@b.c")).unwrap(),
            json!("a@b.c")
        );
        let err = registry.to_wire(&ScalarType::from("Email"), &json!(5)).unwrap_err();
        assert!(err.to_string().contains("Email"));
    }

    #[test]
    fn alias_of_unknown_base_fails() {
        let mut registry = ScalarTypeRegistry::new();
        assert!(matches!(
            registry.alias("Email", "String"),
            Err(WireError::InvalidScalarType(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn register_replaces_existing() {
        let mut registry = ScalarTypeRegistry::with_builtins();
        let previous = registry.register("Int", Arc::new(IntegerCodec::LONG));
        assert!(previous.is_some());
        assert!(registry
            .to_wire(&ScalarType::from("Int"), &json!(5_000_000_000i64))
            .is_ok());
    }

    #[test]
    fn names_are_sorted() {
        let registry = ScalarTypeRegistry::with_builtins();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn registry_drives_semantic_comparison() {
        let registry = ScalarTypeRegistry::with_builtins();
        let a = field("price").unwrap().gte(value("Decimal", "10.50"));
        let b = field("price").unwrap().gte(value("Decimal", 10.5));
        assert!(ConditionComparator::new(&registry).equal(Some(&a), Some(&b)));
        assert!(!sieve_compare::compare_conditions(Some(&a), Some(&b), false));
    }

    #[test]
    fn unregistered_types_compare_representationally() {
        let registry = ScalarTypeRegistry::new();
        assert!(registry.scalar_eq(&ScalarType::from("X"), &json!(1), &json!(1)));
        assert!(!registry.scalar_eq(&ScalarType::from("X"), &json!(1), &json!(1.0)));
    }
}
