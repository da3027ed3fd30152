//! Wire bridge for Sieve.
//!
//! The merge engine never serializes anything itself. This crate is the
//! query-execution side of the boundary: it resolves every `Value` /
//! `Values` leaf through a registry of scalar codecs keyed by scalar type
//! name, and renders the composite into the document the backend expects.
//!
//! # Quick Start
//!
//! ```rust
//! use sieve_types::{and, component, field, value};
//! use sieve_wire::{QueryEncoder, ScalarTypeRegistry};
//!
//! let registry = ScalarTypeRegistry::with_builtins();
//! let composite = and([component(Some("ageFilter"))
//!     .with_condition(Some(field("age").unwrap().gte(value("Int", 18))))]);
//!
//! let text = QueryEncoder::new(&registry).encode_to_string(Some(&composite)).unwrap();
//! assert_eq!(
//!     text,
//!     r#"{"args":[{"args":[{"field":"age"},{"type":"Int","value":18}],"op":"gte"}],"op":"and"}"#
//! );
//! ```

pub mod codec;
pub mod encoder;
pub mod error;
pub mod registry;

pub use codec::{
    BooleanCodec, DateCodec, DateTimeCodec, DecimalCodec, FloatCodec, IntegerCodec, ScalarCodec,
    StringCodec, UuidCodec,
};
pub use encoder::QueryEncoder;
pub use error::{WireError, WireResult};
pub use registry::ScalarTypeRegistry;
