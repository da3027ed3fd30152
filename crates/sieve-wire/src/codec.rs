//! Scalar codecs: per-type validation, wire conversion, and equality.
//!
//! Each built-in scalar type has a codec that checks the literal's shape,
//! converts it to the representation the backend expects, and decides when
//! two literals denote the same value.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::Number;
use uuid::Uuid;

use sieve_types::{Scalar, ScalarType};

use crate::error::{WireError, WireResult};

pub const STRING: &str = "String";
pub const INT: &str = "Int";
pub const LONG: &str = "Long";
pub const FLOAT: &str = "Float";
pub const DOUBLE: &str = "Double";
pub const BOOLEAN: &str = "Boolean";
pub const DATE: &str = "Date";
pub const DATE_TIME: &str = "DateTime";
pub const DECIMAL: &str = "Decimal";
pub const UUID: &str = "UUID";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialization and equality for one scalar type.
pub trait ScalarCodec: Send + Sync {
    /// Convert a literal to its wire representation.
    ///
    /// `scalar_type` is the name the literal was tagged with; it may be an
    /// alias of the codec's own type and is used for error messages.
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar>;

    /// Returns `true` if two literals denote the same value.
    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        a == b
    }
}

fn expect_str<'a>(scalar_type: &ScalarType, value: &'a Scalar) -> WireResult<&'a str> {
    value.as_str().ok_or_else(|| expected(scalar_type, "a string", value))
}

fn expected(scalar_type: &ScalarType, what: &str, value: &Scalar) -> WireError {
    WireError::invalid_value(scalar_type.as_str(), format!("expected {what}, got {value}"))
}

// ---------------------------------------------------------------------------
// Primitive codecs
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl ScalarCodec for StringCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        expect_str(scalar_type, value).map(|s| Scalar::String(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BooleanCodec;

impl ScalarCodec for BooleanCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        value
            .as_bool()
            .map(Scalar::Bool)
            .ok_or_else(|| expected(scalar_type, "a boolean", value))
    }
}

/// Integral numbers within a fixed range.
#[derive(Clone, Copy, Debug)]
pub struct IntegerCodec {
    min: i64,
    max: i64,
}

impl IntegerCodec {
    /// 32-bit signed integers.
    pub const INT: IntegerCodec = IntegerCodec {
        min: i32::MIN as i64,
        max: i32::MAX as i64,
    };

    /// 64-bit signed integers.
    pub const LONG: IntegerCodec = IntegerCodec {
        min: i64::MIN,
        max: i64::MAX,
    };
}

impl ScalarCodec for IntegerCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        let n = value
            .as_i64()
            .ok_or_else(|| expected(scalar_type, "an integer", value))?;
        if n < self.min || n > self.max {
            return Err(WireError::invalid_value(
                scalar_type.as_str(),
                format!("{n} out of range [{}, {}]", self.min, self.max),
            ));
        }
        Ok(Scalar::from(n))
    }
}

/// Floating point numbers; integral literals are accepted and widened.
#[derive(Clone, Copy, Debug, Default)]
pub struct FloatCodec;

impl ScalarCodec for FloatCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        value
            .as_f64()
            .and_then(Number::from_f64)
            .map(Scalar::Number)
            .ok_or_else(|| expected(scalar_type, "a finite number", value))
    }

    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

// ---------------------------------------------------------------------------
// Temporal codecs
// ---------------------------------------------------------------------------

/// Calendar dates written as `YYYY-MM-DD`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateCodec;

impl DateCodec {
    fn parse(value: &Scalar) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.as_str()?.trim(), DATE_FORMAT).ok()
    }
}

impl ScalarCodec for DateCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        let text = expect_str(scalar_type, value)?;
        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|e| WireError::invalid_value(scalar_type.as_str(), format!("{text:?}: {e}")))?;
        Ok(Scalar::String(date.format(DATE_FORMAT).to_string()))
    }

    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        match (Self::parse(a), Self::parse(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

/// RFC 3339 timestamps, normalized to UTC on the wire.
#[derive(Clone, Copy, Debug, Default)]
pub struct DateTimeCodec;

impl DateTimeCodec {
    fn parse(value: &Scalar) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value.as_str()?.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl ScalarCodec for DateTimeCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        let text = expect_str(scalar_type, value)?;
        let instant = DateTime::parse_from_rfc3339(text.trim())
            .map_err(|e| WireError::invalid_value(scalar_type.as_str(), format!("{text:?}: {e}")))?
            .with_timezone(&Utc);
        Ok(Scalar::String(
            instant.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ))
    }

    /// Same instant, regardless of the offset it was written in.
    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        match (Self::parse(a), Self::parse(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

// ---------------------------------------------------------------------------
// Decimal
// ---------------------------------------------------------------------------

/// Exact decimals, given as strings or JSON numbers, sent as normalized strings.
#[derive(Clone, Copy, Debug, Default)]
pub struct DecimalCodec;

impl DecimalCodec {
    fn parse(value: &Scalar) -> Option<Decimal> {
        match value {
            Scalar::String(s) => parse_decimal(s),
            Scalar::Number(n) => parse_decimal(&n.to_string()),
            _ => None,
        }
    }
}

impl ScalarCodec for DecimalCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        Self::parse(value)
            .map(|d| Scalar::String(d.normalize().to_string()))
            .ok_or_else(|| {
                WireError::invalid_value(scalar_type.as_str(), format!("not a decimal: {value}"))
            })
    }

    /// `1.50`, `"1.5"` and `1.5` are the same decimal.
    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        match (Self::parse(a), Self::parse(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}

/// Plain (`12.50`) or scientific (`1e-7`, `1e+21`) decimal text.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        text.parse::<Decimal>().ok()
    }
}

// ---------------------------------------------------------------------------
// UUID
// ---------------------------------------------------------------------------

/// UUIDs in any accepted textual form, sent lowercase and hyphenated.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidCodec;

impl ScalarCodec for UuidCodec {
    fn to_wire(&self, scalar_type: &ScalarType, value: &Scalar) -> WireResult<Scalar> {
        let text = expect_str(scalar_type, value)?;
        let id = Uuid::parse_str(text.trim())
            .map_err(|e| WireError::invalid_value(scalar_type.as_str(), format!("{text:?}: {e}")))?;
        Ok(Scalar::String(id.hyphenated().to_string()))
    }

    fn values_equal(&self, a: &Scalar, b: &Scalar) -> bool {
        let parse = |v: &Scalar| v.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok());
        match (parse(a), parse(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        }
    }
}
