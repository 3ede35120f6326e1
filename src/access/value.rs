use std::cmp::Ordering;
use std::fmt;

use anyhow::{bail, Context, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// SQL scalar types understood by the engine.
///
/// The discriminants are the wire codes the planner uses.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Invalid = 0,
    Null = 1,
    TinyInt = 3,
    SmallInt = 4,
    Integer = 5,
    BigInt = 6,
    Double = 8,
    Varchar = 9,
    Timestamp = 11,
    Decimal = 22,
    Boolean = 23,
    Varbinary = 25,
}

impl ValueType {
    pub const ALL: [ValueType; 12] = [
        ValueType::Invalid,
        ValueType::Null,
        ValueType::TinyInt,
        ValueType::SmallInt,
        ValueType::Integer,
        ValueType::BigInt,
        ValueType::Double,
        ValueType::Varchar,
        ValueType::Timestamp,
        ValueType::Decimal,
        ValueType::Boolean,
        ValueType::Varbinary,
    ];

    pub fn from_u8(value: u8) -> Result<Self> {
        match Self::ALL.iter().find(|vt| **vt as u8 == value) {
            Some(vt) => Ok(*vt),
            None => bail!("Unknown value type: {}", value),
        }
    }

    /// Look up a value type by its planner name, e.g. `"INTEGER"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|vt| vt.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Invalid => "INVALID",
            ValueType::Null => "NULL",
            ValueType::TinyInt => "TINYINT",
            ValueType::SmallInt => "SMALLINT",
            ValueType::Integer => "INTEGER",
            ValueType::BigInt => "BIGINT",
            ValueType::Double => "DOUBLE",
            ValueType::Varchar => "VARCHAR",
            ValueType::Timestamp => "TIMESTAMP",
            ValueType::Decimal => "DECIMAL",
            ValueType::Boolean => "BOOLEAN",
            ValueType::Varbinary => "VARBINARY",
        }
    }

    /// Width rank of the integer types, used for promotion.
    pub(crate) fn integer_rank(&self) -> Option<u8> {
        match self {
            ValueType::TinyInt => Some(1),
            ValueType::SmallInt => Some(2),
            ValueType::Integer => Some(3),
            ValueType::BigInt => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One SQL datum. NULL keeps the type it was declared with.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null(ValueType),
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Double(f64),
    Varchar(String),
    Varbinary(Vec<u8>),
    Timestamp(i64),
    Decimal(Decimal),
}

/// Numeric view of a value used for cross-type arithmetic and comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Double(f64),
    Decimal(Decimal),
}

impl Value {
    /// The NULL representation for `value_type`.
    pub fn null(value_type: ValueType) -> Self {
        Value::Null(value_type)
    }

    /// Build a VARBINARY value from its hexadecimal encoding.
    pub fn binary_from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded)
            .with_context(|| format!("Invalid hex literal for VARBINARY: {:?}", encoded))?;
        Ok(Value::Varbinary(bytes))
    }

    /// Build an exact DECIMAL value from its textual form.
    pub fn decimal_from_str(text: &str) -> Result<Self> {
        let decimal = Decimal::from_str_exact(text.trim())
            .with_context(|| format!("Invalid DECIMAL literal: {:?}", text))?;
        Ok(Value::Decimal(decimal))
    }

    /// Narrow `value` into the integer type `value_type`.
    ///
    /// Returns `None` when `value_type` is not an integer type or the value
    /// does not fit.
    pub fn integer(value_type: ValueType, value: i64) -> Option<Self> {
        match value_type {
            ValueType::TinyInt => i8::try_from(value).ok().map(Value::TinyInt),
            ValueType::SmallInt => i16::try_from(value).ok().map(Value::SmallInt),
            ValueType::Integer => i32::try_from(value).ok().map(Value::Integer),
            ValueType::BigInt => Some(Value::BigInt(value)),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a value, inferring the widest natural type.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null(ValueType::Null)),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::BigInt(i)),
                None => match n.as_f64() {
                    Some(f) => Ok(Value::Double(f)),
                    None => bail!("Unrepresentable number: {}", n),
                },
            },
            serde_json::Value::String(s) => Ok(Value::Varchar(s.clone())),
            other => bail!("Cannot convert {} to a scalar value", other),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null(vt) => *vt,
            Value::Boolean(_) => ValueType::Boolean,
            Value::TinyInt(_) => ValueType::TinyInt,
            Value::SmallInt(_) => ValueType::SmallInt,
            Value::Integer(_) => ValueType::Integer,
            Value::BigInt(_) => ValueType::BigInt,
            Value::Double(_) => ValueType::Double,
            Value::Varchar(_) => ValueType::Varchar,
            Value::Varbinary(_) => ValueType::Varbinary,
            Value::Timestamp(_) => ValueType::Timestamp,
            Value::Decimal(_) => ValueType::Decimal,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Integer(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Double(v) => Some(Numeric::Double(*v)),
            Value::Decimal(v) => Some(Numeric::Decimal(*v)),
            _ => self.as_i64().map(Numeric::Int),
        }
    }

    /// Total-order comparison of two non-NULL values.
    ///
    /// Integers of any width, doubles and decimals compare numerically with
    /// each other; every other type only compares with itself. Returns `None`
    /// for NULL operands or incomparable types.
    pub fn try_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null(_), _) | (_, Value::Null(_)) => None,
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Varchar(a), Value::Varchar(b)) => Some(a.cmp(b)),
            (Value::Varbinary(a), Value::Varbinary(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => {
                let (a, b) = (self.numeric()?, other.numeric()?);
                compare_numeric(a, b)
            }
        }
    }
}

fn compare_numeric(left: Numeric, right: Numeric) -> Option<Ordering> {
    match (left, right) {
        (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(&b)),
        (Numeric::Decimal(a), Numeric::Decimal(b)) => Some(a.cmp(&b)),
        (Numeric::Decimal(a), Numeric::Int(b)) => Some(a.cmp(&Decimal::from(b))),
        (Numeric::Int(a), Numeric::Decimal(b)) => Some(Decimal::from(a).cmp(&b)),
        (a, b) => Some(compare_f64(a.to_f64()?, b.to_f64()?)),
    }
}

/// Numeric order on doubles, so `-0.0 == 0.0`. NaN sorts below every
/// number and equals only NaN.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| b.is_nan().cmp(&a.is_nan()))
}

impl Numeric {
    pub(crate) fn to_f64(self) -> Option<f64> {
        match self {
            Numeric::Int(v) => Some(v as f64),
            Numeric::Double(v) => Some(v),
            Numeric::Decimal(v) => v.to_f64(),
        }
    }

    pub(crate) fn to_decimal(self) -> Option<Decimal> {
        match self {
            Numeric::Int(v) => Some(Decimal::from(v)),
            Numeric::Decimal(v) => Some(v),
            Numeric::Double(v) => Decimal::from_f64_retain(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::TinyInt(v) => write!(f, "{}", v),
            Value::SmallInt(v) => write!(f, "{}", v),
            Value::Integer(v) => write!(f, "{}", v),
            Value::BigInt(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Varchar(v) => write!(f, "'{}'", v),
            Value::Varbinary(v) => write!(f, "x'{}'", hex::encode_upper(v)),
            Value::Timestamp(v) => write!(f, "TIMESTAMP {}", v),
            Value::Decimal(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_conversion() -> Result<()> {
        assert_eq!(ValueType::from_u8(5)?, ValueType::Integer);
        assert_eq!(ValueType::from_u8(25)?, ValueType::Varbinary);
        assert!(ValueType::from_u8(99).is_err());

        for vt in ValueType::ALL {
            assert_eq!(ValueType::from_name(vt.name()), Some(vt));
            assert_eq!(ValueType::from_u8(vt as u8)?, vt);
        }
        assert_eq!(ValueType::from_name("integer"), None);
        Ok(())
    }

    #[test]
    fn test_typed_null() {
        let null = Value::null(ValueType::Varchar);
        assert!(null.is_null());
        assert_eq!(null.value_type(), ValueType::Varchar);
        assert_ne!(null, Value::null(ValueType::Integer));
    }

    #[test]
    fn test_binary_from_hex() -> Result<()> {
        assert_eq!(
            Value::binary_from_hex("48656C6C6F")?,
            Value::Varbinary(b"Hello".to_vec())
        );
        assert_eq!(Value::binary_from_hex("")?, Value::Varbinary(vec![]));
        assert!(Value::binary_from_hex("4").is_err());
        assert!(Value::binary_from_hex("zz").is_err());
        Ok(())
    }

    #[test]
    fn test_decimal_from_str() -> Result<()> {
        let value = Value::decimal_from_str("123.4500")?;
        assert_eq!(value, Value::Decimal(Decimal::new(1234500, 4)));
        assert!(Value::decimal_from_str("12x").is_err());
        Ok(())
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(
            Value::integer(ValueType::TinyInt, 127),
            Some(Value::TinyInt(127))
        );
        assert_eq!(Value::integer(ValueType::TinyInt, 128), None);
        assert_eq!(
            Value::integer(ValueType::SmallInt, -32768),
            Some(Value::SmallInt(-32768))
        );
        assert_eq!(
            Value::integer(ValueType::BigInt, i64::MIN),
            Some(Value::BigInt(i64::MIN))
        );
        assert_eq!(Value::integer(ValueType::Double, 1), None);
    }

    #[test]
    fn test_try_cmp_same_type() {
        assert_eq!(
            Value::Integer(1).try_cmp(&Value::Integer(2)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Varchar("b".into()).try_cmp(&Value::Varchar("a".into())),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Varbinary(vec![1, 2]).try_cmp(&Value::Varbinary(vec![1, 2])),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Timestamp(10).try_cmp(&Value::Timestamp(3)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_try_cmp_numeric_promotion() {
        assert_eq!(
            Value::TinyInt(5).try_cmp(&Value::BigInt(5)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::SmallInt(3).try_cmp(&Value::Double(3.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Value::Decimal(Decimal::new(25, 1)).try_cmp(&Value::Integer(2)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::Double(-0.5).try_cmp(&Value::Double(1.0)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_try_cmp_signed_zero() {
        let negative_zero = -1.0 * 0.0;
        assert_eq!(
            Value::Double(negative_zero).try_cmp(&Value::Double(0.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Double(negative_zero).try_cmp(&Value::Integer(0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Integer(0).try_cmp(&Value::Double(-0.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Decimal(Decimal::ZERO).try_cmp(&Value::Double(-0.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn test_try_cmp_nan() {
        let nan = Value::Double(f64::NAN);
        assert_eq!(nan.try_cmp(&Value::Double(f64::NAN)), Some(Ordering::Equal));
        assert_eq!(nan.try_cmp(&Value::Double(f64::MIN)), Some(Ordering::Less));
        assert_eq!(Value::BigInt(i64::MIN).try_cmp(&nan), Some(Ordering::Greater));
    }

    #[test]
    fn test_try_cmp_incomparable() {
        assert_eq!(Value::Integer(1).try_cmp(&Value::Varchar("1".into())), None);
        assert_eq!(Value::Timestamp(1).try_cmp(&Value::BigInt(1)), None);
        assert_eq!(Value::null(ValueType::Integer).try_cmp(&Value::Integer(1)), None);
    }

    #[test]
    fn test_from_json() -> Result<()> {
        assert_eq!(Value::from_json(&serde_json::json!(7))?, Value::BigInt(7));
        assert_eq!(Value::from_json(&serde_json::json!(1.5))?, Value::Double(1.5));
        assert_eq!(
            Value::from_json(&serde_json::json!("x"))?,
            Value::Varchar("x".into())
        );
        assert!(Value::from_json(&serde_json::json!(null))?.is_null());
        assert!(Value::from_json(&serde_json::json!([1])).is_err());
        Ok(())
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Varbinary(vec![0xab, 0x01]).to_string(), "x'AB01'");
        assert_eq!(Value::null(ValueType::Integer).to_string(), "NULL");
        assert_eq!(Value::Varchar("hi".into()).to_string(), "'hi'");
    }
}
