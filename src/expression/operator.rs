//! Operator definitions and their value semantics.

use crate::access::value::Numeric;
use crate::access::{Value, ValueType};
use crate::expression::{ExpressionError, ExpressionResult, ExpressionType};

/// Arithmetic operators with an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl ArithmeticOperator {
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            ArithmeticOperator::Plus => ExpressionType::OperatorPlus,
            ArithmeticOperator::Minus => ExpressionType::OperatorMinus,
            ArithmeticOperator::Multiply => ExpressionType::OperatorMultiply,
            ArithmeticOperator::Divide => ExpressionType::OperatorDivide,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOperator::Plus => "+",
            ArithmeticOperator::Minus => "-",
            ArithmeticOperator::Multiply => "*",
            ArithmeticOperator::Divide => "/",
        }
    }

    /// Apply the operator with numeric promotion: integers widen to the wider
    /// operand, any DOUBLE makes the result DOUBLE, otherwise any DECIMAL
    /// makes it DECIMAL. NULL in, NULL out.
    pub fn apply(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        let result_type = promoted_type(left.value_type(), right.value_type());
        if left.is_null() || right.is_null() {
            return Ok(Value::null(result_type));
        }

        let (a, b) = match (left.numeric(), right.numeric()) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                return Err(ExpressionError::InvalidOperandTypes {
                    operator: self.as_str(),
                    left_type: left.value_type(),
                    right_type: Some(right.value_type()),
                })
            }
        };

        match (a, b) {
            (Numeric::Int(x), Numeric::Int(y)) => {
                let v = self.apply_i64(x, y)?;
                Value::integer(result_type, v).ok_or(ExpressionError::NumericOverflow {
                    operator: self.as_str(),
                })
            }
            (Numeric::Double(_), _) | (_, Numeric::Double(_)) => {
                let overflow = ExpressionError::NumericOverflow {
                    operator: self.as_str(),
                };
                let x = a.to_f64().ok_or_else(|| overflow.clone())?;
                let y = b.to_f64().ok_or(overflow)?;
                self.apply_f64(x, y).map(Value::Double)
            }
            _ => {
                let overflow = ExpressionError::NumericOverflow {
                    operator: self.as_str(),
                };
                let x = a.to_decimal().ok_or_else(|| overflow.clone())?;
                let y = b.to_decimal().ok_or_else(|| overflow.clone())?;
                if *self == ArithmeticOperator::Divide && y.is_zero() {
                    return Err(ExpressionError::DivisionByZero);
                }
                let result = match self {
                    ArithmeticOperator::Plus => x.checked_add(y),
                    ArithmeticOperator::Minus => x.checked_sub(y),
                    ArithmeticOperator::Multiply => x.checked_mul(y),
                    ArithmeticOperator::Divide => x.checked_div(y),
                };
                result.map(Value::Decimal).ok_or(overflow)
            }
        }
    }

    fn apply_i64(&self, x: i64, y: i64) -> ExpressionResult<i64> {
        if *self == ArithmeticOperator::Divide && y == 0 {
            return Err(ExpressionError::DivisionByZero);
        }
        let result = match self {
            ArithmeticOperator::Plus => x.checked_add(y),
            ArithmeticOperator::Minus => x.checked_sub(y),
            ArithmeticOperator::Multiply => x.checked_mul(y),
            ArithmeticOperator::Divide => x.checked_div(y),
        };
        result.ok_or(ExpressionError::NumericOverflow {
            operator: self.as_str(),
        })
    }

    fn apply_f64(&self, x: f64, y: f64) -> ExpressionResult<f64> {
        match self {
            ArithmeticOperator::Plus => Ok(x + y),
            ArithmeticOperator::Minus => Ok(x - y),
            ArithmeticOperator::Multiply => Ok(x * y),
            ArithmeticOperator::Divide if y == 0.0 => Err(ExpressionError::DivisionByZero),
            ArithmeticOperator::Divide => Ok(x / y),
        }
    }
}

fn promoted_type(left: ValueType, right: ValueType) -> ValueType {
    match (left, right) {
        (ValueType::Double, _) | (_, ValueType::Double) => ValueType::Double,
        (ValueType::Decimal, _) | (_, ValueType::Decimal) => ValueType::Decimal,
        _ => match (left.integer_rank(), right.integer_rank()) {
            (Some(l), Some(r)) if r > l => right,
            (None, Some(_)) => right,
            _ => left,
        },
    }
}

/// Comparison operators. All but `Like` have specialized node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqualTo,
    GreaterThanOrEqualTo,
    Like,
}

impl ComparisonOperator {
    pub fn from_expression_type(expression_type: ExpressionType) -> Option<Self> {
        match expression_type {
            ExpressionType::CompareEqual => Some(ComparisonOperator::Equal),
            ExpressionType::CompareNotEqual => Some(ComparisonOperator::NotEqual),
            ExpressionType::CompareLessThan => Some(ComparisonOperator::LessThan),
            ExpressionType::CompareGreaterThan => Some(ComparisonOperator::GreaterThan),
            ExpressionType::CompareLessThanOrEqualTo => {
                Some(ComparisonOperator::LessThanOrEqualTo)
            }
            ExpressionType::CompareGreaterThanOrEqualTo => {
                Some(ComparisonOperator::GreaterThanOrEqualTo)
            }
            ExpressionType::CompareLike => Some(ComparisonOperator::Like),
            _ => None,
        }
    }

    pub fn expression_type(&self) -> ExpressionType {
        match self {
            ComparisonOperator::Equal => ExpressionType::CompareEqual,
            ComparisonOperator::NotEqual => ExpressionType::CompareNotEqual,
            ComparisonOperator::LessThan => ExpressionType::CompareLessThan,
            ComparisonOperator::GreaterThan => ExpressionType::CompareGreaterThan,
            ComparisonOperator::LessThanOrEqualTo => ExpressionType::CompareLessThanOrEqualTo,
            ComparisonOperator::GreaterThanOrEqualTo => {
                ExpressionType::CompareGreaterThanOrEqualTo
            }
            ComparisonOperator::Like => ExpressionType::CompareLike,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThanOrEqualTo => "<=",
            ComparisonOperator::GreaterThanOrEqualTo => ">=",
            ComparisonOperator::Like => "LIKE",
        }
    }

    pub fn is_specializable(&self) -> bool {
        !matches!(self, ComparisonOperator::Like)
    }

    /// Compare two values. Any NULL operand yields a BOOLEAN NULL.
    pub fn compare(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        if left.is_null() || right.is_null() {
            return Ok(Value::null(ValueType::Boolean));
        }

        let invalid = || ExpressionError::InvalidOperandTypes {
            operator: self.as_str(),
            left_type: left.value_type(),
            right_type: Some(right.value_type()),
        };
        let ordering = || left.try_cmp(right).ok_or_else(invalid);

        let result = match self {
            ComparisonOperator::Equal => ordering()?.is_eq(),
            ComparisonOperator::NotEqual => ordering()?.is_ne(),
            ComparisonOperator::LessThan => ordering()?.is_lt(),
            ComparisonOperator::GreaterThan => ordering()?.is_gt(),
            ComparisonOperator::LessThanOrEqualTo => ordering()?.is_le(),
            ComparisonOperator::GreaterThanOrEqualTo => ordering()?.is_ge(),
            ComparisonOperator::Like => match (left, right) {
                (Value::Varchar(text), Value::Varchar(pattern)) => like_match(text, pattern),
                _ => return Err(invalid()),
            },
        };
        Ok(Value::Boolean(result))
    }
}

/// SQL LIKE: `%` matches any run of characters, `_` exactly one.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    // Position of the last `%` and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if let Some((star, absorbed)) = backtrack {
            p = star + 1;
            t = absorbed + 1;
            backtrack = Some((star, absorbed + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '%')
}

/// Conjunction operators with SQL three-valued logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConjunctionOperator {
    And,
    Or,
}

impl ConjunctionOperator {
    pub fn from_expression_type(expression_type: ExpressionType) -> Option<Self> {
        match expression_type {
            ExpressionType::ConjunctionAnd => Some(ConjunctionOperator::And),
            ExpressionType::ConjunctionOr => Some(ConjunctionOperator::Or),
            _ => None,
        }
    }

    pub fn expression_type(&self) -> ExpressionType {
        match self {
            ConjunctionOperator::And => ExpressionType::ConjunctionAnd,
            ConjunctionOperator::Or => ExpressionType::ConjunctionOr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConjunctionOperator::And => "AND",
            ConjunctionOperator::Or => "OR",
        }
    }

    /// The result when `left` alone decides the outcome.
    pub fn short_circuit(&self, left: &Value) -> Option<Value> {
        match (self, left.as_bool()) {
            (ConjunctionOperator::And, Some(false)) => Some(Value::Boolean(false)),
            (ConjunctionOperator::Or, Some(true)) => Some(Value::Boolean(true)),
            _ => None,
        }
    }

    pub fn apply(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        let invalid = || ExpressionError::InvalidOperandTypes {
            operator: self.as_str(),
            left_type: left.value_type(),
            right_type: Some(right.value_type()),
        };
        let l = truth_value(left).ok_or_else(invalid)?;
        let r = truth_value(right).ok_or_else(invalid)?;

        let result = match self {
            ConjunctionOperator::And => match (l, r) {
                (Some(false), _) | (_, Some(false)) => Some(false),
                (Some(true), Some(true)) => Some(true),
                _ => None,
            },
            ConjunctionOperator::Or => match (l, r) {
                (Some(true), _) | (_, Some(true)) => Some(true),
                (Some(false), Some(false)) => Some(false),
                _ => None,
            },
        };
        Ok(result.map_or(Value::null(ValueType::Boolean), Value::Boolean))
    }
}

/// `Some(None)` for NULL, `None` for a non-boolean operand.
fn truth_value(value: &Value) -> Option<Option<bool>> {
    match value {
        Value::Null(_) => Some(None),
        Value::Boolean(b) => Some(Some(*b)),
        _ => None,
    }
}

/// Logical NOT. NULL stays NULL.
pub fn logical_not(operand: &Value) -> ExpressionResult<Value> {
    match operand {
        Value::Null(_) => Ok(Value::null(ValueType::Boolean)),
        Value::Boolean(b) => Ok(Value::Boolean(!b)),
        _ => Err(ExpressionError::InvalidOperandTypes {
            operator: "NOT",
            left_type: operand.value_type(),
            right_type: None,
        }),
    }
}
