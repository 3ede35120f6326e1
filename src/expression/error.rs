//! Error types for expression construction and evaluation.

use thiserror::Error;

use crate::access::ValueType;
use crate::expression::ExpressionType;

/// Errors raised while building or evaluating an expression tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The serialized plan is missing a field, carries an out-of-range value,
    /// or asks for a literal that can never be decoded.
    #[error("Malformed plan: {reason}")]
    MalformedPlan { reason: String },

    /// A defined operator that has no implementation yet.
    #[error("{kind} operator is not yet supported")]
    UnsupportedOperator { kind: ExpressionType },

    /// An expression type outside the set a factory dispatches on.
    #[error("Invalid ExpressionType '{kind}' requested from {context}")]
    InvalidExpressionType {
        kind: ExpressionType,
        context: &'static str,
    },

    #[error("Column index {index} out of bounds for tuple with {tuple_size} columns")]
    ColumnIndexOutOfBounds { index: usize, tuple_size: usize },

    #[error("Parameter index {index} out of bounds for {parameter_count} parameters")]
    ParameterIndexOutOfBounds {
        index: usize,
        parameter_count: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Numeric overflow in {operator}")]
    NumericOverflow { operator: &'static str },

    #[error(
        "Invalid operand types for operator {operator}: left={left_type}, right={right_type:?}"
    )]
    InvalidOperandTypes {
        operator: &'static str,
        left_type: ValueType,
        right_type: Option<ValueType>,
    },

    #[error("No tuple address available in evaluation context")]
    TupleAddressUnavailable,
}

impl ExpressionError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        ExpressionError::MalformedPlan {
            reason: reason.into(),
        }
    }

    pub fn is_malformed_plan(&self) -> bool {
        matches!(self, ExpressionError::MalformedPlan { .. })
    }

    /// True for kind tags the factory cannot build: the plan compiler and
    /// this factory disagree, so the plan must be rejected outright.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            ExpressionError::UnsupportedOperator { .. }
                | ExpressionError::InvalidExpressionType { .. }
        )
    }
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExpressionError::malformed("constant value: missing VALUE");
        assert_eq!(
            err.to_string(),
            "Malformed plan: constant value: missing VALUE"
        );

        let err = ExpressionError::UnsupportedOperator {
            kind: ExpressionType::OperatorMod,
        };
        assert_eq!(err.to_string(), "OPERATOR_MOD operator is not yet supported");

        let err = ExpressionError::InvalidExpressionType {
            kind: ExpressionType::AggregateSum,
            context: "expression factory",
        };
        assert_eq!(
            err.to_string(),
            "Invalid ExpressionType 'AGGREGATE_SUM' requested from expression factory"
        );

        let err = ExpressionError::InvalidOperandTypes {
            operator: "+",
            left_type: ValueType::Integer,
            right_type: Some(ValueType::Varchar),
        };
        assert_eq!(
            err.to_string(),
            "Invalid operand types for operator +: left=INTEGER, right=Some(Varchar)"
        );

        let err = ExpressionError::ColumnIndexOutOfBounds {
            index: 5,
            tuple_size: 3,
        };
        assert_eq!(
            err.to_string(),
            "Column index 5 out of bounds for tuple with 3 columns"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(ExpressionError::malformed("x").is_malformed_plan());
        assert!(!ExpressionError::malformed("x").is_construction_error());
        assert!(ExpressionError::UnsupportedOperator {
            kind: ExpressionType::OperatorCast
        }
        .is_construction_error());
        assert!(ExpressionError::InvalidExpressionType {
            kind: ExpressionType::Invalid,
            context: "expression factory",
        }
        .is_construction_error());
        assert!(!ExpressionError::DivisionByZero.is_construction_error());
    }
}
