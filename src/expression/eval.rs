//! Expression evaluation implementation.

use crate::access::{Value, ValueType};
use crate::expression::operator::logical_not;
use crate::expression::{Expression, ExpressionError, ExpressionResult, InlinedOperands};

/// Per-tuple inputs an expression tree is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// The tuple values to evaluate against
    tuple: &'a [Value],
    /// Bound query parameters
    parameters: &'a [Value],
    tuple_address: Option<u64>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(tuple: &'a [Value]) -> Self {
        Self {
            tuple,
            parameters: &[],
            tuple_address: None,
        }
    }

    pub fn with_parameters(mut self, parameters: &'a [Value]) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_tuple_address(mut self, address: u64) -> Self {
        self.tuple_address = Some(address);
        self
    }

    pub fn column(&self, index: usize) -> ExpressionResult<&'a Value> {
        self.tuple
            .get(index)
            .ok_or(ExpressionError::ColumnIndexOutOfBounds {
                index,
                tuple_size: self.tuple.len(),
            })
    }

    pub fn parameter(&self, index: usize) -> ExpressionResult<&'a Value> {
        self.parameters
            .get(index)
            .ok_or(ExpressionError::ParameterIndexOutOfBounds {
                index,
                parameter_count: self.parameters.len(),
            })
    }

    pub fn tuple_address(&self) -> ExpressionResult<u64> {
        self.tuple_address
            .ok_or(ExpressionError::TupleAddressUnavailable)
    }
}

impl Expression {
    /// Evaluate this expression against one tuple.
    pub fn evaluate(&self, context: &EvaluationContext<'_>) -> ExpressionResult<Value> {
        match self {
            Expression::Operator { op, left, right } => {
                let left_val = left.evaluate(context)?;
                let right_val = right.evaluate(context)?;
                op.apply(&left_val, &right_val)
            }

            Expression::OperatorNot { operand } => logical_not(&operand.evaluate(context)?),

            Expression::Comparison { op, left, right } => {
                let left_val = left.evaluate(context)?;
                let right_val = right.evaluate(context)?;
                op.compare(&left_val, &right_val)
            }

            // Leaf operands are read in place, no intermediate copies.
            Expression::InlinedComparison { op, operands } => match operands {
                InlinedOperands::ConstantConstant(l, r) => op.compare(l.value(), r.value()),
                InlinedOperands::ConstantTuple(l, r) => op.compare(l.value(), r.value(context)?),
                InlinedOperands::TupleConstant(l, r) => op.compare(l.value(context)?, r.value()),
                InlinedOperands::TupleTuple(l, r) => {
                    op.compare(l.value(context)?, r.value(context)?)
                }
            },

            Expression::Conjunction { op, left, right } => {
                let left_val = left.evaluate(context)?;
                if let Some(result) = op.short_circuit(&left_val) {
                    return Ok(result);
                }
                let right_val = right.evaluate(context)?;
                op.apply(&left_val, &right_val)
            }

            Expression::ConstantValue(constant) => Ok(constant.value().clone()),

            Expression::ParameterValue(parameter) => parameter.value(context).cloned(),

            Expression::TupleValue(tuple) => tuple.value(context).cloned(),

            Expression::TupleAddress => {
                let address = context.tuple_address()?;
                i64::try_from(address)
                    .map(Value::BigInt)
                    .map_err(|_| ExpressionError::NumericOverflow {
                        operator: "tuple address",
                    })
            }
        }
    }

    /// Evaluate as a filter predicate: NULL and FALSE both reject the tuple.
    pub fn evaluate_predicate(&self, context: &EvaluationContext<'_>) -> ExpressionResult<bool> {
        match self.evaluate(context)? {
            Value::Boolean(b) => Ok(b),
            Value::Null(_) => Ok(false),
            other => Err(ExpressionError::InvalidOperandTypes {
                operator: "predicate",
                left_type: other.value_type(),
                right_type: Some(ValueType::Boolean),
            }),
        }
    }
}
