//! Expression tree node definitions.

use std::fmt;

use crate::access::Value;
use crate::expression::operator::{ArithmeticOperator, ComparisonOperator, ConjunctionOperator};
use crate::expression::{EvaluationContext, ExpressionResult, ExpressionType};

/// Literal leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValue {
    value: Value,
}

impl ConstantValue {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Leaf reading one query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterValue {
    index: usize,
}

impl ParameterValue {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    pub fn parameter_id(&self) -> usize {
        self.index
    }

    pub fn value<'a>(&self, context: &EvaluationContext<'a>) -> ExpressionResult<&'a Value> {
        context.parameter(self.index)
    }
}

/// Leaf reading one column of the current tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleValue {
    column_index: usize,
    table_name: String,
    column_name: String,
}

impl TupleValue {
    pub fn new(
        column_index: usize,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            column_index,
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    pub fn column_id(&self) -> usize {
        self.column_index
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn value<'a>(&self, context: &EvaluationContext<'a>) -> ExpressionResult<&'a Value> {
        context.column(self.column_index)
    }
}

/// Construction-time classification of a comparison operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    Constant,
    TupleColumn,
    Other,
}

/// A comparison operand taken apart by its [`OperandKind`].
///
/// Classification consumes the child node, so the leaf payload moves
/// straight into a specialized comparison without a second probe.
#[derive(Debug)]
pub enum Operand {
    Constant(ConstantValue),
    TupleColumn(TupleValue),
    Other(Box<Expression>),
}

impl Operand {
    pub fn classify(expression: Box<Expression>) -> Self {
        match *expression {
            Expression::ConstantValue(constant) => Operand::Constant(constant),
            Expression::TupleValue(tuple) => Operand::TupleColumn(tuple),
            other => Operand::Other(Box::new(other)),
        }
    }

    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Constant(_) => OperandKind::Constant,
            Operand::TupleColumn(_) => OperandKind::TupleColumn,
            Operand::Other(_) => OperandKind::Other,
        }
    }

    pub fn into_expression(self) -> Box<Expression> {
        match self {
            Operand::Constant(constant) => Box::new(Expression::ConstantValue(constant)),
            Operand::TupleColumn(tuple) => Box::new(Expression::TupleValue(tuple)),
            Operand::Other(expression) => expression,
        }
    }
}

/// Operands of a specialized comparison, one variant per ordered pair of
/// leaf kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum InlinedOperands {
    ConstantConstant(ConstantValue, ConstantValue),
    ConstantTuple(ConstantValue, TupleValue),
    TupleConstant(TupleValue, ConstantValue),
    TupleTuple(TupleValue, TupleValue),
}

impl InlinedOperands {
    pub fn kinds(&self) -> (OperandKind, OperandKind) {
        match self {
            InlinedOperands::ConstantConstant(..) => (OperandKind::Constant, OperandKind::Constant),
            InlinedOperands::ConstantTuple(..) => (OperandKind::Constant, OperandKind::TupleColumn),
            InlinedOperands::TupleConstant(..) => (OperandKind::TupleColumn, OperandKind::Constant),
            InlinedOperands::TupleTuple(..) => (OperandKind::TupleColumn, OperandKind::TupleColumn),
        }
    }
}

/// Expression tree node.
///
/// Children are exclusively owned, and a tree is never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Binary arithmetic
    Operator {
        op: ArithmeticOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Logical NOT over the left child
    OperatorNot { operand: Box<Expression> },

    /// Comparison that evaluates both children through [`Expression::evaluate`]
    Comparison {
        op: ComparisonOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// Comparison reading its leaf operands directly
    InlinedComparison {
        op: ComparisonOperator,
        operands: InlinedOperands,
    },

    Conjunction {
        op: ConjunctionOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    ConstantValue(ConstantValue),

    ParameterValue(ParameterValue),

    TupleValue(TupleValue),

    /// Address of the tuple being evaluated
    TupleAddress,
}

impl Expression {
    pub fn constant(value: Value) -> Self {
        Expression::ConstantValue(ConstantValue::new(value))
    }

    pub fn parameter(index: usize) -> Self {
        Expression::ParameterValue(ParameterValue::new(index))
    }

    pub fn tuple(
        column_index: usize,
        table_name: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Expression::TupleValue(TupleValue::new(column_index, table_name, column_name))
    }

    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Expression::Operator { op, .. } => op.expression_type(),
            Expression::OperatorNot { .. } => ExpressionType::OperatorNot,
            Expression::Comparison { op, .. } | Expression::InlinedComparison { op, .. } => {
                op.expression_type()
            }
            Expression::Conjunction { op, .. } => op.expression_type(),
            Expression::ConstantValue(_) => ExpressionType::ValueConstant,
            Expression::ParameterValue(_) => ExpressionType::ValueParameter,
            Expression::TupleValue(_) => ExpressionType::ValueTuple,
            Expression::TupleAddress => ExpressionType::ValueTupleAddress,
        }
    }

    pub fn is_specialized(&self) -> bool {
        matches!(self, Expression::InlinedComparison { .. })
    }

    /// The tuple-reference marker: present only on column leaves.
    pub fn as_tuple_value(&self) -> Option<&TupleValue> {
        match self {
            Expression::TupleValue(tuple) => Some(tuple),
            _ => None,
        }
    }

    /// The parameter-reference marker: present only on parameter leaves.
    pub fn as_parameter_value(&self) -> Option<&ParameterValue> {
        match self {
            Expression::ParameterValue(parameter) => Some(parameter),
            _ => None,
        }
    }

    pub fn as_constant_value(&self) -> Option<&ConstantValue> {
        match self {
            Expression::ConstantValue(constant) => Some(constant),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::Display for TupleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}#{}",
            self.table_name, self.column_name, self.column_index
        )
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Operator { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::OperatorNot { operand } => write!(f, "(NOT {})", operand),
            Expression::Comparison { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::InlinedComparison { op, operands } => {
                let op = op.as_str();
                match operands {
                    InlinedOperands::ConstantConstant(l, r) => write!(f, "({} {} {})", l, op, r),
                    InlinedOperands::ConstantTuple(l, r) => write!(f, "({} {} {})", l, op, r),
                    InlinedOperands::TupleConstant(l, r) => write!(f, "({} {} {})", l, op, r),
                    InlinedOperands::TupleTuple(l, r) => write!(f, "({} {} {})", l, op, r),
                }
            }
            Expression::Conjunction { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expression::ConstantValue(constant) => write!(f, "{}", constant),
            Expression::ParameterValue(parameter) => write!(f, "?{}", parameter.parameter_id()),
            Expression::TupleValue(tuple) => write!(f, "{}", tuple),
            Expression::TupleAddress => write!(f, "TUPLE_ADDRESS"),
        }
    }
}
