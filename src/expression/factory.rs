//! Construction of expression nodes from serialized plan nodes.
//!
//! Children are built before their parent and handed over through
//! `&mut Option` slots. A factory takes a child out of its slot only once
//! the node is certain to be built; on error both slots are left as they
//! were, so the caller still owns its children.

use log::{debug, trace, warn};
use serde_json::Value as JsonValue;

use crate::access::{Value, ValueType};
use crate::expression::operator::{ArithmeticOperator, ComparisonOperator, ConjunctionOperator};
use crate::expression::plan::PlanNode;
use crate::expression::{
    Expression, ExpressionError, ExpressionResult, ExpressionType, InlinedOperands, Operand,
};

/// Build one expression node of type `expression_type`.
///
/// `value_type` is only consulted by constant leaves. `value_size` is
/// carried by the wire format but no node needs it.
pub fn expression_factory(
    node: &PlanNode<'_>,
    expression_type: ExpressionType,
    value_type: ValueType,
    value_size: i32,
    left: &mut Option<Box<Expression>>,
    right: &mut Option<Box<Expression>>,
) -> ExpressionResult<Box<Expression>> {
    trace!(
        "expression factory request: {} {} size={} left={} right={}",
        expression_type,
        value_type,
        value_size,
        left.is_some(),
        right.is_some()
    );

    let result = match expression_type {
        ExpressionType::OperatorPlus
        | ExpressionType::OperatorMinus
        | ExpressionType::OperatorMultiply
        | ExpressionType::OperatorDivide
        | ExpressionType::OperatorConcat
        | ExpressionType::OperatorMod
        | ExpressionType::OperatorCast
        | ExpressionType::OperatorNot => operator_factory(expression_type, left, right),

        ExpressionType::CompareEqual
        | ExpressionType::CompareNotEqual
        | ExpressionType::CompareLessThan
        | ExpressionType::CompareGreaterThan
        | ExpressionType::CompareLessThanOrEqualTo
        | ExpressionType::CompareGreaterThanOrEqualTo
        | ExpressionType::CompareLike => comparison_factory(expression_type, left, right),

        ExpressionType::ConjunctionAnd | ExpressionType::ConjunctionOr => {
            conjunction_factory(expression_type, left, right)
        }

        ExpressionType::ValueConstant => constant_value_factory(node, value_type),

        ExpressionType::ValueParameter => parameter_value_factory(node),

        ExpressionType::ValueTuple => tuple_value_factory(node),

        ExpressionType::ValueTupleAddress => Ok(Box::new(Expression::TupleAddress)),

        // Named for diagnostics only; the factory must refuse them.
        ExpressionType::Invalid
        | ExpressionType::ValueNull
        | ExpressionType::AggregateCount
        | ExpressionType::AggregateCountStar
        | ExpressionType::AggregateSum
        | ExpressionType::AggregateMin
        | ExpressionType::AggregateMax
        | ExpressionType::AggregateAvg => Err(ExpressionError::InvalidExpressionType {
            kind: expression_type,
            context: "expression factory",
        }),
    };

    match &result {
        Ok(expression) => trace!("created {} expression: {}", expression_type, expression),
        Err(e) if e.is_construction_error() => warn!("{}", e),
        Err(e) => debug!("rejected {} node: {}", expression_type, e),
    }
    result
}

/// Build a whole tree from a nested plan, children (`LEFT`, `RIGHT`) first.
pub fn build_expression_tree(json: &JsonValue) -> ExpressionResult<Box<Expression>> {
    let node = PlanNode::new(json)?;
    let header = node.header()?;
    let expression_type = header.expression_type()?;
    let value_type = header.value_type()?;

    let mut left = node
        .child("LEFT")?
        .map(|child| build_expression_tree(child.json()))
        .transpose()?;
    let mut right = node
        .child("RIGHT")?
        .map(|child| build_expression_tree(child.json()))
        .transpose()?;

    expression_factory(
        &node,
        expression_type,
        value_type,
        header.value_size,
        &mut left,
        &mut right,
    )
}

fn missing_child(expression_type: ExpressionType, side: &str) -> ExpressionError {
    ExpressionError::malformed(format!("{} requires a {} child", expression_type, side))
}

/// Take both children, or neither.
fn take_children(
    expression_type: ExpressionType,
    left: &mut Option<Box<Expression>>,
    right: &mut Option<Box<Expression>>,
) -> ExpressionResult<(Box<Expression>, Box<Expression>)> {
    match (left.take(), right.take()) {
        (Some(l), Some(r)) => Ok((l, r)),
        (l, r) => {
            let side = if l.is_none() { "left" } else { "right" };
            *left = l;
            *right = r;
            Err(missing_child(expression_type, side))
        }
    }
}

/// Build an operator node. `OPERATOR_NOT` takes only the left child and
/// leaves `right` in place.
pub fn operator_factory(
    expression_type: ExpressionType,
    left: &mut Option<Box<Expression>>,
    right: &mut Option<Box<Expression>>,
) -> ExpressionResult<Box<Expression>> {
    let op = match expression_type {
        ExpressionType::OperatorPlus => ArithmeticOperator::Plus,
        ExpressionType::OperatorMinus => ArithmeticOperator::Minus,
        ExpressionType::OperatorMultiply => ArithmeticOperator::Multiply,
        ExpressionType::OperatorDivide => ArithmeticOperator::Divide,
        ExpressionType::OperatorNot => {
            let operand = left
                .take()
                .ok_or_else(|| missing_child(expression_type, "left"))?;
            return Ok(Box::new(Expression::OperatorNot { operand }));
        }
        ExpressionType::OperatorMod
        | ExpressionType::OperatorConcat
        | ExpressionType::OperatorCast => {
            return Err(ExpressionError::UnsupportedOperator {
                kind: expression_type,
            })
        }
        other => {
            return Err(ExpressionError::InvalidExpressionType {
                kind: other,
                context: "operator factory",
            })
        }
    };

    let (left, right) = take_children(expression_type, left, right)?;
    Ok(Box::new(Expression::Operator { op, left, right }))
}

/// Build a comparison node, specializing when both operands are leaves
/// whose values can be read without evaluation.
pub fn comparison_factory(
    expression_type: ExpressionType,
    left: &mut Option<Box<Expression>>,
    right: &mut Option<Box<Expression>>,
) -> ExpressionResult<Box<Expression>> {
    let op = ComparisonOperator::from_expression_type(expression_type).ok_or(
        ExpressionError::InvalidExpressionType {
            kind: expression_type,
            context: "comparison factory",
        },
    )?;
    let (left, right) = take_children(expression_type, left, right)?;

    if !op.is_specializable() {
        return Ok(Box::new(Expression::Comparison { op, left, right }));
    }

    let operands = match (Operand::classify(left), Operand::classify(right)) {
        (Operand::Constant(l), Operand::Constant(r)) => InlinedOperands::ConstantConstant(l, r),
        (Operand::Constant(l), Operand::TupleColumn(r)) => InlinedOperands::ConstantTuple(l, r),
        (Operand::TupleColumn(l), Operand::Constant(r)) => InlinedOperands::TupleConstant(l, r),
        (Operand::TupleColumn(l), Operand::TupleColumn(r)) => InlinedOperands::TupleTuple(l, r),
        (l, r) => {
            return Ok(Box::new(Expression::Comparison {
                op,
                left: l.into_expression(),
                right: r.into_expression(),
            }))
        }
    };

    debug!(
        "specialized {} for operands {:?}",
        expression_type,
        operands.kinds()
    );
    Ok(Box::new(Expression::InlinedComparison { op, operands }))
}

pub fn conjunction_factory(
    expression_type: ExpressionType,
    left: &mut Option<Box<Expression>>,
    right: &mut Option<Box<Expression>>,
) -> ExpressionResult<Box<Expression>> {
    let op = ConjunctionOperator::from_expression_type(expression_type).ok_or(
        ExpressionError::InvalidExpressionType {
            kind: expression_type,
            context: "conjunction factory",
        },
    )?;
    let (left, right) = take_children(expression_type, left, right)?;
    Ok(Box::new(Expression::Conjunction { op, left, right }))
}

/// Decode a constant leaf. A `"NULL"` string literal yields the typed NULL
/// for `value_type` before any type-specific decoding.
pub fn constant_value_factory(
    node: &PlanNode<'_>,
    value_type: ValueType,
) -> ExpressionResult<Box<Expression>> {
    const CONTEXT: &str = "constant value";
    let raw = node.require("VALUE", CONTEXT)?;

    if raw.as_str() == Some("NULL") {
        return Ok(constant_value(Value::null(value_type)));
    }

    let value = decode_literal(raw, value_type)?;
    Ok(constant_value(value))
}

pub fn constant_value(value: Value) -> Box<Expression> {
    Box::new(Expression::constant(value))
}

/// Decode a non-NULL literal for `value_type`.
///
/// Integer literals are narrowed with a range check: a value that does not
/// fit the target width is a malformed plan rather than being truncated.
fn decode_literal(raw: &JsonValue, value_type: ValueType) -> ExpressionResult<Value> {
    let mismatch = || {
        ExpressionError::malformed(format!(
            "constant value: cannot decode {} as {}",
            raw, value_type
        ))
    };

    match value_type {
        ValueType::Invalid | ValueType::Null => Err(ExpressionError::malformed(format!(
            "constant value: value type should never be {}",
            value_type
        ))),

        ValueType::TinyInt | ValueType::SmallInt | ValueType::Integer | ValueType::BigInt => {
            let wide = literal_i64(raw).ok_or_else(mismatch)?;
            Value::integer(value_type, wide).ok_or_else(|| {
                ExpressionError::malformed(format!(
                    "constant value: {} is out of range for {}",
                    wide, value_type
                ))
            })
        }

        ValueType::Double => {
            let parsed = match raw {
                JsonValue::String(s) => s.trim().parse::<f64>().ok(),
                other => other.as_f64(),
            };
            parsed.map(Value::Double).ok_or_else(mismatch)
        }

        ValueType::Varchar => raw
            .as_str()
            .map(|s| Value::Varchar(s.to_string()))
            .ok_or_else(mismatch),

        ValueType::Varbinary => {
            let encoded = raw.as_str().ok_or_else(mismatch)?;
            Value::binary_from_hex(encoded)
                .map_err(|e| ExpressionError::malformed(format!("constant value: {:#}", e)))
        }

        ValueType::Timestamp => literal_i64(raw).map(Value::Timestamp).ok_or_else(mismatch),

        ValueType::Decimal => {
            let text = raw.as_str().ok_or_else(mismatch)?;
            Value::decimal_from_str(text)
                .map_err(|e| ExpressionError::malformed(format!("constant value: {:#}", e)))
        }

        ValueType::Boolean => Err(ExpressionError::malformed(format!(
            "constant value: unrecognized value type {}",
            value_type
        ))),
    }
}

/// Integers arrive either as JSON numbers or as decimal strings.
fn literal_i64(raw: &JsonValue) -> Option<i64> {
    match raw {
        JsonValue::String(s) => s.trim().parse().ok(),
        other => other.as_i64(),
    }
}

pub fn parameter_value_factory(node: &PlanNode<'_>) -> ExpressionResult<Box<Expression>> {
    let index = node.index("PARAM_IDX", "parameter value")?;
    Ok(parameter_value(index))
}

/// Build a parameter leaf without a serialized node.
pub fn parameter_value(index: usize) -> Box<Expression> {
    Box::new(Expression::parameter(index))
}

pub fn tuple_value_factory(node: &PlanNode<'_>) -> ExpressionResult<Box<Expression>> {
    const CONTEXT: &str = "tuple value";
    let column_index = node.index("COLUMN_IDX", CONTEXT)?;
    let table_name = node.string("TABLE_NAME", CONTEXT)?;
    let column_name = node.string("COLUMN_NAME", CONTEXT)?;
    Ok(Box::new(Expression::tuple(
        column_index,
        table_name,
        column_name,
    )))
}

/// Column ids of `expressions` if every one is a column leaf, else `None`.
pub fn convert_if_all_tuple_values(expressions: &[Box<Expression>]) -> Option<Vec<usize>> {
    let mut ids = Vec::with_capacity(expressions.len());
    for expression in expressions {
        ids.push(expression.as_tuple_value()?.column_id());
    }
    Some(ids)
}

/// Parameter ids of `expressions` if every one is a parameter leaf, else `None`.
pub fn convert_if_all_parameter_values(expressions: &[Box<Expression>]) -> Option<Vec<usize>> {
    let mut ids = Vec::with_capacity(expressions.len());
    for expression in expressions {
        ids.push(expression.as_parameter_value()?.parameter_id());
    }
    Some(ids)
}
