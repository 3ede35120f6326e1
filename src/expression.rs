//! Expression trees built from serialized query plans.
//!
//! This module provides:
//! - Expression type tags and their diagnostic names
//! - The closed set of expression node variants
//! - Factories that validate plan nodes and pick the most specialized
//!   node variant for each operation
//! - Evaluation of built trees against a tuple

pub mod error;
pub mod eval;
pub mod expr;
pub mod expression_type;
pub mod factory;
pub mod operator;
pub mod plan;

pub use error::{ExpressionError, ExpressionResult};
pub use eval::EvaluationContext;
pub use expr::{
    ConstantValue, Expression, InlinedOperands, Operand, OperandKind, ParameterValue, TupleValue,
};
pub use expression_type::{expression_type_name, ExpressionType};
pub use factory::{
    build_expression_tree, convert_if_all_parameter_values, convert_if_all_tuple_values,
    expression_factory, parameter_value,
};
pub use operator::{ArithmeticOperator, ComparisonOperator, ConjunctionOperator};
pub use plan::{PlanHeader, PlanNode};
