//! Expression type tags shared with the planner.

use std::fmt;

/// Every expression type the planner can emit.
///
/// The discriminants are the planner's wire codes. Aggregate and
/// `ValueNull` types are named here for diagnostics but no expression node
/// is built for them.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    Invalid = 0,

    OperatorPlus = 1,
    OperatorMinus = 2,
    OperatorMultiply = 3,
    OperatorDivide = 4,
    OperatorConcat = 5,
    OperatorMod = 6,
    OperatorCast = 7,
    OperatorNot = 8,

    CompareEqual = 10,
    CompareNotEqual = 11,
    CompareLessThan = 12,
    CompareGreaterThan = 13,
    CompareLessThanOrEqualTo = 14,
    CompareGreaterThanOrEqualTo = 15,
    CompareLike = 16,

    ConjunctionAnd = 20,
    ConjunctionOr = 21,

    ValueConstant = 30,
    ValueParameter = 31,
    ValueTuple = 32,
    ValueTupleAddress = 33,
    ValueNull = 34,

    AggregateCount = 40,
    AggregateCountStar = 41,
    AggregateSum = 42,
    AggregateMin = 43,
    AggregateMax = 44,
    AggregateAvg = 45,
}

impl ExpressionType {
    pub const ALL: [ExpressionType; 29] = [
        ExpressionType::Invalid,
        ExpressionType::OperatorPlus,
        ExpressionType::OperatorMinus,
        ExpressionType::OperatorMultiply,
        ExpressionType::OperatorDivide,
        ExpressionType::OperatorConcat,
        ExpressionType::OperatorMod,
        ExpressionType::OperatorCast,
        ExpressionType::OperatorNot,
        ExpressionType::CompareEqual,
        ExpressionType::CompareNotEqual,
        ExpressionType::CompareLessThan,
        ExpressionType::CompareGreaterThan,
        ExpressionType::CompareLessThanOrEqualTo,
        ExpressionType::CompareGreaterThanOrEqualTo,
        ExpressionType::CompareLike,
        ExpressionType::ConjunctionAnd,
        ExpressionType::ConjunctionOr,
        ExpressionType::ValueConstant,
        ExpressionType::ValueParameter,
        ExpressionType::ValueTuple,
        ExpressionType::ValueTupleAddress,
        ExpressionType::ValueNull,
        ExpressionType::AggregateCount,
        ExpressionType::AggregateCountStar,
        ExpressionType::AggregateSum,
        ExpressionType::AggregateMin,
        ExpressionType::AggregateMax,
        ExpressionType::AggregateAvg,
    ];

    pub fn from_i32(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|et| *et as i32 == code)
    }

    /// Look up an expression type by its planner name, e.g. `"COMPARE_EQUAL"`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|et| et.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpressionType::Invalid => "INVALID",
            ExpressionType::OperatorPlus => "OPERATOR_PLUS",
            ExpressionType::OperatorMinus => "OPERATOR_MINUS",
            ExpressionType::OperatorMultiply => "OPERATOR_MULTIPLY",
            ExpressionType::OperatorDivide => "OPERATOR_DIVIDE",
            ExpressionType::OperatorConcat => "OPERATOR_CONCAT",
            ExpressionType::OperatorMod => "OPERATOR_MOD",
            ExpressionType::OperatorCast => "OPERATOR_CAST",
            ExpressionType::OperatorNot => "OPERATOR_NOT",
            ExpressionType::CompareEqual => "COMPARE_EQUAL",
            ExpressionType::CompareNotEqual => "COMPARE_NOTEQUAL",
            ExpressionType::CompareLessThan => "COMPARE_LESSTHAN",
            ExpressionType::CompareGreaterThan => "COMPARE_GREATERTHAN",
            ExpressionType::CompareLessThanOrEqualTo => "COMPARE_LESSTHANOREQUALTO",
            ExpressionType::CompareGreaterThanOrEqualTo => "COMPARE_GREATERTHANOREQUALTO",
            ExpressionType::CompareLike => "COMPARE_LIKE",
            ExpressionType::ConjunctionAnd => "CONJUNCTION_AND",
            ExpressionType::ConjunctionOr => "CONJUNCTION_OR",
            ExpressionType::ValueConstant => "VALUE_CONSTANT",
            ExpressionType::ValueParameter => "VALUE_PARAMETER",
            ExpressionType::ValueTuple => "VALUE_TUPLE",
            ExpressionType::ValueTupleAddress => "VALUE_TUPLE_ADDRESS",
            ExpressionType::ValueNull => "VALUE_NULL",
            ExpressionType::AggregateCount => "AGGREGATE_COUNT",
            ExpressionType::AggregateCountStar => "AGGREGATE_COUNT_STAR",
            ExpressionType::AggregateSum => "AGGREGATE_SUM",
            ExpressionType::AggregateMin => "AGGREGATE_MIN",
            ExpressionType::AggregateMax => "AGGREGATE_MAX",
            ExpressionType::AggregateAvg => "AGGREGATE_AVG",
        }
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self,
            ExpressionType::OperatorPlus
                | ExpressionType::OperatorMinus
                | ExpressionType::OperatorMultiply
                | ExpressionType::OperatorDivide
                | ExpressionType::OperatorConcat
                | ExpressionType::OperatorMod
                | ExpressionType::OperatorCast
                | ExpressionType::OperatorNot
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            ExpressionType::CompareEqual
                | ExpressionType::CompareNotEqual
                | ExpressionType::CompareLessThan
                | ExpressionType::CompareGreaterThan
                | ExpressionType::CompareLessThanOrEqualTo
                | ExpressionType::CompareGreaterThanOrEqualTo
                | ExpressionType::CompareLike
        )
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name for a raw expression type code, for error messages.
///
/// Codes that match no expression type render as `UNKNOWN[code]`.
pub fn expression_type_name(code: i32) -> String {
    match ExpressionType::from_i32(code) {
        Some(et) => et.name().to_string(),
        None => format!("UNKNOWN[{}]", code),
    }
}
