use planexpr::access::{Value, ValueType};
use planexpr::expression::{
    build_expression_tree, convert_if_all_parameter_values, convert_if_all_tuple_values,
    expression_factory, parameter_value, ComparisonOperator, EvaluationContext, Expression,
    ExpressionError, ExpressionType, OperandKind, PlanNode,
};
use rust_decimal::Decimal;
use serde_json::json;

const COMPARISONS: [ExpressionType; 6] = [
    ExpressionType::CompareEqual,
    ExpressionType::CompareNotEqual,
    ExpressionType::CompareLessThan,
    ExpressionType::CompareGreaterThan,
    ExpressionType::CompareLessThanOrEqualTo,
    ExpressionType::CompareGreaterThanOrEqualTo,
];

const OPERAND_KINDS: [OperandKind; 3] = [
    OperandKind::Constant,
    OperandKind::TupleColumn,
    OperandKind::Other,
];

/// An operand of the requested kind that reads `slot` from the tuple, the
/// constant pool, or the parameters, so every kind sees the same value.
fn operand(kind: OperandKind, slot: usize, values: &[Value]) -> Box<Expression> {
    match kind {
        OperandKind::Constant => Box::new(Expression::constant(values[slot].clone())),
        OperandKind::TupleColumn => Box::new(Expression::tuple(slot, "t", format!("c{}", slot))),
        OperandKind::Other => parameter_value(slot),
    }
}

fn build(
    expression_type: ExpressionType,
    left: Box<Expression>,
    right: Box<Expression>,
) -> Result<Box<Expression>, ExpressionError> {
    let json = json!({});
    expression_factory(
        &PlanNode::new(&json)?,
        expression_type,
        ValueType::Boolean,
        1,
        &mut Some(left),
        &mut Some(right),
    )
}

#[test]
fn test_specialization_selected_iff_no_other_operand() -> Result<(), ExpressionError> {
    let values = vec![Value::Integer(4), Value::BigInt(9)];

    for expression_type in COMPARISONS {
        for left_kind in OPERAND_KINDS {
            for right_kind in OPERAND_KINDS {
                let expr = build(
                    expression_type,
                    operand(left_kind, 0, &values),
                    operand(right_kind, 1, &values),
                )?;
                let expect_specialized =
                    left_kind != OperandKind::Other && right_kind != OperandKind::Other;
                assert_eq!(
                    expr.is_specialized(),
                    expect_specialized,
                    "{} with {:?}/{:?}",
                    expression_type,
                    left_kind,
                    right_kind
                );
                assert_eq!(expr.expression_type(), expression_type);
            }
        }
    }
    Ok(())
}

#[test]
fn test_specialized_and_generic_agree() -> Result<(), ExpressionError> {
    let pairs = vec![
        (Value::Integer(4), Value::BigInt(9)),
        (Value::BigInt(9), Value::TinyInt(9)),
        (Value::Double(2.5), Value::SmallInt(2)),
        (Value::Decimal(Decimal::new(105, 1)), Value::Double(10.5)),
        (Value::Varchar("abc".into()), Value::Varchar("abd".into())),
        (Value::Varbinary(vec![1, 2]), Value::Varbinary(vec![1])),
        (Value::Timestamp(100), Value::Timestamp(100)),
        (Value::null(ValueType::Integer), Value::Integer(1)),
        (Value::Varchar("x".into()), Value::null(ValueType::Varchar)),
    ];

    for (left, right) in pairs {
        let values = vec![left, right];
        let context = EvaluationContext::new(&values).with_parameters(&values);

        for expression_type in COMPARISONS {
            let generic = build(
                expression_type,
                operand(OperandKind::Other, 0, &values),
                operand(OperandKind::Other, 1, &values),
            )?;
            assert!(!generic.is_specialized());
            let expected = generic.evaluate(&context)?;

            for left_kind in [OperandKind::Constant, OperandKind::TupleColumn] {
                for right_kind in [OperandKind::Constant, OperandKind::TupleColumn] {
                    let specialized = build(
                        expression_type,
                        operand(left_kind, 0, &values),
                        operand(right_kind, 1, &values),
                    )?;
                    assert!(specialized.is_specialized());
                    assert_eq!(
                        specialized.evaluate(&context)?,
                        expected,
                        "{} on {:?}",
                        expression_type,
                        values
                    );
                }
            }
        }
    }
    Ok(())
}

#[test]
fn test_specialized_and_generic_agree_on_type_errors() -> Result<(), ExpressionError> {
    let values = vec![Value::Integer(1), Value::Varchar("1".into())];
    let context = EvaluationContext::new(&values).with_parameters(&values);

    let generic = build(
        ExpressionType::CompareEqual,
        operand(OperandKind::Other, 0, &values),
        operand(OperandKind::Other, 1, &values),
    )?;
    let specialized = build(
        ExpressionType::CompareEqual,
        operand(OperandKind::TupleColumn, 0, &values),
        operand(OperandKind::Constant, 1, &values),
    )?;
    assert!(generic.evaluate(&context).is_err());
    assert_eq!(generic.evaluate(&context), specialized.evaluate(&context));
    Ok(())
}

#[test]
fn test_reserved_operators_fail() {
    for expression_type in [
        ExpressionType::OperatorMod,
        ExpressionType::OperatorConcat,
        ExpressionType::OperatorCast,
    ] {
        let err = build(
            expression_type,
            Box::new(Expression::constant(Value::Integer(1))),
            Box::new(Expression::constant(Value::Integer(2))),
        )
        .unwrap_err();
        assert!(err.is_construction_error(), "{:?}", err);
        assert_eq!(
            err,
            ExpressionError::UnsupportedOperator {
                kind: expression_type
            }
        );
    }
}

#[test]
fn test_varbinary_hex_constant() -> Result<(), ExpressionError> {
    let plan = json!({"TYPE": "VALUE_CONSTANT", "VALUE_TYPE": "VARBINARY", "VALUE": "48656C6C6F"});
    let expr = build_expression_tree(&plan)?;
    let constant = expr.as_constant_value().expect("constant leaf");
    assert_eq!(
        constant.value(),
        &Value::Varbinary(vec![0x48, 0x65, 0x6C, 0x6C, 0x6F])
    );
    assert_eq!(constant.value(), &Value::Varbinary(b"Hello".to_vec()));
    Ok(())
}

#[test]
fn test_null_literal_for_every_value_type() -> Result<(), ExpressionError> {
    for value_type in ValueType::ALL {
        let plan = json!({
            "TYPE": "VALUE_CONSTANT",
            "VALUE_TYPE": value_type.name(),
            "VALUE": "NULL"
        });
        let expr = build_expression_tree(&plan)?;
        assert_eq!(*expr, Expression::constant(Value::null(value_type)));
    }

    // A VARCHAR literal spelled NULL is still the NULL sentinel.
    let plan = json!({"TYPE": "VALUE_CONSTANT", "VALUE_TYPE": "VARCHAR", "VALUE": "NULL"});
    let expr = build_expression_tree(&plan)?;
    assert!(expr.as_constant_value().is_some_and(|c| c.value().is_null()));
    Ok(())
}

#[test]
fn test_tuple_value_missing_table_name() {
    let plan = json!({
        "TYPE": "VALUE_TUPLE",
        "VALUE_TYPE": "INTEGER",
        "COLUMN_IDX": 0,
        "COLUMN_NAME": "a"
    });
    let result = build_expression_tree(&plan);
    assert!(matches!(result, Err(ExpressionError::MalformedPlan { .. })));
}

#[test]
fn test_convert_if_all_tuple_values_is_all_or_nothing() {
    let expressions = vec![
        Box::new(Expression::tuple(2, "t", "a")),
        Box::new(Expression::tuple(5, "t", "b")),
        Box::new(Expression::constant(Value::Integer(7))),
    ];
    assert_eq!(convert_if_all_tuple_values(&expressions), None);
    assert_eq!(convert_if_all_tuple_values(&expressions[..2]), Some(vec![2, 5]));
}

#[test]
fn test_convert_if_all_parameter_values_keeps_order() {
    let expressions: Vec<_> = [0, 1, 2].into_iter().map(parameter_value).collect();
    assert_eq!(
        convert_if_all_parameter_values(&expressions),
        Some(vec![0, 1, 2])
    );
    assert_eq!(convert_if_all_tuple_values(&expressions), None);
}

#[test]
fn test_undispatched_kinds_fail() -> Result<(), ExpressionError> {
    let json = json!({});
    let node = PlanNode::new(&json)?;
    for expression_type in ExpressionType::ALL {
        let dispatched = expression_type.is_operator()
            || expression_type.is_comparison()
            || matches!(
                expression_type,
                ExpressionType::ConjunctionAnd
                    | ExpressionType::ConjunctionOr
                    | ExpressionType::ValueConstant
                    | ExpressionType::ValueParameter
                    | ExpressionType::ValueTuple
                    | ExpressionType::ValueTupleAddress
            );
        if dispatched {
            continue;
        }
        let result = expression_factory(
            &node,
            expression_type,
            ValueType::Integer,
            4,
            &mut None,
            &mut None,
        );
        assert!(
            matches!(result, Err(ref e) if e.is_construction_error()),
            "{} should be rejected",
            expression_type
        );
    }
    Ok(())
}

#[test]
fn test_where_clause_end_to_end() -> Result<(), ExpressionError> {
    // price * 2 >= ? AND name LIKE 'wid%'
    let plan = json!({
        "TYPE": "CONJUNCTION_AND",
        "VALUE_TYPE": "BOOLEAN",
        "LEFT": {
            "TYPE": "COMPARE_GREATERTHANOREQUALTO",
            "VALUE_TYPE": "BOOLEAN",
            "LEFT": {
                "TYPE": "OPERATOR_MULTIPLY",
                "VALUE_TYPE": "INTEGER",
                "LEFT": {"TYPE": "VALUE_TUPLE", "VALUE_TYPE": "INTEGER",
                         "COLUMN_IDX": 1, "TABLE_NAME": "products", "COLUMN_NAME": "price"},
                "RIGHT": {"TYPE": "VALUE_CONSTANT", "VALUE_TYPE": "INTEGER", "VALUE": 2}
            },
            "RIGHT": {"TYPE": "VALUE_PARAMETER", "VALUE_TYPE": "INTEGER", "PARAM_IDX": 0}
        },
        "RIGHT": {
            "TYPE": "COMPARE_LIKE",
            "VALUE_TYPE": "BOOLEAN",
            "LEFT": {"TYPE": "VALUE_TUPLE", "VALUE_TYPE": "VARCHAR",
                     "COLUMN_IDX": 0, "TABLE_NAME": "products", "COLUMN_NAME": "name"},
            "RIGHT": {"TYPE": "VALUE_CONSTANT", "VALUE_TYPE": "VARCHAR", "VALUE": "wid%"}
        }
    });
    let expr = build_expression_tree(&plan)?;

    let params = vec![Value::Integer(20)];
    let widget = vec![Value::Varchar("widget".into()), Value::Integer(15)];
    let gadget = vec![Value::Varchar("gadget".into()), Value::Integer(15)];
    let cheap = vec![Value::Varchar("widget".into()), Value::Integer(5)];
    let unpriced = vec![Value::Varchar("widget".into()), Value::null(ValueType::Integer)];

    let eval = |tuple: &[Value]| {
        expr.evaluate_predicate(&EvaluationContext::new(tuple).with_parameters(&params))
    };
    assert!(eval(&widget)?);
    assert!(!eval(&gadget)?);
    assert!(!eval(&cheap)?);
    assert!(!eval(&unpriced)?);

    match &*expr {
        Expression::Conjunction { right, .. } => assert!(matches!(
            **right,
            Expression::Comparison {
                op: ComparisonOperator::Like,
                ..
            }
        )),
        other => panic!("expected conjunction, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_built_trees_are_shareable_across_threads() -> Result<(), ExpressionError> {
    let plan = json!({
        "TYPE": "COMPARE_LESSTHAN",
        "LEFT": {"TYPE": "VALUE_TUPLE", "COLUMN_IDX": 0, "TABLE_NAME": "t", "COLUMN_NAME": "a"},
        "RIGHT": {"TYPE": "VALUE_CONSTANT", "VALUE_TYPE": "BIGINT", "VALUE": 100}
    });
    let expr = std::sync::Arc::new(build_expression_tree(&plan)?);

    let handles: Vec<_> = (0..4i64)
        .map(|i| {
            let expr = expr.clone();
            std::thread::spawn(move || {
                let tuple = vec![Value::BigInt(i * 50)];
                expr.evaluate(&EvaluationContext::new(&tuple))
            })
        })
        .collect();

    let results = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        results,
        vec![
            Value::Boolean(true),
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Boolean(false)
        ]
    );
    Ok(())
}
