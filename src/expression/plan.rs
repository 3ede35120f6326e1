//! Read access to serialized plan nodes.
//!
//! The planner ships each expression node as a JSON object. Field lookups
//! here turn absent or out-of-range fields into `MalformedPlan` errors so the
//! factories can read fields with `?` and never build half-initialized nodes.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::access::ValueType;
use crate::expression::{ExpressionError, ExpressionResult, ExpressionType};

/// The fields every plan node carries.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanHeader {
    #[serde(rename = "TYPE")]
    pub expression_type: String,
    #[serde(rename = "VALUE_TYPE", default)]
    pub value_type: Option<String>,
    #[serde(rename = "VALUE_SIZE", default)]
    pub value_size: i32,
}

impl PlanHeader {
    pub fn expression_type(&self) -> ExpressionResult<ExpressionType> {
        ExpressionType::from_name(&self.expression_type).ok_or_else(|| {
            ExpressionError::malformed(format!(
                "unknown expression type name {:?}",
                self.expression_type
            ))
        })
    }

    /// The declared value type; nodes that omit it are `Invalid`.
    pub fn value_type(&self) -> ExpressionResult<ValueType> {
        match &self.value_type {
            None => Ok(ValueType::Invalid),
            Some(name) => ValueType::from_name(name).ok_or_else(|| {
                ExpressionError::malformed(format!("unknown value type name {:?}", name))
            }),
        }
    }
}

/// One serialized expression node.
#[derive(Debug, Clone, Copy)]
pub struct PlanNode<'a> {
    json: &'a JsonValue,
}

impl<'a> PlanNode<'a> {
    pub fn new(json: &'a JsonValue) -> ExpressionResult<Self> {
        if !json.is_object() {
            return Err(ExpressionError::malformed(format!(
                "expression node must be a JSON object, got {}",
                json
            )));
        }
        Ok(Self { json })
    }

    pub fn json(&self) -> &'a JsonValue {
        self.json
    }

    pub fn header(&self) -> ExpressionResult<PlanHeader> {
        PlanHeader::deserialize(self.json)
            .map_err(|e| ExpressionError::malformed(format!("invalid expression header: {}", e)))
    }

    /// A field's value. JSON `null` counts as absent.
    pub fn field(&self, name: &str) -> Option<&'a JsonValue> {
        self.json.get(name).filter(|value| !value.is_null())
    }

    pub fn require(&self, name: &str, context: &str) -> ExpressionResult<&'a JsonValue> {
        self.field(name).ok_or_else(|| {
            ExpressionError::malformed(format!("{}: could not find {} value", context, name))
        })
    }

    /// A required non-negative integer field.
    pub fn index(&self, name: &str, context: &str) -> ExpressionResult<usize> {
        let value = self.require(name, context)?;
        let raw = value.as_i64().ok_or_else(|| {
            ExpressionError::malformed(format!(
                "{}: {} must be an integer, got {}",
                context, name, value
            ))
        })?;
        usize::try_from(raw).map_err(|_| {
            ExpressionError::malformed(format!("{}: invalid {} {}", context, name, raw))
        })
    }

    /// A required string field.
    pub fn string(&self, name: &str, context: &str) -> ExpressionResult<&'a str> {
        let value = self.require(name, context)?;
        value.as_str().ok_or_else(|| {
            ExpressionError::malformed(format!(
                "{}: {} must be a string, got {}",
                context, name, value
            ))
        })
    }

    /// An optional child node.
    pub fn child(&self, name: &str) -> ExpressionResult<Option<PlanNode<'a>>> {
        self.field(name).map(PlanNode::new).transpose()
    }
}

/// Read and parse a JSON plan document from disk.
pub fn read_plan_file(path: &Path) -> Result<JsonValue> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read plan file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse plan file {}", path.display()))
}
