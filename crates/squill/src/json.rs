//! Adapter for loosely-typed JSON input.
//!
//! Conditions and column maps often arrive as untyped data, e.g. from a
//! request body or a config file. This module maps [`serde_json::Value`]
//! trees onto the crate's typed shapes, keeping the same forgiving grammar
//! at the boundary while everything past it stays strictly typed:
//!
//! - a JSON string is a raw condition,
//! - a JSON object is a hash condition (`{"status": 1, "id": [1, 2]}`),
//! - a JSON array is an operator form: `["and", {...}, "age > 30"]`,
//!   `["between", "age", 18, 65]`, `["in", "id", [1, 2, 3]]`,
//!   `["in", ["a", "b"], [{"a": 1, "b": 2}]]`.
//!
//! Unknown operator keywords are rejected at compile time by
//! [`Operator::parse`], exactly as for hand-built conditions.

use serde_json::Value as Json;

use crate::condition::{Condition, HashValue, Operand, Operator, RowValue};
use crate::error::{SquillError, SquillResult};
use crate::expression::ColumnValue;
use crate::value::Value;

/// Convert a JSON scalar into a [`Value`].
///
/// Arrays and objects are rejected; they are structure, not scalars.
pub fn value_from_json(json: &Json) -> SquillResult<Value> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(SquillError::condition(format!(
                    "number {n} does not fit a supported scalar"
                )))
            }
        }
        Json::String(s) => Ok(Value::Text(s.clone())),
        other => Err(SquillError::condition(format!(
            "expected a scalar value, got {other}"
        ))),
    }
}

/// Convert a JSON tree into a [`Condition`].
pub fn condition_from_json(json: &Json) -> SquillResult<Condition> {
    match json {
        Json::String(sql) => Ok(Condition::raw(sql.clone())),
        Json::Object(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (column, value) in map {
                pairs.push((column.clone(), hash_value_from_json(value)?));
            }
            Ok(Condition::Hash(pairs))
        }
        Json::Array(items) => {
            let Some((operator, rest)) = items.split_first() else {
                return Err(SquillError::condition(
                    "an operator condition cannot be empty",
                ));
            };
            let Json::String(keyword) = operator else {
                return Err(SquillError::condition(format!(
                    "the operator keyword must be a string, got {operator}"
                )));
            };
            let operands = operands_from_json(Operator::parse(keyword)?, rest)?;
            Ok(Condition::op(keyword.clone(), operands))
        }
        other => Err(SquillError::condition(format!(
            "unsupported condition shape: {other}"
        ))),
    }
}

/// Convert a JSON object into an ordered column map for INSERT/UPDATE.
///
/// Every value must be a scalar; expressions cannot be represented in plain
/// JSON and must be attached through [`ColumnValue::expr`] afterwards.
pub fn column_values_from_json(json: &Json) -> SquillResult<Vec<(String, ColumnValue)>> {
    let Json::Object(map) = json else {
        return Err(SquillError::condition(format!(
            "expected an object of column values, got {json}"
        )));
    };
    let mut columns = Vec::with_capacity(map.len());
    for (name, value) in map {
        columns.push((name.clone(), ColumnValue::Literal(value_from_json(value)?)));
    }
    Ok(columns)
}

fn hash_value_from_json(json: &Json) -> SquillResult<HashValue> {
    match json {
        Json::Array(items) => {
            let values = items
                .iter()
                .map(value_from_json)
                .collect::<SquillResult<Vec<_>>>()?;
            Ok(HashValue::List(values))
        }
        scalar => Ok(HashValue::Value(value_from_json(scalar)?)),
    }
}

fn operands_from_json(operator: Operator, rest: &[Json]) -> SquillResult<Vec<Operand>> {
    match operator {
        Operator::And | Operator::Or => rest
            .iter()
            .map(|item| Ok(Operand::Condition(Box::new(condition_from_json(item)?))))
            .collect(),
        Operator::Between | Operator::NotBetween => {
            let [column, low, high] = rest else {
                return Err(SquillError::condition(format!(
                    "operator '{}' requires three operands",
                    operator.keyword()
                )));
            };
            Ok(vec![
                column_operand_from_json(column)?,
                Operand::Value(value_from_json(low)?),
                Operand::Value(value_from_json(high)?),
            ])
        }
        Operator::In
        | Operator::NotIn
        | Operator::Like
        | Operator::NotLike
        | Operator::OrLike
        | Operator::OrNotLike => {
            let [column, values] = rest else {
                return Err(SquillError::condition(format!(
                    "operator '{}' requires a column and a value list",
                    operator.keyword()
                )));
            };
            Ok(vec![
                column_operand_from_json(column)?,
                Operand::Values(row_values_from_json(values)?),
            ])
        }
    }
}

fn column_operand_from_json(json: &Json) -> SquillResult<Operand> {
    match json {
        Json::String(column) => Ok(Operand::Column(column.clone())),
        Json::Array(items) => {
            let columns = items
                .iter()
                .map(|item| match item {
                    Json::String(column) => Ok(column.clone()),
                    other => Err(SquillError::condition(format!(
                        "column names must be strings, got {other}"
                    ))),
                })
                .collect::<SquillResult<Vec<_>>>()?;
            Ok(Operand::Columns(columns))
        }
        other => Err(SquillError::condition(format!(
            "expected a column name or list, got {other}"
        ))),
    }
}

fn row_values_from_json(json: &Json) -> SquillResult<Vec<RowValue>> {
    let items = match json {
        Json::Array(items) => items.as_slice(),
        // a single bare scalar reads as a one-element list
        scalar => std::slice::from_ref(scalar),
    };
    items
        .iter()
        .map(|item| match item {
            Json::Object(row) => {
                let mut pairs = Vec::with_capacity(row.len());
                for (column, value) in row {
                    pairs.push((column.clone(), value_from_json(value)?));
                }
                Ok(RowValue::Row(pairs))
            }
            scalar => Ok(RowValue::Scalar(value_from_json(scalar)?)),
        })
        .collect()
}
