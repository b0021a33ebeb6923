//! Lowers [`Condition`] values into SQL boolean expression text.
//!
//! The compiler is pure: it reads only the condition and the active driver's
//! quoting rules, so independent compilations need no synchronization. All
//! malformed input (unknown operator keyword, wrong operand arity) fails here,
//! synchronously, never at execution time.

use crate::condition::{Condition, HashValue, Operand, Operator, RowValue};
use crate::driver::Driver;
use crate::error::{SquillError, SquillResult};
use crate::value::Value;

/// Compiles condition specifications against one dialect.
pub struct ConditionCompiler<'a> {
    driver: &'a dyn Driver,
    auto_quote: bool,
}

impl<'a> ConditionCompiler<'a> {
    /// Create a compiler for the given driver.
    ///
    /// With `auto_quote` disabled all column tokens pass through unchanged.
    pub fn new(driver: &'a dyn Driver, auto_quote: bool) -> Self {
        Self { driver, auto_quote }
    }

    /// Compile a condition into a SQL fragment.
    ///
    /// An empty hash or an all-empty junction compiles to the empty string;
    /// the caller omits the enclosing clause keyword entirely.
    pub fn compile(&self, condition: &Condition) -> SquillResult<String> {
        match condition {
            Condition::Raw(sql) => Ok(sql.clone()),
            Condition::Hash(pairs) => self.compile_hash(pairs),
            Condition::Op { operator, operands } => {
                let operator = Operator::parse(operator)?;
                match operator {
                    Operator::And | Operator::Or => self.compile_junction(operator, operands),
                    Operator::Between | Operator::NotBetween => {
                        self.compile_between(operator, operands)
                    }
                    Operator::In | Operator::NotIn => self.compile_in(operator, operands),
                    Operator::Like
                    | Operator::NotLike
                    | Operator::OrLike
                    | Operator::OrNotLike => self.compile_like(operator, operands),
                }
            }
        }
    }

    /// Quote a column token unless it is a raw expression.
    fn quote_column(&self, column: &str) -> String {
        if !self.auto_quote || column.contains('(') {
            column.to_string()
        } else {
            self.driver.quote_column_name(column)
        }
    }

    fn compile_hash(&self, pairs: &[(String, HashValue)]) -> SquillResult<String> {
        let mut parts = Vec::with_capacity(pairs.len());
        for (column, value) in pairs {
            match value {
                HashValue::List(values) => {
                    let operands = [
                        Operand::Column(column.clone()),
                        Operand::Values(values.iter().cloned().map(RowValue::Scalar).collect()),
                    ];
                    parts.push(self.compile_in(Operator::In, &operands)?);
                }
                HashValue::Value(value) => {
                    let column = self.quote_column(column);
                    if value.is_null() {
                        parts.push(format!("{column} IS NULL"));
                    } else {
                        parts.push(format!("{column}={}", value.quote()));
                    }
                }
            }
        }
        Ok(join_parenthesized(parts, "AND"))
    }

    fn compile_junction(&self, operator: Operator, operands: &[Operand]) -> SquillResult<String> {
        let mut parts = Vec::with_capacity(operands.len());
        for operand in operands {
            let fragment = match operand {
                Operand::Condition(condition) => self.compile(condition)?,
                Operand::Value(Value::Text(sql)) => sql.clone(),
                Operand::Column(sql) => sql.clone(),
                other => {
                    return Err(SquillError::condition(format!(
                        "operator '{}' cannot take operand {other:?}",
                        operator.keyword()
                    )));
                }
            };
            if !fragment.is_empty() {
                parts.push(fragment);
            }
        }
        Ok(join_parenthesized(parts, operator.keyword()))
    }

    fn compile_between(&self, operator: Operator, operands: &[Operand]) -> SquillResult<String> {
        let arity_err = || {
            SquillError::condition(format!(
                "operator '{}' requires three operands",
                operator.keyword()
            ))
        };
        let [column, low, high] = operands else {
            return Err(arity_err());
        };
        let column = self.quote_column(column_token(column).ok_or_else(arity_err)?);
        let low = scalar_token(low).ok_or_else(arity_err)?.quote();
        let high = scalar_token(high).ok_or_else(arity_err)?.quote();
        Ok(format!("{column} {} {low} AND {high}", operator.keyword()))
    }

    fn compile_in(&self, operator: Operator, operands: &[Operand]) -> SquillResult<String> {
        let arity_err = || {
            SquillError::condition(format!(
                "operator '{}' requires two operands",
                operator.keyword()
            ))
        };
        let [column, values] = operands else {
            return Err(arity_err());
        };
        let values = value_list(values).ok_or_else(arity_err)?;

        // Collapse a one-element column list to the simple form.
        let (column, composite) = match column {
            Operand::Column(name) => (name.as_str(), None),
            Operand::Columns(columns) if columns.len() == 1 => (columns[0].as_str(), None),
            Operand::Columns(columns) => ("", Some(columns)),
            _ => return Err(arity_err()),
        };

        if values.is_empty() || composite.is_some_and(|c| c.is_empty()) {
            // NOT IN over nothing imposes no restriction; IN over nothing can
            // never match.
            return Ok(if operator == Operator::In {
                "0=1".to_string()
            } else {
                String::new()
            });
        }

        if let Some(columns) = composite {
            return Ok(self.compile_composite_in(operator, columns, &values));
        }

        let rendered: Vec<String> = values
            .iter()
            .map(|value| match value {
                RowValue::Scalar(v) => v.quote(),
                RowValue::Row(pairs) => row_lookup(pairs, column).quote(),
            })
            .collect();
        let quoted = self.quote_column(column);

        if rendered.len() > 1 {
            Ok(format!(
                "{quoted} {} ({})",
                operator.keyword(),
                rendered.join(", ")
            ))
        } else {
            // Degenerate one-element set: an equality test ports better than
            // a one-element IN list.
            let cmp = if operator == Operator::In { "=" } else { "<>" };
            Ok(format!("{quoted}{cmp}{}", rendered[0]))
        }
    }

    fn compile_composite_in(
        &self,
        operator: Operator,
        columns: &[String],
        values: &[RowValue],
    ) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_column(c)).collect();
        let tuples: Vec<String> = values
            .iter()
            .map(|value| {
                let fields: Vec<String> = columns
                    .iter()
                    .map(|column| match value {
                        RowValue::Row(pairs) => row_lookup(pairs, column).quote(),
                        RowValue::Scalar(_) => Value::Null.quote(),
                    })
                    .collect();
                format!("({})", fields.join(", "))
            })
            .collect();
        format!(
            "({}) {} ({})",
            quoted.join(", "),
            operator.keyword(),
            tuples.join(", ")
        )
    }

    fn compile_like(&self, operator: Operator, operands: &[Operand]) -> SquillResult<String> {
        let arity_err = || {
            SquillError::condition(format!(
                "operator '{}' requires two operands",
                operator.keyword()
            ))
        };
        let [column, patterns] = operands else {
            return Err(arity_err());
        };
        let column = column_token(column).ok_or_else(arity_err)?;
        let patterns = value_list(patterns).ok_or_else(arity_err)?;

        if patterns.is_empty() {
            // Same include/exclude asymmetry as the empty IN set.
            return Ok(match operator {
                Operator::Like | Operator::OrLike => "0=1".to_string(),
                _ => String::new(),
            });
        }

        let (glue, keyword) = match operator {
            Operator::Like => (" AND ", "LIKE"),
            Operator::NotLike => (" AND ", "NOT LIKE"),
            Operator::OrLike => (" OR ", "LIKE"),
            _ => (" OR ", "NOT LIKE"),
        };
        let column = self.quote_column(column);
        let parts: Vec<String> = patterns
            .iter()
            .map(|pattern| match pattern {
                RowValue::Scalar(v) => Ok(format!("{column} {keyword} {}", v.quote())),
                RowValue::Row(_) => Err(arity_err()),
            })
            .collect::<SquillResult<_>>()?;
        Ok(parts.join(glue))
    }
}

/// Join fragments as `(a) OP (b) OP (c)`; a single fragment is emitted bare.
fn join_parenthesized(parts: Vec<String>, operator: &str) -> String {
    match parts.len() {
        0 => String::new(),
        1 => parts.into_iter().next().unwrap_or_default(),
        _ => format!("({})", parts.join(&format!(") {operator} ("))),
    }
}

fn column_token(operand: &Operand) -> Option<&str> {
    match operand {
        Operand::Column(name) => Some(name),
        Operand::Value(Value::Text(name)) => Some(name),
        _ => None,
    }
}

fn scalar_token(operand: &Operand) -> Option<&Value> {
    match operand {
        Operand::Value(value) => Some(value),
        _ => None,
    }
}

fn value_list(operand: &Operand) -> Option<Vec<RowValue>> {
    match operand {
        Operand::Values(values) => Some(values.clone()),
        Operand::Value(value) => Some(vec![RowValue::Scalar(value.clone())]),
        _ => None,
    }
}

fn row_lookup<'v>(pairs: &'v [(String, Value)], column: &str) -> &'v Value {
    pairs
        .iter()
        .find(|(name, _)| name == column)
        .map_or(&Value::Null, |(_, value)| value)
}
