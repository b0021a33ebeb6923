//! Condition values for dynamic WHERE/HAVING/ON clauses.
//!
//! A [`Condition`] is a recursive value with three shapes: a raw SQL string,
//! a hash of column/value pairs, or an operator applied to operands. The
//! operator keyword is kept as loosely-typed text until compile time, where
//! [`Operator::parse`] rejects anything outside the nine recognized keywords.
//!
//! # Example
//! ```ignore
//! use squill::Condition;
//!
//! // hash form: (status=1) AND (deleted_at IS NULL)
//! Condition::hash([("status", 1.into()), ("deleted_at", Option::<i32>::None.into())]);
//!
//! // operator form
//! Condition::and([
//!     Condition::between("age", 18, 65),
//!     Condition::in_list("status", [1, 2]),
//! ]);
//! ```

use crate::error::{SquillError, SquillResult};
use crate::value::Value;

/// The nine recognized condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Conjunction of sub-conditions
    And,
    /// Disjunction of sub-conditions
    Or,
    /// column BETWEEN low AND high
    Between,
    /// column NOT BETWEEN low AND high
    NotBetween,
    /// column IN (values) — also the composite multi-column form
    In,
    /// column NOT IN (values)
    NotIn,
    /// patterns joined with AND
    Like,
    /// patterns joined with AND, negated
    NotLike,
    /// patterns joined with OR
    OrLike,
    /// patterns joined with OR, negated
    OrNotLike,
}

impl Operator {
    /// Parse a keyword, case-insensitively.
    ///
    /// An unrecognized keyword is a [`SquillError::ConditionSyntax`] naming
    /// the offending operator; the compiler never guesses a default.
    pub fn parse(keyword: &str) -> SquillResult<Self> {
        match keyword.to_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            "BETWEEN" => Ok(Self::Between),
            "NOT BETWEEN" => Ok(Self::NotBetween),
            "IN" => Ok(Self::In),
            "NOT IN" => Ok(Self::NotIn),
            "LIKE" => Ok(Self::Like),
            "NOT LIKE" => Ok(Self::NotLike),
            "OR LIKE" => Ok(Self::OrLike),
            "OR NOT LIKE" => Ok(Self::OrNotLike),
            other => Err(SquillError::condition(format!(
                "found unknown operator in query: {other}"
            ))),
        }
    }

    /// The upper-case keyword as it appears in generated SQL.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::OrLike => "OR LIKE",
            Self::OrNotLike => "OR NOT LIKE",
        }
    }
}

/// The value side of a hash-form pair.
#[derive(Debug, Clone, PartialEq)]
pub enum HashValue {
    /// Equality (or `IS NULL` when the value is null)
    Value(Value),
    /// Membership test, recursing into the IN path
    List(Vec<Value>),
}

impl<T: Into<Value>> From<T> for HashValue {
    fn from(v: T) -> Self {
        HashValue::Value(v.into())
    }
}

/// One candidate value in an IN test.
#[derive(Debug, Clone, PartialEq)]
pub enum RowValue {
    /// A plain scalar
    Scalar(Value),
    /// Column-keyed tuple, used by composite IN; a column missing from the
    /// row maps to NULL in that position
    Row(Vec<(String, Value)>),
}

impl<T: Into<Value>> From<T> for RowValue {
    fn from(v: T) -> Self {
        RowValue::Scalar(v.into())
    }
}

/// An operand of an operator-form condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A nested condition (AND/OR operands)
    Condition(Box<Condition>),
    /// A single column token
    Column(String),
    /// A column list (composite IN)
    Columns(Vec<String>),
    /// A single scalar
    Value(Value),
    /// A list of candidate values
    Values(Vec<RowValue>),
}

impl From<Condition> for Operand {
    fn from(c: Condition) -> Self {
        Operand::Condition(Box::new(c))
    }
}

/// A condition specification consumed by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Pre-built SQL, passed through unmodified
    Raw(String),
    /// column/value pairs, each compiling to an equality, `IS NULL`, or IN
    /// test; pairs keep insertion order
    Hash(Vec<(String, HashValue)>),
    /// Operator keyword applied to operands; the keyword is validated when
    /// the condition is compiled
    Op {
        operator: String,
        operands: Vec<Operand>,
    },
}

impl Condition {
    /// A raw SQL condition.
    ///
    /// # Safety
    /// Be careful with SQL injection when using raw conditions.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    /// A hash-form condition from column/value pairs.
    pub fn hash<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<HashValue>,
    {
        Condition::Hash(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// An operator-form condition with a loosely-typed keyword.
    ///
    /// The keyword is validated at compile time, so this is the entry point
    /// for adapters translating external input.
    pub fn op(operator: impl Into<String>, operands: impl IntoIterator<Item = Operand>) -> Self {
        Condition::Op {
            operator: operator.into(),
            operands: operands.into_iter().collect(),
        }
    }

    /// Conjunction of sub-conditions.
    pub fn and(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::op("AND", conditions.into_iter().map(Operand::from))
    }

    /// Disjunction of sub-conditions.
    pub fn or(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::op("OR", conditions.into_iter().map(Operand::from))
    }

    /// column BETWEEN low AND high
    pub fn between(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::op(
            "BETWEEN",
            [
                Operand::Column(column.into()),
                Operand::Value(low.into()),
                Operand::Value(high.into()),
            ],
        )
    }

    /// column NOT BETWEEN low AND high
    pub fn not_between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::op(
            "NOT BETWEEN",
            [
                Operand::Column(column.into()),
                Operand::Value(low.into()),
                Operand::Value(high.into()),
            ],
        )
    }

    /// column IN (values...)
    pub fn in_list<V: Into<RowValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::op(
            "IN",
            [
                Operand::Column(column.into()),
                Operand::Values(values.into_iter().map(Into::into).collect()),
            ],
        )
    }

    /// column NOT IN (values...)
    pub fn not_in<V: Into<RowValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::op(
            "NOT IN",
            [
                Operand::Column(column.into()),
                Operand::Values(values.into_iter().map(Into::into).collect()),
            ],
        )
    }

    /// (c1, c2, ...) IN ((v1, v2, ...), ...) — composite membership test.
    pub fn in_columns<C: Into<String>>(
        columns: impl IntoIterator<Item = C>,
        rows: impl IntoIterator<Item = RowValue>,
    ) -> Self {
        Self::op(
            "IN",
            [
                Operand::Columns(columns.into_iter().map(Into::into).collect()),
                Operand::Values(rows.into_iter().collect()),
            ],
        )
    }

    /// column LIKE pattern(s), joined with AND
    pub fn like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::like_op("LIKE", column, patterns)
    }

    /// column NOT LIKE pattern(s), joined with AND
    pub fn not_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::like_op("NOT LIKE", column, patterns)
    }

    /// column LIKE pattern(s), joined with OR
    pub fn or_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::like_op("OR LIKE", column, patterns)
    }

    /// column NOT LIKE pattern(s), joined with OR
    pub fn or_not_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::like_op("OR NOT LIKE", column, patterns)
    }

    fn like_op<V: Into<Value>>(
        operator: &str,
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::op(
            operator,
            [
                Operand::Column(column.into()),
                Operand::Values(patterns.into_iter().map(|p| RowValue::Scalar(p.into())).collect()),
            ],
        )
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::raw(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::Raw(sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parse_is_case_insensitive() {
        assert_eq!(Operator::parse("between").unwrap(), Operator::Between);
        assert_eq!(Operator::parse("Not In").unwrap(), Operator::NotIn);
        assert_eq!(Operator::parse("or like").unwrap(), Operator::OrLike);
    }

    #[test]
    fn operator_parse_rejects_unknown_keyword() {
        let err = Operator::parse("XOR").unwrap_err();
        assert!(err.is_condition_syntax());
        assert!(err.to_string().contains("XOR"));
    }

    #[test]
    fn and_constructor_nests_conditions() {
        let c = Condition::and([Condition::raw("a=1"), Condition::raw("b=2")]);
        match c {
            Condition::Op { operator, operands } => {
                assert_eq!(operator, "AND");
                assert_eq!(operands.len(), 2);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }
}
