//! Raw SQL fragments that bypass quoting and parameterization.

use crate::value::{Params, Value};

/// An opaque SQL fragment paired with its own named parameters.
///
/// When an `Expression` appears as a column value in an insert or update, its
/// text is spliced into the statement verbatim and its parameters are merged
/// into the enclosing parameter map. This is the deliberate escape hatch for
/// things the value-quoting path must not touch, e.g. `NOW()`.
///
/// # Safety
/// The fragment is trusted as-is. Be careful with SQL injection when building
/// expressions from external input.
///
/// # Example
/// ```ignore
/// use squill::Expression;
///
/// let now = Expression::new("NOW()");
/// let offset = Expression::with_params("created_at + :days", [(":days", 7)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The literal SQL text.
    pub expression: String,
    /// Parameters referenced by the fragment.
    pub params: Params,
}

impl Expression {
    /// Create an expression without parameters.
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            params: Params::new(),
        }
    }

    /// Create an expression carrying its own named parameters.
    pub fn with_params<K, V>(
        expression: impl Into<String>,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            expression: expression.into(),
            params: params.into_iter().collect(),
        }
    }
}

impl From<&str> for Expression {
    fn from(sql: &str) -> Self {
        Expression::new(sql)
    }
}

impl From<String> for Expression {
    fn from(sql: String) -> Self {
        Expression::new(sql)
    }
}

/// A column's assigned value in an INSERT or UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// A literal value, bound through a generated `:pN` placeholder
    Literal(Value),
    /// An expression spliced verbatim, its parameters merged into the
    /// statement's parameter map
    Expr(Expression),
}

impl ColumnValue {
    /// A literal column value.
    pub fn literal(value: impl Into<Value>) -> Self {
        ColumnValue::Literal(value.into())
    }

    /// An expression column value.
    pub fn expr(expression: impl Into<Expression>) -> Self {
        ColumnValue::Expr(expression.into())
    }
}

impl From<Value> for ColumnValue {
    fn from(v: Value) -> Self {
        ColumnValue::Literal(v)
    }
}

impl From<Expression> for ColumnValue {
    fn from(e: Expression) -> Self {
        ColumnValue::Expr(e)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Literal(v.into())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Literal(v.into())
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Literal(v.into())
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Literal(v.into())
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Literal(v.into())
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Literal(v.into())
    }
}
