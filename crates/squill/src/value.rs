//! Scalar values, SQL literal rendering, and the named parameter map.
//!
//! [`Value`] is the dialect-independent scalar that appears in conditions and
//! column maps. [`Value::quote`] renders it as inline SQL text using the
//! manual escaping rules shared with [`Connection::quote_value`]
//! (embedded quotes doubled, control characters backslash-escaped).
//!
//! [`Params`] is the side-channel map of named placeholders (`:p0`, `:id`)
//! accumulated while a statement is compiled; the execution layer binds it
//! separately.
//!
//! [`Connection::quote_value`]: crate::connection::Connection::quote_value

use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

/// A scalar value in a query specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean, rendered as TRUE / FALSE
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text, quoted and escaped when rendered inline
    Text(String),
}

impl Value {
    /// Render the value as an inline SQL literal.
    ///
    /// Strings are wrapped in single quotes with embedded quotes doubled and
    /// `\0`, `\n`, `\r`, `\\` and `\x1a` backslash-escaped. Non-strings are
    /// emitted as their literal text.
    pub fn quote(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => quote_str(s),
        }
    }

    /// Whether this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Escape a string and wrap it in single quotes.
///
/// This is the fallback used when the underlying client library cannot quote
/// values natively: embedded `'` doubled, control characters and backslashes
/// backslash-escaped.
pub(crate) fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.quote())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Named placeholder map accumulated during statement compilation.
///
/// Keys are the exact placeholder tokens appearing in the generated SQL
/// (`:p0`, `:id`, ...). Insertion order is irrelevant; keys are unique and
/// the last write wins on collision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(HashMap<String, Value>);

impl Params {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value to a placeholder name. Last write wins.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a placeholder by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Merge another map into this one. Colliding keys take the other's value.
    pub fn merge(&mut self, other: &Params) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Number of bound placeholders.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over placeholder name / value pairs.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Value);
    type IntoIter = hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
