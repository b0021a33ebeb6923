//! The dialect-independent query specification.
//!
//! [`QuerySpec`] is the mutable aggregate describing one SELECT statement:
//! select list, sources, joins, conditions, grouping, ordering, pagination,
//! set operations, and the accumulated named parameter map. It carries no SQL
//! text itself; [`QueryBuilder`](crate::builder::QueryBuilder) lowers it.
//!
//! # Example
//! ```ignore
//! use squill::{Condition, QuerySpec};
//!
//! let query = QuerySpec::new()
//!     .select(["id", "name"])
//!     .from("users")
//!     .filter(Condition::hash([("status", 1)]))
//!     .order_by("id")
//!     .limit(10);
//! ```

use crate::condition::Condition;
use crate::value::{Params, Value};

/// A column or table list: either comma-delimited text (split and trimmed at
/// build time) or an ordered sequence of tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum NameList {
    /// Comma-delimited text; text containing a parenthesis is passed through
    /// as one raw expression
    Text(String),
    /// Ordered list of individual tokens
    List(Vec<String>),
}

impl NameList {
    /// Split into individual trimmed tokens.
    ///
    /// Returns `None` for text containing a parenthesis, which must be used
    /// verbatim.
    pub(crate) fn tokens(&self) -> Option<Vec<String>> {
        match self {
            NameList::Text(text) if text.contains('(') => None,
            NameList::Text(text) => Some(
                text.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            NameList::List(tokens) => Some(tokens.clone()),
        }
    }

    /// The raw text joined with commas, without any quoting.
    pub(crate) fn raw(&self) -> String {
        match self {
            NameList::Text(text) => text.clone(),
            NameList::List(tokens) => tokens.join(", "),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            NameList::Text(text) => text.trim().is_empty(),
            NameList::List(tokens) => tokens.is_empty(),
        }
    }
}

impl From<&str> for NameList {
    fn from(text: &str) -> Self {
        NameList::Text(text.to_string())
    }
}

impl From<String> for NameList {
    fn from(text: String) -> Self {
        NameList::Text(text)
    }
}

impl From<Vec<String>> for NameList {
    fn from(tokens: Vec<String>) -> Self {
        NameList::List(tokens)
    }
}

impl<const N: usize> From<[&str; N]> for NameList {
    fn from(tokens: [&str; N]) -> Self {
        NameList::List(tokens.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for NameList {
    fn from(tokens: &[&str]) -> Self {
        NameList::List(tokens.iter().map(|s| s.to_string()).collect())
    }
}

/// One join in a query specification.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Join type keyword, e.g. `LEFT JOIN`
    pub kind: String,
    /// Table token, optionally with an alias
    pub table: String,
    /// ON condition; `None` emits no ON clause
    pub on: Option<Condition>,
}

impl Join {
    /// Create a join from its type keyword, table, and optional condition.
    pub fn new(
        kind: impl Into<String>,
        table: impl Into<String>,
        on: Option<Condition>,
    ) -> Self {
        Self {
            kind: kind.into(),
            table: table.into(),
            on,
        }
    }
}

/// One member of a UNION list.
#[derive(Debug, Clone, PartialEq)]
pub enum Union {
    /// Pre-built SQL used verbatim
    Raw(String),
    /// A nested specification, built recursively
    Query(Box<QuerySpec>),
}

/// The abstract description of one SELECT statement.
///
/// All fields are public; the fluent methods are conveniences in the
/// consuming-builder style.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Select list; `None` selects `*`
    pub select: Option<NameList>,
    /// Emit SELECT DISTINCT
    pub distinct: bool,
    /// Extra modifier after SELECT [DISTINCT], e.g. `SQL_CALC_FOUND_ROWS`
    pub select_option: Option<String>,
    /// FROM list
    pub from: Option<NameList>,
    /// JOIN clauses, in order
    pub joins: Vec<Join>,
    /// WHERE condition
    pub where_condition: Option<Condition>,
    /// GROUP BY list
    pub group_by: Option<NameList>,
    /// HAVING condition
    pub having: Option<Condition>,
    /// ORDER BY list; tokens may carry a trailing `ASC`/`DESC`
    pub order_by: Option<NameList>,
    /// Row limit; unset emits no LIMIT clause
    pub limit: Option<u64>,
    /// Row offset; zero is omitted from output
    pub offset: u64,
    /// UNION members appended after HAVING
    pub unions: Vec<Union>,
    /// Named placeholders bound by the caller or accumulated by DML builders
    pub params: Params,
}

impl QuerySpec {
    /// Create an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the select list.
    pub fn select(mut self, columns: impl Into<NameList>) -> Self {
        self.select = Some(columns.into());
        self
    }

    /// Emit SELECT DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Set a select modifier emitted right after SELECT [DISTINCT].
    pub fn select_option(mut self, option: impl Into<String>) -> Self {
        self.select_option = Some(option.into());
        self
    }

    /// Set the FROM list.
    pub fn from(mut self, tables: impl Into<NameList>) -> Self {
        self.from = Some(tables.into());
        self
    }

    /// Add a join.
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add an INNER JOIN.
    pub fn inner_join(self, table: impl Into<String>, on: impl Into<Condition>) -> Self {
        self.join(Join::new("INNER JOIN", table, Some(on.into())))
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: impl Into<String>, on: impl Into<Condition>) -> Self {
        self.join(Join::new("LEFT JOIN", table, Some(on.into())))
    }

    /// Add a RIGHT JOIN.
    pub fn right_join(self, table: impl Into<String>, on: impl Into<Condition>) -> Self {
        self.join(Join::new("RIGHT JOIN", table, Some(on.into())))
    }

    /// Set the WHERE condition, replacing any previous one.
    pub fn filter(mut self, condition: impl Into<Condition>) -> Self {
        self.where_condition = Some(condition.into());
        self
    }

    /// AND a condition onto the existing WHERE.
    pub fn and_filter(mut self, condition: impl Into<Condition>) -> Self {
        self.where_condition = Some(match self.where_condition.take() {
            Some(existing) => Condition::and([existing, condition.into()]),
            None => condition.into(),
        });
        self
    }

    /// OR a condition onto the existing WHERE.
    pub fn or_filter(mut self, condition: impl Into<Condition>) -> Self {
        self.where_condition = Some(match self.where_condition.take() {
            Some(existing) => Condition::or([existing, condition.into()]),
            None => condition.into(),
        });
        self
    }

    /// Set the GROUP BY list.
    pub fn group_by(mut self, columns: impl Into<NameList>) -> Self {
        self.group_by = Some(columns.into());
        self
    }

    /// Set the HAVING condition.
    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.having = Some(condition.into());
        self
    }

    /// Set the ORDER BY list.
    pub fn order_by(mut self, columns: impl Into<NameList>) -> Self {
        self.order_by = Some(columns.into());
        self
    }

    /// Set the row limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the row offset. Zero is omitted from output.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Append a raw UNION member.
    pub fn union(mut self, sql: impl Into<String>) -> Self {
        self.unions.push(Union::Raw(sql.into()));
        self
    }

    /// Append a nested specification as a UNION member.
    pub fn union_query(mut self, query: QuerySpec) -> Self {
        self.unions.push(Union::Query(Box::new(query)));
        self
    }

    /// Bind one named placeholder.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Merge a parameter map into this specification. Last write wins.
    pub fn add_params(&mut self, params: &Params) {
        self.params.merge(params);
    }

    /// This specification's parameters folded together with those of every
    /// nested union member.
    pub fn collect_params(&self) -> Params {
        let mut all = self.params.clone();
        for union in &self.unions {
            if let Union::Query(query) = union {
                all.merge(&query.collect_params());
            }
        }
        all
    }
}
