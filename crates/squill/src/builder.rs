//! Lowers query specifications into dialect-specific SQL statement text.
//!
//! [`QueryBuilder`] is the one component that knows clause ordering, DML
//! placeholder generation, and the DDL statement shapes. It never touches a
//! database; everything here is pure string construction over the active
//! [`Driver`]'s quoting rules and type map.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::compiler::ConditionCompiler;
use crate::condition::Condition;
use crate::driver::Driver;
use crate::error::{SquillError, SquillResult};
use crate::expression::ColumnValue;
use crate::query::{Join, NameList, QuerySpec, Union};
use crate::value::Params;

/// `expr AS alias` or `expr alias` in a select list; the alias is a plain
/// identifier.
static SELECT_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(?i:\s+as\s+|\s+)([\w\-.]+)$").unwrap());

/// `table AS alias` or `table alias` in a FROM or JOIN clause.
static TABLE_ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(?i:\s+as\s+|\s+)(.*)$").unwrap());

/// Trailing sort direction on an ORDER BY token.
static ORDER_DIRECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s+(asc|desc)$").unwrap());

/// Leading word of an abstract column type, e.g. `string` in
/// `string NOT NULL`.
static COLUMN_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\w+)\s+").unwrap());

/// One column in a CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDef {
    /// Named column with an abstract or physical type specification
    Named { name: String, type_spec: String },
    /// A raw fragment inserted verbatim, e.g. `PRIMARY KEY (id, name)`
    Raw(String),
}

impl ColumnDef {
    /// A named column definition.
    pub fn new(name: impl Into<String>, type_spec: impl Into<String>) -> Self {
        ColumnDef::Named {
            name: name.into(),
            type_spec: type_spec.into(),
        }
    }

    /// A raw table-level fragment.
    pub fn raw(sql: impl Into<String>) -> Self {
        ColumnDef::Raw(sql.into())
    }
}

/// Builds SQL statement text for one dialect.
///
/// The builder is stateless between calls; DML placeholder counters are local
/// to each `insert`/`update` invocation.
pub struct QueryBuilder {
    driver: Arc<dyn Driver>,
    /// Separator between statement clauses.
    pub separator: String,
    /// When disabled, all identifiers pass through unquoted.
    pub auto_quote: bool,
}

impl QueryBuilder {
    /// Create a builder over the given driver.
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            separator: " ".to_string(),
            auto_quote: true,
        }
    }

    /// The driver this builder quotes for.
    pub fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    fn compiler(&self) -> ConditionCompiler<'_> {
        ConditionCompiler::new(&*self.driver, self.auto_quote)
    }

    fn quote_table(&self, name: &str) -> String {
        if self.auto_quote {
            self.driver.quote_table_name(name)
        } else {
            name.to_string()
        }
    }

    fn quote_column(&self, name: &str) -> String {
        if self.auto_quote {
            self.driver.quote_column_name(name)
        } else {
            name.to_string()
        }
    }

    fn quote_simple_column(&self, name: &str) -> String {
        if self.auto_quote {
            self.driver.quote_simple_column_name(name)
        } else {
            name.to_string()
        }
    }

    /// Generate a complete SELECT statement from a query specification.
    ///
    /// Clauses appear in fixed order: SELECT, FROM, JOIN, WHERE, GROUP BY,
    /// HAVING, UNION, ORDER BY, LIMIT/OFFSET. Empty clauses are omitted and
    /// the rest are joined with [`separator`](Self::separator).
    pub fn build(&self, query: &QuerySpec) -> SquillResult<String> {
        let clauses = [
            self.build_select(query),
            self.build_from(query),
            self.build_join(query)?,
            self.build_where(query)?,
            self.build_group(query),
            self.build_having(query)?,
            self.build_union(query)?,
            self.build_order(query),
            self.build_limit(query),
        ];
        Ok(clauses
            .into_iter()
            .filter(|clause| !clause.is_empty())
            .collect::<Vec<_>>()
            .join(&self.separator))
    }

    fn build_select(&self, query: &QuerySpec) -> String {
        let mut select = if query.distinct {
            String::from("SELECT DISTINCT")
        } else {
            String::from("SELECT")
        };
        if let Some(option) = &query.select_option {
            select.push(' ');
            select.push_str(option);
        }

        let columns = match &query.select {
            Some(columns) if !columns.is_empty() => columns,
            _ => return format!("{select} *"),
        };
        if !self.auto_quote {
            return format!("{select} {}", columns.raw());
        }
        let Some(tokens) = columns.tokens() else {
            // text with a parenthesis is a raw expression list
            return format!("{select} {}", columns.raw());
        };
        let quoted: Vec<String> = tokens
            .iter()
            .map(|token| {
                if token.contains('(') {
                    token.clone()
                } else if let Some(caps) = SELECT_ALIAS_RE.captures(token) {
                    format!(
                        "{} AS {}",
                        self.driver.quote_column_name(&caps[1]),
                        self.driver.quote_simple_column_name(&caps[2])
                    )
                } else {
                    self.driver.quote_column_name(token)
                }
            })
            .collect();
        format!("{select} {}", quoted.join(", "))
    }

    fn quote_table_token(&self, token: &str) -> String {
        if !self.auto_quote || token.contains('(') {
            return token.to_string();
        }
        match TABLE_ALIAS_RE.captures(token) {
            Some(caps) => format!(
                "{} {}",
                self.driver.quote_table_name(&caps[1]),
                self.driver.quote_table_name(&caps[2])
            ),
            None => self.driver.quote_table_name(token),
        }
    }

    fn build_from(&self, query: &QuerySpec) -> String {
        let tables = match &query.from {
            Some(tables) if !tables.is_empty() => tables,
            _ => return String::new(),
        };
        if !self.auto_quote {
            return format!("FROM {}", tables.raw());
        }
        let Some(tokens) = tables.tokens() else {
            return format!("FROM {}", tables.raw());
        };
        let quoted: Vec<String> = tokens
            .iter()
            .map(|token| self.quote_table_token(token))
            .collect();
        format!("FROM {}", quoted.join(", "))
    }

    fn build_join(&self, query: &QuerySpec) -> SquillResult<String> {
        if query.joins.is_empty() {
            return Ok(String::new());
        }
        let mut clauses = Vec::with_capacity(query.joins.len());
        for join in &query.joins {
            clauses.push(self.build_join_clause(join)?);
        }
        Ok(clauses.join(&self.separator))
    }

    fn build_join_clause(&self, join: &Join) -> SquillResult<String> {
        if join.kind.trim().is_empty() || join.table.trim().is_empty() {
            return Err(SquillError::structural(
                "a join clause must specify its join type and table",
            ));
        }
        let mut clause = format!("{} {}", join.kind, self.quote_table_token(&join.table));
        if let Some(on) = &join.on {
            let condition = self.compiler().compile(on)?;
            if !condition.is_empty() {
                clause.push_str(" ON ");
                clause.push_str(&condition);
            }
        }
        Ok(clause)
    }

    fn build_where(&self, query: &QuerySpec) -> SquillResult<String> {
        let Some(condition) = &query.where_condition else {
            return Ok(String::new());
        };
        let sql = self.compiler().compile(condition)?;
        Ok(if sql.is_empty() {
            String::new()
        } else {
            format!("WHERE {sql}")
        })
    }

    fn build_group(&self, query: &QuerySpec) -> String {
        match &query.group_by {
            Some(columns) if !columns.is_empty() => {
                format!("GROUP BY {}", self.build_columns(columns))
            }
            _ => String::new(),
        }
    }

    fn build_having(&self, query: &QuerySpec) -> SquillResult<String> {
        let Some(condition) = &query.having else {
            return Ok(String::new());
        };
        let sql = self.compiler().compile(condition)?;
        Ok(if sql.is_empty() {
            String::new()
        } else {
            format!("HAVING {sql}")
        })
    }

    fn build_order(&self, query: &QuerySpec) -> String {
        let columns = match &query.order_by {
            Some(columns) if !columns.is_empty() => columns,
            _ => return String::new(),
        };
        if !self.auto_quote {
            return format!("ORDER BY {}", columns.raw());
        }
        let Some(tokens) = columns.tokens() else {
            return format!("ORDER BY {}", columns.raw());
        };
        let quoted: Vec<String> = tokens
            .iter()
            .map(|token| {
                if token.contains('(') {
                    token.clone()
                } else if let Some(caps) = ORDER_DIRECTION_RE.captures(token) {
                    // the direction keyword keeps the caller's casing
                    format!("{} {}", self.driver.quote_column_name(&caps[1]), &caps[2])
                } else {
                    self.driver.quote_column_name(token)
                }
            })
            .collect();
        format!("ORDER BY {}", quoted.join(", "))
    }

    fn build_limit(&self, query: &QuerySpec) -> String {
        let mut sql = String::new();
        if let Some(limit) = query.limit {
            sql = format!("LIMIT {limit}");
        }
        if query.offset > 0 {
            if !sql.is_empty() {
                sql.push(' ');
            }
            sql.push_str(&format!("OFFSET {}", query.offset));
        }
        sql
    }

    fn build_union(&self, query: &QuerySpec) -> SquillResult<String> {
        if query.unions.is_empty() {
            return Ok(String::new());
        }
        let mut members = Vec::with_capacity(query.unions.len());
        for union in &query.unions {
            members.push(match union {
                Union::Raw(sql) => sql.clone(),
                Union::Query(nested) => self.build(nested)?,
            });
        }
        Ok(format!("UNION (\n{}\n)", members.join("\n) UNION (\n")))
    }

    /// Quote and join a column list, leaving parenthesized expressions alone.
    fn build_columns(&self, columns: &NameList) -> String {
        if !self.auto_quote {
            return columns.raw();
        }
        let Some(tokens) = columns.tokens() else {
            return columns.raw();
        };
        tokens
            .iter()
            .map(|token| {
                if token.contains('(') {
                    token.clone()
                } else {
                    self.driver.quote_column_name(token)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Generate an INSERT statement and its parameter map.
    ///
    /// Literal values bind through `:p0`, `:p1`, ... placeholders numbered
    /// locally to this call; expression values splice their SQL verbatim and
    /// merge their own parameters.
    pub fn insert<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[(S, ColumnValue)],
    ) -> (String, Params) {
        let mut names = Vec::with_capacity(columns.len());
        let mut placeholders = Vec::with_capacity(columns.len());
        let mut params = Params::new();
        let mut count = 0;
        for (name, value) in columns {
            names.push(self.quote_column(name.as_ref()));
            match value {
                ColumnValue::Expr(expression) => {
                    placeholders.push(expression.expression.clone());
                    params.merge(&expression.params);
                }
                ColumnValue::Literal(value) => {
                    let placeholder = format!(":p{count}");
                    placeholders.push(placeholder.clone());
                    params.insert(placeholder, value.clone());
                    count += 1;
                }
            }
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote_table(table),
            names.join(", "),
            placeholders.join(", ")
        );
        (sql, params)
    }

    /// Generate an UPDATE statement and its parameter map.
    ///
    /// The WHERE clause is appended only when the compiled condition is
    /// non-empty; caller-supplied `params` are carried through the returned
    /// map.
    pub fn update<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[(S, ColumnValue)],
        condition: Option<&Condition>,
        params: Params,
    ) -> SquillResult<(String, Params)> {
        let mut lines = Vec::with_capacity(columns.len());
        let mut params = params;
        let mut count = 0;
        for (name, value) in columns {
            let name = self.quote_simple_column(name.as_ref());
            match value {
                ColumnValue::Expr(expression) => {
                    lines.push(format!("{name}={}", expression.expression));
                    params.merge(&expression.params);
                }
                ColumnValue::Literal(value) => {
                    let placeholder = format!(":p{count}");
                    lines.push(format!("{name}={placeholder}"));
                    params.insert(placeholder, value.clone());
                    count += 1;
                }
            }
        }
        let mut sql = format!("UPDATE {} SET {}", self.quote_table(table), lines.join(", "));
        if let Some(condition) = condition {
            let where_sql = self.compiler().compile(condition)?;
            if !where_sql.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }
        Ok((sql, params))
    }

    /// Generate a DELETE statement and its parameter map.
    pub fn delete(
        &self,
        table: &str,
        condition: Option<&Condition>,
        params: Params,
    ) -> SquillResult<(String, Params)> {
        let mut sql = format!("DELETE FROM {}", self.quote_table(table));
        if let Some(condition) = condition {
            let where_sql = self.compiler().compile(condition)?;
            if !where_sql.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&where_sql);
            }
        }
        Ok((sql, params))
    }

    /// Generate a CREATE TABLE statement.
    ///
    /// Named columns run their type specification through
    /// [`get_column_type`](Self::get_column_type); raw definitions are
    /// inserted verbatim.
    pub fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDef],
        options: Option<&str>,
    ) -> String {
        let cols: Vec<String> = columns
            .iter()
            .map(|column| match column {
                ColumnDef::Named { name, type_spec } => {
                    format!(
                        "\t{} {}",
                        self.quote_column(name),
                        self.get_column_type(type_spec)
                    )
                }
                ColumnDef::Raw(sql) => format!("\t{sql}"),
            })
            .collect();
        let sql = format!(
            "CREATE TABLE {} (\n{}\n)",
            self.quote_table(table),
            cols.join(",\n")
        );
        match options {
            Some(options) => format!("{sql} {options}"),
            None => sql,
        }
    }

    /// Generate a RENAME TABLE statement.
    pub fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote_table(old_name),
            self.quote_table(new_name)
        )
    }

    /// Generate a DROP TABLE statement.
    pub fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_table(table))
    }

    /// Generate a TRUNCATE TABLE statement.
    pub fn truncate_table(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.quote_table(table))
    }

    /// Generate an ALTER TABLE ... ADD statement for a new column.
    pub fn add_column(&self, table: &str, column: &str, type_spec: &str) -> String {
        format!(
            "ALTER TABLE {} ADD {} {}",
            self.quote_table(table),
            self.quote_column(column),
            self.get_column_type(type_spec)
        )
    }

    /// Generate an ALTER TABLE ... DROP COLUMN statement.
    pub fn drop_column(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_table(table),
            self.quote_simple_column(column)
        )
    }

    /// Generate an ALTER TABLE ... RENAME COLUMN statement.
    pub fn rename_column(&self, table: &str, old_name: &str, new_name: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_table(table),
            self.quote_simple_column(old_name),
            self.quote_simple_column(new_name)
        )
    }

    /// Generate an ALTER TABLE ... CHANGE statement redefining a column.
    pub fn alter_column(&self, table: &str, column: &str, type_spec: &str) -> String {
        let column = self.quote_simple_column(column);
        format!(
            "ALTER TABLE {} CHANGE {column} {column} {}",
            self.quote_table(table),
            self.get_column_type(type_spec)
        )
    }

    /// Generate an ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY statement.
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key(
        &self,
        name: &str,
        table: &str,
        columns: impl Into<NameList>,
        ref_table: &str,
        ref_columns: impl Into<NameList>,
        on_delete: Option<&str>,
        on_update: Option<&str>,
    ) -> String {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_table(table),
            self.quote_column(name),
            self.build_columns(&columns.into()),
            self.quote_table(ref_table),
            self.build_columns(&ref_columns.into())
        );
        if let Some(action) = on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action);
        }
        if let Some(action) = on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action);
        }
        sql
    }

    /// Generate an ALTER TABLE ... DROP CONSTRAINT statement.
    pub fn drop_foreign_key(&self, name: &str, table: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_table(table),
            self.quote_column(name)
        )
    }

    /// Generate a CREATE [UNIQUE] INDEX statement.
    pub fn create_index(
        &self,
        name: &str,
        table: &str,
        columns: impl Into<NameList>,
        unique: bool,
    ) -> String {
        format!(
            "{} {} ON {} ({})",
            if unique {
                "CREATE UNIQUE INDEX"
            } else {
                "CREATE INDEX"
            },
            self.quote_table(name),
            self.quote_table(table),
            self.build_columns(&columns.into())
        )
    }

    /// Generate a DROP INDEX statement.
    pub fn drop_index(&self, name: &str, table: &str) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_table(name),
            self.quote_table(table)
        )
    }

    /// Convert an abstract column type into the driver's physical type.
    ///
    /// An exact match on the type map wins; otherwise the leading word is
    /// looked up and replaced while the remainder (e.g. `NOT NULL`) is kept.
    /// Anything unrecognized passes through unchanged.
    pub fn get_column_type(&self, type_spec: &str) -> String {
        let map = self.driver.type_map();
        let lookup = |token: &str| {
            map.iter()
                .find(|(abstract_type, _)| *abstract_type == token)
                .map(|(_, physical)| *physical)
        };
        if let Some(physical) = lookup(type_spec) {
            return physical.to_string();
        }
        if let Some(caps) = COLUMN_TYPE_RE.captures(type_spec) {
            let leading = caps.get(1).unwrap();
            if let Some(physical) = lookup(leading.as_str()) {
                return format!("{physical}{}", &type_spec[leading.end()..]);
            }
        }
        type_spec.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::driver::{MysqlDriver, PostgresDriver};
    use crate::expression::Expression;
    use crate::value::Value;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(Arc::new(MysqlDriver))
    }

    #[test]
    fn empty_query_selects_star() {
        let sql = builder().build(&QuerySpec::new()).unwrap();
        assert_eq!(sql, "SELECT *");
    }

    #[test]
    fn clauses_appear_in_fixed_order() {
        let query = QuerySpec::new()
            .select("id, name")
            .from("users")
            .filter(Condition::hash([("status", 1)]))
            .group_by("name")
            .having(Condition::raw("COUNT(*) > 1"))
            .order_by("id")
            .limit(10)
            .offset(20);
        let sql = builder().build(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT `id`, `name` FROM `users` WHERE `status`=1 \
             GROUP BY `name` HAVING COUNT(*) > 1 ORDER BY `id` LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn distinct_and_select_option() {
        let query = QuerySpec::new()
            .distinct()
            .select_option("SQL_CALC_FOUND_ROWS")
            .select("id")
            .from("users");
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT DISTINCT SQL_CALC_FOUND_ROWS `id` FROM `users`");
    }

    #[test]
    fn select_aliases_are_quoted() {
        let query = QuerySpec::new().select("u.name AS author, age stage").from("users u");
        let sql = builder().build(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT `u`.`name` AS `author`, `age` AS `stage` FROM `users` `u`"
        );
    }

    #[test]
    fn parenthesized_select_text_passes_through() {
        let query = QuerySpec::new().select("COUNT(*), name").from("users");
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT COUNT(*), name FROM `users`");
    }

    #[test]
    fn function_call_in_select_list_passes_through() {
        let query = QuerySpec::new()
            .select(["COUNT(id)", "name"])
            .from("users");
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT COUNT(id), `name` FROM `users`");
    }

    #[test]
    fn join_emits_on_condition() {
        let query = QuerySpec::new()
            .from("orders o")
            .left_join("users u", Condition::raw("o.user_id = u.id"));
        let sql = builder().build(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `orders` `o` LEFT JOIN `users` `u` ON o.user_id = u.id"
        );
    }

    #[test]
    fn join_without_table_is_rejected() {
        let query = QuerySpec::new()
            .from("orders")
            .join(Join::new("LEFT JOIN", "", None));
        let err = builder().build(&query).unwrap_err();
        assert!(err.to_string().contains("join"));
    }

    #[test]
    fn empty_where_condition_omits_the_clause() {
        let query = QuerySpec::new()
            .from("users")
            .filter(Condition::hash(Vec::<(&str, Value)>::new()));
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM `users`");
    }

    #[test]
    fn union_members_are_wrapped() {
        let query = QuerySpec::new()
            .from("a")
            .union("SELECT id FROM b")
            .union_query(QuerySpec::new().from("c"));
        let sql = builder().build(&query).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `a` UNION (\nSELECT id FROM b\n) UNION (\nSELECT * FROM `c`\n)"
        );
    }

    #[test]
    fn order_direction_keeps_caller_casing() {
        let query = QuerySpec::new().from("users").order_by("name desc, id ASC");
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM `users` ORDER BY `name` desc, `id` ASC");
    }

    #[test]
    fn offset_without_limit_stands_alone() {
        let query = QuerySpec::new().from("users").offset(5);
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM `users` OFFSET 5");
    }

    #[test]
    fn zero_offset_is_omitted() {
        let query = QuerySpec::new().from("users").limit(3);
        let sql = builder().build(&query).unwrap();
        assert_eq!(sql, "SELECT * FROM `users` LIMIT 3");
    }

    #[test]
    fn auto_quote_disabled_passes_identifiers_through() {
        let mut b = builder();
        b.auto_quote = false;
        let query = QuerySpec::new()
            .select("id, name")
            .from("users u")
            .filter(Condition::hash([("status", 1)]));
        let sql = b.build(&query).unwrap();
        assert_eq!(sql, "SELECT id, name FROM users u WHERE status=1");
    }

    #[test]
    fn building_twice_yields_identical_sql() {
        let query = QuerySpec::new()
            .select("id")
            .from("users")
            .filter(Condition::in_list("status", [1, 2]))
            .order_by("id");
        let b = builder();
        assert_eq!(b.build(&query).unwrap(), b.build(&query).unwrap());
    }

    #[test]
    fn insert_binds_literals_through_placeholders() {
        let (sql, params) = builder().insert(
            "users",
            &[("name", "Sam".into()), ("age", 30.into())],
        );
        assert_eq!(
            sql,
            "INSERT INTO `users` (`name`, `age`) VALUES (:p0, :p1)"
        );
        assert_eq!(params.get(":p0"), Some(&Value::Text("Sam".into())));
        assert_eq!(params.get(":p1"), Some(&Value::Int(30)));
    }

    #[test]
    fn insert_splices_expressions_and_merges_their_params() {
        let (sql, params) = builder().insert(
            "log",
            &[
                ("created_at", ColumnValue::expr(Expression::new("NOW()"))),
                (
                    "level",
                    ColumnValue::expr(Expression::with_params(":lvl + 1", [(":lvl", 2)])),
                ),
                ("message", "hi".into()),
            ],
        );
        assert_eq!(
            sql,
            "INSERT INTO `log` (`created_at`, `level`, `message`) VALUES (NOW(), :lvl + 1, :p0)"
        );
        assert_eq!(params.len(), 2);
        assert_eq!(params.get(":lvl"), Some(&Value::Int(2)));
        assert_eq!(params.get(":p0"), Some(&Value::Text("hi".into())));
    }

    #[test]
    fn update_appends_where_only_when_nonempty() {
        let b = builder();
        let condition = Condition::raw("age > 30");
        let (sql, params) = b
            .update("users", &[("status", 1.into())], Some(&condition), Params::new())
            .unwrap();
        assert_eq!(sql, "UPDATE `users` SET `status`=:p0 WHERE age > 30");
        assert_eq!(params.get(":p0"), Some(&Value::Int(1)));

        let empty = Condition::hash(Vec::<(&str, Value)>::new());
        let (sql, _) = b
            .update("users", &[("status", 1.into())], Some(&empty), Params::new())
            .unwrap();
        assert_eq!(sql, "UPDATE `users` SET `status`=:p0");
    }

    #[test]
    fn delete_with_and_without_condition() {
        let b = builder();
        let (sql, _) = b.delete("users", None, Params::new()).unwrap();
        assert_eq!(sql, "DELETE FROM `users`");

        let condition = Condition::hash([("status", 0)]);
        let (sql, _) = b.delete("users", Some(&condition), Params::new()).unwrap();
        assert_eq!(sql, "DELETE FROM `users` WHERE `status`=0");
    }

    #[test]
    fn create_table_maps_abstract_types() {
        let sql = builder().create_table(
            "users",
            &[
                ColumnDef::new("id", "pk"),
                ColumnDef::new("name", "string NOT NULL"),
                ColumnDef::raw("PRIMARY KEY (id)"),
            ],
            Some("ENGINE=InnoDB"),
        );
        assert_eq!(
            sql,
            "CREATE TABLE `users` (\n\
             \t`id` int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY,\n\
             \t`name` varchar(255) NOT NULL,\n\
             \tPRIMARY KEY (id)\n\
             ) ENGINE=InnoDB"
        );
    }

    #[test]
    fn get_column_type_resolution_order() {
        let b = builder();
        assert_eq!(b.get_column_type("string"), "varchar(255)");
        assert_eq!(b.get_column_type("string NOT NULL"), "varchar(255) NOT NULL");
        assert_eq!(b.get_column_type("varchar(32)"), "varchar(32)");
    }

    #[test]
    fn get_column_type_follows_the_driver() {
        let b = QueryBuilder::new(Arc::new(PostgresDriver));
        assert_eq!(b.get_column_type("pk"), "serial NOT NULL PRIMARY KEY");
        assert_eq!(b.get_column_type("binary"), "bytea");
    }

    #[test]
    fn table_ddl_statements() {
        let b = builder();
        assert_eq!(b.rename_table("old", "new"), "RENAME TABLE `old` TO `new`");
        assert_eq!(b.drop_table("users"), "DROP TABLE `users`");
        assert_eq!(b.truncate_table("users"), "TRUNCATE TABLE `users`");
    }

    #[test]
    fn column_ddl_statements() {
        let b = builder();
        assert_eq!(
            b.add_column("users", "email", "string"),
            "ALTER TABLE `users` ADD `email` varchar(255)"
        );
        assert_eq!(
            b.drop_column("users", "email"),
            "ALTER TABLE `users` DROP COLUMN `email`"
        );
        assert_eq!(
            b.rename_column("users", "email", "mail"),
            "ALTER TABLE `users` RENAME COLUMN `email` TO `mail`"
        );
        assert_eq!(
            b.alter_column("users", "age", "integer NOT NULL"),
            "ALTER TABLE `users` CHANGE `age` `age` int(11) NOT NULL"
        );
    }

    #[test]
    fn foreign_key_statements() {
        let b = builder();
        let sql = b.add_foreign_key(
            "fk_order_user",
            "orders",
            "user_id",
            "users",
            "id",
            Some("CASCADE"),
            None,
        );
        assert_eq!(
            sql,
            "ALTER TABLE `orders` ADD CONSTRAINT `fk_order_user` FOREIGN KEY (`user_id`) \
             REFERENCES `users` (`id`) ON DELETE CASCADE"
        );
        assert_eq!(
            b.drop_foreign_key("fk_order_user", "orders"),
            "ALTER TABLE `orders` DROP CONSTRAINT `fk_order_user`"
        );
    }

    #[test]
    fn index_statements() {
        let b = builder();
        assert_eq!(
            b.create_index("idx_name", "users", "name, email", false),
            "CREATE INDEX `idx_name` ON `users` (`name`, `email`)"
        );
        assert_eq!(
            b.create_index("idx_name", "users", "name", true),
            "CREATE UNIQUE INDEX `idx_name` ON `users` (`name`)"
        );
        assert_eq!(
            b.drop_index("idx_name", "users"),
            "DROP INDEX `idx_name` ON `users`"
        );
    }
}
