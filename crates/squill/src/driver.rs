//! Dialect strategies: identifier quoting and abstract type mapping.
//!
//! A [`Driver`] is a stateless strategy for one DBMS family. The default
//! trait methods implement the qualifier-aware quoting shared by every
//! dialect; implementations override the quote characters and supply their
//! own abstract-to-physical type map.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MysqlDriver;
pub use postgres::PostgresDriver;
pub use sqlite::SqliteDriver;

use crate::error::{SquillError, SquillResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Dialect strategy for identifier quoting and column type mapping.
pub trait Driver: fmt::Debug + Send + Sync {
    /// The dialect name this driver serves.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote characters.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quote an unqualified table name.
    ///
    /// Names already containing the quote character pass through unchanged.
    fn quote_simple_table_name(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        if name.contains(open) {
            name.to_string()
        } else {
            format!("{open}{name}{close}")
        }
    }

    /// Quote a possibly schema-qualified table name.
    ///
    /// Tokens containing a parenthesis are treated as raw expressions and are
    /// never quoted; dotted qualifiers are quoted part by part.
    fn quote_table_name(&self, name: &str) -> String {
        if name.contains('(') {
            return name.to_string();
        }
        name.split('.')
            .map(|part| self.quote_simple_table_name(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote an unqualified column name. `*` passes through unchanged.
    fn quote_simple_column_name(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        if name == "*" || name.contains(open) {
            name.to_string()
        } else {
            format!("{open}{name}{close}")
        }
    }

    /// Quote a possibly table-qualified column name.
    ///
    /// The part before the last dot is quoted as a table name, the rest as a
    /// simple column name.
    fn quote_column_name(&self, name: &str) -> String {
        if name.contains('(') {
            return name.to_string();
        }
        match name.rfind('.') {
            Some(pos) => {
                let prefix = self.quote_table_name(&name[..pos]);
                let column = self.quote_simple_column_name(&name[pos + 1..]);
                format!("{prefix}.{column}")
            }
            None => self.quote_simple_column_name(name),
        }
    }

    /// Abstract column type tokens mapped to physical column types.
    fn type_map(&self) -> &'static [(&'static str, &'static str)];
}

/// Mapping from dialect keyword to [`Driver`] implementation.
///
/// The registry is an explicit configuration value passed into
/// [`Connection`](crate::connection::Connection) construction, which keeps
/// dialect choice test-injectable. An unmapped dialect is rejected when the
/// driver is resolved, not when the connection is opened.
#[derive(Debug, Clone)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn Driver>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Register a driver for a dialect keyword, replacing any previous entry.
    pub fn register(&mut self, dialect: impl Into<String>, driver: Arc<dyn Driver>) {
        self.drivers.insert(dialect.into().to_lowercase(), driver);
    }

    /// Resolve the driver for a dialect keyword.
    pub fn resolve(&self, dialect: &str) -> SquillResult<Arc<dyn Driver>> {
        self.drivers
            .get(&dialect.to_lowercase())
            .cloned()
            .ok_or_else(|| SquillError::UnsupportedDialect(dialect.to_string()))
    }

    /// The registered dialect keywords.
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.drivers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for DriverRegistry {
    /// Registry with the built-in dialects: `mysql`/`mysqli`, `pgsql`,
    /// `sqlite`/`sqlite2`.
    fn default() -> Self {
        let mut registry = Self::empty();
        let mysql: Arc<dyn Driver> = Arc::new(MysqlDriver);
        let pgsql: Arc<dyn Driver> = Arc::new(PostgresDriver);
        let sqlite: Arc<dyn Driver> = Arc::new(SqliteDriver);
        registry.register("mysql", Arc::clone(&mysql));
        registry.register("mysqli", mysql);
        registry.register("pgsql", pgsql);
        registry.register("sqlite", Arc::clone(&sqlite));
        registry.register("sqlite2", sqlite);
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_quotes_with_backticks() {
        let d = MysqlDriver;
        assert_eq!(d.quote_column_name("name"), "`name`");
        assert_eq!(d.quote_column_name("u.name"), "`u`.`name`");
        assert_eq!(d.quote_table_name("public.users"), "`public`.`users`");
    }

    #[test]
    fn postgres_quotes_with_double_quotes() {
        let d = PostgresDriver;
        assert_eq!(d.quote_column_name("name"), "\"name\"");
        assert_eq!(d.quote_table_name("users"), "\"users\"");
    }

    #[test]
    fn star_and_expressions_pass_through() {
        let d = MysqlDriver;
        assert_eq!(d.quote_column_name("*"), "*");
        assert_eq!(d.quote_column_name("t.*"), "`t`.*");
        assert_eq!(d.quote_column_name("COUNT(id)"), "COUNT(id)");
        assert_eq!(d.quote_table_name("(SELECT 1) t"), "(SELECT 1) t");
    }

    #[test]
    fn already_quoted_names_pass_through() {
        let d = MysqlDriver;
        assert_eq!(d.quote_column_name("`name`"), "`name`");
        let p = PostgresDriver;
        assert_eq!(p.quote_column_name("\"Name\""), "\"Name\"");
    }

    #[test]
    fn registry_resolves_case_insensitively() {
        let registry = DriverRegistry::default();
        assert_eq!(registry.resolve("MySQL").unwrap().name(), "mysql");
        assert_eq!(registry.resolve("sqlite2").unwrap().name(), "sqlite");
    }

    #[test]
    fn registry_rejects_unknown_dialect() {
        let registry = DriverRegistry::default();
        let err = registry.resolve("oci").unwrap_err();
        assert!(err.is_unsupported_dialect());
        assert!(err.to_string().contains("oci"));
    }

    #[test]
    fn registry_is_injectable() {
        let mut registry = DriverRegistry::empty();
        assert!(registry.resolve("mysql").is_err());
        registry.register("mysql", Arc::new(MysqlDriver));
        assert!(registry.resolve("mysql").is_ok());
    }
}
