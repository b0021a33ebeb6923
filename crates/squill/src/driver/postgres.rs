//! PostgreSQL-family dialect.

use super::Driver;

/// Driver for PostgreSQL: standard double-quote quoting, Postgres physical
/// types.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn name(&self) -> &'static str {
        "pgsql"
    }

    fn type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("pk", "serial NOT NULL PRIMARY KEY"),
            ("string", "varchar(255)"),
            ("text", "text"),
            ("smallint", "smallint"),
            ("integer", "integer"),
            ("bigint", "bigint"),
            ("boolean", "boolean"),
            ("float", "double precision"),
            ("decimal", "numeric"),
            ("datetime", "timestamp"),
            ("timestamp", "timestamp"),
            ("time", "time"),
            ("date", "date"),
            ("money", "numeric(19,4)"),
            ("binary", "bytea"),
        ]
    }
}
