//! SQLite dialect.

use super::Driver;

/// Driver for SQLite 2/3: standard double-quote quoting, SQLite affinities.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl Driver for SqliteDriver {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("pk", "integer PRIMARY KEY AUTOINCREMENT NOT NULL"),
            ("string", "varchar(255)"),
            ("text", "text"),
            ("smallint", "smallint"),
            ("integer", "integer"),
            ("bigint", "bigint"),
            ("boolean", "tinyint(1)"),
            ("float", "float"),
            ("decimal", "decimal"),
            ("datetime", "datetime"),
            ("timestamp", "timestamp"),
            ("time", "time"),
            ("date", "date"),
            ("money", "decimal(19,4)"),
            ("binary", "blob"),
        ]
    }
}
