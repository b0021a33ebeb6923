//! MySQL-family dialect.

use super::Driver;

/// Driver for MySQL and MariaDB: backtick quoting, MySQL physical types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDriver;

impl Driver for MysqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn type_map(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("pk", "int(11) NOT NULL AUTO_INCREMENT PRIMARY KEY"),
            ("string", "varchar(255)"),
            ("text", "text"),
            ("smallint", "smallint(6)"),
            ("integer", "int(11)"),
            ("bigint", "bigint(20)"),
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
