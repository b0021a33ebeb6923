//! # squill
//!
//! A dialect-aware SQL statement compiler with a connection and transaction
//! lifecycle, minus any execution layer.
//!
//! ## Features
//!
//! - **Typed query specifications**: [`QuerySpec`] and [`Condition`] describe
//!   statements as data; the compiler turns them into SQL text
//! - **Dialect strategies**: MySQL, PostgreSQL and SQLite quoting and type
//!   maps behind the [`Driver`] trait, resolved through an injectable
//!   [`DriverRegistry`]
//! - **Full statement surface**: SELECT with joins, grouping, unions and
//!   pagination; parameterized INSERT/UPDATE/DELETE; schema DDL
//! - **Explicit lifecycle**: [`Connection`] owns the open/close state machine
//!   and hands out consume-once [`Transaction`] handles
//! - **Pluggable execution**: the physical link sits behind the
//!   [`Link`]/[`LinkFactory`] seam, so any client library (or a test mock)
//!   can drive it
//!
//! ## Building statements
//!
//! ```ignore
//! use squill::{Condition, DriverRegistry, QueryBuilder, QuerySpec};
//!
//! let driver = DriverRegistry::default().resolve("mysql")?;
//! let builder = QueryBuilder::new(driver);
//!
//! let query = QuerySpec::new()
//!     .select("id, name")
//!     .from("users")
//!     .filter(Condition::and([
//!         Condition::hash([("status", 1)]),
//!         Condition::between("age", 18, 65),
//!     ]))
//!     .order_by("name")
//!     .limit(10);
//!
//! let sql = builder.build(&query)?;
//! // SELECT `id`, `name` FROM `users`
//! //   WHERE (`status`=1) AND (`age` BETWEEN 18 AND 65)
//! //   ORDER BY `name` LIMIT 10
//! ```
//!
//! ## Connection lifecycle
//!
//! ```ignore
//! use squill::{Connection, ConnectionConfig, DriverRegistry};
//!
//! let config = ConnectionConfig {
//!     dsn: "mysql:host=localhost;dbname=app".to_string(),
//!     charset: Some("utf8".to_string()),
//!     ..ConnectionConfig::default()
//! };
//! let mut conn = Connection::new(config, DriverRegistry::default(), factory);
//! let mut tx = conn.begin_transaction()?;
//! // ... execute statements through the link ...
//! tx.commit(&mut conn)?;
//! ```

pub mod builder;
pub mod compiler;
pub mod condition;
pub mod connection;
pub mod driver;
pub mod error;
pub mod expression;
pub mod json;
pub mod query;
pub mod transaction;
pub mod value;

pub use builder::{ColumnDef, QueryBuilder};
pub use compiler::ConditionCompiler;
pub use condition::{Condition, HashValue, Operand, Operator, RowValue};
pub use connection::{Connection, ConnectionConfig, Link, LinkError, LinkFactory};
pub use driver::{Driver, DriverRegistry, MysqlDriver, PostgresDriver, SqliteDriver};
pub use error::{SquillError, SquillResult};
pub use expression::{ColumnValue, Expression};
pub use json::{column_values_from_json, condition_from_json, value_from_json};
pub use query::{Join, NameList, QuerySpec, Union};
pub use transaction::Transaction;
pub use value::{Params, Value};
