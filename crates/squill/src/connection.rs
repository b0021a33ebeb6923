//! Connection lifecycle over an injected physical link.
//!
//! [`Connection`] owns the configuration, the resolved [`Driver`], and the
//! at-most-one open [`Link`]. The link itself is behind the [`LinkFactory`]
//! seam: statement execution belongs to the client library plugged in there,
//! while everything in this crate stays synchronous string work.
//!
//! State machine: `Closed -> Open -> Closed`. `open` and `close` are
//! re-entrant no-ops, so callers can open defensively before any operation
//! that needs a live link.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::builder::QueryBuilder;
use crate::driver::{Driver, DriverRegistry};
use crate::error::{SquillError, SquillResult};
use crate::transaction::Transaction;
use crate::value::quote_str;

/// `{{TableName}}` tokens replaced by table-prefix expansion.
static TABLE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

/// Failure reported by the physical link.
#[derive(Debug, Clone)]
pub struct LinkError {
    /// Human-readable message from the client library.
    pub message: String,
    /// Driver-level error code; zero when the library reports none.
    pub code: i32,
}

impl LinkError {
    /// Create a link error.
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// An open physical database link.
///
/// Implementations wrap a concrete client library. The default methods
/// signal "not supported", which makes the connection fall back to DSN-based
/// dialect detection and manual value escaping.
pub trait Link: Send {
    /// Execute a statement for its side effect.
    fn execute(&mut self, sql: &str) -> Result<(), LinkError>;

    /// The dialect keyword reported by the server, if the library exposes it.
    fn dialect_name(&self) -> Option<String> {
        None
    }

    /// Driver-native string quoting, if the library supports it.
    fn quote_value(&self, _raw: &str) -> Option<String> {
        None
    }
}

/// Creates physical links from connection credentials.
pub trait LinkFactory: Send {
    /// Open a link to the database described by `dsn`.
    fn connect(
        &self,
        dsn: &str,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Link>, LinkError>;
}

/// Connection settings.
#[derive(Debug, Clone, Default)]
pub struct ConnectionConfig {
    /// Data source name, `dialect:rest`, e.g. `mysql:host=localhost;dbname=app`.
    pub dsn: String,
    /// Username passed to the link factory.
    pub username: String,
    /// Password passed to the link factory.
    pub password: String,
    /// When set, `SET NAMES <charset>` runs right after the link opens.
    pub charset: Option<String>,
    /// Statements executed after the charset is applied, in order.
    pub init_sqls: Vec<String>,
    /// Prefix substituted for `{{TableName}}` tokens; `None` disables
    /// expansion entirely.
    pub table_prefix: Option<String>,
    /// Keep raw link error messages in returned errors. Off by default so
    /// credentials inside client messages never leak to callers.
    pub debug: bool,
}

/// A database connection: configuration, cached driver, and the link.
pub struct Connection {
    config: ConnectionConfig,
    registry: DriverRegistry,
    factory: Box<dyn LinkFactory>,
    link: Option<Box<dyn Link>>,
    driver: Option<Arc<dyn Driver>>,
    current_tx: Option<Arc<AtomicBool>>,
}

impl Connection {
    /// Create a closed connection.
    pub fn new(
        config: ConnectionConfig,
        registry: DriverRegistry,
        factory: Box<dyn LinkFactory>,
    ) -> Self {
        Self {
            config,
            registry,
            factory,
            link: None,
            driver: None,
            current_tx: None,
        }
    }

    /// Whether a link is currently open.
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Establish the link. Does nothing if one is already open.
    ///
    /// After connecting, the charset and init statements run; a failure there
    /// discards the link so the connection never ends up half-initialized.
    pub fn open(&mut self) -> SquillResult<()> {
        if self.link.is_some() {
            return Ok(());
        }
        if self.config.dsn.is_empty() {
            return Err(SquillError::configuration("connection dsn cannot be empty"));
        }
        tracing::debug!(dsn = %self.config.dsn, "opening database connection");
        let link = self
            .factory
            .connect(&self.config.dsn, &self.config.username, &self.config.password)
            .map_err(|err| {
                tracing::error!(dsn = %self.config.dsn, code = err.code, "failed to open database connection");
                wrap_link_error("failed to open database connection", err, self.config.debug)
            })?;
        self.link = Some(link);
        if let Err(err) = self.init_connection() {
            self.link = None;
            return Err(err);
        }
        Ok(())
    }

    /// Close the link. Does nothing if already closed.
    ///
    /// Drops the cached driver and marks any outstanding transaction handle
    /// inactive.
    pub fn close(&mut self) {
        if self.link.is_some() {
            tracing::debug!(dsn = %self.config.dsn, "closing database connection");
            self.link = None;
            self.driver = None;
            if let Some(flag) = self.current_tx.take() {
                flag.store(false, Ordering::SeqCst);
            }
        }
    }

    fn init_connection(&mut self) -> SquillResult<()> {
        if let Some(charset) = self.config.charset.clone() {
            let sql = format!("SET NAMES {}", self.quote_value(&charset));
            self.run(&sql)?;
        }
        for sql in self.config.init_sqls.clone() {
            self.run(&sql)?;
        }
        Ok(())
    }

    /// Execute a statement on the open link.
    pub(crate) fn run(&mut self, sql: &str) -> SquillResult<()> {
        let debug = self.config.debug;
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| SquillError::configuration("connection is not open"))?;
        link.execute(sql)
            .map_err(|err| wrap_link_error("statement failed on the connection", err, debug))
    }

    /// The dialect keyword: the DSN scheme when present, otherwise whatever
    /// the open link reports.
    pub fn dialect_name(&self) -> SquillResult<String> {
        if let Some(pos) = self.config.dsn.find(':') {
            return Ok(self.config.dsn[..pos].to_lowercase());
        }
        if let Some(name) = self.link.as_ref().and_then(|link| link.dialect_name()) {
            return Ok(name.to_lowercase());
        }
        Err(SquillError::configuration(
            "cannot determine the dialect from the dsn",
        ))
    }

    /// The driver for this connection's dialect, resolved once and cached.
    ///
    /// Resolution needs no open link as long as the DSN carries a scheme.
    pub fn driver(&mut self) -> SquillResult<Arc<dyn Driver>> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }
        let dialect = self.dialect_name()?;
        let driver = self.registry.resolve(&dialect)?;
        self.driver = Some(Arc::clone(&driver));
        Ok(driver)
    }

    /// A query builder bound to this connection's driver.
    pub fn query_builder(&mut self) -> SquillResult<QueryBuilder> {
        Ok(QueryBuilder::new(self.driver()?))
    }

    /// Quote a string as an inline SQL literal.
    ///
    /// Uses the link's native quoting when it is open and supports it, and
    /// the manual escaping rules otherwise.
    pub fn quote_value(&self, raw: &str) -> String {
        if let Some(quoted) = self.link.as_ref().and_then(|link| link.quote_value(raw)) {
            return quoted;
        }
        quote_str(raw)
    }

    /// Quote a possibly qualified table name with the connection's driver.
    pub fn quote_table_name(&mut self, name: &str) -> SquillResult<String> {
        Ok(self.driver()?.quote_table_name(name))
    }

    /// Quote a possibly qualified column name with the connection's driver.
    pub fn quote_column_name(&mut self, name: &str) -> SquillResult<String> {
        Ok(self.driver()?.quote_column_name(name))
    }

    /// Replace `{{TableName}}` tokens with the configured table prefix.
    ///
    /// With no prefix configured the statement passes through unchanged; an
    /// empty-string prefix strips the braces and keeps the bare name.
    pub fn expand_table_prefix(&self, sql: &str) -> String {
        match &self.config.table_prefix {
            Some(prefix) if sql.contains("{{") => TABLE_PREFIX_RE
                .replace_all(sql, format!("{prefix}$1"))
                .into_owned(),
            _ => sql.to_string(),
        }
    }

    /// Start a transaction, opening the connection first if needed.
    ///
    /// At most one transaction may be active; beginning another while one is
    /// active is a structural error rather than a silent nesting.
    pub fn begin_transaction(&mut self) -> SquillResult<Transaction> {
        self.open()?;
        if let Some(flag) = &self.current_tx {
            if flag.load(Ordering::SeqCst) {
                return Err(SquillError::structural(
                    "cannot begin a transaction while another is active",
                ));
            }
        }
        tracing::debug!("starting transaction");
        self.run("BEGIN")?;
        let flag = Arc::new(AtomicBool::new(true));
        self.current_tx = Some(Arc::clone(&flag));
        Ok(Transaction::new(flag))
    }
}

fn wrap_link_error(context: &str, err: LinkError, debug: bool) -> SquillError {
    let message = if debug {
        format!("{context}: {}", err.message)
    } else {
        context.to_string()
    };
    SquillError::Connection {
        message,
        code: err.code,
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    /// Records every executed statement; optionally fails on a marker.
    pub(crate) struct MockLink {
        pub(crate) log: Arc<Mutex<Vec<String>>>,
        pub(crate) fail_on: Option<String>,
        pub(crate) native_quote: bool,
    }

    impl Link for MockLink {
        fn execute(&mut self, sql: &str) -> Result<(), LinkError> {
            if let Some(marker) = &self.fail_on {
                if sql.contains(marker.as_str()) {
                    return Err(LinkError::new(format!("rejected: {sql}"), 1064));
                }
            }
            self.log.lock().unwrap().push(sql.to_string());
            Ok(())
        }

        fn quote_value(&self, raw: &str) -> Option<String> {
            self.native_quote.then(|| format!("N'{raw}'"))
        }
    }

    #[derive(Default)]
    pub(crate) struct MockFactory {
        pub(crate) log: Arc<Mutex<Vec<String>>>,
        pub(crate) connects: Arc<AtomicUsize>,
        pub(crate) refuse: bool,
        pub(crate) fail_on: Option<String>,
        pub(crate) native_quote: bool,
    }

    impl LinkFactory for MockFactory {
        fn connect(
            &self,
            _dsn: &str,
            _username: &str,
            _password: &str,
        ) -> Result<Box<dyn Link>, LinkError> {
            if self.refuse {
                return Err(LinkError::new("access denied for user 'root'", 1045));
            }
            self.connects.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MockLink {
                log: Arc::clone(&self.log),
                fail_on: self.fail_on.clone(),
                native_quote: self.native_quote,
            }))
        }
    }

    pub(crate) fn connection(config: ConnectionConfig, factory: MockFactory) -> Connection {
        Connection::new(config, DriverRegistry::default(), Box::new(factory))
    }

    pub(crate) fn mysql_config() -> ConnectionConfig {
        ConnectionConfig {
            dsn: "mysql:host=localhost;dbname=app".to_string(),
            ..ConnectionConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockFactory, connection, mysql_config};
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn open_is_reentrant() {
        let connects = Arc::new(AtomicUsize::new(0));
        let factory = MockFactory {
            connects: Arc::clone(&connects),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        assert!(!conn.is_open());
        conn.open().unwrap();
        conn.open().unwrap();
        assert!(conn.is_open());
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        conn.close();
        conn.close();
        assert!(!conn.is_open());
    }

    #[test]
    fn open_requires_a_dsn() {
        let mut conn = connection(ConnectionConfig::default(), MockFactory::default());
        let err = conn.open().unwrap_err();
        assert!(matches!(err, SquillError::Configuration(_)));
    }

    #[test]
    fn open_failure_is_sanitized_but_keeps_the_code() {
        let factory = MockFactory {
            refuse: true,
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        match conn.open().unwrap_err() {
            SquillError::Connection { message, code } => {
                assert_eq!(code, 1045);
                assert!(!message.contains("access denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn debug_mode_keeps_the_link_message() {
        let factory = MockFactory {
            refuse: true,
            ..MockFactory::default()
        };
        let config = ConnectionConfig {
            debug: true,
            ..mysql_config()
        };
        let mut conn = connection(config, factory);
        match conn.open().unwrap_err() {
            SquillError::Connection { message, code } => {
                assert_eq!(code, 1045);
                assert!(message.contains("access denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn charset_and_init_sqls_run_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            log: Arc::clone(&log),
            ..MockFactory::default()
        };
        let config = ConnectionConfig {
            charset: Some("utf8".to_string()),
            init_sqls: vec!["SET time_zone = '+00:00'".to_string()],
            ..mysql_config()
        };
        let mut conn = connection(config, factory);
        conn.open().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "SET NAMES 'utf8'".to_string(),
                "SET time_zone = '+00:00'".to_string(),
            ]
        );
    }

    #[test]
    fn init_failure_leaves_the_connection_closed() {
        let factory = MockFactory {
            fail_on: Some("time_zone".to_string()),
            ..MockFactory::default()
        };
        let config = ConnectionConfig {
            init_sqls: vec!["SET time_zone = '+00:00'".to_string()],
            ..mysql_config()
        };
        let mut conn = connection(config, factory);
        let err = conn.open().unwrap_err();
        assert!(err.is_connection());
        assert!(!conn.is_open());
    }

    #[test]
    fn driver_resolves_from_the_scheme_without_opening() {
        let connects = Arc::new(AtomicUsize::new(0));
        let factory = MockFactory {
            connects: Arc::clone(&connects),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        assert_eq!(conn.driver().unwrap().name(), "mysql");
        assert_eq!(connects.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_scheme_is_rejected_by_name() {
        let config = ConnectionConfig {
            dsn: "oci:dbname=XE".to_string(),
            ..ConnectionConfig::default()
        };
        let mut conn = connection(config, MockFactory::default());
        let err = conn.driver().unwrap_err();
        assert!(err.is_unsupported_dialect());
        assert!(err.to_string().contains("oci"));
    }

    #[test]
    fn query_builder_uses_the_connection_driver() {
        let mut conn = connection(mysql_config(), MockFactory::default());
        let builder = conn.query_builder().unwrap();
        assert_eq!(builder.driver().name(), "mysql");
    }

    #[test]
    fn quote_value_prefers_the_native_path() {
        let factory = MockFactory {
            native_quote: true,
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        // closed: fallback escaping
        assert_eq!(conn.quote_value("it's"), "'it''s'");
        conn.open().unwrap();
        assert_eq!(conn.quote_value("it's"), "N'it's'");
    }

    #[test]
    fn quote_name_passthroughs_use_the_driver() {
        let mut conn = connection(mysql_config(), MockFactory::default());
        assert_eq!(conn.quote_table_name("a.b").unwrap(), "`a`.`b`");
        assert_eq!(conn.quote_column_name("t.c").unwrap(), "`t`.`c`");
    }

    #[test]
    fn table_prefix_expansion() {
        let config = ConnectionConfig {
            table_prefix: Some("tbl_".to_string()),
            ..mysql_config()
        };
        let conn = connection(config, MockFactory::default());
        assert_eq!(
            conn.expand_table_prefix("SELECT * FROM {{User}} JOIN {{Order}}"),
            "SELECT * FROM tbl_User JOIN tbl_Order"
        );
    }

    #[test]
    fn empty_prefix_keeps_bare_names() {
        let config = ConnectionConfig {
            table_prefix: Some(String::new()),
            ..mysql_config()
        };
        let conn = connection(config, MockFactory::default());
        assert_eq!(conn.expand_table_prefix("DELETE FROM {{User}}"), "DELETE FROM User");
    }

    #[test]
    fn missing_prefix_disables_expansion() {
        let conn = connection(mysql_config(), MockFactory::default());
        assert_eq!(
            conn.expand_table_prefix("DELETE FROM {{User}}"),
            "DELETE FROM {{User}}"
        );
    }

    #[test]
    fn begin_transaction_opens_and_issues_begin() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            log: Arc::clone(&log),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        let tx = conn.begin_transaction().unwrap();
        assert!(conn.is_open());
        assert!(tx.is_active());
        assert_eq!(*log.lock().unwrap(), vec!["BEGIN".to_string()]);
    }

    #[test]
    fn nested_transactions_are_rejected() {
        let mut conn = connection(mysql_config(), MockFactory::default());
        let _tx = conn.begin_transaction().unwrap();
        let err = conn.begin_transaction().unwrap_err();
        assert!(matches!(err, SquillError::Structural(_)));
    }

    #[test]
    fn closing_deactivates_the_current_transaction() {
        let mut conn = connection(mysql_config(), MockFactory::default());
        let mut tx = conn.begin_transaction().unwrap();
        conn.close();
        assert!(!tx.is_active());
        let err = tx.commit(&mut conn).unwrap_err();
        assert!(matches!(err, SquillError::InactiveTransaction));
    }
}
