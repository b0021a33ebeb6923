//! Transaction handles with consume-once terminal semantics.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::connection::Connection;
use crate::error::{SquillError, SquillResult};

/// A handle to one database transaction.
///
/// The handle shares its active flag with the owning [`Connection`]: closing
/// the connection or finishing the transaction flips it, so every later
/// terminal call on this handle (or a stale clone of the situation, e.g. a
/// handle kept across a reconnect) reports [`SquillError::InactiveTransaction`]
/// instead of silently re-committing.
///
/// # Example
/// ```ignore
/// let mut tx = connection.begin_transaction()?;
/// connection.run_statements()?;
/// tx.commit(&mut connection)?;
/// ```
#[derive(Debug)]
pub struct Transaction {
    active: Arc<AtomicBool>,
}

impl Transaction {
    pub(crate) fn new(active: Arc<AtomicBool>) -> Self {
        Self { active }
    }

    /// Whether this handle can still commit or roll back.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Commit the transaction.
    pub fn commit(&mut self, connection: &mut Connection) -> SquillResult<()> {
        tracing::debug!("committing transaction");
        self.finish(connection, "COMMIT")
    }

    /// Roll the transaction back.
    pub fn rollback(&mut self, connection: &mut Connection) -> SquillResult<()> {
        tracing::debug!("rolling back transaction");
        self.finish(connection, "ROLLBACK")
    }

    fn finish(&mut self, connection: &mut Connection, sql: &str) -> SquillResult<()> {
        // swap claims the terminal call; losing the claim means the handle
        // was already finished or invalidated
        if !self.active.swap(false, Ordering::SeqCst) {
            return Err(SquillError::InactiveTransaction);
        }
        connection.run(sql)
    }
}

#[cfg(test)]
mod tests {
    use crate::connection::mock::{MockFactory, connection, mysql_config};
    use crate::error::SquillError;
    use std::sync::{Arc, Mutex};

    #[test]
    fn commit_issues_commit_once() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            log: Arc::clone(&log),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        let mut tx = conn.begin_transaction().unwrap();
        tx.commit(&mut conn).unwrap();
        assert!(!tx.is_active());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["BEGIN".to_string(), "COMMIT".to_string()]
        );
    }

    #[test]
    fn second_terminal_call_errors() {
        let mut conn = connection(mysql_config(), MockFactory::default());
        let mut tx = conn.begin_transaction().unwrap();
        tx.commit(&mut conn).unwrap();
        assert!(matches!(
            tx.commit(&mut conn).unwrap_err(),
            SquillError::InactiveTransaction
        ));
        assert!(matches!(
            tx.rollback(&mut conn).unwrap_err(),
            SquillError::InactiveTransaction
        ));
    }

    #[test]
    fn rollback_issues_rollback() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            log: Arc::clone(&log),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        let mut tx = conn.begin_transaction().unwrap();
        tx.rollback(&mut conn).unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["BEGIN".to_string(), "ROLLBACK".to_string()]
        );
    }

    #[test]
    fn stale_handle_cannot_finish_a_newer_transaction() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let factory = MockFactory {
            log: Arc::clone(&log),
            ..MockFactory::default()
        };
        let mut conn = connection(mysql_config(), factory);
        let mut first = conn.begin_transaction().unwrap();
        first.rollback(&mut conn).unwrap();
        let second = conn.begin_transaction().unwrap();
        // the superseded handle must not commit the live transaction
        assert!(matches!(
            first.commit(&mut conn).unwrap_err(),
            SquillError::InactiveTransaction
        ));
        assert!(second.is_active());
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "BEGIN".to_string(),
                "ROLLBACK".to_string(),
                "BEGIN".to_string(),
            ]
        );
    }
}
