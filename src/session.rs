//! Client sessions for MiniDB
//!
//! A [`Session`] owns a reference to a [`Catalog`] and runs SQL text against
//! it, one statement at a time or as a batch.

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::executor::{ExecResult, Executor, ResultSet};
use crate::sql;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Session state; closing drops the catalog reference
#[derive(Debug)]
enum State {
    Open(Arc<Catalog>),
    Closed,
}

/// A SQL session
#[derive(Debug)]
pub struct Session {
    state: State,
    executor: Executor,
    /// Statements queued by `add_batch`
    batch: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Open a session on a fresh, private catalog with default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Open a session on a fresh, private catalog
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_catalog(Arc::new(Catalog::new()), config)
    }

    /// Open a session on a catalog that other sessions may share
    pub fn with_catalog(catalog: Arc<Catalog>, config: EngineConfig) -> Self {
        debug!(?config, "session opened");
        Self {
            state: State::Open(catalog),
            executor: Executor::new(config),
            batch: Vec::new(),
        }
    }

    /// The catalog this session runs against
    pub fn catalog(&self) -> Result<&Arc<Catalog>> {
        match &self.state {
            State::Open(catalog) => Ok(catalog),
            State::Closed => Err(Error::SessionClosed),
        }
    }

    /// Execute a single SQL statement
    pub fn execute(&mut self, sql: &str) -> Result<ExecResult> {
        let catalog = self.catalog()?;
        let stmt = sql::parse(sql)?;
        self.executor.execute(catalog, stmt)
    }

    /// Execute a statement that does not return rows, returning the affected row count
    pub fn execute_update(&mut self, sql: &str) -> Result<usize> {
        let catalog = self.catalog()?;
        let stmt = sql::parse(sql)?;
        if stmt.is_query() {
            return Err(Error::WrongStatementKind(
                "a query cannot be run as an update".to_string(),
            ));
        }

        match self.executor.execute(catalog, stmt)? {
            ExecResult::RowCount(n) => Ok(n),
            ExecResult::Rows(_) => Err(Error::Internal(
                "update statement returned rows".to_string(),
            )),
        }
    }

    /// Execute a query, returning its rows
    pub fn execute_query(&mut self, sql: &str) -> Result<ResultSet> {
        let catalog = self.catalog()?;
        let stmt = sql::parse(sql)?;
        if !stmt.is_query() {
            return Err(Error::WrongStatementKind(
                "only SELECT statements return rows".to_string(),
            ));
        }

        match self.executor.execute(catalog, stmt)? {
            ExecResult::Rows(rows) => Ok(rows),
            ExecResult::RowCount(_) => Err(Error::Internal(
                "query returned a row count".to_string(),
            )),
        }
    }

    /// Execute each statement in turn, recording every outcome
    ///
    /// A failure is kept at its position and does not stop later statements,
    /// nor undo earlier ones.
    pub fn execute_batch<I, S>(&mut self, sqls: I) -> Vec<Result<usize>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sqls.into_iter()
            .enumerate()
            .map(|(slot, sql)| {
                let outcome = self.execute_update(sql.as_ref());
                if let Err(e) = &outcome {
                    warn!(slot, error = %e, "batch statement failed");
                }
                outcome
            })
            .collect()
    }

    /// Queue a statement for the next `run_batch`
    pub fn add_batch(&mut self, sql: impl Into<String>) -> Result<()> {
        self.catalog()?;
        self.batch.push(sql.into());
        Ok(())
    }

    /// Discard queued statements
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Execute and drain the queued statements
    pub fn run_batch(&mut self) -> Vec<Result<usize>> {
        let batch = std::mem::take(&mut self.batch);
        self.execute_batch(batch)
    }

    /// Close the session; later calls fail with [`Error::SessionClosed`]
    pub fn close(&mut self) {
        if let State::Open(_) = std::mem::replace(&mut self.state, State::Closed) {
            self.batch.clear();
            info!("session closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let mut session = Session::new();
        session
            .execute("create table DDL(id int, name varchar(20),price int)")
            .unwrap();
        session
    }

    #[test]
    fn test_execute_batch() {
        let mut session = session();
        let results = session.execute_batch([
            r#"insert into DDL values(1,"notebook",20)"#,
            r#"insert into DDL values(2,"pen",10)"#,
        ]);

        let counts: Vec<usize> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(counts, vec![1, 1]);

        let rs = session.execute_query("select id from DDL").unwrap();
        assert_eq!(rs.len(), 2);
    }

    #[test]
    fn test_batch_failures_do_not_abort() {
        let mut session = session();
        let results = session.execute_batch(vec![
            "insert into DDL values (1, 'notebook', 20)".to_string(),
            "insert into DDL values (2, 'pen')".to_string(),
            "select * from DDL".to_string(),
            "insert into DDL values (3, 'folder', 5)".to_string(),
        ]);

        assert!(matches!(results[0], Ok(1)));
        assert!(matches!(results[1], Err(Error::ColumnCountMismatch { .. })));
        assert!(matches!(results[2], Err(Error::WrongStatementKind(_))));
        assert!(matches!(results[3], Ok(1)));
        assert_eq!(session.execute_query("select * from DDL").unwrap().len(), 2);
    }

    #[test]
    fn test_add_and_run_batch() {
        let mut session = session();
        session.add_batch("insert into DDL values (1, 'notebook', 20)").unwrap();
        session.add_batch("insert into DDL values (2, 'pen', 10)").unwrap();

        let results = session.run_batch();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| matches!(r, Ok(1))));

        // The batch was drained
        assert!(session.run_batch().is_empty());

        session.add_batch("insert into DDL values (3, 'ink', 5)").unwrap();
        session.clear_batch();
        assert!(session.run_batch().is_empty());
    }

    #[test]
    fn test_statement_kind_checks() {
        let mut session = session();
        assert!(matches!(
            session.execute_update("select * from DDL"),
            Err(Error::WrongStatementKind(_))
        ));
        assert!(matches!(
            session.execute_query("delete from DDL"),
            Err(Error::WrongStatementKind(_))
        ));
        assert_eq!(session.execute_update("delete from DDL").unwrap(), 0);
    }

    #[test]
    fn test_closed_session() {
        let mut session = session();
        session.close();
        assert!(session.is_closed());

        assert!(matches!(
            session.execute("select * from DDL"),
            Err(Error::SessionClosed)
        ));
        assert!(matches!(
            session.execute_update("delete from DDL"),
            Err(Error::SessionClosed)
        ));
        assert!(matches!(session.add_batch("delete from DDL"), Err(Error::SessionClosed)));
        assert!(matches!(session.catalog(), Err(Error::SessionClosed)));

        let results = session.execute_batch(["delete from DDL"]);
        assert!(matches!(results[0], Err(Error::SessionClosed)));

        // Closing twice is harmless
        session.close();
        assert!(session.is_closed());
    }

    #[test]
    fn test_close_releases_catalog() {
        let catalog = Arc::new(Catalog::new());
        let mut session = Session::with_catalog(catalog.clone(), EngineConfig::default());
        assert_eq!(Arc::strong_count(&catalog), 2);

        session.close();
        assert_eq!(Arc::strong_count(&catalog), 1);
    }

    #[test]
    fn test_shared_catalog() {
        let catalog = Arc::new(Catalog::new());
        let mut writer = Session::with_catalog(catalog.clone(), EngineConfig::default());
        let mut reader = Session::with_catalog(catalog, EngineConfig::default());

        writer.execute("create table t (id int primary key)").unwrap();
        writer.execute("insert into t values (7)").unwrap();

        let rs = reader.execute_query("select id from t").unwrap();
        assert_eq!(rs.row(0).unwrap().get_int(1).unwrap(), 7);
    }
}
