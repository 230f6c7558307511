use tracing::{Instrument, debug, debug_span};

use super::prepare_statement;
use crate::connector::{Connection, Connector};
use crate::error::Result;
use crate::mssql::MssqlConnector;
use crate::results::ResultSet;
use crate::types::SqlParameter;

/// Non-blocking CRUD accessor.
///
/// ```rust,no_run
/// use mssql_helper::prelude::*;
///
/// # async fn demo() -> Result<(), DbHelperError> {
/// let db = AsyncDataAccessor::new("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=...");
/// let inserted = db
///     .create(
///         "INSERT INTO t(id, val) VALUES (@id, @val)",
///         &[SqlParameter::new("@id", 1), SqlParameter::new("@val", "a")],
///     )
///     .await?;
/// assert_eq!(inserted, 1);
///
/// let rows = db
///     .read("SELECT * FROM t WHERE id = @id", Some(&[SqlParameter::new("@id", 1)]))
///     .await?;
/// assert_eq!(rows.results[0].get("val").and_then(RowValues::as_text), Some("a"));
/// # Ok(())
/// # }
/// ```
///
/// Dropping a returned future before it completes cancels the call and closes its
/// connection. No timeout is applied beyond what the connection string configures.
#[derive(Debug, Clone)]
pub struct AsyncDataAccessor<C = MssqlConnector> {
    connector: C,
}

impl AsyncDataAccessor<MssqlConnector> {
    /// Create an accessor for a SQL Server connection string.
    ///
    /// The string is not validated here; an invalid one fails each operation with
    /// [`DbHelperError::ConnectionError`](crate::DbHelperError::ConnectionError).
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self::with_connector(MssqlConnector::new(connection_string))
    }
}

impl<C: Connector> AsyncDataAccessor<C> {
    #[must_use]
    pub fn with_connector(connector: C) -> Self {
        Self { connector }
    }

    #[must_use]
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Insert rows; returns the number of rows affected.
    ///
    /// # Errors
    /// [`ConnectionError`](crate::DbHelperError::ConnectionError) if no connection could be
    /// opened, [`StatementError`](crate::DbHelperError::StatementError) if binding or
    /// execution fails.
    pub async fn create(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.execute(statement, params)
            .instrument(debug_span!("create", statement))
            .await
    }

    /// Run a query and materialize its rows. `None` runs the statement unparameterized.
    ///
    /// A query matching nothing returns an empty `ResultSet`, not an error.
    ///
    /// # Errors
    /// Same as [`create`](Self::create).
    pub async fn read(
        &self,
        statement: &str,
        params: Option<&[SqlParameter]>,
    ) -> Result<ResultSet> {
        self.query(statement, params.unwrap_or_default())
            .instrument(debug_span!("read", statement))
            .await
    }

    /// Update rows; same contract as [`create`](Self::create).
    ///
    /// # Errors
    /// Same as [`create`](Self::create).
    pub async fn update(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.execute(statement, params)
            .instrument(debug_span!("update", statement))
            .await
    }

    /// Delete rows; same contract as [`create`](Self::create).
    ///
    /// # Errors
    /// Same as [`create`](Self::create).
    pub async fn delete(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.execute(statement, params)
            .instrument(debug_span!("delete", statement))
            .await
    }

    async fn execute(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        let (sql, values) = prepare_statement(statement, params)?;
        let mut connection = self.connector.connect().await?;
        let affected = connection.execute(&sql, &values).await;
        drop(connection);

        let affected = affected?;
        debug!(affected, "statement executed");
        Ok(affected)
    }

    async fn query(&self, statement: &str, params: &[SqlParameter]) -> Result<ResultSet> {
        let (sql, values) = prepare_statement(statement, params)?;
        let mut connection = self.connector.connect().await?;
        let result_set = connection.query(&sql, &values).await;
        drop(connection);

        let result_set = result_set?;
        debug!(rows = result_set.len(), "query materialized");
        Ok(result_set)
    }
}
