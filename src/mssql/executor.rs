use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::client::{MssqlClient, create_mssql_client};
use super::config::parse_connection_string;
use super::params::bind_query_params;
use super::query::build_result_set;
use crate::connector::{Connection, Connector};
use crate::error::{DbHelperError, Result};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Opens SQL Server connections from a connection string.
///
/// The string is kept as given and parsed on every connect, so a bad descriptor only
/// surfaces when an operation runs.
#[derive(Clone)]
pub struct MssqlConnector {
    connection_string: Arc<str>,
}

// Connection strings carry passwords; keep them out of Debug output.
impl fmt::Debug for MssqlConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MssqlConnector")
            .field("connection_string", &"<redacted>")
            .finish()
    }
}

impl MssqlConnector {
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        let connection_string: String = connection_string.into();
        Self {
            connection_string: Arc::from(connection_string),
        }
    }

    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    type Connection = MssqlConnection;

    async fn connect(&self) -> Result<MssqlConnection> {
        let config = parse_connection_string(&self.connection_string)?;
        let client = create_mssql_client(config).await?;
        debug!("SQL Server connection opened");
        Ok(MssqlConnection { client })
    }
}

/// One logged-in SQL Server connection; dropping it closes the socket.
pub struct MssqlConnection {
    client: MssqlClient,
}

impl MssqlConnection {
    /// Access the underlying tiberius client.
    pub fn client(&mut self) -> &mut MssqlClient {
        &mut self.client
    }
}

#[async_trait]
impl Connection for MssqlConnection {
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize> {
        let query_builder = bind_query_params(sql, params);

        let exec_result = query_builder.execute(&mut self.client).await.map_err(|e| {
            DbHelperError::StatementError(format!("SQL Server execution error: {e}"))
        })?;

        let rows_affected: u64 = exec_result.rows_affected().iter().sum();
        convert_affected_rows(rows_affected)
    }

    async fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultSet> {
        build_result_set(&mut self.client, sql, params).await
    }
}

fn convert_affected_rows(rows_affected: u64) -> Result<usize> {
    usize::try_from(rows_affected).map_err(|e| {
        DbHelperError::StatementError(format!("Invalid rows affected count: {e}"))
    })
}
