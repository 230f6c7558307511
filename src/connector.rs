//! The seam between the accessors and a concrete driver.
//!
//! A [`Connector`] opens one physical connection per call; the accessor runs exactly one
//! statement on it and drops it before returning. Dropping a [`Connection`] must release
//! everything it holds.

use async_trait::async_trait;

use crate::error::Result;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Opens connections from an immutable descriptor.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Open and log in a fresh connection.
    ///
    /// # Errors
    /// Returns [`DbHelperError::ConnectionError`](crate::DbHelperError::ConnectionError) if the
    /// descriptor is invalid or the server cannot be reached.
    async fn connect(&self) -> Result<Self::Connection>;
}

/// A live connection. Parameters arrive positional, already matched to `@P1..@Pn`.
#[async_trait]
pub trait Connection: Send {
    /// Run a statement and return the number of rows it affected.
    ///
    /// # Errors
    /// Returns [`DbHelperError::StatementError`](crate::DbHelperError::StatementError) if the
    /// statement fails.
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize>;

    /// Run a statement and materialize its first result set.
    ///
    /// # Errors
    /// Returns [`DbHelperError::StatementError`](crate::DbHelperError::StatementError) if the
    /// statement or a row fetch fails.
    async fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultSet>;
}
