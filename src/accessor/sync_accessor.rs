use std::future::Future;
use std::panic;
use std::thread;

use tokio::runtime::{Builder, Handle, Runtime};

use super::AsyncDataAccessor;
use crate::connector::Connector;
use crate::error::{DbHelperError, Result};
use crate::mssql::MssqlConnector;
use crate::results::ResultSet;
use crate::types::SqlParameter;

/// Blocking CRUD accessor.
///
/// Runs the [`AsyncDataAccessor`] operations on a private multi-threaded runtime, so
/// several threads may call into one instance at the same time. Calls from a thread that
/// is already inside a tokio runtime, such as a `spawn_blocking` closure, are driven on a
/// helper thread. Async code should use [`AsyncDataAccessor`] instead of blocking a worker.
///
/// ```rust,no_run
/// use mssql_helper::prelude::*;
///
/// # fn demo() -> Result<(), DbHelperError> {
/// let db = SyncDataAccessor::new("Server=tcp:localhost,1433;Database=app;User Id=sa;Password=...")?;
/// let removed = db.delete("DELETE FROM t WHERE id = @id", &[SqlParameter::new("@id", 1)])?;
/// # let _ = removed;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SyncDataAccessor<C = MssqlConnector> {
    inner: AsyncDataAccessor<C>,
    // taken in `Drop`
    runtime: Option<Runtime>,
}

impl SyncDataAccessor<MssqlConnector> {
    /// Create an accessor for a SQL Server connection string.
    ///
    /// # Errors
    /// Returns [`DbHelperError::RuntimeError`] if the runtime cannot be started.
    pub fn new(connection_string: impl Into<String>) -> Result<Self> {
        Self::with_connector(MssqlConnector::new(connection_string))
    }
}

impl<C: Connector> SyncDataAccessor<C> {
    /// # Errors
    /// Returns [`DbHelperError::RuntimeError`] if the runtime cannot be started.
    pub fn with_connector(connector: C) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mssql-helper-io")
            .enable_all()
            .build()
            .map_err(|e| {
                DbHelperError::RuntimeError(format!("Failed to start blocking runtime: {e}"))
            })?;

        Ok(Self {
            inner: AsyncDataAccessor::with_connector(connector),
            runtime: Some(runtime),
        })
    }

    #[must_use]
    pub fn connector(&self) -> &C {
        self.inner.connector()
    }

    /// Blocking form of [`AsyncDataAccessor::create`].
    ///
    /// # Errors
    /// See [`AsyncDataAccessor::create`].
    pub fn create(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.block_on(self.inner.create(statement, params))
    }

    /// Blocking form of [`AsyncDataAccessor::read`].
    ///
    /// # Errors
    /// See [`create`](Self::create).
    pub fn read(&self, statement: &str, params: Option<&[SqlParameter]>) -> Result<ResultSet> {
        self.block_on(self.inner.read(statement, params))
    }

    /// Blocking form of [`AsyncDataAccessor::update`].
    ///
    /// # Errors
    /// See [`create`](Self::create).
    pub fn update(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.block_on(self.inner.update(statement, params))
    }

    /// Blocking form of [`AsyncDataAccessor::delete`].
    ///
    /// # Errors
    /// See [`create`](Self::create).
    pub fn delete(&self, statement: &str, params: &[SqlParameter]) -> Result<usize> {
        self.block_on(self.inner.delete(statement, params))
    }

    fn block_on<T, F>(&self, future: F) -> Result<T>
    where
        T: Send,
        F: Future<Output = Result<T>> + Send,
    {
        let runtime = self.runtime.as_ref().ok_or_else(|| {
            DbHelperError::RuntimeError("blocking runtime already shut down".to_string())
        })?;

        if Handle::try_current().is_err() {
            return runtime.block_on(future);
        }

        // a runtime context is set on this thread; `block_on` would panic here
        thread::scope(|s| {
            s.spawn(|| runtime.block_on(future))
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        })
    }
}

impl<C> Drop for SyncDataAccessor<C> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
