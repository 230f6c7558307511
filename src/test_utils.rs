//! Scripted in-memory connector for exercising the accessors without a server.
//!
//! Responses are handed out in FIFO order, one per statement. Every statement is recorded
//! together with its bound values, and opened/released connections are counted so tests
//! can check that nothing outlives a call.

use std::collections::VecDeque;
use std::future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::connector::{Connection, Connector};
use crate::error::{DbHelperError, Result};
use crate::results::ResultSet;
use crate::types::RowValues;

/// A statement as it reached the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStatement {
    pub sql: String,
    pub params: Vec<RowValues>,
}

/// What the next statement should produce.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Affected(usize),
    Rows(ResultSet),
    Fail(String),
    /// Never completes; the statement stays in flight until the call is dropped.
    Hang,
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    recorded: Mutex<Vec<RecordedStatement>>,
    refuse_connections: Mutex<Option<String>>,
    opened: AtomicUsize,
    released: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connector whose connections replay queued responses.
///
/// Clones share the same script and counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<ScriptState>,
}

impl ScriptedConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(self, response: ScriptedResponse) -> Self {
        lock(&self.state.responses).push_back(response);
        self
    }

    #[must_use]
    pub fn with_affected(self, rows: usize) -> Self {
        self.with_response(ScriptedResponse::Affected(rows))
    }

    /// Queue a result set built from column names and rows of values.
    #[must_use]
    pub fn with_rows(self, columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        let mut result_set = ResultSet::with_capacity(rows.len());
        result_set.set_column_names(Arc::new(columns.iter().map(|c| (*c).to_string()).collect()));
        for row in rows {
            result_set.add_row_values(row);
        }
        self.with_response(ScriptedResponse::Rows(result_set))
    }

    #[must_use]
    pub fn with_failure(self, message: &str) -> Self {
        self.with_response(ScriptedResponse::Fail(message.to_string()))
    }

    #[must_use]
    pub fn with_hang(self) -> Self {
        self.with_response(ScriptedResponse::Hang)
    }

    /// Make every connect fail with a connection error.
    #[must_use]
    pub fn refusing_connections(self, message: &str) -> Self {
        *lock(&self.state.refuse_connections) = Some(message.to_string());
        self
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedStatement> {
        lock(&self.state.recorded).clone()
    }

    #[must_use]
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Responses not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.state.responses).len()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    type Connection = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection> {
        if let Some(message) = lock(&self.state.refuse_connections).clone() {
            return Err(DbHelperError::ConnectionError(message));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedConnection {
            state: Arc::clone(&self.state),
        })
    }
}

/// Connection handed out by [`ScriptedConnector`]; counts itself released on drop.
#[derive(Debug)]
pub struct ScriptedConnection {
    state: Arc<ScriptState>,
}

impl ScriptedConnection {
    fn next(&self, sql: &str, params: &[RowValues]) -> Option<ScriptedResponse> {
        lock(&self.state.recorded).push(RecordedStatement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        lock(&self.state.responses).pop_front()
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.state.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn execute(&mut self, sql: &str, params: &[RowValues]) -> Result<usize> {
        match self.next(sql, params) {
            None => Ok(0),
            Some(ScriptedResponse::Affected(rows)) => Ok(rows),
            Some(ScriptedResponse::Fail(message)) => Err(DbHelperError::StatementError(message)),
            Some(ScriptedResponse::Hang) => future::pending().await,
            Some(ScriptedResponse::Rows(_)) => Err(DbHelperError::StatementError(
                "scripted rows where an affected count was expected".to_string(),
            )),
        }
    }

    async fn query(&mut self, sql: &str, params: &[RowValues]) -> Result<ResultSet> {
        match self.next(sql, params) {
            None => Ok(ResultSet::default()),
            Some(ScriptedResponse::Rows(result_set)) => Ok(result_set),
            Some(ScriptedResponse::Fail(message)) => Err(DbHelperError::StatementError(message)),
            Some(ScriptedResponse::Hang) => future::pending().await,
            Some(ScriptedResponse::Affected(_)) => Err(DbHelperError::StatementError(
                "scripted affected count where rows were expected".to_string(),
            )),
        }
    }
}
