//! CRUD accessors.
//!
//! [`AsyncDataAccessor`] holds the one implementation of the four operations;
//! [`SyncDataAccessor`] drives the same futures to completion on a runtime it owns. Every
//! call opens its own connection, runs one statement and drops the connection before
//! returning, so neither accessor carries state between calls.

mod async_accessor;
mod sync_accessor;

use std::borrow::Cow;

pub use async_accessor::AsyncDataAccessor;
pub use sync_accessor::SyncDataAccessor;

use crate::error::Result;
use crate::translation::bind_named_parameters;
use crate::types::{RowValues, SqlParameter};

/// Statement text with named placeholders rewritten, plus the values in bind order.
fn prepare_statement<'a>(
    statement: &'a str,
    params: &[SqlParameter],
) -> Result<(Cow<'a, str>, Vec<RowValues>)> {
    let sql = bind_named_parameters(statement, params)?;
    let values = params.iter().map(|p| p.value().clone()).collect();
    Ok((sql, values))
}
