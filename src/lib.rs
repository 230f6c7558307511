//! Connection-string configured CRUD helper for SQL Server.
//!
//! Two accessors expose the same four operations (`create`, `read`, `update`, `delete`):
//! [`AsyncDataAccessor`] returns futures, [`SyncDataAccessor`] blocks. Each call opens its
//! own connection through tiberius, binds the named parameters, executes a single
//! statement and closes the connection before returning.
//!
//! ```rust,no_run
//! use mssql_helper::prelude::*;
//!
//! # fn demo() -> Result<(), DbHelperError> {
//! let db = SyncDataAccessor::new(
//!     "Server=tcp:localhost,1433;Database=app;User Id=sa;Password=...;TrustServerCertificate=true",
//! )?;
//! db.create(
//!     "INSERT INTO t(id, val) VALUES (@id, @val)",
//!     &[SqlParameter::new("@id", 1), SqlParameter::new("@val", "a")],
//! )?;
//! let rows = db.read("SELECT * FROM t", None)?;
//! for row in &rows {
//!     println!("{:?}", row.get("val"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod accessor;
pub mod connector;
pub mod error;
pub mod mssql;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use accessor::{AsyncDataAccessor, SyncDataAccessor};
pub use connector::{Connection, Connector};
pub use error::{DbHelperError, Result};
pub use mssql::{ConnectionOptions, ConnectionOptionsBuilder, MssqlConnector};
pub use results::{CustomDbRow, ResultSet};
pub use translation::bind_named_parameters;
pub use types::{RowValues, SqlParameter};
