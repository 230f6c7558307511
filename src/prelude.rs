//! Convenient imports for common functionality.

pub use crate::accessor::{AsyncDataAccessor, SyncDataAccessor};
pub use crate::connector::{Connection, Connector};
pub use crate::error::DbHelperError;
pub use crate::mssql::{ConnectionOptions, ConnectionOptionsBuilder, MssqlConnector};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::translation::bind_named_parameters;
pub use crate::types::{RowValues, SqlParameter};
