// SQL Server backend, built on tiberius.
//
// - config: connection string parsing and typed connection options
// - client: TCP connect and login
// - params: binding positional parameters
// - query: result set materialization and value conversion
// - executor: the `Connector`/`Connection` implementations the accessors use

pub mod client;
pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use client::{MssqlClient, create_mssql_client};
pub use config::{ConnectionOptions, ConnectionOptionsBuilder, parse_connection_string};
pub use executor::{MssqlConnection, MssqlConnector};
pub use params::bind_query_params;
pub use query::build_result_set;
