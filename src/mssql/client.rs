use tiberius::{Client, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::error::{DbHelperError, Result};

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Open a logged-in SQL Server connection.
///
/// Named instances are resolved through the SQL Browser. If the server answers the login
/// with a routing redirect (Azure SQL gateways do), the redirect is followed once.
///
/// # Errors
/// Returns [`DbHelperError::ConnectionError`] if the TCP connection, TLS handshake or login
/// fails.
pub async fn create_mssql_client(mut config: tiberius::Config) -> Result<MssqlClient> {
    let result = match open(config.clone()).await {
        Err(tiberius::error::Error::Routing { host, port }) => {
            debug!(%host, port, "SQL Server redirected the login");
            config.host(&host);
            config.port(port);
            open(config).await
        }
        other => other,
    };

    result.map_err(|e| DbHelperError::ConnectionError(format!("SQL Server connection error: {e}")))
}

async fn open(config: tiberius::Config) -> tiberius::Result<MssqlClient> {
    let tcp = TcpStream::connect_named(&config).await?;
    tcp.set_nodelay(true)
        .map_err(|e| tiberius::error::Error::Io {
            kind: e.kind(),
            message: format!("TCP configuration error: {e}"),
        })?;

    debug!(addr = %config.get_addr(), "TCP connection established");
    Client::connect(config, tcp.compat_write()).await
}
