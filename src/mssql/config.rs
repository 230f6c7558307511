use std::fmt;

use tiberius::Config as TiberiusConfig;

use crate::error::{DbHelperError, Result};

const DEFAULT_PORT: u16 = 1433;

/// Parse a connection descriptor into a tiberius configuration.
///
/// `jdbc:sqlserver://` URLs are accepted; anything else is read as an ADO.NET connection
/// string (`Server=tcp:host,1433;Database=app;User Id=sa;Password=...`).
///
/// # Errors
/// Returns [`DbHelperError::ConnectionError`] if the driver rejects the descriptor.
pub fn parse_connection_string(descriptor: &str) -> Result<TiberiusConfig> {
    let descriptor = descriptor.trim();
    let is_jdbc = descriptor
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("jdbc:"));

    let parsed = if is_jdbc {
        TiberiusConfig::from_jdbc_string(descriptor)
    } else {
        TiberiusConfig::from_ado_string(descriptor)
    };

    parsed.map_err(|e| {
        DbHelperError::ConnectionError(format!("Invalid SQL Server connection string: {e}"))
    })
}

/// Typed connection settings that render to an ADO.NET connection string.
#[derive(Clone)]
pub struct ConnectionOptions {
    pub server: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub port: Option<u16>,
    pub instance_name: Option<String>,
    pub trust_server_certificate: bool,
    pub application_name: Option<String>,
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("server", &self.server)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .field("instance_name", &self.instance_name)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl ConnectionOptions {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            server,
            database,
            user,
            password,
            port: None,
            instance_name: None,
            trust_server_certificate: false,
            application_name: None,
        }
    }

    #[must_use]
    pub fn builder(
        server: String,
        database: String,
        user: String,
        password: String,
    ) -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::new(server, database, user, password)
    }

    /// Read options from `MSSQL_SERVER`, `MSSQL_DATABASE`, `MSSQL_USER`, `MSSQL_PASSWORD`
    /// and the optional `MSSQL_PORT` / `MSSQL_INSTANCE`.
    ///
    /// # Errors
    /// Returns [`DbHelperError::ConnectionError`] if a required variable is missing or the
    /// port does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| DbHelperError::ConnectionError(format!("{key} is not set")))
        };

        let port = lookup("MSSQL_PORT")
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|e| {
                    DbHelperError::ConnectionError(format!("MSSQL_PORT is not a valid port: {e}"))
                })
            })
            .transpose()?;

        Ok(Self::builder(
            required("MSSQL_SERVER")?,
            required("MSSQL_DATABASE")?,
            required("MSSQL_USER")?,
            required("MSSQL_PASSWORD")?,
        )
        .port(port)
        .instance_name(lookup("MSSQL_INSTANCE"))
        .finish())
    }

    /// Render the options as an ADO.NET connection string.
    ///
    /// A named instance without an explicit port leaves the port to the SQL Browser.
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        let mut server = format!("tcp:{}", self.server);
        if let Some(instance) = &self.instance_name {
            server.push('\\');
            server.push_str(instance);
        }
        match (self.port, &self.instance_name) {
            (Some(port), _) => server.push_str(&format!(",{port}")),
            (None, None) => server.push_str(&format!(",{DEFAULT_PORT}")),
            (None, Some(_)) => {}
        }

        let mut pairs = vec![
            ("Server", server),
            ("Database", self.database.clone()),
            ("User Id", self.user.clone()),
            ("Password", self.password.clone()),
        ];
        if self.trust_server_certificate {
            pairs.push(("TrustServerCertificate", "true".to_string()));
        }
        if let Some(app) = &self.application_name {
            pairs.push(("Application Name", app.clone()));
        }

        pairs
            .into_iter()
            .map(|(key, value)| format!("{key}={}", quote_value(&value)))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Build the tiberius configuration these options describe.
    ///
    /// # Errors
    /// Returns [`DbHelperError::ConnectionError`] if the rendered string is rejected.
    pub fn to_tiberius_config(&self) -> Result<TiberiusConfig> {
        parse_connection_string(&self.to_connection_string())
    }
}

/// Fluent builder for [`ConnectionOptions`].
#[derive(Debug, Clone)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            opts: ConnectionOptions::new(server, database, user, password),
        }
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn instance_name(mut self, instance_name: Option<String>) -> Self {
        self.opts.instance_name = instance_name;
        self
    }

    #[must_use]
    pub fn trust_server_certificate(mut self, trust: bool) -> Self {
        self.opts.trust_server_certificate = trust;
        self
    }

    #[must_use]
    pub fn application_name(mut self, application_name: Option<String>) -> Self {
        self.opts.application_name = application_name;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }
}

fn quote_value(value: &str) -> String {
    let needs_quotes = value.contains([';', '\'', '"'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);
    if !needs_quotes {
        value.to_string()
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        format!("'{}'", value.replace('\'', "''"))
    }
}
