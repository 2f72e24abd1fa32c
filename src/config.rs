//! Connection configuration sourced from environment variables.
//!
//! Required: `REDSHIFT_HOST`, `REDSHIFT_DATABASE`, `REDSHIFT_USER`,
//! `REDSHIFT_PASSWORD`. Optional: `REDSHIFT_PORT` (default 5439).

use std::fmt;

use crate::error::{McpError, Result};

/// Default Redshift port.
pub const DEFAULT_PORT: u16 = 5439;

const ENV_HOST: &str = "REDSHIFT_HOST";
const ENV_PORT: &str = "REDSHIFT_PORT";
const ENV_DATABASE: &str = "REDSHIFT_DATABASE";
const ENV_USER: &str = "REDSHIFT_USER";
const ENV_PASSWORD: &str = "REDSHIFT_PASSWORD";

/// Redshift connection configuration. Immutable once loaded.
#[derive(Clone)]
pub struct RedshiftConfig {
    /// Cluster endpoint hostname.
    pub host: String,
    /// Port, 5439 unless overridden.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Username.
    pub user: String,
    /// Password. Kept out of Debug output and logs.
    pub password: String,
}

// Manual impl so the password never leaks into logs or error output.
impl fmt::Debug for RedshiftConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedshiftConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl RedshiftConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an injected lookup function.
    ///
    /// Collects every missing variable before failing so the operator
    /// sees the full list at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| -> Option<String> {
            match lookup(name) {
                Some(v) if !v.trim().is_empty() => Some(v),
                _ => {
                    missing.push(name);
                    None
                }
            }
        };

        let host = required(ENV_HOST);
        let database = required(ENV_DATABASE);
        let user = required(ENV_USER);
        let password = required(ENV_PASSWORD);

        if !missing.is_empty() {
            return Err(McpError::Config(format!(
                "missing Redshift connection parameters: set {}",
                missing.join(", ")
            )));
        }

        let port = match lookup(ENV_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                McpError::Config(format!("{} must be a valid port number, got '{}'", ENV_PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        // Safe: missing is empty, so all four are Some.
        Ok(Self {
            host: host.ok_or_else(|| McpError::Internal("host missing".to_string()))?,
            port,
            database: database.ok_or_else(|| McpError::Internal("database missing".to_string()))?,
            user: user.ok_or_else(|| McpError::Internal("user missing".to_string()))?,
            password: password.ok_or_else(|| McpError::Internal("password missing".to_string()))?,
        })
    }

    /// Endpoint description for log lines: `host:port/database`.
    pub fn endpoint(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}
