//! Connection management for the single shared Redshift connection.
//!
//! The session owns the one live connection the process is allowed; all
//! tools share it and access is serialized through an async mutex because
//! the wire connection cannot interleave statements.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

use crate::config::RedshiftConfig;
use crate::convert::{rows_to_json, RowMap};
use crate::error::{McpError, Result};

/// Connect timeout, matching the original operator tooling default.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// The shared database session.
///
/// Dropping the session closes the connection; there is no explicit close
/// and no reconnect policy. Startup is fail-fast: `connect` then
/// `test_connection`, abort on failure.
#[derive(Debug)]
pub struct RedshiftSession {
    client: Mutex<Client>,
    endpoint: String,
}

impl RedshiftSession {
    /// Open the connection described by `config`.
    ///
    /// Fails with [`McpError::Connection`] if the host is unreachable or
    /// the credentials are rejected. The connection driver runs on a
    /// background task; a driver error closes the connection and is logged.
    pub async fn connect(config: &RedshiftConfig) -> Result<Self> {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&config.host)
            .port(config.port)
            .dbname(&config.database)
            .user(&config.user)
            .password(&config.password)
            .connect_timeout(CONNECT_TIMEOUT);

        let (client, connection) = pg
            .connect(NoTls)
            .await
            .map_err(|e| McpError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("database connection closed: {}", e);
            }
        });

        tracing::debug!(endpoint = %config.endpoint(), "connection established");

        Ok(Self {
            client: Mutex::new(client),
            endpoint: config.endpoint(),
        })
    }

    /// The `host:port/database` this session is connected to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Health check: runs `SELECT version()` and never errors.
    ///
    /// Returns `(true, version_string)` on success, `(false, message)` on
    /// any failure.
    pub async fn test_connection(&self) -> (bool, String) {
        match self.query("SELECT version()", &[]).await {
            Ok(rows) => {
                let version = rows
                    .first()
                    .and_then(|row| row.values().next())
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                (true, version)
            }
            Err(e) => (false, e.to_string()),
        }
    }

    /// Run a single parameterized statement and fetch all rows.
    ///
    /// Each statement runs in its own implicit transaction; a rejected
    /// statement leaves the connection usable for subsequent calls.
    pub async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<RowMap>> {
        let client = self.client.lock().await;
        let rows = client.query(sql, params).await?;
        tracing::debug!(rows = rows.len(), "query returned");
        Ok(rows_to_json(&rows))
    }

    /// Execute caller-supplied SQL.
    ///
    /// Row-returning statements yield their rows; anything else executes
    /// and reports `{"affected_rows": n}` as a single row, mirroring the
    /// shape callers get from row-returning statements.
    pub async fn run_sql(&self, sql: &str) -> Result<Vec<RowMap>> {
        if returns_rows(sql) {
            self.query(sql, &[]).await
        } else {
            let client = self.client.lock().await;
            let affected = client.execute(sql, &[]).await?;
            drop(client);
            let mut row = RowMap::new();
            row.insert("affected_rows".to_string(), affected.into());
            Ok(vec![row])
        }
    }
}

/// Whether a statement produces a row set, judged by its leading keyword.
fn returns_rows(sql: &str) -> bool {
    let first = sql
        .trim_start()
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(
        first.as_str(),
        "select" | "with" | "show" | "explain" | "values" | "table"
    )
}
