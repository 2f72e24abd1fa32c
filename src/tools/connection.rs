//! Connectivity tool.
//!
//! Tools: test_redshift_connection

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::schema;
use crate::session::RedshiftSession;
use crate::tools::ToolDef;

/// Get the connection tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![ToolDef::new(
        "test_redshift_connection",
        "Test connection to the Redshift database. Runs a trivial query and reports \
         status, the server version on success, or the failure message. Never errors; \
         a broken connection is reported in the result.",
        schema!(object {}),
    )]
}

/// Dispatch a connection tool call.
pub async fn dispatch(
    session: &RedshiftSession,
    name: &str,
    _args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "test_redshift_connection" => {
            let (connected, message) = session.test_connection().await;
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            let result = if connected {
                serde_json::json!({
                    "status": "success",
                    "connected": true,
                    "version": message,
                    "timestamp": timestamp,
                })
            } else {
                serde_json::json!({
                    "status": "error",
                    "connected": false,
                    "message": format!("Connection test failed: {}", message),
                    "timestamp": timestamp,
                })
            };
            Ok(result)
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
