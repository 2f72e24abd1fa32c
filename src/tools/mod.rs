//! Tool registry and definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.
//! The tool surface is fixed: run_query, explain_query, list_schemas,
//! list_tables_in_schema, test_redshift_connection.

pub mod catalog;
pub mod connection;
pub mod query;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::session::RedshiftSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "run_query")
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut tools = Vec::new();
        tools.extend(query::tools());
        tools.extend(catalog::tools());
        tools.extend(connection::tools());
        Self { tools }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// Argument validation happens inside the handler, before any SQL is
    /// issued against the shared session.
    pub async fn dispatch(
        &self,
        session: &RedshiftSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        match name {
            "run_query" | "explain_query" => query::dispatch(session, name, args).await,
            "list_schemas" | "list_tables_in_schema" => {
                catalog::dispatch(session, name, args).await
            }
            "test_redshift_connection" => connection::dispatch(session, name, args).await,
            _ => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper macro for creating JSON Schema for tool input parameters.
#[macro_export]
macro_rules! schema {
    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt => $req_desc:literal),* $(,)? }
    }) => {{
        let mut required = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), schema!(@prop $req_type, $req_desc));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required
        })
    }};

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }};

    // Property with description
    (@prop string, $desc:literal) => {
        serde_json::json!({"type": "string", "description": $desc})
    };
    (@prop integer, $desc:literal) => {
        serde_json::json!({"type": "integer", "description": $desc})
    };
    (@prop boolean, $desc:literal) => {
        serde_json::json!({"type": "boolean", "description": $desc})
    };
}
