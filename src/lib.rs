//! # redshift-mcp
//!
//! MCP (Model Context Protocol) server for Amazon Redshift.
//!
//! This crate exposes a fixed set of Redshift operations as MCP tools for
//! AI agents and operator tooling: query execution, plan explanation,
//! schema/table listing, and connection testing. It implements the MCP
//! protocol as JSON-RPC 2.0 over stdin/stdout, with an optional HTTP/SSE
//! transport.
//!
//! ## Tools
//!
//! - `run_query` — execute SQL verbatim, return row mappings
//! - `explain_query` — `EXPLAIN` a query, return plan lines
//! - `list_schemas` — schemas with owners from the system catalog
//! - `list_tables_in_schema` — tables and views in one schema
//! - `test_redshift_connection` — connectivity check, never errors
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools
//! like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "redshift": {
//!       "command": "/path/to/redshift-mcp",
//!       "env": {
//!         "REDSHIFT_HOST": "cluster.example.com",
//!         "REDSHIFT_DATABASE": "dev",
//!         "REDSHIFT_USER": "awsuser",
//!         "REDSHIFT_PASSWORD": "..."
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, the dispatcher can be driven directly:
//!
//! ```no_run
//! use std::sync::Arc;
//! use redshift_mcp::{McpServer, RedshiftConfig, RedshiftSession};
//!
//! # async fn run() -> redshift_mcp::Result<()> {
//! let config = RedshiftConfig::from_env()?;
//! let session = Arc::new(RedshiftSession::connect(&config).await?);
//! let server = McpServer::new(session);
//!
//! // Run the server (reads from stdin, writes to stdout)
//! // server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod convert;
mod error;
mod http;
mod server;
mod session;
mod tools;

pub use config::{RedshiftConfig, DEFAULT_PORT};
pub use convert::{row_to_json, rows_to_json, RowMap};
pub use error::{McpError, Result};
pub use http::run as run_http;
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::RedshiftSession;
pub use tools::{ToolDef, ToolRegistry};
