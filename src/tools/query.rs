//! SQL execution tools.
//!
//! Tools: run_query, explain_query

use serde_json::{Map, Value as JsonValue};

use crate::convert::get_non_empty_string_arg;
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::RedshiftSession;
use crate::tools::ToolDef;

/// Get the query tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "run_query",
            "Run a SQL query on Redshift and return the results. SELECT queries return \
             the matching rows; other statements return the affected row count. The SQL \
             is executed verbatim, so include WHERE and LIMIT clauses to keep result \
             sets small.",
            schema!(object {
                required: { "query": string => "The SQL query to execute" }
            }),
        ),
        ToolDef::new(
            "explain_query",
            "Get the execution plan for a SQL query without running it. Useful for \
             spotting full table scans, join strategies, and estimated costs before \
             executing an expensive query.",
            schema!(object {
                required: { "query": string => "The SQL query to explain" }
            }),
        ),
    ]
}

/// Dispatch a query tool call.
pub async fn dispatch(
    session: &RedshiftSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "run_query" => {
            let query = get_non_empty_string_arg(&args, "query")?;
            tracing::debug!(query = %truncate(&query), "run_query");
            let rows = session.run_sql(&query).await?;
            Ok(rows_json(rows))
        }

        "explain_query" => {
            let query = get_non_empty_string_arg(&args, "query")?;
            tracing::debug!(query = %truncate(&query), "explain_query");
            let rows = session.run_sql(&format!("EXPLAIN {}", query)).await?;
            Ok(rows_json(rows))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

pub(crate) fn rows_json(rows: Vec<crate::convert::RowMap>) -> JsonValue {
    JsonValue::Array(rows.into_iter().map(JsonValue::Object).collect())
}

fn truncate(sql: &str) -> &str {
    let end = sql
        .char_indices()
        .nth(100)
        .map(|(i, _)| i)
        .unwrap_or(sql.len());
    &sql[..end]
}
