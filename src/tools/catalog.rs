//! Schema introspection tools.
//!
//! Tools: list_schemas, list_tables_in_schema

use serde_json::{Map, Value as JsonValue};

use crate::convert::get_non_empty_string_arg;
use crate::error::{McpError, Result};
use crate::schema;
use crate::session::RedshiftSession;
use crate::tools::query::rows_json;
use crate::tools::ToolDef;

const LIST_SCHEMAS_SQL: &str = "\
    SELECT schema_name, schema_owner \
    FROM information_schema.schemata \
    ORDER BY schema_name";

// The schema name is bound as a parameter, never interpolated.
const LIST_TABLES_SQL: &str = "\
    SELECT table_name, table_type, table_schema \
    FROM information_schema.tables \
    WHERE table_schema = $1 \
    ORDER BY table_name";

/// Get the catalog tool definitions.
pub fn tools() -> Vec<ToolDef> {
    vec![
        ToolDef::new(
            "list_schemas",
            "List all schemas in the database with their owners. Most databases \
             include public, information_schema, and pg_catalog; use this to explore \
             the high-level structure before querying specific tables.",
            schema!(object {}),
        ),
        ToolDef::new(
            "list_tables_in_schema",
            "List all tables and views in a specific schema. Each row carries \
             table_name, table_type, and table_schema. A schema with no tables \
             returns an empty list.",
            schema!(object {
                required: { "schema_name": string => "The name of the schema" }
            }),
        ),
    ]
}

/// Dispatch a catalog tool call.
pub async fn dispatch(
    session: &RedshiftSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_schemas" => {
            let rows = session.query(LIST_SCHEMAS_SQL, &[]).await?;
            Ok(rows_json(rows))
        }

        "list_tables_in_schema" => {
            let schema_name = get_non_empty_string_arg(&args, "schema_name")?;
            let rows = session.query(LIST_TABLES_SQL, &[&schema_name]).await?;
            Ok(rows_json(rows))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}
