//! MCP server for Amazon Redshift.
//!
//! Connection parameters come from `REDSHIFT_HOST`, `REDSHIFT_PORT`,
//! `REDSHIFT_DATABASE`, `REDSHIFT_USER`, `REDSHIFT_PASSWORD`. Run with no
//! arguments for stdio transport, or `--sse --port 8888` for HTTP/SSE.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod config;
mod convert;
mod error;
mod http;
mod server;
mod session;
mod tools;

use config::RedshiftConfig;
use server::McpServer;
use session::RedshiftSession;

/// MCP server for Amazon Redshift.
///
/// Exposes query execution, plan explanation, and schema introspection as
/// MCP tools. Communicates via JSON-RPC 2.0 over stdin/stdout, or over
/// HTTP/SSE with --sse.
#[derive(Parser)]
#[command(name = "redshift-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Use the HTTP/SSE transport instead of stdio.
    #[arg(long)]
    sse: bool,

    /// Port for the HTTP/SSE transport.
    #[arg(long, default_value_t = 8888)]
    port: u16,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logging goes to stderr; stdout belongs to the protocol.
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.verbose {
        if let Ok(directive) = "redshift_mcp=debug".parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Two-phase startup: build config, then verify connectivity.
    // Only then does any transport start accepting traffic.
    let config = match RedshiftConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let session = match RedshiftSession::connect(&config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: failed to connect to {}: {}", config.endpoint(), e);
            std::process::exit(1);
        }
    };

    let (ok, message) = session.test_connection().await;
    if !ok {
        eprintln!("Error: Redshift connection test failed: {}", message);
        std::process::exit(1);
    }
    tracing::info!(endpoint = %config.endpoint(), version = %message, "connection test successful");

    let server = Arc::new(McpServer::new(Arc::new(session)));

    let result = if args.sse {
        tracing::info!(port = args.port, "starting with SSE transport");
        http::run(server, args.port).await
    } else {
        tracing::info!("starting with stdio transport");
        server.run().await
    };

    if let Err(e) = result {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}
