//! HTTP/SSE transport.
//!
//! Same request handling as the stdio loop, reachable over HTTP: clients
//! POST JSON-RPC requests to `/message` and may subscribe to `/sse` to
//! receive every response as a server-sent event. CORS is wide open; this
//! is a local operator tool, not a public service.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::cors::{Any, CorsLayer};

use crate::error::Result;
use crate::server::{JsonRpcRequest, McpServer};

/// Capacity of the broadcast channel feeding SSE subscribers.
const CHANNEL_CAPACITY: usize = 100;

struct HttpState {
    server: Arc<McpServer>,
    tx: broadcast::Sender<String>,
}

/// Serve the MCP protocol over HTTP on the given port.
///
/// Binds to all interfaces and runs until the process is terminated.
pub async fn run(server: Arc<McpServer>, port: u16) -> Result<()> {
    let (tx, _rx) = broadcast::channel::<String>(CHANNEL_CAPACITY);
    let state = Arc::new(HttpState { server, tx });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/sse", get(sse_handler))
        .route("/message", post(message_handler))
        .with_state(state)
        .layer(cors);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!(%addr, "SSE transport listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Server info for clients probing the endpoint.
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "redshift-mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "transport": "sse",
        "endpoints": {
            "sse": "/sse",
            "message": "/message"
        }
    }))
}

/// Clients connect here to receive responses as server-sent events.
async fn sse_handler(
    State(state): State<Arc<HttpState>>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let rx = state.tx.subscribe();

    let stream = BroadcastStream::new(rx).map(|result| match result {
        Ok(msg) => Ok(Event::default().data(msg)),
        Err(_) => Ok(Event::default().data("{\"error\": \"stream error\"}")),
    });

    Sse::new(stream)
}

/// Clients POST JSON-RPC requests here.
///
/// The response is returned directly and also broadcast to SSE subscribers.
/// Notifications are accepted but carry no response body.
async fn message_handler(
    State(state): State<Arc<HttpState>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let Some(response) = state.server.handle_request(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    if let Ok(serialized) = serde_json::to_string(&response) {
        // Only fails when there are no subscribers
        let _ = state.tx.send(serialized);
    }

    Json(response).into_response()
}
