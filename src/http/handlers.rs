//! Axum HTTP handlers for the web server
//!
//! Provides the Model Context Protocol endpoints (JSON-RPC over POST, SSE
//! over GET) and the informational endpoints.

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::State,
    http::Uri,
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::search_example;
use crate::domain::listings::now_utc;
use crate::errors::AppError;
use crate::mcp::server::handle_json_rpc_body;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub uptime_seconds: f64,
    pub active_connections: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
    pub transports: [&'static str; 2],
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        active_connections: state.connections.len(),
        timestamp: now_utc(),
    })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
        transports: ["http", "sse"],
    })
}

pub async fn documentation() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Mock travel-listing data served over REST and the Model Context Protocol",
        "endpoints": {
            "GET /": "This documentation",
            "GET /health": "Health check with uptime",
            "GET /.well-known/mcp": "MCP discovery document",
            "POST /api/search": "Search listings (requires location)",
            "POST /api/listing/{id}": "Listing details for an id",
            "GET /mcp": "MCP Server-Sent-Events stream",
            "POST /mcp": "MCP JSON-RPC endpoint"
        },
        "examples": {
            "search": search_example(),
            "listing": {
                "checkin": "2026-12-01",
                "checkout": "2026-12-05",
                "adults": 2
            },
            "mcp": {
                "toolsList": { "jsonrpc": "2.0", "id": 1, "method": "tools/list" },
                "toolsCall": {
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/call",
                    "params": {
                        "name": "airbnb_search",
                        "arguments": { "location": "San Francisco, CA", "adults": 2 }
                    }
                }
            }
        },
        "timestamp": now_utc()
    }))
}

pub async fn mcp_endpoint(body: Bytes) -> Response {
    Json(handle_json_rpc_body(&body)).into_response()
}

pub async fn mcp_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = state
        .connections
        .connect()
        .map(|message| Ok(Event::default().data(message.to_string())));

    Sse::new(stream)
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::not_found(uri.path())
}
