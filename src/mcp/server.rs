//! The central Model Context Protocol engine
//!
//! Decodes JSON-RPC bodies and routes `initialize`, `tools/list` and
//! `tools/call`. Stateless: every message is handled on its own.

use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ServerCapabilities, ServerCapabilitiesTools,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::tools::{build_tools_list, call_tool, requested_tool_name, ToolError};
use crate::mcp::rpc::{
    internal_error, json_rpc_error, json_rpc_result, JsonRpcMessage, JsonRpcResponse,
    INTERNAL_ERROR, METHOD_NOT_FOUND,
};

pub const SUPPORTED_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn code(&self) -> i64 {
        match self {
            Self::MethodNotFound(_) => METHOD_NOT_FOUND,
            Self::Tool(ToolError::Encode(_)) | Self::Internal(_) => INTERNAL_ERROR,
            Self::Tool(err) => err.code(),
        }
    }

    /// Message placed on the wire. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.code() {
            INTERNAL_ERROR => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Handles a raw `POST /mcp` body. Anything that cannot be read as a
/// JSON-RPC message becomes an internal error envelope.
pub fn handle_json_rpc_body(body: &[u8]) -> JsonRpcResponse {
    let payload: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "mcp request body is not valid json");
            return internal_error(None);
        }
    };

    handle_json_rpc_value(payload)
}

pub fn handle_json_rpc_value(payload: Value) -> JsonRpcResponse {
    let request_id = payload.get("id").cloned();
    let message: JsonRpcMessage = match serde_json::from_value(payload) {
        Ok(message) => message,
        Err(err) => {
            warn!(error = %err, "mcp request is not a json-rpc message");
            return internal_error(request_id);
        }
    };

    handle_json_rpc_message(message)
}

pub fn handle_json_rpc_message(message: JsonRpcMessage) -> JsonRpcResponse {
    let tool_name = message
        .params
        .as_ref()
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let response = match dispatch(&message.method, message.params.as_ref()) {
        Ok(result) => json_rpc_result(message.id, result),
        Err(err) => {
            if err.code() == INTERNAL_ERROR {
                warn!(method = %message.method, error = %err, "mcp dispatch failed");
            }
            json_rpc_error(message.id, err.code(), err.public_message())
        }
    };

    info!(
        method = %message.method,
        tool = tool_name.as_deref().unwrap_or("-"),
        outcome = if response.is_error() { "failure" } else { "success" },
        "mcp action audited"
    );

    response
}

pub fn dispatch(method: &str, params: Option<&Value>) -> Result<Value, DispatchError> {
    match method {
        "initialize" => initialize_result(),
        "tools/list" => Ok(json!({ "tools": build_tools_list() })),
        "tools/call" => {
            let name = requested_tool_name(params);
            let arguments = params
                .and_then(|params| params.get("arguments"))
                .filter(|arguments| !arguments.is_null());

            let result = call_tool(&name, arguments)?;
            serde_json::to_value(result).map_err(|err| DispatchError::Internal(err.to_string()))
        }
        other => Err(DispatchError::MethodNotFound(other.to_string())),
    }
}

fn initialize_result() -> Result<Value, DispatchError> {
    let initialize_result = InitializeResult {
        server_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            title: None,
            description: None,
            icons: vec![],
            website_url: None,
        },
        capabilities: ServerCapabilities {
            tools: Some(ServerCapabilitiesTools {
                list_changed: Some(false),
            }),
            ..Default::default()
        },
        protocol_version: SUPPORTED_PROTOCOL_VERSION.to_string(),
        instructions: None,
        meta: None,
    };

    serde_json::to_value(initialize_result).map_err(|err| DispatchError::Internal(err.to_string()))
}
