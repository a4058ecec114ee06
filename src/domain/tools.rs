//! Tools exposed via Model Context Protocol
//!
//! Provides the `airbnb_search` and `airbnb_listing_details` descriptors and
//! routes `tools/call` invocations to the mock listing providers. Adding a
//! tool means adding both a descriptor and a match arm in [`call_tool`].

use rust_mcp_sdk::schema::{CallToolResult, ContentBlock, TextContent};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::domain::{
    listings::{listing_details, search},
    params::{text_field, SearchParams},
};

pub const SEARCH_TOOL: &str = "airbnb_search";
pub const LISTING_DETAILS_TOOL: &str = "airbnb_listing_details";

/// Server-defined JSON-RPC error code used for every tool failure.
pub const TOOL_ERROR_CODE: i64 = -32000;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("failed to encode tool result: {0}")]
    Encode(String),
}

impl ToolError {
    pub fn code(&self) -> i64 {
        TOOL_ERROR_CODE
    }
}

pub fn build_tools_list() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: SEARCH_TOOL,
            description: "Search for Airbnb listings with various filters. Returns mock listing data.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "Location to search for (city, state, etc.)"
                    },
                    "checkin": {
                        "type": "string",
                        "format": "date",
                        "description": "Check-in date (YYYY-MM-DD)"
                    },
                    "checkout": {
                        "type": "string",
                        "format": "date",
                        "description": "Check-out date (YYYY-MM-DD)"
                    },
                    "adults": guest_count("Number of adults", 1, 16, 1),
                    "children": guest_count("Number of children", 0, 10, 0),
                    "infants": guest_count("Number of infants", 0, 5, 0),
                    "pets": guest_count("Number of pets", 0, 5, 0),
                    "minPrice": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Minimum price per night"
                    },
                    "maxPrice": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Maximum price per night"
                    }
                },
                "required": []
            }),
        },
        ToolDescriptor {
            name: LISTING_DETAILS_TOOL,
            description: "Get detailed information about a specific Airbnb listing. Returns mock listing data.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The Airbnb listing ID"
                    },
                    "checkin": {
                        "type": "string",
                        "format": "date",
                        "description": "Check-in date (YYYY-MM-DD)"
                    },
                    "checkout": {
                        "type": "string",
                        "format": "date",
                        "description": "Check-out date (YYYY-MM-DD)"
                    },
                    "adults": guest_count("Number of adults", 1, 16, 1),
                    "children": guest_count("Number of children", 0, 10, 0),
                    "infants": guest_count("Number of infants", 0, 5, 0),
                    "pets": guest_count("Number of pets", 0, 5, 0)
                },
                "required": ["id"]
            }),
        },
    ]
}

fn guest_count(description: &str, minimum: u32, maximum: u32, default: u32) -> Value {
    json!({
        "type": "integer",
        "minimum": minimum,
        "maximum": maximum,
        "default": default,
        "description": description
    })
}

/// Renders the requested tool name for lookup and error messages. A missing
/// name reads as `undefined`; non-string names keep their JSON text.
pub fn requested_tool_name(params: Option<&Value>) -> String {
    match params.and_then(|params| params.get("name")) {
        Some(Value::String(name)) => name.clone(),
        Some(other) => other.to_string(),
        None => "undefined".to_string(),
    }
}

/// Runs a tool by name. Schema bounds are not enforced here.
pub fn call_tool(name: &str, arguments: Option<&Value>) -> Result<CallToolResult, ToolError> {
    let empty = json!({});
    let arguments = arguments.unwrap_or(&empty);

    let payload = match name {
        SEARCH_TOOL => to_pretty_json(&search(&SearchParams::from_value(arguments)))?,
        LISTING_DETAILS_TOOL => {
            let id = text_field(arguments, "id").ok_or(ToolError::MissingParameter("id"))?;
            to_pretty_json(&listing_details(&id, &SearchParams::from_value(arguments)))?
        }
        other => return Err(ToolError::UnknownTool(other.to_string())),
    };

    Ok(CallToolResult {
        content: vec![ContentBlock::from(TextContent::new(payload, None, None))],
        is_error: None,
        meta: None,
        structured_content: None,
    })
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|err| ToolError::Encode(err.to_string()))
}
