//! REST adapter over the mock listing providers
//!
//! `POST /api/search` and `POST /api/listing/{id}`. Responses are the
//! provider payloads tagged with `source: "mock-data"`.

use axum::{body::Bytes, extract::Path, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    domain::{
        listings::{listing_details, search, ListingDetails, SearchResults},
        params::SearchParams,
    },
    errors::AppError,
};

pub const DATA_SOURCE: &str = "mock-data";

#[derive(Debug, Serialize)]
pub struct Sourced<T> {
    #[serde(flatten)]
    pub body: T,
    pub source: &'static str,
}

impl<T> Sourced<T> {
    fn mock(body: T) -> Json<Self> {
        Json(Self {
            body,
            source: DATA_SOURCE,
        })
    }
}

pub fn search_example() -> Value {
    json!({
        "location": "San Francisco, CA",
        "checkin": "2026-12-01",
        "checkout": "2026-12-05",
        "adults": 2,
        "children": 0
    })
}

pub async fn search_listings(body: Bytes) -> Result<Json<Sourced<SearchResults>>, AppError> {
    let payload = parse_body(&body)?;
    let params = SearchParams::from_value(&payload);

    if params.location.is_none() {
        return Err(AppError::bad_request_with_example(
            "Location is required",
            search_example(),
        ));
    }

    let results = search(&params);
    info!(
        location = params.location.as_deref().unwrap_or_default(),
        results = results.total_results,
        "search served"
    );

    Ok(Sourced::mock(results))
}

pub async fn listing_detail(
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Sourced<ListingDetails>>, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::bad_request("Listing ID is required"));
    }

    let payload = parse_body(&body)?;
    let details = listing_details(id, &SearchParams::from_value(&payload));
    info!(listing_id = %id, "listing details served");

    Ok(Sourced::mock(details))
}

pub async fn missing_listing_id() -> AppError {
    AppError::bad_request("Listing ID is required")
}

/// An empty body counts as `{}`; anything else must be JSON.
fn parse_body(body: &[u8]) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }

    serde_json::from_slice(body).map_err(|_| AppError::bad_request("Invalid JSON body"))
}
