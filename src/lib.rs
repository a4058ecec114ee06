use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod middleware;

use config::{Config, CorsPolicy};
use mcp::sse::ConnectionRegistry;
use middleware::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub environment: Arc<str>,
    pub started_at: Instant,
    pub cors: Arc<CorsPolicy>,
    pub rate_limiter: Arc<RateLimiter>,
    pub connections: ConnectionRegistry,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            environment: Arc::from(config.environment.as_str()),
            started_at: Instant::now(),
            cors: Arc::new(config.cors.clone()),
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit,
                config.rate_limit_window,
            )),
            connections: ConnectionRegistry::new(config.ping_interval),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let rest = Router::new()
        .route("/api/search", post(api::search_listings))
        .route("/api/listing", post(api::missing_listing_id))
        .route("/api/listing/", post(api::missing_listing_id))
        .route("/api/listing/{id}", post(api::listing_detail))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::enforce_rate_limit,
        ));

    Router::new()
        .route("/", get(http::handlers::documentation))
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route(
            "/mcp",
            get(http::handlers::mcp_stream).post(http::handlers::mcp_endpoint),
        )
        .merge(rest)
        .fallback(http::handlers::not_found)
        .layer(CatchPanicLayer::custom(middleware::panic_response))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(middleware::cors_layer(&state.cors))
        .layer(axum::middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        extract::connect_info::ConnectInfo,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn state_with(config: Config) -> AppState {
        AppState::new(&config)
    }

    fn app() -> Router {
        build_app(state_with(Config::default()))
    }

    fn post_json(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request build")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("GET")
            .body(Body::empty())
            .expect("request build")
    }

    async fn body_json(response: Response) -> Value {
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        serde_json::from_slice(&body).expect("valid json response")
    }

    #[tokio::test]
    async fn health_reports_status_and_uptime() {
        let response = app().oneshot(get("/health")).await.expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptimeSeconds"].is_number());
        assert_eq!(body["activeConnections"], 0);
    }

    #[tokio::test]
    async fn root_serves_documentation() {
        let response = app().oneshot(get("/")).await.expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["endpoints"]["POST /mcp"].is_string());
        assert_eq!(body["examples"]["search"]["location"], "San Francisco, CA");
    }

    #[tokio::test]
    async fn discovery_points_at_mcp() {
        let response = app()
            .oneshot(get("/.well-known/mcp"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["mcp_endpoint"], "/mcp");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app().oneshot(get("/services")).await.expect("request execution");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not found");
        assert_eq!(body["path"], "/services");
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let response = app().oneshot(get("/health")).await.expect("request execution");

        assert_eq!(
            response.headers().get(header::X_CONTENT_TYPE_OPTIONS),
            Some(&header::HeaderValue::from_static("nosniff"))
        );
        assert!(response.headers().contains_key(header::X_FRAME_OPTIONS));
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .method("GET")
                    .header(header::ORIGIN, "https://client.example")
                    .body(Body::empty())
                    .expect("request build"),
            )
            .await
            .expect("request execution");

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&header::HeaderValue::from_static("*"))
        );
    }

    #[tokio::test]
    async fn mcp_tools_list_returns_both_tools() {
        let response = app()
            .oneshot(post_json("/mcp", r#"{"method":"tools/list","id":1}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], 1);
        let tools = body["result"]["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0]["name"], "airbnb_search");
        assert_eq!(tools[1]["name"], "airbnb_listing_details");
        assert!(tools[0]["inputSchema"]["properties"].is_object());
    }

    #[tokio::test]
    async fn mcp_initialize_returns_server_info() {
        let response = app()
            .oneshot(post_json(
                "/mcp",
                r#"{"jsonrpc":"2.0","id":"init","method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{}}}"#,
            ))
            .await
            .expect("request execution");

        let body = body_json(response).await;
        assert_eq!(body["id"], "init");
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(body["result"]["serverInfo"]["name"], env!("CARGO_PKG_NAME"));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn mcp_unknown_method_returns_method_not_found() {
        let response = app()
            .oneshot(post_json("/mcp", r#"{"jsonrpc":"2.0","id":1,"method":"unknown"}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32601);
        assert_eq!(body["error"]["message"], "Method not found: unknown");
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn mcp_tools_call_search_returns_text_content() {
        let response = app()
            .oneshot(post_json(
                "/mcp",
                r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"airbnb_search","arguments":{"location":"Denver","adults":"2"}}}"#,
            ))
            .await
            .expect("request execution");

        let body = body_json(response).await;
        let text = body["result"]["content"][0]["text"]
            .as_str()
            .expect("text content");
        let payload: Value = serde_json::from_str(text).expect("json text");
        assert_eq!(payload["success"], true);
        assert_eq!(payload["searchParams"]["adults"], 2);
        assert_eq!(
            payload["listings"].as_array().map(Vec::len),
            payload["totalResults"].as_u64().map(|n| n as usize)
        );
    }

    #[tokio::test]
    async fn mcp_tools_call_unknown_tool() {
        let response = app()
            .oneshot(post_json(
                "/mcp",
                r#"{"method":"tools/call","id":2,"params":{"name":"bogus"}}"#,
            ))
            .await
            .expect("request execution");

        let body = body_json(response).await;
        assert_eq!(body["id"], 2);
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["error"]["message"], "Unknown tool: bogus");
    }

    #[tokio::test]
    async fn mcp_tools_call_details_without_id() {
        let response = app()
            .oneshot(post_json(
                "/mcp",
                r#"{"method":"tools/call","id":4,"params":{"name":"airbnb_listing_details","arguments":{"adults":2}}}"#,
            ))
            .await
            .expect("request execution");

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], -32000);
        assert_eq!(body["error"]["message"], "Missing required parameter: id");
    }

    #[tokio::test]
    async fn mcp_invalid_json_returns_internal_error() {
        let response = app()
            .oneshot(post_json("/mcp", "{"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["id"], Value::Null);
        assert_eq!(body["error"]["code"], -32603);
        assert_eq!(body["error"]["message"], "Internal error");
    }

    #[tokio::test]
    async fn mcp_stream_opens_with_connection_event() {
        let state = state_with(Config::default());
        let response = build_app(state.clone())
            .oneshot(get("/mcp"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/event-stream"));
        assert_eq!(state.connections.len(), 1);

        let mut body = response.into_body();
        let frame = body
            .frame()
            .await
            .expect("first frame")
            .expect("frame read");
        let data = frame.into_data().expect("data frame");
        let text = std::str::from_utf8(&data).expect("utf8 frame");
        assert!(text.starts_with("data: "));
        assert!(text.ends_with("\n\n"));
        assert!(text.contains(r#""type":"connection""#));

        drop(body);
        assert!(state.connections.is_empty());
    }

    #[tokio::test]
    async fn rest_search_requires_location() {
        let response = app()
            .oneshot(post_json("/api/search", "{}"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Location is required");
        assert!(body["example"]["location"].is_string());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn rest_search_returns_tagged_results() {
        let response = app()
            .oneshot(post_json(
                "/api/search",
                r#"{"location":"Boston","adults":"3","children":"1"}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["source"], "mock-data");
        assert_eq!(body["searchParams"]["adults"], 3);
        assert_eq!(body["searchParams"]["children"], 1);
        assert_eq!(body["totalResults"], 3);
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn rest_listing_returns_details() {
        let response = app()
            .oneshot(post_json(
                "/api/listing/mcp-1",
                r#"{"checkin":"2026-06-01","checkout":"2026-06-03"}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["source"], "mock-data");
        assert_eq!(body["listing"]["id"], "mcp-1");
        assert_eq!(body["listing"]["pricing"]["nights"], 2);
    }

    #[tokio::test]
    async fn rest_listing_accepts_empty_body() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/listing/abc")
                    .method("POST")
                    .body(Body::empty())
                    .expect("request build"),
            )
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["listing"]["id"], "abc");
    }

    #[tokio::test]
    async fn rest_listing_without_id_is_bad_request() {
        let response = app()
            .oneshot(post_json("/api/listing/", "{}"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Listing ID is required");
    }

    #[tokio::test]
    async fn rest_routes_are_rate_limited_per_client() {
        let app = build_app(state_with(Config {
            rate_limit: 2,
            ..Config::default()
        }));

        let request = |last: u8| {
            Request::builder()
                .uri("/api/search")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .extension(ConnectInfo(std::net::SocketAddr::from((
                    [10, 0, 0, last],
                    9000,
                ))))
                .body(Body::from(r#"{"location":"Miami"}"#))
                .expect("request build")
        };

        for _ in 0..2 {
            let response = app.clone().oneshot(request(1)).await.expect("request execution");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let limited = app.clone().oneshot(request(1)).await.expect("request execution");
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.headers().contains_key(header::RETRY_AFTER));

        let other_client = app.clone().oneshot(request(2)).await.expect("request execution");
        assert_eq!(other_client.status(), StatusCode::OK);

        let mcp = app
            .oneshot(post_json("/mcp", r#"{"method":"tools/list","id":1}"#))
            .await
            .expect("request execution");
        assert_eq!(mcp.status(), StatusCode::OK);
    }
}
