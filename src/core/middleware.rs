//! 核心中间件模块

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::ApiError;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 请求日志中间件，并在响应头中附加请求 id
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());
    let request_id = Uuid::new_v4().to_string();

    let mut response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    info!(
        "{} {} - {} - {}ms - request_id: {} - User-Agent: {:?}",
        method,
        uri,
        status,
        duration.as_millis(),
        request_id,
        user_agent
    );

    response
}

/// 请求级超时，超时后返回带 `detail` 的 408
pub async fn request_timeout_middleware(
    State(timeout): State<Duration>,
    req: Request,
    next: Next,
) -> Response {
    let uri = req.uri().clone();

    match tokio::time::timeout(timeout, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!("Request {} exceeded {:?}", uri, timeout);
            ApiError::Timeout.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use axum_test::TestServer;
    use serde_json::Value;

    fn slow_router(timeout: Duration) -> Router {
        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "done"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .layer(middleware::from_fn_with_state(
                timeout,
                request_timeout_middleware,
            ))
    }

    #[tokio::test]
    async fn test_slow_request_times_out_with_detail() {
        let server = TestServer::new(slow_router(Duration::from_millis(10))).unwrap();

        let response = server.get("/slow").await;
        response.assert_status(StatusCode::REQUEST_TIMEOUT);
        let body: Value = response.json();
        assert_eq!(body["detail"], "Request timed out");
        assert_eq!(body["code"], 408);
    }

    #[tokio::test]
    async fn test_fast_request_passes_through() {
        let server = TestServer::new(slow_router(Duration::from_secs(5))).unwrap();

        let response = server.get("/fast").await;
        response.assert_status_ok();
        response.assert_text("done");
    }

    #[tokio::test]
    async fn test_request_id_header_is_attached() {
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn(request_logging_middleware));
        let server = TestServer::new(app).unwrap();

        let response = server.get("/").await;
        assert!(response.headers().get(REQUEST_ID_HEADER).is_some());
    }
}
