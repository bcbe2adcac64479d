//! 应用层：路由与共享状态

pub mod users;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, MethodRouter},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

use crate::core::{
    error::ApiError,
    middleware::{request_logging_middleware, request_timeout_middleware},
    response::{HealthResponse, MessageResponse},
};
use crate::infrastructure::database::Gateway;
use users::{handler, UserService};

/// 请求处理器共享的状态
#[derive(Clone, Debug)]
pub struct AppState {
    pub users: UserService,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            users: UserService::new(gateway.clone()),
            gateway,
        }
    }
}

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("hello world"))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.gateway.ping().await.map_err(|e| {
        error!("Health check failed: {}", e);
        ApiError::ServiceUnavailable("Database unavailable".to_string())
    })?;

    Ok(Json(HealthResponse::healthy()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// 未注册的方法返回 JSON 405
fn json_405(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(method_not_allowed)
}

// 创建路由
pub fn create_routes(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", json_405(get(root)))
        .route("/health", json_405(get(health_check)))
        .route("/users/search/", json_405(get(handler::search_by_name)))
        .route("/users/search", json_405(get(handler::search_by_name)))
        .route("/users/all/", json_405(get(handler::list_users)))
        .route("/users/all", json_405(get(handler::list_users)))
        .route(
            "/users/:id",
            json_405(
                get(handler::get_user)
                    .post(handler::create_user)
                    .put(handler::update_user)
                    .delete(handler::delete_user),
            ),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(middleware::from_fn_with_state(
                    request_timeout,
                    request_timeout_middleware,
                )),
        )
        .with_state(state)
}
