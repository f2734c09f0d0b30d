use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::products;
use crate::config::Config;
use crate::error::AppError;
use crate::middleware::auth;
use crate::store::ProductStore;

pub struct AppState {
    pub config: Config,
    pub store: ProductStore,
}

pub async fn create_app(state: AppState) -> Result<Router, AppError> {
    let app_state = Arc::new(state);

    // 健康检查路由
    let health_route = Router::new().route("/health", get(|| async { "OK" }));

    // API 路由
    let api_routes = Router::new()
        .nest("/products", products::routes())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::require_write_access,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-api-key")]);

    // 组合所有路由
    let app = Router::new()
        .nest("/api", api_routes)
        .merge(health_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    Ok(app)
}
