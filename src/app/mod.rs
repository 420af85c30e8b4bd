//! 应用层

pub mod product;

use axum::{middleware, routing::get, Router};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::core::middleware::request_logging_middleware;
use crate::infrastructure::config::ServerConfig;
use product::handler::{
    add_product, delete_product, get_product, get_products, health_check, update_product,
    AppState,
};

/// 组装路由与中间件
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/products", get(get_products).post(add_product))
        .route(
            "/api/v1/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_logging_middleware))
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeout_seconds))),
        )
        .with_state(state)
}
