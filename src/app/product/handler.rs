//! Product 处理器

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{
    gateway::ProductGateway,
    model::{NewProduct, PartialProduct, Product},
};
use crate::core::{error::CoreError, response::ApiResponse};

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ProductGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ProductGateway>) -> Self {
        Self { gateway }
    }
}

type HandlerResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), CoreError>;

/// 解析请求体，空请求体视为缺少数据
fn parse_payload<T: DeserializeOwned>(body: &Bytes) -> Result<T, CoreError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CoreError::BadRequest("No data".to_string()));
    }

    serde_json::from_slice(body)
        .map_err(|e| CoreError::BadRequest(format!("Invalid product data: {}", e)))
}

/// GET /api/v1/products
pub async fn get_products(State(state): State<AppState>) -> HandlerResult<Vec<Product>> {
    let products = state.gateway.list_all().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(products))))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<Product> {
    let product = state.gateway.get_by_id(&id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(product))))
}

/// POST /api/v1/products
pub async fn add_product(State(state): State<AppState>, body: Bytes) -> HandlerResult<Product> {
    let fields: NewProduct = parse_payload(&body)?;
    let product = state.gateway.insert(fields).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// PUT /api/v1/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> HandlerResult<Product> {
    // 先确认记录存在，404 优先于 400
    state.gateway.get_by_id(&id).await?;

    let patch: PartialProduct = parse_payload(&body)?;
    let product = state.gateway.update(&id, patch).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(product))))
}

/// DELETE /api/v1/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult<()> {
    state.gateway.get_by_id(&id).await?;
    state.gateway.delete(&id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::message(format!(
            "Product with id {} has been deleted",
            id
        ))),
    ))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "healthy",
        "backend": state.gateway.backend(),
    })))
}
