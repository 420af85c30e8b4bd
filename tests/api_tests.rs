use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use product_api::app::{self, product::handler::AppState};
use product_api::infrastructure::config::ServerConfig;
use product_api::{
    MemoryGateway, NewProduct, PartialProduct, Product, ProductGateway, StoreError,
};
use serde_json::{json, Value};
use std::sync::Arc;

fn server_with(gateway: MemoryGateway) -> TestServer {
    let state = AppState::new(Arc::new(gateway));
    let app = app::router(state, &ServerConfig::default());
    TestServer::new(app).unwrap()
}

fn empty_server() -> TestServer {
    server_with(MemoryGateway::new())
}

#[tokio::test]
async fn test_health_check() {
    let server = empty_server();

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["backend"], "memory");
}

#[tokio::test]
async fn test_product_lifecycle() {
    let server = empty_server();

    // 创建
    let response = server
        .post("/api/v1/products")
        .json(&json!({"name": "X", "description": "Y", "price": 10}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let created: Product = serde_json::from_value(body["data"].clone()).unwrap();
    assert!(!created.id.is_empty());

    // 查询
    let response = server.get(&format!("/api/v1/products/{}", created.id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["data"],
        json!({"id": created.id, "name": "X", "description": "Y", "price": 10.0})
    );

    // 部分更新
    let response = server
        .put(&format!("/api/v1/products/{}", created.id))
        .json(&json!({"price": 15}))
        .await;
    response.assert_status_ok();

    let response = server.get(&format!("/api/v1/products/{}", created.id)).await;
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "X");
    assert_eq!(body["data"]["description"], "Y");
    assert_eq!(body["data"]["price"], 15.0);

    // 删除
    let response = server
        .delete(&format!("/api/v1/products/{}", created.id))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["msg"],
        format!("Product with id {} has been deleted", created.id)
    );

    let response = server.get(&format!("/api/v1/products/{}", created.id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_products() {
    let server = server_with(MemoryGateway::with_products(vec![
        Product::new("a", "A", "first", 1.0),
        Product::new("b", "B", "second", 2.0),
    ]));

    let response = server.get("/api/v1/products").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["A", "B"]);
}

#[tokio::test]
async fn test_missing_product_envelope() {
    let server = empty_server();

    let response = server.get("/api/v1/products/unknown").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({"success": false, "msg": "No product with the id of unknown"})
    );
}

#[tokio::test]
async fn test_add_without_body_is_bad_request() {
    let server = empty_server();

    let response = server.post("/api/v1/products").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, json!({"success": false, "msg": "No data"}));
}

#[tokio::test]
async fn test_add_with_incomplete_body_is_bad_request() {
    let server = empty_server();

    let response = server
        .post("/api/v1/products")
        .json(&json!({"name": "only a name"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_update_missing_product_is_not_found() {
    let server = empty_server();

    let response = server
        .put("/api/v1/products/ghost")
        .json(&json!({"price": 1}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_without_body_is_bad_request() {
    let server = server_with(MemoryGateway::with_products(vec![Product::new(
        "a", "A", "first", 1.0,
    )]));

    let response = server.put("/api/v1/products/a").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // 记录未被修改
    let body: Value = server.get("/api/v1/products/a").await.json();
    assert_eq!(body["data"]["price"], 1.0);
}

#[tokio::test]
async fn test_update_ignores_id_in_payload() {
    let server = server_with(MemoryGateway::with_products(vec![Product::new(
        "a", "A", "first", 1.0,
    )]));

    let response = server
        .put("/api/v1/products/a")
        .json(&json!({"id": "b", "name": "Renamed"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["id"], "a");
    assert_eq!(body["data"]["name"], "Renamed");

    server
        .get("/api/v1/products/b")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let server = empty_server();

    let response = server.delete("/api/v1/products/ghost").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

/// 所有操作都返回存储故障的网关
struct FailingGateway;

#[async_trait]
impl ProductGateway for FailingGateway {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> Result<Product, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn insert(&self, _fields: NewProduct) -> Result<Product, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn update(&self, _id: &str, _patch: PartialProduct) -> Result<Product, StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }

    async fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Storage("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_storage_fault_returns_500_with_message() {
    let state = AppState::new(Arc::new(FailingGateway));
    let server = TestServer::new(app::router(state, &ServerConfig::default())).unwrap();
    let expected = json!({"success": false, "msg": "connection refused"});

    let response = server.get("/api/v1/products").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), expected);

    let response = server
        .post("/api/v1/products")
        .json(&json!({"name": "X", "description": "Y", "price": 10}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), expected);

    let response = server.delete("/api/v1/products/any").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>(), expected);
}
