//! 关系型存储网关
//!
//! 每个操作独立获取连接，并在所有退出路径上释放。
//! 更新与删除是先读后写，不在事务中执行，并发写入时后写者生效。

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::gateway::{ProductGateway, StoreError};
use super::merge::merge;
use super::model::{NewProduct, PartialProduct, Product};
use crate::infrastructure::database::{Connection, Driver, SqlValue};

// id 统一按文本比较、price 统一读成 float8，兼容 SERIAL/UUID 主键与 NUMERIC 价格列
const SELECT_ALL: &str =
    "SELECT id::text AS id, name, description, price::float8 AS price FROM products";
const SELECT_BY_ID: &str = "SELECT id::text AS id, name, description, price::float8 AS price \
     FROM products WHERE id::text = $1";
const INSERT: &str = "INSERT INTO products (name, description, price) VALUES ($1, $2, $3) \
     RETURNING id::text AS id, name, description, price::float8 AS price";
const UPDATE: &str =
    "UPDATE products SET name = $1, description = $2, price = $3 WHERE id::text = $4";
const DELETE: &str = "DELETE FROM products WHERE id::text = $1";

#[derive(Clone)]
pub struct RelationalGateway {
    driver: Arc<dyn Driver>,
}

impl RelationalGateway {
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self { driver }
    }

    async fn fetch_by_id(conn: &mut dyn Connection, id: &str) -> Result<Product, StoreError> {
        let result = conn.query(SELECT_BY_ID, &[id.into()]).await?;
        result
            .into_product()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list_with(conn: &mut dyn Connection) -> Result<Vec<Product>, StoreError> {
        let result = conn.query(SELECT_ALL, &[]).await?;
        Ok(result.into_products()?)
    }

    async fn insert_with(
        conn: &mut dyn Connection,
        fields: NewProduct,
    ) -> Result<Product, StoreError> {
        let params = [
            SqlValue::from(fields.name),
            SqlValue::from(fields.description),
            SqlValue::from(fields.price),
        ];
        let result = conn.query(INSERT, &params).await?;
        result
            .into_product()?
            .ok_or_else(|| StoreError::Storage("insert returned no row".to_string()))
    }

    async fn update_with(
        conn: &mut dyn Connection,
        id: &str,
        patch: &PartialProduct,
    ) -> Result<Product, StoreError> {
        let existing = Self::fetch_by_id(conn, id).await?;
        let merged = merge(&existing, patch);

        let params = [
            SqlValue::from(merged.name.as_str()),
            SqlValue::from(merged.description.as_str()),
            SqlValue::from(merged.price),
            SqlValue::from(id),
        ];
        conn.query(UPDATE, &params).await?;
        Ok(merged)
    }

    async fn delete_with(conn: &mut dyn Connection, id: &str) -> Result<(), StoreError> {
        Self::fetch_by_id(conn, id).await?;
        conn.query(DELETE, &[id.into()]).await?;
        Ok(())
    }
}

#[async_trait]
impl ProductGateway for RelationalGateway {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let mut conn = self.driver.connect().await?;
        let result = Self::list_with(conn.as_mut()).await;
        conn.end().await;

        if let Ok(products) = &result {
            debug!(count = products.len(), "listed products");
        }
        result
    }

    async fn get_by_id(&self, id: &str) -> Result<Product, StoreError> {
        let mut conn = self.driver.connect().await?;
        let result = Self::fetch_by_id(conn.as_mut(), id).await;
        conn.end().await;
        result
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let mut conn = self.driver.connect().await?;
        let result = Self::insert_with(conn.as_mut(), fields).await;
        conn.end().await;

        if let Ok(product) = &result {
            info!(id = %product.id, "product created");
        }
        result
    }

    async fn update(&self, id: &str, patch: PartialProduct) -> Result<Product, StoreError> {
        let mut conn = self.driver.connect().await?;
        let result = Self::update_with(conn.as_mut(), id, &patch).await;
        conn.end().await;

        match &result {
            Ok(_) => info!(id, "product updated"),
            Err(StoreError::NotFound(_)) => warn!(id, "update skipped, product not found"),
            Err(_) => {}
        }
        result
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut conn = self.driver.connect().await?;
        let result = Self::delete_with(conn.as_mut(), id).await;
        conn.end().await;

        match &result {
            Ok(()) => info!(id, "product deleted"),
            Err(StoreError::NotFound(_)) => warn!(id, "delete skipped, product not found"),
            Err(_) => {}
        }
        result
    }
}
