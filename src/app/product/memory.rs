//! 内存存储网关
//!
//! 有序集合保存在读写锁内，每个操作在一次加锁内完成读-改-写。

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::gateway::{ProductGateway, StoreError};
use super::merge::merge;
use super::model::{NewProduct, PartialProduct, Product};

#[derive(Debug, Default)]
pub struct MemoryGateway {
    products: RwLock<Vec<Product>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// 演示数据
    pub fn with_demo_data() -> Self {
        let products = [
            ("Product One", "This is product one", 29.99),
            ("Product Two", "This is product two", 39.99),
            ("Product Three", "This is product three", 59.99),
        ]
        .into_iter()
        .map(|(name, description, price)| {
            Product::new(Uuid::new_v4().to_string(), name, description, price)
        })
        .collect();

        Self::with_products(products)
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.products.read().await.len()
    }
}

/// 生成与已有记录不冲突的 id
fn fresh_id(products: &[Product]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !products.iter().any(|product| product.id == id) {
            return id;
        }
    }
}

#[async_trait]
impl ProductGateway for MemoryGateway {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.read().await.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Product, StoreError> {
        self.products
            .read()
            .await
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let product = Product::from_new(fresh_id(&products), fields);
        products.push(product.clone());

        info!(id = %product.id, total = products.len(), "product created");
        Ok(product)
    }

    async fn update(&self, id: &str, patch: PartialProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().await;
        let slot = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        *slot = merge(slot, &patch);

        info!(id, "product updated");
        Ok(slot.clone())
    }

    /// 过滤掉所有匹配项；不存在时同样视为成功
    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| product.id != id);

        debug!(id, removed = before - products.len(), "product delete applied");
        Ok(())
    }
}
