//! 存储网关抽象
//!
//! 关系型与内存两种实现共享同一契约，处理器只依赖 [`ProductGateway`]。

use async_trait::async_trait;

use super::materializer::MaterializeError;
use super::model::{NewProduct, PartialProduct, Product};
use crate::infrastructure::database::DriverError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("No product with the id of {0}")]
    NotFound(String),
    #[error("{0}")]
    Storage(String),
}

impl From<DriverError> for StoreError {
    fn from(err: DriverError) -> Self {
        StoreError::Storage(err.0)
    }
}

impl From<MaterializeError> for StoreError {
    fn from(err: MaterializeError) -> Self {
        StoreError::Storage(err.to_string())
    }
}

#[async_trait]
pub trait ProductGateway: Send + Sync {
    /// 后端名称，用于日志与健康检查
    fn backend(&self) -> &'static str;

    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_by_id(&self, id: &str) -> Result<Product, StoreError>;

    async fn insert(&self, fields: NewProduct) -> Result<Product, StoreError>;

    /// 返回合并后的单条记录
    async fn update(&self, id: &str, patch: PartialProduct) -> Result<Product, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
