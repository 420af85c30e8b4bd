//! # product-api
//!
//! 产品资源的 CRUD 服务，可在 Postgres 与进程内存储之间切换。
//! 关系型路径把按位置编码的查询结果物化为规范记录，
//! 两种后端共享同一套合并更新语义。

pub mod app;
pub mod core;
pub mod infrastructure;

pub use app::product::{
    MemoryGateway, NewProduct, PartialProduct, Product, ProductGateway, RelationalGateway,
    StoreError,
};
