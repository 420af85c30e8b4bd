//! Product 资源：模型、物化、合并、存储网关与处理器

pub mod gateway;
pub mod handler;
pub mod materializer;
pub mod memory;
pub mod merge;
pub mod model;
pub mod relational;

pub use gateway::{ProductGateway, StoreError};
pub use memory::MemoryGateway;
pub use model::{NewProduct, PartialProduct, Product, ProductField};
pub use relational::RelationalGateway;
