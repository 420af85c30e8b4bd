//! 合并更新

use super::model::{PartialProduct, Product};

/// 把部分更新覆盖到已有记录上，返回新记录。
///
/// 只覆盖请求体显式提供的字段；`id` 始终来自 `base`。
pub fn merge(base: &Product, patch: &PartialProduct) -> Product {
    Product {
        id: base.id.clone(),
        name: patch.name.clone().unwrap_or_else(|| base.name.clone()),
        description: patch
            .description
            .clone()
            .unwrap_or_else(|| base.description.clone()),
        price: patch.price.unwrap_or(base.price),
    }
}
