//! Product 数据模型

use serde::{Deserialize, Serialize};

/// 产品规范记录，与存储后端无关
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// 创建产品所需字段，id 由存储层分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// 部分更新请求体
/// 缺失或为 `null` 的字段保留原值；`id` 等其他键一律忽略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// [`Product`] 字段枚举，顺序与声明一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Id,
    Name,
    Description,
    Price,
}

impl ProductField {
    pub const ALL: [ProductField; 4] = [
        ProductField::Id,
        ProductField::Name,
        ProductField::Description,
        ProductField::Price,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
        }
    }

    /// 根据列名解析字段，未知列返回 `None`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

impl Product {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            price,
        }
    }

    pub fn from_new(id: impl Into<String>, fields: NewProduct) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            description: fields.description,
            price: fields.price,
        }
    }
}

#[cfg(test)]
impl PartialProduct {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_resolve_in_order() {
        let names: Vec<_> = ProductField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, ["id", "name", "description", "price"]);
        assert_eq!(ProductField::from_name("price"), Some(ProductField::Price));
        assert_eq!(ProductField::from_name("created_at"), None);
    }

    #[test]
    fn partial_product_ignores_id_key() {
        let patch: PartialProduct =
            serde_json::from_str(r#"{"id":"other","price":15}"#).unwrap();
        assert_eq!(patch.price, Some(15.0));
        assert!(patch.name.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn null_fields_count_as_absent() {
        let patch: PartialProduct = serde_json::from_str(r#"{"name":null}"#).unwrap();
        assert!(patch.is_empty());
    }
}
