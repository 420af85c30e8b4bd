//! 行物化
//!
//! 把按位置编码的查询结果（列描述 + 行）转换成 [`Product`]。
//! 不认识的列被忽略，缺失的字段保留零值，输出顺序与输入行一致。

use tracing::debug;

use super::model::{Product, ProductField};
use crate::infrastructure::database::{ColumnDescriptor, RawRow, ResultSet, SqlValue};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MaterializeError {
    #[error("row {row} has {values} values but the result set has {columns} columns")]
    ShapeMismatch {
        row: usize,
        columns: usize,
        values: usize,
    },
    #[error("column {column} holds a value that cannot be read: {value}")]
    InvalidValue { column: String, value: String },
}

pub fn materialize_many(
    columns: &[ColumnDescriptor],
    rows: &[RawRow],
) -> Result<Vec<Product>, MaterializeError> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| materialize_row(columns, row, index))
        .collect()
}

/// 空结果返回 `None`；多行时只取第一行
pub fn materialize_one(
    columns: &[ColumnDescriptor],
    rows: &[RawRow],
) -> Result<Option<Product>, MaterializeError> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    if rows.len() > 1 {
        debug!(discarded = rows.len() - 1, "single-row lookup returned extra rows");
    }

    materialize_row(columns, first, 0).map(Some)
}

impl ResultSet {
    pub fn into_products(self) -> Result<Vec<Product>, MaterializeError> {
        materialize_many(&self.columns, &self.rows)
    }

    pub fn into_product(self) -> Result<Option<Product>, MaterializeError> {
        materialize_one(&self.columns, &self.rows)
    }
}

fn materialize_row(
    columns: &[ColumnDescriptor],
    row: &RawRow,
    index: usize,
) -> Result<Product, MaterializeError> {
    if row.len() != columns.len() {
        return Err(MaterializeError::ShapeMismatch {
            row: index,
            columns: columns.len(),
            values: row.len(),
        });
    }

    let mut product = Product::default();
    for (column, value) in columns.iter().zip(row) {
        let Some(field) = ProductField::from_name(&column.name) else {
            continue;
        };

        match field {
            ProductField::Id => product.id = read_text(value),
            ProductField::Name => product.name = read_text(value),
            ProductField::Description => product.description = read_text(value),
            ProductField::Price => product.price = read_number(&column.name, value)?,
        }
    }

    Ok(product)
}

fn read_text(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Text(text) => text.clone(),
        SqlValue::Int(number) => number.to_string(),
        SqlValue::Float(number) => number.to_string(),
        SqlValue::Bool(flag) => flag.to_string(),
    }
}

fn read_number(column: &str, value: &SqlValue) -> Result<f64, MaterializeError> {
    let invalid = || MaterializeError::InvalidValue {
        column: column.to_string(),
        value: format!("{:?}", value),
    };

    match value {
        SqlValue::Null => Ok(0.0),
        SqlValue::Float(number) => Ok(*number),
        SqlValue::Int(number) => Ok(*number as f64),
        SqlValue::Text(text) => text.trim().parse().map_err(|_| invalid()),
        SqlValue::Bool(_) => Err(invalid()),
    }
}
