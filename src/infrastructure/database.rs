//! 数据库基础设施
//!
//! 驱动边界：`Driver` 负责获取连接，`Connection` 执行参数化查询并返回
//! 按位置编码的结果集（行 + 列描述）。Postgres 实现基于 sqlx 连接池。

use async_trait::async_trait;

/// 驱动层错误，携带底层错误文本
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// 无类型的单元格值
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

pub type RawRow = Vec<SqlValue>;

/// 查询结果：每一行与同一组列描述按位置对应
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RawRow>,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }
}

/// 单次操作期间持有的数据库连接
#[async_trait]
pub trait Connection: Send {
    /// SQL 使用 `$1, $2, ...` 占位符，参数按顺序绑定
    async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, DriverError>;

    /// 释放连接，调用方在每条退出路径上都必须调用
    async fn end(self: Box<Self>);
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, DriverError>;
}

#[cfg(feature = "database")]
pub use postgres::{DatabaseManager, PgDriver};

#[cfg(feature = "database")]
mod postgres {
    use super::{ColumnDescriptor, Connection, Driver, DriverError, RawRow, ResultSet, SqlValue};
    use crate::infrastructure::config::DatabaseConfig;
    use async_trait::async_trait;
    use sqlx::{
        pool::PoolConnection,
        postgres::{PgPool, PgPoolOptions, PgRow},
        Column, Postgres, Row, TypeInfo, ValueRef,
    };
    use std::time::Duration;
    use tracing::debug;

    impl From<sqlx::Error> for DriverError {
        fn from(err: sqlx::Error) -> Self {
            DriverError(err.to_string())
        }
    }

    pub struct DatabaseManager {
        pool: PgPool,
    }

    impl DatabaseManager {
        pub async fn new(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
                .connect(database_url)
                .await?;

            Ok(Self { pool })
        }

        pub fn driver(&self) -> PgDriver {
            PgDriver {
                pool: self.pool.clone(),
            }
        }
    }

    /// 基于连接池的驱动，connect 即从池中借出连接
    #[derive(Clone)]
    pub struct PgDriver {
        pool: PgPool,
    }

    #[async_trait]
    impl Driver for PgDriver {
        async fn connect(&self) -> Result<Box<dyn Connection>, DriverError> {
            let conn = self.pool.acquire().await?;
            Ok(Box::new(PgConnection { conn }))
        }
    }

    struct PgConnection {
        conn: PoolConnection<Postgres>,
    }

    #[async_trait]
    impl Connection for PgConnection {
        async fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<ResultSet, DriverError> {
            let mut query = sqlx::query(sql);
            for param in params {
                query = match param {
                    SqlValue::Null => query.bind(None::<String>),
                    SqlValue::Text(value) => query.bind(value.clone()),
                    SqlValue::Int(value) => query.bind(*value),
                    SqlValue::Float(value) => query.bind(*value),
                    SqlValue::Bool(value) => query.bind(*value),
                };
            }

            let rows = query.fetch_all(&mut *self.conn).await?;
            debug!(sql, rows = rows.len(), "query executed");

            // 空结果没有行可供读取列信息
            let columns = rows
                .first()
                .map(|row| {
                    row.columns()
                        .iter()
                        .map(|column| ColumnDescriptor::new(column.name()))
                        .collect()
                })
                .unwrap_or_default();

            let rows = rows
                .iter()
                .map(decode_row)
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ResultSet::new(columns, rows))
        }

        async fn end(self: Box<Self>) {
            // 归还连接池
            drop(self.conn);
        }
    }

    fn decode_row(row: &PgRow) -> Result<RawRow, sqlx::Error> {
        (0..row.columns().len())
            .map(|index| decode_value(row, index))
            .collect()
    }

    fn decode_value(row: &PgRow, index: usize) -> Result<SqlValue, sqlx::Error> {
        if row.try_get_raw(index)?.is_null() {
            return Ok(SqlValue::Null);
        }

        let column = &row.columns()[index];
        let value = match column.type_info().name() {
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => SqlValue::Text(row.try_get(index)?),
            "UUID" => SqlValue::Text(row.try_get::<uuid::Uuid, _>(index)?.to_string()),
            "INT2" => SqlValue::Int(row.try_get::<i16, _>(index)?.into()),
            "INT4" => SqlValue::Int(row.try_get::<i32, _>(index)?.into()),
            "INT8" => SqlValue::Int(row.try_get(index)?),
            "FLOAT4" => SqlValue::Float(row.try_get::<f32, _>(index)?.into()),
            "FLOAT8" => SqlValue::Float(row.try_get(index)?),
            "BOOL" => SqlValue::Bool(row.try_get(index)?),
            other => {
                return Err(sqlx::Error::Decode(
                    format!("unsupported column type {} for column {}", other, column.name())
                        .into(),
                ))
            }
        };

        Ok(value)
    }
}
