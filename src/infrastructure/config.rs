//! 配置基础设施
//!
//! 加载顺序：`$CONFIG_PATH` 或默认路径下的 TOML 文件，然后应用环境变量覆盖，
//! 最后做有效性校验。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// 默认查找的配置文件路径
const CONFIG_PATHS: [&str; 2] = ["config.toml", "./config/config.toml"];

/// 服务配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[validate(nested)]
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    #[validate(nested)]
    pub logging: LoggingConfig,
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// 绑定地址
    #[validate(length(min = 1, message = "bind_address must not be empty"))]
    pub bind_address: String,
    #[validate(range(min = 1, message = "port must be greater than 0"))]
    pub port: u16,
    /// 请求超时时间（秒）
    #[validate(range(min = 1, message = "timeout_seconds must be greater than 0"))]
    pub timeout_seconds: u64,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_pool_bounds"))]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[validate(range(min = 1, message = "max_connections must be greater than 0"))]
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// 存储后端选择
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// 配置了数据库地址时使用 Postgres，否则回退到内存存储
    #[default]
    Auto,
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(StorageBackend::Auto),
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Env(format!("unknown storage backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// 内存存储启动时是否写入示例数据
    pub seed_demo_data: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    #[validate(custom(function = "validate_level"))]
    pub level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            timeout_seconds: 30,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 20,
            min_connections: 0,
            acquire_timeout_seconds: 8,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Auto,
            seed_demo_data: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AppConfig {
    /// 从文件、环境变量加载并校验
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("CONFIG_PATH") {
            Ok(path) => Self::load_from_file(path)?,
            Err(_) => match CONFIG_PATHS.iter().find(|path| Path::new(path).exists()) {
                Some(path) => Self::load_from_file(path)?,
                None => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::FileRead(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 应用环境变量覆盖：PORT、DATABASE_URL、LOG_LEVEL、STORAGE_BACKEND
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env(format!("invalid PORT: {}", port)))?;
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(backend) = lookup("STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }
        Ok(())
    }

    /// 确定实际使用的存储后端
    pub fn resolved_backend(&self) -> Result<StorageBackend, ConfigError> {
        match self.storage.backend {
            StorageBackend::Auto if self.database.url.is_some() => Ok(StorageBackend::Postgres),
            StorageBackend::Auto => Ok(StorageBackend::Memory),
            StorageBackend::Postgres if self.database.url.is_none() => Err(
                ConfigError::Validation("postgres backend requires database.url".to_string()),
            ),
            backend => Ok(backend),
        }
    }
}

fn validate_level(level: &str) -> Result<(), ValidationError> {
    tracing::Level::from_str(level)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_log_level"))
}

fn validate_pool_bounds(config: &DatabaseConfig) -> Result<(), ValidationError> {
    if config.min_connections > config.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(String),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid environment override: {0}")]
    Env(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        ConfigError::Validation(err.to_string())
    }
}
