//! 基础设施层：配置、日志、数据库驱动

pub mod config;
pub mod database;
pub mod logger;
