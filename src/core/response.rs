//! 核心响应处理模块

use serde::{Deserialize, Serialize};

/// API 响应信封：`{success, data?, msg?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            msg: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            msg: Some(msg.into()),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            msg: Some(msg.into()),
        }
    }
}
