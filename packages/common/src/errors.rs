// 通用错误类型定义

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 通用错误类型
///
/// 供配置校验和表单规范化等不依赖 Web/数据库层的代码使用，
/// 在服务层统一转换为 `StudioError`。
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CommonError {
    #[error("验证失败: {message}")]
    Validation { message: String },

    #[error("配置错误: {message}")]
    Configuration { message: String },

    #[error("内部错误: {message}")]
    Internal { message: String },
}

impl CommonError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 错误代码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

pub type CommonResult<T> = Result<T, CommonError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CommonError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(CommonError::configuration("x").code(), "CONFIGURATION_ERROR");
        assert_eq!(CommonError::internal("x").code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_display() {
        let err = CommonError::validation("标题不能为空");
        assert_eq!(err.to_string(), "验证失败: 标题不能为空");
    }
}
