// 统一错误类型定义

use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use studio_common::CommonError;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// 配置档不存在时返回给客户端的固定消息
pub const PROFILE_NOT_FOUND: &str = "Profile not found";

/// 知识库不存在时返回给客户端的固定消息
pub const KNOWLEDGE_BASE_NOT_FOUND: &str = "Knowledge base not found";

/// Profile Studio 统一错误类型
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error_type", content = "details")]
pub enum StudioError {
    /// 配置错误
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// 数据库错误
    #[error("数据库错误: {message}")]
    Database { message: String },

    /// 配置文件存储错误
    #[error("存储错误: {message}")]
    Storage { message: String, path: Option<String> },

    /// 认证错误
    #[error("认证错误: {message}")]
    Authentication { message: String },

    /// 授权错误
    #[error("授权错误: {message}")]
    Authorization { message: String },

    /// 验证错误
    #[error("验证错误: {field} - {message}")]
    Validation { field: String, message: String },

    /// 资源未找到
    #[error("{message}")]
    NotFound { message: String },

    /// 配置档引用了不存在的知识库
    #[error("Knowledge base not found {knowledge_base_id}")]
    ReferentialIntegrity { knowledge_base_id: Uuid },

    /// 内部服务器错误
    #[error("内部服务器错误: {message}")]
    Internal { message: String },
}

impl StudioError {
    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Database { .. } => "DATABASE_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::Authentication { .. } => "AUTHENTICATION_ERROR",
            Self::Authorization { .. } => "AUTHORIZATION_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ReferentialIntegrity { .. } => "REFERENTIAL_INTEGRITY",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::Database { .. } => 500,
            Self::Storage { .. } => 500,
            Self::Authentication { .. } => 401,
            Self::Authorization { .. } => 403,
            Self::Validation { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::ReferentialIntegrity { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    /// 是否应该记录错误日志
    pub fn should_log(&self) -> bool {
        !matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::ReferentialIntegrity { .. }
                | Self::Authentication { .. }
        )
    }

    /// 创建配置错误
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 创建数据库错误
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// 创建存储错误（带文件路径）
    pub fn storage(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// 创建认证错误
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// 创建授权错误
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 创建资源未找到错误
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// 配置档不存在
    pub fn profile_not_found() -> Self {
        Self::not_found(PROFILE_NOT_FOUND)
    }

    /// 知识库不存在
    pub fn knowledge_base_not_found() -> Self {
        Self::not_found(KNOWLEDGE_BASE_NOT_FOUND)
    }

    /// 引用的知识库不存在
    pub fn missing_knowledge_base(knowledge_base_id: Uuid) -> Self {
        Self::ReferentialIntegrity { knowledge_base_id }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// 实现 ResponseError trait 以便与 Actix Web 集成
impl ResponseError for StudioError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(self.status_code())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.should_log() {
            error!(
                error_code = %self.error_code(),
                error_message = %self,
                "处理请求时发生错误"
            );
        }

        crate::errors::ErrorResponse::from_error(self).into_http_response()
    }
}

/// 从 CommonError 转换
impl From<CommonError> for StudioError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::Validation { message } => Self::validation("general", message),
            CommonError::Configuration { message } => Self::configuration(message),
            CommonError::Internal { message } => Self::internal(message),
        }
    }
}

/// 从 sea_orm::DbErr 转换
impl From<sea_orm::DbErr> for StudioError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::ConnectionAcquire(_) => Self::database("无法获取数据库连接"),
            sea_orm::DbErr::TryIntoErr { .. } => Self::database("数据类型转换错误"),
            sea_orm::DbErr::Json(msg) => Self::database(format!("JSON 列解码失败: {}", msg)),
            sea_orm::DbErr::Conn(msg) => Self::database(format!("数据库连接错误: {}", msg)),
            sea_orm::DbErr::Exec(msg) => Self::database(format!("数据库执行错误: {}", msg)),
            sea_orm::DbErr::Query(msg) => Self::database(format!("数据库查询错误: {}", msg)),
            _ => Self::database(format!("数据库错误: {}", err)),
        }
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for StudioError {
    fn from(err: config::ConfigError) -> Self {
        Self::configuration(format!("配置加载错误: {}", err))
    }
}

/// 从 std::io::Error 转换
impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            message: format!("IO 错误: {}", err),
            path: None,
        }
    }
}

/// 从 serde_json::Error 转换
impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation("json", format!("JSON 解析错误: {}", err))
    }
}

/// 从 jsonwebtoken::errors::Error 转换
impl From<jsonwebtoken::errors::Error> for StudioError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::authentication(format!("无效的访问令牌: {}", err))
    }
}

/// 统一结果类型
pub type StudioResult<T> = Result<T, StudioError>;
