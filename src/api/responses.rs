// 统一成功响应
// 错误响应由 crate::errors::ErrorResponse 负责

use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{get_request_id_from_http, StudioResult};

/// 统一 API 响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 是否成功
    pub success: bool,
    /// 响应数据
    pub data: T,
    /// 请求 ID
    pub request_id: String,
    /// 响应时间戳
    pub timestamp: DateTime<Utc>,
    /// API 版本
    pub version: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            request_id: generate_request_id(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 使用请求中间件分配的请求 ID
    pub fn for_request(req: &HttpRequest, data: T) -> Self {
        let mut response = Self::ok(data);
        if let Some(request_id) = get_request_id_from_http(req) {
            response.request_id = request_id;
        }
        response
    }
}

/// HTTP 响应构建器
pub struct HttpResponseBuilder;

impl HttpResponseBuilder {
    /// 200 OK
    pub fn ok<T: Serialize>(req: &HttpRequest, data: T) -> StudioResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(ApiResponse::for_request(req, data)))
    }

    /// 201 Created
    pub fn created<T: Serialize>(req: &HttpRequest, data: T) -> StudioResult<HttpResponse> {
        Ok(HttpResponse::Created().json(ApiResponse::for_request(req, data)))
    }
}

/// 生成请求 ID
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
