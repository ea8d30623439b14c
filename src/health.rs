use actix_web::{web, HttpResponse, Result};
use serde_json::json;

use crate::db::DatabaseManager;

/// 健康检查端点
///
/// 注册了数据库管理器时同时检查数据库连通性，失败返回 503。
pub async fn health_check(db: Option<web::Data<DatabaseManager>>) -> Result<HttpResponse> {
    let database = match db {
        Some(manager) => match manager.health_check().await {
            Ok(()) => "healthy",
            Err(_) => "unhealthy",
        },
        None => "not_configured",
    };

    let body = json!({
        "status": if database == "unhealthy" { "unhealthy" } else { "healthy" },
        "service": "profile-studio",
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": { "database": database },
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    if database == "unhealthy" {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

/// 根路径处理器
pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "name": "Profile Studio",
        "version": env!("CARGO_PKG_VERSION"),
        "api": "/api/v1",
        "openapi": "/api/v1/openapi.json",
        "health": "/health"
    })))
}
