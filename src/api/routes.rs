// API 路由定义

use actix_web::{
    error::{JsonPayloadError, PathError},
    web, HttpRequest, HttpResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::extractors::TokenVerifier;
use crate::api::handlers::{chat_profile, config_catalog, knowledge_base};
use crate::errors::{StudioError, StudioResult};
use crate::services::CatalogService;

/// 请求体大小上限
const JSON_LIMIT_BYTES: usize = 2 * 1024 * 1024;

/// API 文档聚合
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Profile Studio API",
        description = "聊天配置档与知识库管理接口",
        version = "0.1.0",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        chat_profile::list_chat_profiles,
        chat_profile::list_chat_profile_info,
        chat_profile::list_visible_chat_profiles,
        chat_profile::get_chat_profile,
        chat_profile::create_chat_profile,
        chat_profile::update_chat_profile,
        chat_profile::delete_chat_profile,
        knowledge_base::list_knowledge_bases,
        knowledge_base::list_knowledge_base_info,
        knowledge_base::get_knowledge_base,
        knowledge_base::create_knowledge_base,
        knowledge_base::update_knowledge_base,
        knowledge_base::delete_knowledge_base,
        config_catalog::export_catalog,
        config_catalog::import_catalog,
        config_catalog::clear_knowledge_bases,
    ),
    components(schemas(
        crate::services::ChatProfileForm,
        crate::services::KnowledgeBaseForm,
        crate::db::entities::KnowledgeBaseType,
        crate::api::models::ChatProfileResponse,
        crate::api::models::KnowledgeBaseResponse,
        crate::api::models::EntryInfo,
        crate::api::models::ProfileCreated,
        crate::api::models::KnowledgeBaseCreated,
        crate::api::models::Deleted,
        crate::api::models::KnowledgeBasesCleared,
        crate::api::models::CatalogExport,
        crate::api::models::ImportCatalogRequest,
        crate::errors::ErrorResponse,
        crate::errors::ErrorDetail,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Chat Profile", description = "聊天配置档管理"),
        (name = "Knowledge Base", description = "知识库管理"),
        (name = "Config Catalog", description = "配置文件目录的导入导出"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API 共享状态
#[derive(Clone)]
pub struct ApiState {
    /// 数据库后端的目录服务
    pub catalog: web::Data<CatalogService>,
    /// 配置文件后端的目录服务，未启用时为 None
    pub config_catalog: Option<web::Data<CatalogService>>,
    pub verifier: web::Data<TokenVerifier>,
}

/// JSON 解析失败统一转换为校验错误
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            StudioError::validation("body", err.to_string()).into()
        })
}

/// 路径参数（如非法 UUID）解析失败同样返回 JSON 错误
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
        StudioError::validation("path", err.to_string()).into()
    })
}

/// 配置 API 路由
///
/// 数据库后端挂在 `/api/v1`，配置文件后端挂在 `/api/v1/configs`，两者共用同一组处理器；
/// 导入导出与清空知识库只在配置文件后端提供。
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &ApiState) {
    let mut v1 = web::scope("/api/v1")
        .app_data(state.catalog.clone())
        .app_data(state.verifier.clone())
        .app_data(json_config())
        .app_data(path_config())
        .route("/openapi.json", web::get().to(get_openapi_spec));

    if let Some(ref catalog) = state.config_catalog {
        v1 = v1.service(
            web::scope("/configs")
                .app_data(catalog.clone())
                .configure(config_catalog::configure_routes)
                .configure(chat_profile::configure_routes)
                .configure(knowledge_base::configure_routes),
        );
    }

    cfg.service(
        v1.configure(chat_profile::configure_routes)
            .configure(knowledge_base::configure_routes),
    );
}

/// 获取 OpenAPI 规范
async fn get_openapi_spec() -> StudioResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiDoc::openapi()))
}
