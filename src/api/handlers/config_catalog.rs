// 配置文件目录的整体操作：导出、导入和清空知识库

use actix_web::{guard, web, HttpRequest, HttpResponse};
use tracing::info;

use crate::api::extractors::AdminUser;
use crate::api::models::{CatalogExport, ImportCatalogRequest, KnowledgeBasesCleared};
use crate::api::responses::HttpResponseBuilder;
use crate::errors::StudioResult;
use crate::services::CatalogService;

/// 导出整份目录
#[utoipa::path(
    get,
    path = "/api/v1/configs/export",
    responses(
        (status = 200, description = "目录内容", body = CatalogExport),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Config Catalog",
    security(("bearer_auth" = []))
)]
pub async fn export_catalog(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
) -> StudioResult<HttpResponse> {
    let document = service.export_document().await?;
    HttpResponseBuilder::ok(&req, CatalogExport::from(document))
}

/// 用请求中的目录替换现有目录，返回导入后的内容
#[utoipa::path(
    post,
    path = "/api/v1/configs/import",
    request_body = ImportCatalogRequest,
    responses(
        (status = 200, description = "导入后的目录", body = CatalogExport),
        (status = 400, description = "目录内容无效", body = crate::errors::ErrorResponse),
        (status = 404, description = "配置档引用了不存在的知识库", body = crate::errors::ErrorResponse)
    ),
    tag = "Config Catalog",
    security(("bearer_auth" = []))
)]
pub async fn import_catalog(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    admin: AdminUser,
    body: web::Json<ImportCatalogRequest>,
) -> StudioResult<HttpResponse> {
    let imported = service.import_document(body.into_inner().config).await?;

    info!(user_id = %admin.0.user_id, "导入目录");
    HttpResponseBuilder::ok(&req, CatalogExport::from(imported))
}

/// 删除全部知识库
#[utoipa::path(
    delete,
    path = "/api/v1/configs/knowledge-bases",
    responses(
        (status = 200, description = "删除数量", body = KnowledgeBasesCleared),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Config Catalog",
    security(("bearer_auth" = []))
)]
pub async fn clear_knowledge_bases(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    admin: AdminUser,
) -> StudioResult<HttpResponse> {
    let deleted = service.clear_knowledge_bases().await?;

    info!(deleted, user_id = %admin.0.user_id, "清空知识库");
    HttpResponseBuilder::ok(&req, KnowledgeBasesCleared { deleted })
}

/// 配置文件目录路由，需在知识库路由之前注册
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/export", web::get().to(export_catalog))
        .route("/import", web::post().to(import_catalog))
        .service(
            web::resource("/knowledge-bases")
                .guard(guard::Delete())
                .to(clear_knowledge_bases),
        );
}
