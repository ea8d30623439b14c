// 知识库 API 处理器

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;
use uuid::Uuid;

use crate::api::extractors::AdminUser;
use crate::api::models::{
    Deleted, EntryInfo, KnowledgeBaseCreated, KnowledgeBaseListQuery, KnowledgeBaseResponse,
};
use crate::api::responses::HttpResponseBuilder;
use crate::errors::StudioResult;
use crate::services::{CatalogService, KnowledgeBaseFilter, KnowledgeBaseForm};

/// 获取知识库列表
#[utoipa::path(
    get,
    path = "/api/v1/knowledge-bases/",
    params(KnowledgeBaseListQuery),
    responses(
        (status = 200, description = "知识库列表", body = [KnowledgeBaseResponse]),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn list_knowledge_bases(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    query: web::Query<KnowledgeBaseListQuery>,
) -> StudioResult<HttpResponse> {
    let filter = KnowledgeBaseFilter::from(query.into_inner());
    let knowledge_bases: Vec<KnowledgeBaseResponse> = service
        .list_knowledge_bases(&filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    HttpResponseBuilder::ok(&req, knowledge_bases)
}

/// 获取知识库摘要（ID 与标题）
#[utoipa::path(
    get,
    path = "/api/v1/knowledge-bases/info",
    responses(
        (status = 200, description = "知识库摘要", body = [EntryInfo]),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn list_knowledge_base_info(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
) -> StudioResult<HttpResponse> {
    let infos: Vec<EntryInfo> = service
        .list_knowledge_bases(&KnowledgeBaseFilter::default())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    HttpResponseBuilder::ok(&req, infos)
}

/// 获取单个知识库
#[utoipa::path(
    get,
    path = "/api/v1/knowledge-bases/{id}",
    params(("id" = Uuid, Path, description = "知识库 ID")),
    responses(
        (status = 200, description = "知识库详情", body = KnowledgeBaseResponse),
        (status = 404, description = "知识库不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn get_knowledge_base(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> StudioResult<HttpResponse> {
    let knowledge_base = service.get_knowledge_base(path.into_inner()).await?;
    HttpResponseBuilder::ok(&req, KnowledgeBaseResponse::from(knowledge_base))
}

/// 创建知识库
#[utoipa::path(
    post,
    path = "/api/v1/knowledge-bases/add",
    request_body = KnowledgeBaseForm,
    responses(
        (status = 201, description = "知识库创建成功", body = KnowledgeBaseCreated),
        (status = 400, description = "表单校验失败", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn create_knowledge_base(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    admin: AdminUser,
    form: web::Json<KnowledgeBaseForm>,
) -> StudioResult<HttpResponse> {
    let knowledge_base = service
        .create_knowledge_base(&admin.0.user_id, form.into_inner())
        .await?;

    info!(kb_id = %knowledge_base.id, user_id = %admin.0.user_id, "创建知识库");
    HttpResponseBuilder::created(&req, KnowledgeBaseCreated { kb_id: knowledge_base.id })
}

/// 全量更新知识库
#[utoipa::path(
    post,
    path = "/api/v1/knowledge-bases/update/{id}",
    params(("id" = Uuid, Path, description = "知识库 ID")),
    request_body = KnowledgeBaseForm,
    responses(
        (status = 200, description = "更新后的知识库", body = KnowledgeBaseResponse),
        (status = 400, description = "表单校验失败", body = crate::errors::ErrorResponse),
        (status = 404, description = "知识库不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn update_knowledge_base(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    form: web::Json<KnowledgeBaseForm>,
) -> StudioResult<HttpResponse> {
    let knowledge_base = service
        .update_knowledge_base(path.into_inner(), form.into_inner())
        .await?;

    HttpResponseBuilder::ok(&req, KnowledgeBaseResponse::from(knowledge_base))
}

/// 删除知识库，并从引用它的配置档中移除
#[utoipa::path(
    delete,
    path = "/api/v1/knowledge-bases/{id}",
    params(("id" = Uuid, Path, description = "知识库 ID")),
    responses(
        (status = 200, description = "删除成功", body = Deleted),
        (status = 404, description = "知识库不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Knowledge Base",
    security(("bearer_auth" = []))
)]
pub async fn delete_knowledge_base(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> StudioResult<HttpResponse> {
    let id = path.into_inner();
    service.delete_knowledge_base(id).await?;

    HttpResponseBuilder::ok(&req, Deleted { id })
}

/// 知识库路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/knowledge-bases")
            .route("", web::get().to(list_knowledge_bases))
            .route("/", web::get().to(list_knowledge_bases))
            .route("/info", web::get().to(list_knowledge_base_info))
            .route("/add", web::post().to(create_knowledge_base))
            .route("/update/{id}", web::post().to(update_knowledge_base))
            .route("/{id}", web::get().to(get_knowledge_base))
            .route("/{id}", web::delete().to(delete_knowledge_base)),
    );
}
