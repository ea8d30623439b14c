// 聊天配置档 API 处理器

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::extractors::{AdminUser, UserContext};
use crate::api::models::{ChatProfileResponse, Deleted, EntryInfo, ProfileCreated};
use crate::api::responses::HttpResponseBuilder;
use crate::errors::StudioResult;
use crate::services::{CatalogService, ChatProfileForm};

/// 获取全部配置档
#[utoipa::path(
    get,
    path = "/api/v1/chat-profiles/",
    responses(
        (status = 200, description = "配置档列表", body = [ChatProfileResponse]),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn list_chat_profiles(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
) -> StudioResult<HttpResponse> {
    let profiles: Vec<ChatProfileResponse> = service
        .list_profiles()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    HttpResponseBuilder::ok(&req, profiles)
}

/// 获取配置档摘要（ID 与标题）
#[utoipa::path(
    get,
    path = "/api/v1/chat-profiles/info",
    responses(
        (status = 200, description = "配置档摘要", body = [EntryInfo]),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse),
        (status = 403, description = "需要管理员权限", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn list_chat_profile_info(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
) -> StudioResult<HttpResponse> {
    let infos: Vec<EntryInfo> = service
        .list_profiles()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    HttpResponseBuilder::ok(&req, infos)
}

/// 获取调用者可用的配置档
#[utoipa::path(
    get,
    path = "/api/v1/chat-profiles/filtered",
    responses(
        (status = 200, description = "调用者可见的启用配置档", body = [ChatProfileResponse]),
        (status = 401, description = "未认证", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn list_visible_chat_profiles(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    user: UserContext,
) -> StudioResult<HttpResponse> {
    let profiles: Vec<ChatProfileResponse> = service
        .list_visible_profiles(&user.role)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    debug!(user_id = %user.user_id, role = %user.role, count = profiles.len(), "返回可见配置档");
    HttpResponseBuilder::ok(&req, profiles)
}

/// 获取单个配置档
#[utoipa::path(
    get,
    path = "/api/v1/chat-profiles/{id}",
    params(("id" = Uuid, Path, description = "配置档 ID")),
    responses(
        (status = 200, description = "配置档详情", body = ChatProfileResponse),
        (status = 404, description = "配置档不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn get_chat_profile(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> StudioResult<HttpResponse> {
    let profile = service.get_profile(path.into_inner()).await?;
    HttpResponseBuilder::ok(&req, ChatProfileResponse::from(profile))
}

/// 创建配置档
#[utoipa::path(
    post,
    path = "/api/v1/chat-profiles/add",
    request_body = ChatProfileForm,
    responses(
        (status = 201, description = "配置档创建成功", body = ProfileCreated),
        (status = 400, description = "表单校验失败", body = crate::errors::ErrorResponse),
        (status = 404, description = "引用的知识库不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn create_chat_profile(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    admin: AdminUser,
    form: web::Json<ChatProfileForm>,
) -> StudioResult<HttpResponse> {
    let profile = service
        .create_profile(&admin.0.user_id, form.into_inner())
        .await?;

    info!(profile_id = %profile.id, user_id = %admin.0.user_id, "创建配置档");
    HttpResponseBuilder::created(&req, ProfileCreated { profile_id: profile.id })
}

/// 全量更新配置档
#[utoipa::path(
    post,
    path = "/api/v1/chat-profiles/update/{id}",
    params(("id" = Uuid, Path, description = "配置档 ID")),
    request_body = ChatProfileForm,
    responses(
        (status = 200, description = "更新后的配置档", body = ChatProfileResponse),
        (status = 400, description = "表单校验失败", body = crate::errors::ErrorResponse),
        (status = 404, description = "配置档或引用的知识库不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn update_chat_profile(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
    form: web::Json<ChatProfileForm>,
) -> StudioResult<HttpResponse> {
    let profile = service
        .update_profile(path.into_inner(), form.into_inner())
        .await?;

    HttpResponseBuilder::ok(&req, ChatProfileResponse::from(profile))
}

/// 删除配置档
#[utoipa::path(
    delete,
    path = "/api/v1/chat-profiles/{id}",
    params(("id" = Uuid, Path, description = "配置档 ID")),
    responses(
        (status = 200, description = "删除成功", body = Deleted),
        (status = 404, description = "配置档不存在", body = crate::errors::ErrorResponse)
    ),
    tag = "Chat Profile",
    security(("bearer_auth" = []))
)]
pub async fn delete_chat_profile(
    req: HttpRequest,
    service: web::Data<CatalogService>,
    _admin: AdminUser,
    path: web::Path<Uuid>,
) -> StudioResult<HttpResponse> {
    let id = path.into_inner();
    service.delete_profile(id).await?;

    HttpResponseBuilder::ok(&req, Deleted { id })
}

/// 配置档路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/chat-profiles")
            .route("", web::get().to(list_chat_profiles))
            .route("/", web::get().to(list_chat_profiles))
            .route("/info", web::get().to(list_chat_profile_info))
            .route("/filtered", web::get().to(list_visible_chat_profiles))
            .route("/add", web::post().to(create_chat_profile))
            .route("/update/{id}", web::post().to(update_chat_profile))
            .route("/{id}", web::get().to(get_chat_profile))
            .route("/{id}", web::delete().to(delete_chat_profile)),
    );
}
