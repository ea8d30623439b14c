// API 数据模型
// 响应 DTO 与查询参数

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::db::entities::{ChatProfileModel, KnowledgeBaseModel, KnowledgeBaseType};
use crate::services::{CatalogDocument, KnowledgeBaseFilter};

/// 聊天配置档响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatProfileResponse {
    pub id: Uuid,
    pub created_by_user_id: String,
    pub title: String,
    pub description: String,
    pub llm_model: String,
    pub roles_allowed: Vec<String>,
    pub knowledge_bases: Vec<Uuid>,
    pub enabled: bool,
    #[schema(value_type = Object)]
    pub params: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatProfileModel> for ChatProfileResponse {
    fn from(model: ChatProfileModel) -> Self {
        Self {
            id: model.id,
            created_by_user_id: model.created_by_user_id,
            title: model.title,
            description: model.description,
            llm_model: model.llm_model,
            roles_allowed: model.roles_allowed.0,
            knowledge_bases: model.knowledge_bases.0,
            enabled: model.enabled,
            params: model.params,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// 知识库响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeBaseResponse {
    pub id: Uuid,
    pub created_by_user_id: String,
    pub title: String,
    pub description: String,
    pub embedding_model: String,
    /// 知识库类型
    #[serde(rename = "type")]
    pub kb_type: KnowledgeBaseType,
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<serde_json::Value>,
    /// 引用此知识库的配置档
    pub used_by_profiles: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<KnowledgeBaseModel> for KnowledgeBaseResponse {
    fn from(model: KnowledgeBaseModel) -> Self {
        Self {
            id: model.id,
            created_by_user_id: model.created_by_user_id,
            title: model.title,
            description: model.description,
            embedding_model: model.embedding_model,
            kb_type: model.kb_type,
            documents: model.documents.0,
            used_by_profiles: model.used_by_profiles.0,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// 列表摘要项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EntryInfo {
    pub id: Uuid,
    pub title: String,
}

impl From<ChatProfileModel> for EntryInfo {
    fn from(model: ChatProfileModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
        }
    }
}

impl From<KnowledgeBaseModel> for EntryInfo {
    fn from(model: KnowledgeBaseModel) -> Self {
        Self {
            id: model.id,
            title: model.title,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileCreated {
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeBaseCreated {
    pub kb_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Deleted {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KnowledgeBasesCleared {
    pub deleted: usize,
}

/// 目录导出内容，与导入时 `config` 字段的格式一致
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CatalogExport {
    #[schema(value_type = Vec<Object>)]
    pub chat_profiles: Vec<ChatProfileModel>,
    #[schema(value_type = Vec<Object>)]
    pub knowledge_bases: Vec<KnowledgeBaseModel>,
}

impl From<CatalogDocument> for CatalogExport {
    fn from(document: CatalogDocument) -> Self {
        Self {
            chat_profiles: document.chat_profiles,
            knowledge_bases: document.knowledge_bases,
        }
    }
}

/// 目录导入请求
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportCatalogRequest {
    #[schema(value_type = Object)]
    pub config: CatalogDocument,
}

/// 知识库列表查询参数
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KnowledgeBaseListQuery {
    /// 按类型过滤
    #[serde(rename = "type")]
    pub kb_type: Option<KnowledgeBaseType>,
}

impl From<KnowledgeBaseListQuery> for KnowledgeBaseFilter {
    fn from(query: KnowledgeBaseListQuery) -> Self {
        Self {
            kb_type: query.kb_type,
        }
    }
}
