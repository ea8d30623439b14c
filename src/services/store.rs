// 目录存储接口
// 配置档和知识库各一个仓储 trait，数据库与配置文件两种后端实现同一组操作

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::entities::{ChatProfileModel, KnowledgeBaseModel, KnowledgeBaseType};
use crate::errors::StudioResult;
use crate::services::forms::{ChatProfileForm, KnowledgeBaseForm};

/// 配置档查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatProfileFilter {
    /// 只返回指定启用状态
    pub enabled: Option<bool>,
    /// 只返回允许该角色访问的配置档
    pub role: Option<String>,
}

impl ChatProfileFilter {
    pub fn enabled() -> Self {
        Self {
            enabled: Some(true),
            role: None,
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self {
            enabled: None,
            role: Some(role.into()),
        }
    }

    pub fn enabled_for_role(role: impl Into<String>) -> Self {
        Self {
            enabled: Some(true),
            role: Some(role.into()),
        }
    }

    pub fn matches(&self, profile: &ChatProfileModel) -> bool {
        if let Some(enabled) = self.enabled {
            if profile.enabled != enabled {
                return false;
            }
        }

        match self.role {
            Some(ref role) => profile.roles_allowed.allows(role),
            None => true,
        }
    }
}

/// 知识库查询条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBaseFilter {
    pub kb_type: Option<KnowledgeBaseType>,
}

impl KnowledgeBaseFilter {
    pub fn matches(&self, knowledge_base: &KnowledgeBaseModel) -> bool {
        self.kb_type
            .map_or(true, |kb_type| knowledge_base.kb_type == kb_type)
    }
}

/// 聊天配置档仓储
///
/// 列表按 `created_at` 倒序返回。`update_by_id` 和 `delete_by_id` 对不存在的记录
/// 分别返回 `None` / `false`，存储故障走 `Err`，两者不混用。
#[async_trait]
pub trait ChatProfileStore: Send + Sync {
    /// 以新生成的 ID 插入配置档
    async fn create(&self, owner_id: &str, form: ChatProfileForm) -> StudioResult<ChatProfileModel>;

    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<ChatProfileModel>>;

    async fn list_all(&self) -> StudioResult<Vec<ChatProfileModel>>;

    async fn list_filtered(&self, filter: &ChatProfileFilter) -> StudioResult<Vec<ChatProfileModel>>;

    /// 用表单整体替换可写字段，保留 id / 创建者 / 创建时间
    async fn update_by_id(
        &self,
        id: Uuid,
        form: ChatProfileForm,
    ) -> StudioResult<Option<ChatProfileModel>>;

    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool>;

    /// 只改写知识库引用列表
    async fn replace_knowledge_bases(&self, id: Uuid, knowledge_bases: Vec<Uuid>) -> StudioResult<bool>;

    /// 从所有配置档中移除对指定知识库的引用，返回发生变化的配置档 ID
    async fn remove_knowledge_base_from_all(&self, knowledge_base_id: Uuid) -> StudioResult<Vec<Uuid>>;

    async fn list_enabled(&self) -> StudioResult<Vec<ChatProfileModel>> {
        self.list_filtered(&ChatProfileFilter::enabled()).await
    }

    async fn list_by_role(&self, role: &str) -> StudioResult<Vec<ChatProfileModel>> {
        self.list_filtered(&ChatProfileFilter::role(role)).await
    }

    async fn list_enabled_by_role(&self, role: &str) -> StudioResult<Vec<ChatProfileModel>> {
        self.list_filtered(&ChatProfileFilter::enabled_for_role(role)).await
    }
}

/// 知识库仓储
#[async_trait]
pub trait KnowledgeBaseStore: Send + Sync {
    /// 以新生成的 ID 插入知识库，反向引用为空
    async fn create(&self, owner_id: &str, form: KnowledgeBaseForm) -> StudioResult<KnowledgeBaseModel>;

    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<KnowledgeBaseModel>>;

    async fn list_all(&self) -> StudioResult<Vec<KnowledgeBaseModel>>;

    async fn list_filtered(&self, filter: &KnowledgeBaseFilter) -> StudioResult<Vec<KnowledgeBaseModel>>;

    /// 用表单整体替换可写字段，`used_by_profiles` 保持不变
    async fn update_by_id(
        &self,
        id: Uuid,
        form: KnowledgeBaseForm,
    ) -> StudioResult<Option<KnowledgeBaseModel>>;

    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool>;

    /// 只改写反向引用列表
    async fn replace_used_by_profiles(&self, id: Uuid, profiles: Vec<Uuid>) -> StudioResult<bool>;

    async fn exists(&self, id: Uuid) -> StudioResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}
