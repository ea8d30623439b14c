// 目录服务
// 聊天配置档与知识库的业务入口，串联表单校验、仓储和关系维护

use std::fmt;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use studio_common::is_admin;
use tokio::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::entities::{ChatProfileModel, KnowledgeBaseModel};
use crate::db::repositories::{ChatProfileRepository, KnowledgeBaseRepository};
use crate::errors::{StudioError, StudioResult};
use crate::services::config_store::{CatalogDocument, ConfigCatalogStore};
use crate::services::forms::{ChatProfileForm, KnowledgeBaseForm};
use crate::services::relations::RelationshipMaintainer;
use crate::services::store::{ChatProfileStore, KnowledgeBaseFilter, KnowledgeBaseStore};

/// 目录服务
///
/// 所有写操作都在同一把异步锁内完成读改写，数据库与配置文件两种后端的并发约束一致。
pub struct CatalogService {
    profiles: Arc<dyn ChatProfileStore>,
    knowledge_bases: Arc<dyn KnowledgeBaseStore>,
    write_lock: Mutex<()>,
    backend: &'static str,
    /// 配置文件后端持有整份文档，用于导入导出
    document_store: Option<ConfigCatalogStore>,
}

impl fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogService")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(
        profiles: Arc<dyn ChatProfileStore>,
        knowledge_bases: Arc<dyn KnowledgeBaseStore>,
        backend: &'static str,
    ) -> Self {
        Self {
            profiles,
            knowledge_bases,
            write_lock: Mutex::new(()),
            backend,
            document_store: None,
        }
    }

    /// 数据库后端
    pub fn with_database(db: DatabaseConnection) -> Self {
        Self::new(
            Arc::new(ChatProfileRepository::new(db.clone())),
            Arc::new(KnowledgeBaseRepository::new(db)),
            "database",
        )
    }

    /// 配置文件后端
    pub fn with_config_store(store: &ConfigCatalogStore) -> Self {
        Self {
            document_store: Some(store.clone()),
            ..Self::new(
                Arc::new(store.profiles()),
                Arc::new(store.knowledge_bases()),
                "config",
            )
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    fn relations(&self) -> RelationshipMaintainer<'_> {
        RelationshipMaintainer::new(self.profiles.as_ref(), self.knowledge_bases.as_ref())
    }

    // ---- 聊天配置档 ----

    pub async fn list_profiles(&self) -> StudioResult<Vec<ChatProfileModel>> {
        self.profiles.list_all().await
    }

    /// 调用者可选用的配置档：管理员看到全部启用的，其他角色只看到允许自己访问的
    pub async fn list_visible_profiles(&self, role: &str) -> StudioResult<Vec<ChatProfileModel>> {
        if is_admin(role) {
            self.profiles.list_enabled().await
        } else {
            self.profiles.list_enabled_by_role(role).await
        }
    }

    pub async fn get_profile(&self, id: Uuid) -> StudioResult<ChatProfileModel> {
        self.profiles
            .find_by_id(id)
            .await?
            .ok_or_else(StudioError::profile_not_found)
    }

    #[instrument(skip(self, form), fields(backend = self.backend))]
    pub async fn create_profile(&self, owner_id: &str, form: ChatProfileForm) -> StudioResult<ChatProfileModel> {
        let form = form.normalize()?;
        let _guard = self.write_lock.lock().await;

        let relations = self.relations();
        relations
            .ensure_knowledge_bases_exist(&form.knowledge_bases)
            .await?;

        let profile = self.profiles.create(owner_id, form).await?;
        relations
            .attach(profile.id, profile.knowledge_bases.as_slice())
            .await?;

        info!(profile_id = %profile.id, owner = owner_id, "聊天配置档已创建");
        Ok(profile)
    }

    /// 全量更新；所有引用的知识库在写入前校验，失败时配置档保持原样
    #[instrument(skip(self, form), fields(backend = self.backend))]
    pub async fn update_profile(&self, id: Uuid, form: ChatProfileForm) -> StudioResult<ChatProfileModel> {
        let form = form.normalize()?;
        let _guard = self.write_lock.lock().await;

        let existing = self.get_profile(id).await?;
        let relations = self.relations();

        relations
            .ensure_knowledge_bases_exist(&form.knowledge_bases)
            .await?;

        let updated = self
            .profiles
            .update_by_id(id, form)
            .await?
            .ok_or_else(StudioError::profile_not_found)?;

        relations
            .on_profile_updated(
                id,
                existing.knowledge_bases.as_slice(),
                updated.knowledge_bases.as_slice(),
            )
            .await?;

        info!(profile_id = %id, "聊天配置档已更新");
        Ok(updated)
    }

    #[instrument(skip(self), fields(backend = self.backend))]
    pub async fn delete_profile(&self, id: Uuid) -> StudioResult<()> {
        let _guard = self.write_lock.lock().await;

        let existing = self.get_profile(id).await?;
        if !self.profiles.delete_by_id(id).await? {
            return Err(StudioError::profile_not_found());
        }

        self.relations()
            .detach(id, existing.knowledge_bases.as_slice())
            .await?;

        info!(profile_id = %id, "聊天配置档已删除");
        Ok(())
    }

    // ---- 知识库 ----

    pub async fn list_knowledge_bases(&self, filter: &KnowledgeBaseFilter) -> StudioResult<Vec<KnowledgeBaseModel>> {
        self.knowledge_bases.list_filtered(filter).await
    }

    pub async fn get_knowledge_base(&self, id: Uuid) -> StudioResult<KnowledgeBaseModel> {
        self.knowledge_bases
            .find_by_id(id)
            .await?
            .ok_or_else(StudioError::knowledge_base_not_found)
    }

    #[instrument(skip(self, form), fields(backend = self.backend))]
    pub async fn create_knowledge_base(
        &self,
        owner_id: &str,
        form: KnowledgeBaseForm,
    ) -> StudioResult<KnowledgeBaseModel> {
        let form = form.normalize()?;
        let _guard = self.write_lock.lock().await;

        let knowledge_base = self.knowledge_bases.create(owner_id, form).await?;
        info!(kb_id = %knowledge_base.id, owner = owner_id, "知识库已创建");
        Ok(knowledge_base)
    }

    #[instrument(skip(self, form), fields(backend = self.backend))]
    pub async fn update_knowledge_base(
        &self,
        id: Uuid,
        form: KnowledgeBaseForm,
    ) -> StudioResult<KnowledgeBaseModel> {
        let form = form.normalize()?;
        let _guard = self.write_lock.lock().await;

        self.knowledge_bases
            .update_by_id(id, form)
            .await?
            .ok_or_else(StudioError::knowledge_base_not_found)
    }

    /// 删除知识库并从所有配置档中移除对它的引用
    #[instrument(skip(self), fields(backend = self.backend))]
    pub async fn delete_knowledge_base(&self, id: Uuid) -> StudioResult<()> {
        let _guard = self.write_lock.lock().await;

        let changed = self.relations().cascade_knowledge_base_delete(id).await?;
        if !self.knowledge_bases.delete_by_id(id).await? {
            return Err(StudioError::knowledge_base_not_found());
        }

        info!(kb_id = %id, profiles_updated = changed.len(), "知识库已删除");
        Ok(())
    }

    /// 删除全部知识库并清空配置档中的引用，返回删除数量
    #[instrument(skip(self), fields(backend = self.backend))]
    pub async fn clear_knowledge_bases(&self) -> StudioResult<usize> {
        let _guard = self.write_lock.lock().await;

        let relations = self.relations();
        let knowledge_bases = self.knowledge_bases.list_all().await?;
        for knowledge_base in &knowledge_bases {
            relations
                .cascade_knowledge_base_delete(knowledge_base.id)
                .await?;
            self.knowledge_bases.delete_by_id(knowledge_base.id).await?;
        }

        info!(deleted = knowledge_bases.len(), "知识库已全部删除");
        Ok(knowledge_bases.len())
    }

    // ---- 导入导出 ----

    fn document_store(&self) -> StudioResult<&ConfigCatalogStore> {
        self.document_store.as_ref().ok_or_else(|| {
            StudioError::configuration(format!("{} 后端不支持导入导出", self.backend))
        })
    }

    /// 导出整份目录文档
    pub async fn export_document(&self) -> StudioResult<CatalogDocument> {
        let store = self.document_store()?;
        let _guard = self.write_lock.lock().await;
        Ok(store.snapshot().await)
    }

    /// 用导入的文档替换整个目录，随后按正向列表重建反向引用
    #[instrument(skip(self, document), fields(backend = self.backend))]
    pub async fn import_document(&self, document: CatalogDocument) -> StudioResult<CatalogDocument> {
        let store = self.document_store()?;
        document.validate()?;
        let _guard = self.write_lock.lock().await;

        store.replace(document).await?;
        let repaired = self.relations().rebuild_back_references().await?;

        let imported = store.snapshot().await;
        info!(
            chat_profiles = imported.chat_profiles.len(),
            knowledge_bases = imported.knowledge_bases.len(),
            repaired,
            "目录已导入"
        );
        Ok(imported)
    }

    /// 从配置档的正向列表重建知识库反向引用
    pub async fn rebuild_back_references(&self) -> StudioResult<usize> {
        let _guard = self.write_lock.lock().await;
        self.relations().rebuild_back_references().await
    }
}
