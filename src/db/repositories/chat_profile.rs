// 聊天配置档仓储实现（SeaORM）

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::entities::{chat_profile, prelude::*};
use crate::errors::StudioResult;
use crate::services::forms::ChatProfileForm;
use crate::services::store::{ChatProfileFilter, ChatProfileStore};

/// 聊天配置档仓储
#[derive(Clone)]
pub struct ChatProfileRepository {
    db: DatabaseConnection,
}

impl ChatProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 把表单写入 ActiveModel 的可写字段
    fn apply_form(active_model: &mut chat_profile::ActiveModel, form: ChatProfileForm) {
        active_model.title = Set(form.title);
        active_model.description = Set(form.description);
        active_model.llm_model = Set(form.llm_model);
        active_model.roles_allowed = Set(RoleList(form.roles_allowed));
        active_model.knowledge_bases = Set(IdList(form.knowledge_bases));
        active_model.enabled = Set(form.enabled);
        active_model.params = Set(form.params);
        active_model.updated_at = Set(Utc::now().into());
    }
}

#[async_trait]
impl ChatProfileStore for ChatProfileRepository {
    #[instrument(skip(self, form), fields(title = %form.title))]
    async fn create(&self, owner_id: &str, form: ChatProfileForm) -> StudioResult<ChatProfileModel> {
        let now = Utc::now();
        let mut active_model = chat_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_by_user_id: Set(owner_id.to_string()),
            created_at: Set(now.into()),
            ..Default::default()
        };
        Self::apply_form(&mut active_model, form);

        let profile = active_model.insert(&self.db).await?;
        info!(profile_id = %profile.id, "聊天配置档创建成功");
        Ok(profile)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<ChatProfileModel>> {
        Ok(ChatProfile::find_by_id(id).one(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> StudioResult<Vec<ChatProfileModel>> {
        let profiles = ChatProfile::find()
            .order_by_desc(chat_profile::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(profiles)
    }

    #[instrument(skip(self))]
    async fn list_filtered(&self, filter: &ChatProfileFilter) -> StudioResult<Vec<ChatProfileModel>> {
        let mut query = ChatProfile::find();
        if let Some(enabled) = filter.enabled {
            query = query.filter(chat_profile::Column::Enabled.eq(enabled));
        }

        // 角色是 JSON 列，解码后在内存中做集合成员判断
        let profiles = query
            .order_by_desc(chat_profile::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .filter(|profile| filter.matches(profile))
            .collect();

        Ok(profiles)
    }

    #[instrument(skip(self, form))]
    async fn update_by_id(
        &self,
        id: Uuid,
        form: ChatProfileForm,
    ) -> StudioResult<Option<ChatProfileModel>> {
        let txn = self.db.begin().await?;

        let Some(existing) = ChatProfile::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut active_model: chat_profile::ActiveModel = existing.into();
        Self::apply_form(&mut active_model, form);
        let updated = active_model.update(&txn).await?;
        txn.commit().await?;

        info!(profile_id = %id, "聊天配置档更新成功");
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool> {
        let result = ChatProfile::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            info!(profile_id = %id, "聊天配置档已删除");
        }
        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self, knowledge_bases))]
    async fn replace_knowledge_bases(&self, id: Uuid, knowledge_bases: Vec<Uuid>) -> StudioResult<bool> {
        let txn = self.db.begin().await?;

        let Some(existing) = ChatProfile::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        let mut active_model: chat_profile::ActiveModel = existing.into();
        active_model.knowledge_bases = Set(IdList(knowledge_bases));
        active_model.updated_at = Set(Utc::now().into());
        active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(true)
    }

    #[instrument(skip(self))]
    async fn remove_knowledge_base_from_all(&self, knowledge_base_id: Uuid) -> StudioResult<Vec<Uuid>> {
        let txn = self.db.begin().await?;
        let mut changed = Vec::new();

        for profile in ChatProfile::find().all(&txn).await? {
            if !profile.references(&knowledge_base_id) {
                continue;
            }

            let profile_id = profile.id;
            let mut knowledge_bases = profile.knowledge_bases.clone();
            knowledge_bases.remove(&knowledge_base_id);

            let mut active_model: chat_profile::ActiveModel = profile.into();
            active_model.knowledge_bases = Set(knowledge_bases);
            active_model.updated_at = Set(Utc::now().into());
            active_model.update(&txn).await?;

            changed.push(profile_id);
        }

        txn.commit().await?;

        if !changed.is_empty() {
            info!(
                kb_id = %knowledge_base_id,
                profiles = changed.len(),
                "已从聊天配置档中移除知识库引用"
            );
        }
        Ok(changed)
    }
}
