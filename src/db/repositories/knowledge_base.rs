// 知识库仓储实现（SeaORM）

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::entities::{knowledge_base, prelude::*};
use crate::errors::StudioResult;
use crate::services::forms::KnowledgeBaseForm;
use crate::services::store::{KnowledgeBaseFilter, KnowledgeBaseStore};

/// 知识库仓储
#[derive(Clone)]
pub struct KnowledgeBaseRepository {
    db: DatabaseConnection,
}

impl KnowledgeBaseRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn apply_form(active_model: &mut knowledge_base::ActiveModel, form: KnowledgeBaseForm) {
        active_model.title = Set(form.title);
        active_model.description = Set(form.description);
        active_model.embedding_model = Set(form.embedding_model);
        active_model.kb_type = Set(form.kb_type);
        active_model.documents = Set(DocumentList(form.documents));
        active_model.updated_at = Set(Utc::now().into());
    }
}

#[async_trait]
impl KnowledgeBaseStore for KnowledgeBaseRepository {
    #[instrument(skip(self, form), fields(title = %form.title))]
    async fn create(&self, owner_id: &str, form: KnowledgeBaseForm) -> StudioResult<KnowledgeBaseModel> {
        let mut active_model = knowledge_base::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_by_user_id: Set(owner_id.to_string()),
            used_by_profiles: Set(IdList::default()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };
        Self::apply_form(&mut active_model, form);

        let knowledge_base = active_model.insert(&self.db).await?;
        info!(kb_id = %knowledge_base.id, "知识库创建成功");
        Ok(knowledge_base)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<KnowledgeBaseModel>> {
        Ok(KnowledgeBase::find_by_id(id).one(&self.db).await?)
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> StudioResult<Vec<KnowledgeBaseModel>> {
        self.list_filtered(&KnowledgeBaseFilter::default()).await
    }

    #[instrument(skip(self))]
    async fn list_filtered(&self, filter: &KnowledgeBaseFilter) -> StudioResult<Vec<KnowledgeBaseModel>> {
        let mut query = KnowledgeBase::find();
        if let Some(kb_type) = filter.kb_type {
            query = query.filter(knowledge_base::Column::KbType.eq(kb_type));
        }

        let knowledge_bases = query
            .order_by_desc(knowledge_base::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(knowledge_bases)
    }

    #[instrument(skip(self, form))]
    async fn update_by_id(
        &self,
        id: Uuid,
        form: KnowledgeBaseForm,
    ) -> StudioResult<Option<KnowledgeBaseModel>> {
        let txn = self.db.begin().await?;

        let Some(existing) = KnowledgeBase::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let mut active_model: knowledge_base::ActiveModel = existing.into();
        Self::apply_form(&mut active_model, form);
        let updated = active_model.update(&txn).await?;
        txn.commit().await?;

        info!(kb_id = %id, "知识库更新成功");
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool> {
        let result = KnowledgeBase::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            info!(kb_id = %id, "知识库已删除");
        }
        Ok(result.rows_affected > 0)
    }

    #[instrument(skip(self, profiles))]
    async fn replace_used_by_profiles(&self, id: Uuid, profiles: Vec<Uuid>) -> StudioResult<bool> {
        let txn = self.db.begin().await?;

        let Some(existing) = KnowledgeBase::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Ok(false);
        };

        let mut active_model: knowledge_base::ActiveModel = existing.into();
        active_model.used_by_profiles = Set(IdList(profiles));
        active_model.updated_at = Set(Utc::now().into());
        active_model.update(&txn).await?;
        txn.commit().await?;

        Ok(true)
    }
}
