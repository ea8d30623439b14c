// SeaORM 仓储测试（内存 SQLite）

#[cfg(test)]
mod tests {
    use crate::db::entities::KnowledgeBaseType;
    use crate::db::repositories::{ChatProfileRepository, KnowledgeBaseRepository};
    use crate::db::testing::memory_database;
    use crate::services::forms::{ChatProfileForm, KnowledgeBaseForm};
    use crate::services::store::{
        ChatProfileFilter, ChatProfileStore, KnowledgeBaseFilter, KnowledgeBaseStore,
    };
    use serde_json::json;
    use uuid::Uuid;

    fn profile_form(title: &str, roles: &[&str], enabled: bool) -> ChatProfileForm {
        let mut form = ChatProfileForm::titled(title);
        form.roles_allowed = roles.iter().map(|r| r.to_string()).collect();
        form.enabled = enabled;
        form
    }

    #[tokio::test]
    async fn test_create_generates_fresh_id() {
        let repo = ChatProfileRepository::new(memory_database().await);

        let first = repo.create("owner", ChatProfileForm::titled("A")).await.unwrap();
        let second = repo.create("owner", ChatProfileForm::titled("A")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_by_user_id, "owner");
        assert_eq!(first.params, json!({}));
        assert!(first.enabled);
    }

    #[tokio::test]
    async fn test_update_round_trip_preserves_identity() {
        let repo = ChatProfileRepository::new(memory_database().await);
        let created = repo.create("owner", ChatProfileForm::titled("Before")).await.unwrap();

        let mut form = profile_form("After", &["user"], false);
        form.llm_model = "llama3".to_string();
        form.params = json!({ "temperature": 0.2 });

        let updated = repo.update_by_id(created.id, form).await.unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_by_user_id, "owner");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let loaded = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "After");
        assert_eq!(loaded.llm_model, "llama3");
        assert!(!loaded.enabled);
        assert!(loaded.roles_allowed.allows("user"));
        assert_eq!(loaded.params, json!({ "temperature": 0.2 }));
    }

    #[tokio::test]
    async fn test_missing_records_are_reported_without_error() {
        let repo = ChatProfileRepository::new(memory_database().await);
        let missing = Uuid::new_v4();

        assert!(repo.find_by_id(missing).await.unwrap().is_none());
        assert!(repo
            .update_by_id(missing, ChatProfileForm::titled("x"))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_by_id(missing).await.unwrap());
        assert!(!repo.replace_knowledge_bases(missing, vec![]).await.unwrap());
    }

    #[tokio::test]
    async fn test_filtered_listing_uses_exact_role_membership() {
        let repo = ChatProfileRepository::new(memory_database().await);
        let visible = repo.create("o", profile_form("visible", &["user"], true)).await.unwrap();
        repo.create("o", profile_form("disabled", &["user"], false)).await.unwrap();
        repo.create("o", profile_form("other-role", &["users"], true)).await.unwrap();

        let listed = repo.list_enabled_by_role("user").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, visible.id);

        assert_eq!(repo.list_by_role("user").await.unwrap().len(), 2);
        assert_eq!(repo.list_enabled().await.unwrap().len(), 2);
        assert_eq!(repo.list_all().await.unwrap().len(), 3);

        // list_enabled_by_role 是 list_all 的子集且满足谓词
        let all = repo.list_all().await.unwrap();
        let filter = ChatProfileFilter::enabled_for_role("user");
        for profile in &listed {
            assert!(filter.matches(profile));
            assert!(all.iter().any(|p| p.id == profile.id));
        }
    }

    #[tokio::test]
    async fn test_sweep_removes_reference_everywhere() {
        let repo = ChatProfileRepository::new(memory_database().await);
        let kb = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut form = ChatProfileForm::titled("p1");
        form.knowledge_bases = vec![kb, other];
        let p1 = repo.create("o", form).await.unwrap();

        let mut form = ChatProfileForm::titled("p2");
        form.knowledge_bases = vec![other];
        let p2 = repo.create("o", form).await.unwrap();

        let changed = repo.remove_knowledge_base_from_all(kb).await.unwrap();
        assert_eq!(changed, vec![p1.id]);

        let p1 = repo.find_by_id(p1.id).await.unwrap().unwrap();
        assert_eq!(p1.knowledge_bases.as_slice(), &[other]);
        let p2 = repo.find_by_id(p2.id).await.unwrap().unwrap();
        assert_eq!(p2.knowledge_bases.as_slice(), &[other]);

        assert!(repo.remove_knowledge_base_from_all(kb).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_knowledge_base_update_keeps_back_references() {
        let repo = KnowledgeBaseRepository::new(memory_database().await);
        let created = repo
            .create("owner", KnowledgeBaseForm::new("Docs", "embed-v1"))
            .await
            .unwrap();
        assert!(created.used_by_profiles.is_empty());

        let profile = Uuid::new_v4();
        assert!(repo.replace_used_by_profiles(created.id, vec![profile]).await.unwrap());

        let mut form = KnowledgeBaseForm::new("Docs v2", "embed-v2");
        form.documents = vec![json!({ "name": "guide.pdf" })];
        let updated = repo.update_by_id(created.id, form).await.unwrap().unwrap();

        assert_eq!(updated.title, "Docs v2");
        assert_eq!(updated.documents.0, vec![json!({ "name": "guide.pdf" })]);
        assert_eq!(updated.used_by_profiles.as_slice(), &[profile]);
    }

    #[tokio::test]
    async fn test_knowledge_base_type_filter_and_delete() {
        let repo = KnowledgeBaseRepository::new(memory_database().await);
        let general = repo.create("o", KnowledgeBaseForm::new("g", "m")).await.unwrap();

        let mut form = KnowledgeBaseForm::new("s", "m");
        form.kb_type = KnowledgeBaseType::ScrapeWebsites;
        repo.create("o", form).await.unwrap();

        let filter = KnowledgeBaseFilter {
            kb_type: Some(KnowledgeBaseType::General),
        };
        let listed = repo.list_filtered(&filter).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, general.id);

        assert!(repo.exists(general.id).await.unwrap());
        assert!(repo.delete_by_id(general.id).await.unwrap());
        assert!(!repo.exists(general.id).await.unwrap());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
