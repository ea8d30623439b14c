// 目录服务测试
// 同一组场景分别在数据库后端和配置文件后端上运行

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use uuid::Uuid;

    use crate::db::testing::memory_database;
    use crate::errors::StudioError;
    use crate::services::{
        CatalogService, ChatProfileForm, ChatProfileStore, ConfigCatalogStore, KnowledgeBaseFilter,
        KnowledgeBaseForm, KnowledgeBaseStore,
    };

    async fn database_service() -> CatalogService {
        CatalogService::with_database(memory_database().await)
    }

    async fn config_service() -> CatalogService {
        CatalogService::with_config_store(&ConfigCatalogStore::in_memory())
    }

    fn profile_with(title: &str, knowledge_bases: &[Uuid]) -> ChatProfileForm {
        let mut form = ChatProfileForm::titled(title);
        form.knowledge_bases = knowledge_bases.to_vec();
        form
    }

    fn roles(title: &str, roles: &[&str], enabled: bool) -> ChatProfileForm {
        let mut form = ChatProfileForm::titled(title);
        form.roles_allowed = roles.iter().map(|r| r.to_string()).collect();
        form.enabled = enabled;
        form
    }

    async fn create_kb(service: &CatalogService, title: &str) -> Uuid {
        service
            .create_knowledge_base("admin-user", KnowledgeBaseForm::new(title, "text-embedding"))
            .await
            .unwrap()
            .id
    }

    async fn kb_delete_cascades_into_profiles(service: CatalogService) {
        let k1 = create_kb(&service, "k1").await;
        let p1 = service
            .create_profile("admin-user", profile_with("p1", &[k1]))
            .await
            .unwrap();
        let p2 = service
            .create_profile("admin-user", profile_with("p2", &[k1]))
            .await
            .unwrap();

        let kb = service.get_knowledge_base(k1).await.unwrap();
        assert_eq!(kb.used_by_profiles.as_slice(), &[p1.id, p2.id]);

        service.delete_knowledge_base(k1).await.unwrap();

        for id in [p1.id, p2.id] {
            let profile = service.get_profile(id).await.unwrap();
            assert!(profile.knowledge_bases.is_empty());
        }
        assert!(matches!(
            service.get_knowledge_base(k1).await,
            Err(StudioError::NotFound { .. })
        ));
    }

    async fn update_with_unknown_kb_leaves_profile_unchanged(service: CatalogService) {
        let k1 = create_kb(&service, "k1").await;
        let profile = service
            .create_profile("admin-user", profile_with("p1", &[k1]))
            .await
            .unwrap();

        let missing = Uuid::new_v4();
        let err = service
            .update_profile(profile.id, profile_with("renamed", &[k1, missing]))
            .await
            .unwrap_err();

        match err {
            StudioError::ReferentialIntegrity { knowledge_base_id } => {
                assert_eq!(knowledge_base_id, missing)
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let reread = service.get_profile(profile.id).await.unwrap();
        assert_eq!(reread.title, "p1");
        assert_eq!(reread.knowledge_bases.as_slice(), &[k1]);
        assert_eq!(
            service.get_knowledge_base(k1).await.unwrap().used_by_profiles.as_slice(),
            &[profile.id]
        );
    }

    async fn update_moves_back_references(service: CatalogService) {
        let k1 = create_kb(&service, "k1").await;
        let k2 = create_kb(&service, "k2").await;
        let profile = service
            .create_profile("admin-user", profile_with("p1", &[k1]))
            .await
            .unwrap();

        let updated = service
            .update_profile(profile.id, profile_with("p1", &[k2]))
            .await
            .unwrap();
        assert_eq!(updated.knowledge_bases.as_slice(), &[k2]);
        assert_eq!(updated.created_at, profile.created_at);

        assert!(service.get_knowledge_base(k1).await.unwrap().used_by_profiles.is_empty());
        assert_eq!(
            service.get_knowledge_base(k2).await.unwrap().used_by_profiles.as_slice(),
            &[profile.id]
        );
    }

    async fn create_with_unknown_kb_fails(service: CatalogService) {
        let missing = Uuid::new_v4();
        let err = service
            .create_profile("admin-user", profile_with("p1", &[missing]))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_string(), format!("Knowledge base not found {}", missing));
        assert!(service.list_profiles().await.unwrap().is_empty());
    }

    async fn delete_profile_clears_back_references(service: CatalogService) {
        let k1 = create_kb(&service, "k1").await;
        let profile = service
            .create_profile("admin-user", profile_with("p1", &[k1]))
            .await
            .unwrap();

        service.delete_profile(profile.id).await.unwrap();

        assert!(service.get_knowledge_base(k1).await.unwrap().used_by_profiles.is_empty());
        assert!(matches!(
            service.delete_profile(profile.id).await,
            Err(StudioError::NotFound { .. })
        ));
    }

    async fn missing_ids_are_not_found(service: CatalogService) {
        let id = Uuid::new_v4();

        let err = service.get_profile(id).await.unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");
        let err = service
            .update_profile(id, ChatProfileForm::titled("x"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Profile not found");

        let err = service.delete_knowledge_base(id).await.unwrap_err();
        assert_eq!(err.to_string(), "Knowledge base not found");
        let err = service
            .update_knowledge_base(id, KnowledgeBaseForm::new("x", "m"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Knowledge base not found");
    }

    async fn visibility_follows_role(service: CatalogService) {
        service.create_profile("a", roles("both", &["member", "guest"], true)).await.unwrap();
        service.create_profile("a", roles("member-off", &["member"], false)).await.unwrap();
        service.create_profile("a", roles("guest", &["guest"], true)).await.unwrap();
        service.create_profile("a", roles("members", &["members"], true)).await.unwrap();

        let mut member: Vec<String> = service
            .list_visible_profiles("member")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.title)
            .collect();
        member.sort();
        assert_eq!(member, vec!["both"]);

        let admin = service.list_visible_profiles("admin").await.unwrap();
        assert_eq!(admin.len(), 3);
        assert!(admin.iter().all(|p| p.enabled));

        assert_eq!(service.list_profiles().await.unwrap().len(), 4);
    }

    async fn invalid_forms_are_rejected(service: CatalogService) {
        let err = service
            .create_profile("a", ChatProfileForm::titled("   "))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);

        let mut form = KnowledgeBaseForm::new("docs", "m");
        form.documents = vec![serde_json::json!("not an object")];
        let err = service.create_knowledge_base("a", form).await.unwrap_err();
        assert_eq!(err.status_code(), 400);

        assert!(service
            .list_knowledge_bases(&KnowledgeBaseFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    async fn clear_knowledge_bases_strips_references(service: CatalogService) {
        let k1 = create_kb(&service, "k1").await;
        let k2 = create_kb(&service, "k2").await;
        let profile = service
            .create_profile("a", profile_with("p1", &[k1, k2]))
            .await
            .unwrap();

        assert_eq!(service.clear_knowledge_bases().await.unwrap(), 2);

        assert!(service
            .list_knowledge_bases(&KnowledgeBaseFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert!(service.get_profile(profile.id).await.unwrap().knowledge_bases.is_empty());
        assert_eq!(service.clear_knowledge_bases().await.unwrap(), 0);
    }

    macro_rules! on_both_backends {
        ($($scenario:ident),* $(,)?) => {
            mod database_backend {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::database_service().await).await;
                    }
                )*
            }

            mod config_backend {
                $(
                    #[tokio::test]
                    async fn $scenario() {
                        super::$scenario(super::config_service().await).await;
                    }
                )*
            }
        };
    }

    on_both_backends!(
        kb_delete_cascades_into_profiles,
        update_with_unknown_kb_leaves_profile_unchanged,
        update_moves_back_references,
        create_with_unknown_kb_fails,
        delete_profile_clears_back_references,
        missing_ids_are_not_found,
        visibility_follows_role,
        invalid_forms_are_rejected,
        clear_knowledge_bases_strips_references,
    );

    #[tokio::test]
    async fn test_import_replaces_catalog_and_rebuilds_back_references() {
        let source = config_service().await;
        let k1 = create_kb(&source, "k1").await;
        let profile = source
            .create_profile("a", profile_with("p1", &[k1]))
            .await
            .unwrap();
        let mut document = source.export_document().await.unwrap();
        document.knowledge_bases[0].used_by_profiles = Default::default();

        let target = config_service().await;
        create_kb(&target, "replaced").await;
        let imported = target.import_document(document).await.unwrap();

        assert_eq!(imported.chat_profiles.len(), 1);
        assert_eq!(imported.knowledge_bases.len(), 1);
        assert_eq!(
            target.get_knowledge_base(k1).await.unwrap().used_by_profiles.as_slice(),
            &[profile.id]
        );
        assert_eq!(target.export_document().await.unwrap(), imported);
    }

    #[tokio::test]
    async fn test_import_rejects_dangling_reference() {
        let source = config_service().await;
        source
            .create_profile("a", profile_with("p1", &[]))
            .await
            .unwrap();
        let mut document = source.export_document().await.unwrap();
        let missing = Uuid::new_v4();
        document.chat_profiles[0].knowledge_bases.insert(missing);

        let target = config_service().await;
        let kept = create_kb(&target, "kept").await;
        let err = target.import_document(document).await.unwrap_err();

        assert_eq!(err.status_code(), 404);
        assert!(target.list_profiles().await.unwrap().is_empty());
        assert!(target.get_knowledge_base(kept).await.is_ok());
    }

    #[tokio::test]
    async fn test_database_backend_has_no_document() {
        let service = database_service().await;
        assert!(service.export_document().await.is_err());
        assert!(service
            .import_document(Default::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_delete_sweeps_references_missing_from_back_references() {
        let store = ConfigCatalogStore::in_memory();
        let service = CatalogService::with_config_store(&store);
        let k1 = create_kb(&service, "k1").await;

        // 绕过服务直接写入，制造缺失反向引用的配置档
        let stray = store
            .profiles()
            .create("a", profile_with("stray", &[k1]))
            .await
            .unwrap();

        service.delete_knowledge_base(k1).await.unwrap();
        let reread = service.get_profile(stray.id).await.unwrap();
        assert!(reread.knowledge_bases.is_empty());
    }

    async fn kept_dangling_reference_blocks_update(
        service: CatalogService,
        profiles: &dyn ChatProfileStore,
    ) {
        let k1 = create_kb(&service, "k1").await;
        let dangling = Uuid::new_v4();
        let stored = profiles
            .create("a", profile_with("p1", &[k1, dangling]))
            .await
            .unwrap();

        let err = service
            .update_profile(stored.id, profile_with("renamed", &[k1, dangling]))
            .await
            .unwrap_err();
        match err {
            StudioError::ReferentialIntegrity { knowledge_base_id } => {
                assert_eq!(knowledge_base_id, dangling)
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let reread = service.get_profile(stored.id).await.unwrap();
        assert_eq!(reread.title, "p1");
        assert_eq!(reread.knowledge_bases.as_slice(), &[k1, dangling]);
    }

    #[tokio::test]
    async fn test_update_rejects_kept_dangling_reference_in_database() {
        let db = memory_database().await;
        let profiles = crate::db::repositories::ChatProfileRepository::new(db.clone());
        kept_dangling_reference_blocks_update(CatalogService::with_database(db), &profiles).await;
    }

    #[tokio::test]
    async fn test_update_rejects_kept_dangling_reference_in_config() {
        let store = ConfigCatalogStore::in_memory();
        let profiles = store.profiles();
        kept_dangling_reference_blocks_update(CatalogService::with_config_store(&store), &profiles)
            .await;
    }

    #[tokio::test]
    async fn test_rebuild_back_references_repairs_store() {
        let db = memory_database().await;
        let service = CatalogService::with_database(db.clone());
        let k1 = create_kb(&service, "k1").await;
        let k2 = create_kb(&service, "k2").await;

        let profiles = crate::db::repositories::ChatProfileRepository::new(db.clone());
        let p1 = profiles.create("a", profile_with("p1", &[k1, k2])).await.unwrap();
        let knowledge_bases = crate::db::repositories::KnowledgeBaseRepository::new(db);
        knowledge_bases
            .replace_used_by_profiles(k2, vec![Uuid::new_v4()])
            .await
            .unwrap();

        assert_eq!(service.rebuild_back_references().await.unwrap(), 2);
        assert_eq!(service.rebuild_back_references().await.unwrap(), 0);
        for kb in [k1, k2] {
            assert_eq!(
                service.get_knowledge_base(kb).await.unwrap().used_by_profiles.as_slice(),
                &[p1.id]
            );
        }
    }

    #[tokio::test]
    async fn test_backends_are_independent() {
        let database = database_service().await;
        let config = config_service().await;

        create_kb(&database, "only-in-database").await;
        assert!(config
            .list_knowledge_bases(&KnowledgeBaseFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(database.backend(), "database");
        assert_eq!(config.backend(), "config");
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_relations_consistent() {
        let service = Arc::new(config_service().await);
        let k1 = create_kb(&service, "k1").await;
        let k2 = create_kb(&service, "k2").await;
        let profile = service
            .create_profile("a", profile_with("p1", &[]))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let service = service.clone();
            let kb = if i % 2 == 0 { k1 } else { k2 };
            handles.push(tokio::spawn(async move {
                service
                    .update_profile(profile.id, profile_with("p1", &[kb]))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let final_kbs = service.get_profile(profile.id).await.unwrap().knowledge_bases;
        for kb in [k1, k2] {
            let used_by = service.get_knowledge_base(kb).await.unwrap().used_by_profiles;
            assert_eq!(used_by.contains(&profile.id), final_kbs.contains(&kb));
        }
    }
}
