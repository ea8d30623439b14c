// 配置档与知识库之间多对多关系的维护
// 正向列表在配置档上（knowledge_bases），反向列表在知识库上（used_by_profiles）

use std::collections::HashMap;

use studio_common::diff_ids;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{StudioError, StudioResult};
use crate::services::store::{ChatProfileStore, KnowledgeBaseStore};

/// 关系维护器
///
/// 本身不加锁，调用方需要在写锁内使用。
pub struct RelationshipMaintainer<'a> {
    profiles: &'a dyn ChatProfileStore,
    knowledge_bases: &'a dyn KnowledgeBaseStore,
}

impl<'a> RelationshipMaintainer<'a> {
    pub fn new(profiles: &'a dyn ChatProfileStore, knowledge_bases: &'a dyn KnowledgeBaseStore) -> Self {
        Self {
            profiles,
            knowledge_bases,
        }
    }

    /// 所有知识库都必须存在，否则返回第一个缺失的 ID
    pub async fn ensure_knowledge_bases_exist(&self, ids: &[Uuid]) -> StudioResult<()> {
        for id in ids {
            if !self.knowledge_bases.exists(*id).await? {
                return Err(StudioError::missing_knowledge_base(*id));
            }
        }
        Ok(())
    }

    /// 把配置档加入这些知识库的反向引用
    pub async fn attach(&self, profile_id: Uuid, knowledge_base_ids: &[Uuid]) -> StudioResult<()> {
        for kb_id in knowledge_base_ids {
            let Some(knowledge_base) = self.knowledge_bases.find_by_id(*kb_id).await? else {
                return Err(StudioError::missing_knowledge_base(*kb_id));
            };

            let mut used_by = knowledge_base.used_by_profiles;
            if used_by.insert(profile_id) {
                self.knowledge_bases
                    .replace_used_by_profiles(*kb_id, used_by.0)
                    .await?;
                debug!(profile_id = %profile_id, kb_id = %kb_id, "已添加反向引用");
            }
        }
        Ok(())
    }

    /// 从这些知识库的反向引用中移除配置档，缺失的知识库只记录日志
    pub async fn detach(&self, profile_id: Uuid, knowledge_base_ids: &[Uuid]) -> StudioResult<()> {
        for kb_id in knowledge_base_ids {
            let Some(knowledge_base) = self.knowledge_bases.find_by_id(*kb_id).await? else {
                warn!(profile_id = %profile_id, kb_id = %kb_id, "知识库不存在，跳过反向引用清理");
                continue;
            };

            let mut used_by = knowledge_base.used_by_profiles;
            if used_by.remove(&profile_id) {
                self.knowledge_bases
                    .replace_used_by_profiles(*kb_id, used_by.0)
                    .await?;
                debug!(profile_id = %profile_id, kb_id = %kb_id, "已移除反向引用");
            }
        }
        Ok(())
    }

    /// 配置档的知识库列表从 `old` 变为 `new` 后同步反向引用
    pub async fn on_profile_updated(&self, profile_id: Uuid, old: &[Uuid], new: &[Uuid]) -> StudioResult<()> {
        let (added, removed) = diff_ids(old, new);
        self.detach(profile_id, &removed).await?;
        self.attach(profile_id, &added).await
    }

    /// 删除知识库前清理所有配置档中对它的引用，返回被修改的配置档 ID
    pub async fn cascade_knowledge_base_delete(&self, knowledge_base_id: Uuid) -> StudioResult<Vec<Uuid>> {
        let Some(knowledge_base) = self.knowledge_bases.find_by_id(knowledge_base_id).await? else {
            return Err(StudioError::knowledge_base_not_found());
        };

        let mut changed = Vec::new();
        for profile_id in knowledge_base.used_by_profiles.as_slice() {
            let Some(profile) = self.profiles.find_by_id(*profile_id).await? else {
                warn!(kb_id = %knowledge_base_id, profile_id = %profile_id, "反向引用指向不存在的配置档");
                continue;
            };

            let mut forward = profile.knowledge_bases;
            if forward.remove(&knowledge_base_id) {
                self.profiles
                    .replace_knowledge_bases(*profile_id, forward.0)
                    .await?;
                changed.push(*profile_id);
            }
        }

        // 反向引用可能不完整，再全量扫一遍
        let strays = self
            .profiles
            .remove_knowledge_base_from_all(knowledge_base_id)
            .await?;
        if !strays.is_empty() {
            warn!(
                kb_id = %knowledge_base_id,
                profiles = ?strays,
                "反向引用缺失，已通过全量扫描清理"
            );
            changed.extend(strays);
        }

        Ok(changed)
    }

    /// 根据配置档的正向列表重建所有知识库的反向引用，返回被修正的知识库数量
    pub async fn rebuild_back_references(&self) -> StudioResult<usize> {
        let mut expected: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut profiles = self.profiles.list_all().await?;
        // list_all 按创建时间倒序，反向引用按创建顺序排列
        profiles.reverse();

        for profile in &profiles {
            for kb_id in profile.knowledge_bases.as_slice() {
                expected.entry(*kb_id).or_default().push(profile.id);
            }
        }

        let mut repaired = 0;
        for knowledge_base in self.knowledge_bases.list_all().await? {
            let used_by = expected.remove(&knowledge_base.id).unwrap_or_default();
            if used_by.as_slice() != knowledge_base.used_by_profiles.as_slice() {
                self.knowledge_bases
                    .replace_used_by_profiles(knowledge_base.id, used_by)
                    .await?;
                repaired += 1;
            }
        }

        for (kb_id, profile_ids) in expected {
            warn!(kb_id = %kb_id, profiles = ?profile_ids, "配置档引用了不存在的知识库");
        }

        if repaired > 0 {
            info!(repaired, "知识库反向引用已重建");
        }
        Ok(repaired)
    }
}
