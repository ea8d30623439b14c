// 配置文件形式的目录存储
// 配置档和知识库保存在同一个 JSON 文档中；每次写操作在锁内完成读改写并落盘

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::entities::{ChatProfileModel, DocumentList, IdList, KnowledgeBaseModel, RoleList};
use crate::errors::{StudioError, StudioResult};
use crate::services::forms::{ChatProfileForm, KnowledgeBaseForm};
use crate::services::store::{
    ChatProfileFilter, ChatProfileStore, KnowledgeBaseFilter, KnowledgeBaseStore,
};

/// 落盘的目录文档
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub chat_profiles: Vec<ChatProfileModel>,
    #[serde(default)]
    pub knowledge_bases: Vec<KnowledgeBaseModel>,
}

impl CatalogDocument {
    /// 导入前校验：ID 不重复，配置档只引用文档内存在的知识库
    pub fn validate(&self) -> StudioResult<()> {
        let mut kb_ids = HashSet::new();
        for knowledge_base in &self.knowledge_bases {
            if !kb_ids.insert(knowledge_base.id) {
                return Err(StudioError::validation(
                    "knowledge_bases",
                    format!("知识库 ID 重复: {}", knowledge_base.id),
                ));
            }
        }

        let mut profile_ids = HashSet::new();
        for profile in &self.chat_profiles {
            if !profile_ids.insert(profile.id) {
                return Err(StudioError::validation(
                    "chat_profiles",
                    format!("配置档 ID 重复: {}", profile.id),
                ));
            }
            if let Some(missing) = profile
                .knowledge_bases
                .as_slice()
                .iter()
                .find(|id| !kb_ids.contains(*id))
            {
                return Err(StudioError::missing_knowledge_base(*missing));
            }
        }

        Ok(())
    }
}

struct CatalogFile {
    state: Mutex<CatalogDocument>,
    path: Option<PathBuf>,
}

impl CatalogFile {
    async fn read<T>(&self, f: impl FnOnce(&CatalogDocument) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    /// 在副本上执行修改，落盘成功后再替换内存状态
    async fn write<T>(&self, f: impl FnOnce(&mut CatalogDocument) -> T) -> StudioResult<T> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let result = f(&mut next);

        if next != *state {
            self.persist(&next).await?;
            *state = next;
        }

        Ok(result)
    }

    async fn persist(&self, document: &CatalogDocument) -> StudioResult<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let path_display = path.display().to_string();
        let storage_err = |e: std::io::Error| {
            StudioError::storage(format!("写入目录文件失败: {}", e), &path_display)
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| StudioError::internal(format!("序列化目录文件失败: {}", e)))?;

        // 先写临时文件再重命名，避免进程中断留下半截文件
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes).await.map_err(storage_err)?;
        tokio::fs::rename(&tmp_path, path).await.map_err(storage_err)?;

        debug!(path = %path_display, "目录文件已写入");
        Ok(())
    }
}

/// 配置文件存储
///
/// 通过 [`profiles`](Self::profiles) 和 [`knowledge_bases`](Self::knowledge_bases)
/// 取得共享同一份文档的两个仓储句柄。
#[derive(Clone)]
pub struct ConfigCatalogStore {
    file: Arc<CatalogFile>,
}

impl ConfigCatalogStore {
    /// 仅保存在内存中的存储
    pub fn in_memory() -> Self {
        Self::from_document(CatalogDocument::default(), None)
    }

    fn from_document(document: CatalogDocument, path: Option<PathBuf>) -> Self {
        Self {
            file: Arc::new(CatalogFile {
                state: Mutex::new(document),
                path,
            }),
        }
    }

    /// 打开目录文件；文件不存在时从空文档开始，首次写入时创建
    #[instrument]
    pub async fn open(path: &Path) -> StudioResult<Self> {
        let document = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<CatalogDocument>(&bytes).map_err(|e| {
                StudioError::storage(
                    format!("目录文件格式错误: {}", e),
                    path.display().to_string(),
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "目录文件不存在，使用空目录");
                CatalogDocument::default()
            }
            Err(e) => {
                return Err(StudioError::storage(
                    format!("读取目录文件失败: {}", e),
                    path.display().to_string(),
                ));
            }
        };

        info!(
            path = %path.display(),
            chat_profiles = document.chat_profiles.len(),
            knowledge_bases = document.knowledge_bases.len(),
            "目录文件已加载"
        );

        Ok(Self::from_document(document, Some(path.to_path_buf())))
    }

    /// 当前文档的快照
    pub async fn snapshot(&self) -> CatalogDocument {
        self.file.read(|doc| doc.clone()).await
    }

    /// 整体替换文档，落盘失败时内存状态不变
    #[instrument(skip_all)]
    pub async fn replace(&self, document: CatalogDocument) -> StudioResult<()> {
        self.file.write(move |doc| *doc = document).await
    }

    pub fn profiles(&self) -> ConfigChatProfileStore {
        ConfigChatProfileStore {
            file: self.file.clone(),
        }
    }

    pub fn knowledge_bases(&self) -> ConfigKnowledgeBaseStore {
        ConfigKnowledgeBaseStore {
            file: self.file.clone(),
        }
    }
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::FixedOffset>) -> Vec<T> {
    items.sort_by_key(|item| Reverse(created_at(item)));
    items
}

/// 配置文件中的聊天配置档仓储
pub struct ConfigChatProfileStore {
    file: Arc<CatalogFile>,
}

impl ConfigChatProfileStore {
    fn apply_form(profile: &mut ChatProfileModel, form: ChatProfileForm) {
        profile.title = form.title;
        profile.description = form.description;
        profile.llm_model = form.llm_model;
        profile.roles_allowed = RoleList(form.roles_allowed);
        profile.knowledge_bases = IdList(form.knowledge_bases);
        profile.enabled = form.enabled;
        profile.params = form.params;
        profile.updated_at = Utc::now().into();
    }
}

#[async_trait]
impl ChatProfileStore for ConfigChatProfileStore {
    #[instrument(skip(self, form), fields(title = %form.title))]
    async fn create(&self, owner_id: &str, form: ChatProfileForm) -> StudioResult<ChatProfileModel> {
        let now = Utc::now().into();
        let mut profile = ChatProfileModel {
            id: Uuid::new_v4(),
            created_by_user_id: owner_id.to_string(),
            title: String::new(),
            description: String::new(),
            llm_model: String::new(),
            roles_allowed: RoleList::default(),
            knowledge_bases: IdList::default(),
            enabled: true,
            params: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        };
        Self::apply_form(&mut profile, form);

        let created = profile.clone();
        self.file.write(|doc| doc.chat_profiles.push(profile)).await?;

        info!(profile_id = %created.id, "聊天配置档创建成功");
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<ChatProfileModel>> {
        Ok(self
            .file
            .read(|doc| doc.chat_profiles.iter().find(|p| p.id == id).cloned())
            .await)
    }

    async fn list_all(&self) -> StudioResult<Vec<ChatProfileModel>> {
        self.list_filtered(&ChatProfileFilter::default()).await
    }

    async fn list_filtered(&self, filter: &ChatProfileFilter) -> StudioResult<Vec<ChatProfileModel>> {
        let profiles = self
            .file
            .read(|doc| {
                doc.chat_profiles
                    .iter()
                    .filter(|p| filter.matches(p))
                    .cloned()
                    .collect()
            })
            .await;
        Ok(newest_first(profiles, |p| p.created_at))
    }

    #[instrument(skip(self, form))]
    async fn update_by_id(
        &self,
        id: Uuid,
        form: ChatProfileForm,
    ) -> StudioResult<Option<ChatProfileModel>> {
        self.file
            .write(|doc| {
                let profile = doc.chat_profiles.iter_mut().find(|p| p.id == id)?;
                Self::apply_form(profile, form);
                Some(profile.clone())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool> {
        self.file
            .write(|doc| {
                let before = doc.chat_profiles.len();
                doc.chat_profiles.retain(|p| p.id != id);
                doc.chat_profiles.len() != before
            })
            .await
    }

    #[instrument(skip(self, knowledge_bases))]
    async fn replace_knowledge_bases(&self, id: Uuid, knowledge_bases: Vec<Uuid>) -> StudioResult<bool> {
        self.file
            .write(|doc| match doc.chat_profiles.iter_mut().find(|p| p.id == id) {
                Some(profile) => {
                    profile.knowledge_bases = IdList(knowledge_bases);
                    profile.updated_at = Utc::now().into();
                    true
                }
                None => false,
            })
            .await
    }

    #[instrument(skip(self))]
    async fn remove_knowledge_base_from_all(&self, knowledge_base_id: Uuid) -> StudioResult<Vec<Uuid>> {
        let changed = self
            .file
            .write(|doc| {
                let now = Utc::now().into();
                doc.chat_profiles
                    .iter_mut()
                    .filter_map(|profile| {
                        profile.knowledge_bases.remove(&knowledge_base_id).then(|| {
                            profile.updated_at = now;
                            profile.id
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .await?;

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

/// 配置文件中的知识库仓储
pub struct ConfigKnowledgeBaseStore {
    file: Arc<CatalogFile>,
}

impl ConfigKnowledgeBaseStore {
    fn apply_form(knowledge_base: &mut KnowledgeBaseModel, form: KnowledgeBaseForm) {
        knowledge_base.title = form.title;
        knowledge_base.description = form.description;
        knowledge_base.embedding_model = form.embedding_model;
        knowledge_base.kb_type = form.kb_type;
        knowledge_base.documents = DocumentList(form.documents);
        knowledge_base.updated_at = Utc::now().into();
    }
}

#[async_trait]
impl KnowledgeBaseStore for ConfigKnowledgeBaseStore {
    #[instrument(skip(self, form), fields(title = %form.title))]
    async fn create(&self, owner_id: &str, form: KnowledgeBaseForm) -> StudioResult<KnowledgeBaseModel> {
        let now = Utc::now().into();
        let mut knowledge_base = KnowledgeBaseModel {
            id: Uuid::new_v4(),
            created_by_user_id: owner_id.to_string(),
            title: String::new(),
            description: String::new(),
            embedding_model: String::new(),
            kb_type: Default::default(),
            documents: DocumentList::default(),
            used_by_profiles: IdList::default(),
            created_at: now,
            updated_at: now,
        };
        Self::apply_form(&mut knowledge_base, form);

        let created = knowledge_base.clone();
        self.file
            .write(|doc| doc.knowledge_bases.push(knowledge_base))
            .await?;

        info!(kb_id = %created.id, "知识库创建成功");
        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StudioResult<Option<KnowledgeBaseModel>> {
        Ok(self
            .file
            .read(|doc| doc.knowledge_bases.iter().find(|kb| kb.id == id).cloned())
            .await)
    }

    async fn list_all(&self) -> StudioResult<Vec<KnowledgeBaseModel>> {
        self.list_filtered(&KnowledgeBaseFilter::default()).await
    }

    async fn list_filtered(&self, filter: &KnowledgeBaseFilter) -> StudioResult<Vec<KnowledgeBaseModel>> {
        let knowledge_bases = self
            .file
            .read(|doc| {
                doc.knowledge_bases
                    .iter()
                    .filter(|kb| filter.matches(kb))
                    .cloned()
                    .collect()
            })
            .await;
        Ok(newest_first(knowledge_bases, |kb| kb.created_at))
    }

    #[instrument(skip(self, form))]
    async fn update_by_id(
        &self,
        id: Uuid,
        form: KnowledgeBaseForm,
    ) -> StudioResult<Option<KnowledgeBaseModel>> {
        self.file
            .write(|doc| {
                let knowledge_base = doc.knowledge_bases.iter_mut().find(|kb| kb.id == id)?;
                Self::apply_form(knowledge_base, form);
                Some(knowledge_base.clone())
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: Uuid) -> StudioResult<bool> {
        self.file
            .write(|doc| {
                let before = doc.knowledge_bases.len();
                doc.knowledge_bases.retain(|kb| kb.id != id);
                doc.knowledge_bases.len() != before
            })
            .await
    }

    #[instrument(skip(self, profiles))]
    async fn replace_used_by_profiles(&self, id: Uuid, profiles: Vec<Uuid>) -> StudioResult<bool> {
        self.file
            .write(|doc| match doc.knowledge_bases.iter_mut().find(|kb| kb.id == id) {
                Some(knowledge_base) => {
                    knowledge_base.used_by_profiles = IdList(profiles);
                    knowledge_base.updated_at = Utc::now().into();
                    true
                }
                None => false,
            })
            .await
    }
}
