// 配置档与知识库的写入表单
// 负责默认值、字段校验和规范化；表单中携带的 id 一律忽略

use serde::{Deserialize, Serialize};
use studio_common::{dedup_preserving_order, CommonError};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::entities::KnowledgeBaseType;

fn default_enabled() -> bool {
    true
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// 标题与模型名称的最大字符数（与数据库列宽一致）
pub const MAX_NAME_LEN: usize = 255;

fn check_length(field: &str, value: &str) -> Result<(), CommonError> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(CommonError::validation(format!(
            "{} 不能超过 {} 个字符",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// 聊天配置档表单（创建与全量更新共用）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ChatProfileForm {
    /// 标题
    pub title: String,
    /// 描述
    #[serde(default)]
    pub description: String,
    /// 语言模型标识
    #[serde(default)]
    pub llm_model: String,
    /// 允许访问的角色
    #[serde(default)]
    pub roles_allowed: Vec<String>,
    /// 引用的知识库 ID
    #[serde(default)]
    pub knowledge_bases: Vec<Uuid>,
    /// 是否启用
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 模型参数
    #[serde(default = "empty_params")]
    #[schema(value_type = Object)]
    pub params: serde_json::Value,
}

impl ChatProfileForm {
    /// 只带标题、其余取默认值的表单
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            llm_model: String::new(),
            roles_allowed: Vec::new(),
            knowledge_bases: Vec::new(),
            enabled: default_enabled(),
            params: empty_params(),
        }
    }

    /// 校验并规范化表单
    pub fn normalize(mut self) -> Result<Self, CommonError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(CommonError::validation("title 不能为空"));
        }
        check_length("title", &self.title)?;
        check_length("llm_model", &self.llm_model)?;

        if !self.params.is_object() {
            return Err(CommonError::validation("params 必须是 JSON 对象"));
        }

        let roles: Vec<String> = self
            .roles_allowed
            .into_iter()
            .map(|role| role.trim().to_string())
            .collect();
        if roles.iter().any(|role| role.is_empty()) {
            return Err(CommonError::validation("roles_allowed 不能包含空角色名"));
        }
        self.roles_allowed = dedup_preserving_order(roles);
        self.knowledge_bases = dedup_preserving_order(self.knowledge_bases);

        Ok(self)
    }
}

/// 知识库表单（创建与全量更新共用）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct KnowledgeBaseForm {
    /// 标题
    pub title: String,
    /// 描述
    #[serde(default)]
    pub description: String,
    /// 嵌入模型名称
    pub embedding_model: String,
    /// 知识库类型
    #[serde(rename = "type", default)]
    pub kb_type: KnowledgeBaseType,
    /// 文档描述列表
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub documents: Vec<serde_json::Value>,
}

impl KnowledgeBaseForm {
    pub fn new(title: impl Into<String>, embedding_model: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            embedding_model: embedding_model.into(),
            kb_type: KnowledgeBaseType::General,
            documents: Vec::new(),
        }
    }

    /// 校验并规范化表单
    pub fn normalize(mut self) -> Result<Self, CommonError> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(CommonError::validation("title 不能为空"));
        }

        self.embedding_model = self.embedding_model.trim().to_string();
        if self.embedding_model.is_empty() {
            return Err(CommonError::validation("embedding_model 不能为空"));
        }
        check_length("title", &self.title)?;
        check_length("embedding_model", &self.embedding_model)?;

        if let Some(index) = self.documents.iter().position(|doc| !doc.is_object()) {
            return Err(CommonError::validation(format!(
                "documents[{}] 必须是 JSON 对象",
                index
            )));
        }

        Ok(self)
    }
}
