// JSON 列类型
// 列表型字段以 JSON 存储，由 SeaORM 在读取时一次性解码为强类型

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 有序的 ID 列表（配置档引用的知识库、知识库的反向引用）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct IdList(pub Vec<Uuid>);

impl IdList {
    pub fn contains(&self, id: &Uuid) -> bool {
        self.0.contains(id)
    }

    /// 追加 ID，已存在时忽略；返回是否发生变化
    pub fn insert(&mut self, id: Uuid) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        self.0.push(id);
        true
    }

    /// 移除 ID 的所有出现；返回是否发生变化
    pub fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != id);
        self.0.len() != before
    }

    pub fn as_slice(&self) -> &[Uuid] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Uuid>> for IdList {
    fn from(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }
}

/// 允许访问的角色集合
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct RoleList(pub Vec<String>);

impl RoleList {
    /// 精确的集合成员判断，不做子串匹配
    pub fn allows(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }
}

impl From<Vec<String>> for RoleList {
    fn from(roles: Vec<String>) -> Self {
        Self(roles)
    }
}

/// 文档描述列表，每一项是不透明的 JSON 对象
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct DocumentList(pub Vec<serde_json::Value>);

impl From<Vec<serde_json::Value>> for DocumentList {
    fn from(documents: Vec<serde_json::Value>) -> Self {
        Self(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_list_insert_and_remove() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut ids = IdList::default();

        assert!(ids.insert(a));
        assert!(!ids.insert(a));
        assert!(ids.insert(b));
        assert_eq!(ids.as_slice(), &[a, b]);

        assert!(ids.remove(&a));
        assert!(!ids.remove(&a));
        assert_eq!(ids.as_slice(), &[b]);
    }

    #[test]
    fn test_role_membership_is_exact() {
        let roles = RoleList(vec!["admin".to_string(), "user".to_string()]);
        assert!(roles.allows("user"));
        assert!(!roles.allows("use"));
        assert!(!roles.allows("pending"));
    }

    #[test]
    fn test_columns_serialize_as_plain_arrays() {
        let roles = RoleList(vec!["user".to_string()]);
        assert_eq!(serde_json::to_value(&roles).unwrap(), serde_json::json!(["user"]));

        let decoded: IdList = serde_json::from_value(serde_json::json!([])).unwrap();
        assert!(decoded.is_empty());
    }
}
