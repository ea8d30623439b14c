// 通用类型定义

use std::collections::HashSet;
use std::hash::Hash;

use uuid::Uuid;

/// 管理员角色名称
pub const ADMIN_ROLE: &str = "admin";

/// 聊天配置档 ID
pub type ProfileId = Uuid;

/// 知识库 ID
pub type KnowledgeBaseId = Uuid;

/// 用户 ID（由身份认证服务签发，格式不透明）
pub type UserId = String;

/// 判断角色是否拥有管理员权限
pub fn is_admin(role: &str) -> bool {
    role == ADMIN_ROLE
}

/// 去除重复项，保留首次出现的顺序
pub fn dedup_preserving_order<T>(items: impl IntoIterator<Item = T>) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// 计算两个 ID 序列的差集：(仅在 `new` 中出现的, 仅在 `old` 中出现的)
pub fn diff_ids(old: &[Uuid], new: &[Uuid]) -> (Vec<Uuid>, Vec<Uuid>) {
    let old_set: HashSet<&Uuid> = old.iter().collect();
    let new_set: HashSet<&Uuid> = new.iter().collect();

    let added = new.iter().filter(|id| !old_set.contains(id)).copied().collect();
    let removed = old.iter().filter(|id| !new_set.contains(id)).copied().collect();

    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_admin() {
        assert!(is_admin("admin"));
        assert!(!is_admin("user"));
        assert!(!is_admin("Admin"));
    }

    #[test]
    fn test_dedup_preserving_order() {
        let roles = vec!["user", "admin", "user", "pending"];
        assert_eq!(dedup_preserving_order(roles), vec!["user", "admin", "pending"]);
    }

    #[test]
    fn test_diff_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let (added, removed) = diff_ids(&[a, b], &[b, c]);
        assert_eq!(added, vec![c]);
        assert_eq!(removed, vec![a]);

        let (added, removed) = diff_ids(&[a], &[a]);
        assert!(added.is_empty());
        assert!(removed.is_empty());
    }
}
