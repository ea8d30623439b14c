// 数据库迁移脚本定义
// 只使用 PostgreSQL 与 SQLite 都能接受的 DDL

use super::Migration;

/// 获取所有迁移（按版本顺序）
pub fn get_all_migrations() -> Vec<Migration> {
    vec![
        create_knowledge_bases_table(),
        create_chat_profiles_table(),
        add_catalog_indexes(),
    ]
}

/// 创建知识库表
fn create_knowledge_bases_table() -> Migration {
    Migration {
        version: "20250301_000001".to_string(),
        name: "create_knowledge_bases_table".to_string(),
        description: "创建知识库表".to_string(),
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS knowledge_bases (
                id UUID PRIMARY KEY,
                created_by_user_id VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                embedding_model VARCHAR(255) NOT NULL,
                kb_type VARCHAR(32) NOT NULL DEFAULT 'general',
                documents JSONB NOT NULL DEFAULT '[]',
                used_by_profiles JSONB NOT NULL DEFAULT '[]',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
        "#
        .to_string(),
        down_sql: r#"
            DROP TABLE IF EXISTS knowledge_bases;
        "#
        .to_string(),
        dependencies: vec![],
    }
}

/// 创建聊天配置档表
fn create_chat_profiles_table() -> Migration {
    Migration {
        version: "20250301_000002".to_string(),
        name: "create_chat_profiles_table".to_string(),
        description: "创建聊天配置档表".to_string(),
        up_sql: r#"
            CREATE TABLE IF NOT EXISTS chat_profiles (
                id UUID PRIMARY KEY,
                created_by_user_id VARCHAR(255) NOT NULL,
                title VARCHAR(255) NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                llm_model VARCHAR(255) NOT NULL DEFAULT '',
                roles_allowed JSONB NOT NULL DEFAULT '[]',
                knowledge_bases JSONB NOT NULL DEFAULT '[]',
                enabled BOOLEAN NOT NULL DEFAULT TRUE,
                params JSONB NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            );
        "#
        .to_string(),
        down_sql: r#"
            DROP TABLE IF EXISTS chat_profiles;
        "#
        .to_string(),
        dependencies: vec!["20250301_000001".to_string()],
    }
}

/// 列表查询使用的索引
fn add_catalog_indexes() -> Migration {
    Migration {
        version: "20250301_000003".to_string(),
        name: "add_catalog_indexes".to_string(),
        description: "为列表排序和启用状态过滤添加索引".to_string(),
        up_sql: r#"
            CREATE INDEX IF NOT EXISTS idx_chat_profiles_created_at ON chat_profiles(created_at);
            CREATE INDEX IF NOT EXISTS idx_chat_profiles_enabled ON chat_profiles(enabled);
            CREATE INDEX IF NOT EXISTS idx_knowledge_bases_created_at ON knowledge_bases(created_at);
        "#
        .to_string(),
        down_sql: r#"
            DROP INDEX IF EXISTS idx_knowledge_bases_created_at;
            DROP INDEX IF EXISTS idx_chat_profiles_enabled;
            DROP INDEX IF EXISTS idx_chat_profiles_created_at;
        "#
        .to_string(),
        dependencies: vec![
            "20250301_000001".to_string(),
            "20250301_000002".to_string(),
        ],
    }
}
