// 数据库实体模块
// 包含所有 SeaORM 实体定义

pub mod json_columns;

pub mod chat_profile;
pub mod knowledge_base;
pub mod schema_migration;

pub mod prelude;
pub use prelude::*;
