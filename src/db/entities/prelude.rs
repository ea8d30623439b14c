// 实体预导入模块

pub use super::chat_profile::{
    ActiveModel as ChatProfileActiveModel, Entity as ChatProfile, Model as ChatProfileModel,
};
pub use super::json_columns::{DocumentList, IdList, RoleList};
pub use super::knowledge_base::{
    ActiveModel as KnowledgeBaseActiveModel, Entity as KnowledgeBase,
    KnowledgeBaseType, Model as KnowledgeBaseModel,
};
pub use super::schema_migration::{Entity as SchemaMigration, Model as SchemaMigrationModel};
