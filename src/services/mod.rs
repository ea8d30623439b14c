// 服务层模块
// 表单、存储接口、配置文件存储、关系维护和目录服务

pub mod catalog;
pub mod config_store;
pub mod forms;
pub mod relations;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::CatalogService;
pub use config_store::{CatalogDocument, ConfigCatalogStore, ConfigChatProfileStore, ConfigKnowledgeBaseStore};
pub use forms::{ChatProfileForm, KnowledgeBaseForm};
pub use relations::RelationshipMaintainer;
pub use store::{ChatProfileFilter, ChatProfileStore, KnowledgeBaseFilter, KnowledgeBaseStore};
