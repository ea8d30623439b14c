// 数据库仓储模块
// 目录存储接口的 SeaORM 实现

pub mod chat_profile;
pub mod knowledge_base;

#[cfg(test)]
mod tests;

pub use chat_profile::ChatProfileRepository;
pub use knowledge_base::KnowledgeBaseRepository;
