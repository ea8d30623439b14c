// API 处理器模块

pub mod chat_profile;
pub mod config_catalog;
pub mod knowledge_base;
