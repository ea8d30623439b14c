// 知识库实体定义

use super::json_columns::{DocumentList, IdList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 知识库类型枚举
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum KnowledgeBaseType {
    /// 通用文档知识库
    #[default]
    #[sea_orm(string_value = "general")]
    #[serde(rename = "general")]
    General,
    /// 网页抓取知识库
    #[sea_orm(string_value = "scrape-websites")]
    #[serde(rename = "scrape-websites")]
    ScrapeWebsites,
}

/// 知识库实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "knowledge_bases")]
pub struct Model {
    /// 知识库 ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// 创建者用户 ID
    #[sea_orm(column_type = "String(Some(255))")]
    pub created_by_user_id: String,

    /// 标题
    #[sea_orm(column_type = "String(Some(255))")]
    pub title: String,

    /// 描述
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// 嵌入模型名称
    #[sea_orm(column_type = "String(Some(255))")]
    pub embedding_model: String,

    /// 知识库类型
    pub kb_type: KnowledgeBaseType,

    /// 文档描述列表
    #[sea_orm(column_type = "Json")]
    pub documents: DocumentList,

    /// 引用此知识库的配置档 ID（反向引用）
    #[sea_orm(column_type = "Json")]
    #[serde(default)]
    pub used_by_profiles: IdList,

    /// 创建时间
    pub created_at: DateTimeWithTimeZone,

    /// 更新时间
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
