// 聊天配置档实体定义

use super::json_columns::{IdList, RoleList};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 聊天配置档实体
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_profiles")]
pub struct Model {
    /// 配置档 ID
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

    /// 使用的语言模型标识
    #[sea_orm(column_type = "String(Some(255))")]
    pub llm_model: String,

    /// 允许访问的角色
    #[sea_orm(column_type = "Json")]
    pub roles_allowed: RoleList,

    /// 引用的知识库 ID（有序）
    #[sea_orm(column_type = "Json")]
    pub knowledge_bases: IdList,

    /// 是否启用
    pub enabled: bool,

    /// 透传给模型的参数（JSON 对象）
    #[sea_orm(column_type = "Json")]
    pub params: Json,

    /// 创建时间
    pub created_at: DateTimeWithTimeZone,

    /// 更新时间
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 是否引用了指定知识库
    pub fn references(&self, knowledge_base_id: &Uuid) -> bool {
        self.knowledge_bases.contains(knowledge_base_id)
    }
}
