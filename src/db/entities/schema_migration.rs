// 迁移记录实体定义

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 已应用的迁移记录
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schema_migrations")]
pub struct Model {
    /// 迁移版本号
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: String,

    /// 迁移名称
    pub name: String,

    /// 迁移描述
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// up/down SQL 的 SHA-256 校验和
    #[sea_orm(column_type = "String(Some(64))")]
    pub checksum: String,

    /// 应用时间
    pub applied_at: DateTimeWithTimeZone,

    /// 执行耗时（毫秒）
    pub execution_time_ms: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
