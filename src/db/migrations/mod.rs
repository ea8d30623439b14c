// 数据库迁移模块
// 版本化的 SQL 迁移，按校验和记录到 schema_migrations

use crate::db::entities::{schema_migration, SchemaMigration};
use crate::errors::StudioError;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryOrder, Schema, Set, Statement, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

pub mod migrations;

pub use migrations::get_all_migrations;

/// 迁移信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    pub version: String,
    pub name: String,
    pub description: String,
    pub up_sql: String,
    pub down_sql: String,
    pub dependencies: Vec<String>,
}

impl Migration {
    /// 计算迁移校验和
    pub fn checksum(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.up_sql.as_bytes());
        hasher.update(self.down_sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// 迁移状态
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatus {
    pub version: String,
    pub name: String,
    pub applied_at: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub is_applied: bool,
    pub checksum: String,
}

/// 迁移管理器
pub struct MigrationManager {
    db: DatabaseConnection,
}

impl MigrationManager {
    /// 创建新的迁移管理器
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// 初始化迁移系统（创建 schema_migrations 表）
    #[instrument(skip(self))]
    pub async fn init(&self) -> Result<(), StudioError> {
        let backend = self.db.get_database_backend();
        let mut statement = Schema::new(backend).create_table_from_entity(SchemaMigration);
        statement.if_not_exists();

        self.db.execute(backend.build(&statement)).await?;

        info!("迁移系统初始化完成");
        Ok(())
    }

    /// 获取所有可用的迁移
    pub fn get_available_migrations(&self) -> Vec<Migration> {
        get_all_migrations()
    }

    /// 获取已应用的迁移
    #[instrument(skip(self))]
    pub async fn get_applied_migrations(&self) -> Result<Vec<MigrationStatus>, StudioError> {
        let records = SchemaMigration::find()
            .order_by_asc(schema_migration::Column::Version)
            .all(&self.db)
            .await?;

        Ok(records
            .into_iter()
            .map(|record| MigrationStatus {
                version: record.version,
                name: record.name,
                applied_at: Some(record.applied_at),
                is_applied: true,
                checksum: record.checksum,
            })
            .collect())
    }

    /// 检查迁移状态
    #[instrument(skip(self))]
    pub async fn check_status(&self) -> Result<Vec<MigrationStatus>, StudioError> {
        let applied: HashMap<String, MigrationStatus> = self
            .get_applied_migrations()
            .await?
            .into_iter()
            .map(|m| (m.version.clone(), m))
            .collect();

        let status = self
            .get_available_migrations()
            .into_iter()
            .map(|migration| {
                let checksum = migration.checksum();
                match applied.get(&migration.version) {
                    Some(record) => {
                        if record.checksum != checksum {
                            warn!(version = %migration.version, "迁移校验和不匹配，可能已被修改");
                        }
                        record.clone()
                    }
                    None => MigrationStatus {
                        version: migration.version,
                        name: migration.name,
                        applied_at: None,
                        is_applied: false,
                        checksum,
                    },
                }
            })
            .collect();

        Ok(status)
    }

    /// 应用待处理的迁移，返回本次应用的版本号
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<Vec<String>, StudioError> {
        info!("开始应用数据库迁移");

        let mut applied_versions: HashSet<String> = self
            .get_applied_migrations()
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();
        let mut newly_applied = Vec::new();

        for migration in self.get_available_migrations() {
            if applied_versions.contains(&migration.version) {
                continue;
            }

            if let Some(missing) = migration
                .dependencies
                .iter()
                .find(|dep| !applied_versions.contains(*dep))
            {
                return Err(StudioError::database(format!(
                    "迁移 {} 依赖的 {} 尚未应用",
                    migration.version, missing
                )));
            }

            self.apply_migration(&migration).await?;
            applied_versions.insert(migration.version.clone());
            newly_applied.push(migration.version);
        }

        if newly_applied.is_empty() {
            info!("没有待处理的迁移");
        } else {
            info!(count = newly_applied.len(), "迁移应用完成");
        }

        Ok(newly_applied)
    }

    /// 在单个事务中应用迁移并写入记录
    #[instrument(skip(self, migration), fields(version = %migration.version))]
    async fn apply_migration(&self, migration: &Migration) -> Result<(), StudioError> {
        let start_time = std::time::Instant::now();
        let txn = self.db.begin().await?;

        if let Err(e) = Self::execute_sql(&txn, &migration.up_sql).await {
            txn.rollback().await?;
            return Err(StudioError::database(format!(
                "迁移 {} 执行失败: {}",
                migration.version, e
            )));
        }

        let record = schema_migration::ActiveModel {
            version: Set(migration.version.clone()),
            name: Set(migration.name.clone()),
            description: Set(migration.description.clone()),
            checksum: Set(migration.checksum()),
            applied_at: Set(Utc::now().into()),
            execution_time_ms: Set(start_time.elapsed().as_millis() as i64),
        };
        record.insert(&txn).await?;
        txn.commit().await?;

        info!(
            name = %migration.name,
            execution_time_ms = start_time.elapsed().as_millis() as u64,
            "迁移应用成功"
        );
        Ok(())
    }

    /// 回滚指定版本的迁移
    #[instrument(skip(self))]
    pub async fn rollback(&self, version: &str) -> Result<(), StudioError> {
        warn!(version = %version, "回滚数据库迁移");

        let migration = self
            .get_available_migrations()
            .into_iter()
            .find(|m| m.version == version)
            .ok_or_else(|| StudioError::not_found(format!("迁移 {} 不存在", version)))?;

        let txn = self.db.begin().await?;

        if let Err(e) = Self::execute_sql(&txn, &migration.down_sql).await {
            txn.rollback().await?;
            return Err(StudioError::database(format!("迁移 {} 回滚失败: {}", version, e)));
        }

        SchemaMigration::delete_by_id(version.to_string())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        info!(version = %version, "迁移回滚完成");
        Ok(())
    }

    /// 在事务中逐条执行 SQL 语句
    async fn execute_sql(txn: &DatabaseTransaction, sql: &str) -> Result<(), StudioError> {
        let backend = txn.get_database_backend();
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            txn.execute(Statement::from_string(backend, statement.to_string()))
                .await?;
        }
        Ok(())
    }
}
