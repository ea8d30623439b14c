// 数据库模块
// 包含数据库连接、实体定义、迁移和仓储

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repositories;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
mod tests;

pub use connection::*;
pub use migrations::{Migration, MigrationManager, MigrationStatus};
pub use repositories::*;
