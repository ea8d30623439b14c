// 测试辅助：内存 SQLite 数据库

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use crate::db::entities::{ChatProfile, KnowledgeBase};

/// 建立单连接的内存 SQLite，并按实体定义建表
pub async fn memory_database() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // 内存库按连接隔离，必须固定为一个连接
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("连接内存 SQLite 失败");

    let schema = Schema::new(DbBackend::Sqlite);
    let statements = [
        schema.create_table_from_entity(ChatProfile),
        schema.create_table_from_entity(KnowledgeBase),
    ];

    for statement in statements {
        db.execute(db.get_database_backend().build(&statement))
            .await
            .expect("创建测试表失败");
    }

    db
}
