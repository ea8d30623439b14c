// 数据库连接管理
// 处理数据库连接池和连接配置

use crate::config::DatabaseConfig;
use crate::errors::StudioError;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

/// 数据库连接管理器
pub struct DatabaseManager {
    connection: DatabaseConnection,
}

impl DatabaseManager {
    /// 建立连接并做一次健康检查
    #[instrument(skip(config))]
    pub async fn init(config: DatabaseConfig) -> Result<Arc<DatabaseManager>, StudioError> {
        info!("初始化数据库连接...");

        let manager = Arc::new(Self::connect(config).await?);
        manager.health_check().await?;

        info!("数据库连接初始化完成");
        Ok(manager)
    }

    /// 按配置建立连接池
    #[instrument(skip(config))]
    pub async fn connect(config: DatabaseConfig) -> Result<Self, StudioError> {
        let mut opt = ConnectOptions::new(&config.url);

        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .idle_timeout(Duration::from_secs(config.idle_timeout))
            .max_lifetime(Duration::from_secs(config.max_lifetime))
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        info!(
            url = %Self::mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "连接数据库"
        );

        let connection = Database::connect(opt)
            .await
            .map_err(|e| StudioError::database(format!("数据库连接失败: {}", e)))?;

        Ok(Self { connection })
    }

    /// 包装一个已有连接
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// 获取数据库连接
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// 数据库健康检查
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), StudioError> {
        let backend = self.connection.get_database_backend();
        let result = self
            .connection
            .execute(Statement::from_string(backend, "SELECT 1".to_string()))
            .await;

        match result {
            Ok(_) => {
                info!("数据库健康检查通过");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "数据库健康检查失败");
                Err(StudioError::database(format!("数据库健康检查失败: {}", e)))
            }
        }
    }

    /// 屏蔽密码信息用于日志记录
    pub fn mask_password(url: &str) -> String {
        match url::Url::parse(url) {
            Ok(mut parsed_url) => {
                if parsed_url.password().is_some() {
                    let _ = parsed_url.set_password(Some("***"));
                }
                parsed_url.to_string()
            }
            Err(_) => "***".to_string(),
        }
    }
}
