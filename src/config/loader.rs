// 配置加载器
// 处理 .env 文件加载、配置校验和全局实例

use crate::config::AppConfig;
use config::ConfigError;
use dotenvy::dotenv;
use std::sync::OnceLock;
use studio_common::CommonError;
use tracing::{info, warn};

/// 全局配置实例
static CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 初始化配置
    pub fn init() -> Result<&'static AppConfig, CommonError> {
        if let Err(e) = dotenv() {
            warn!("无法加载 .env 文件: {}", e);
        }

        let config = AppConfig::load().map_err(convert_config_error)?;
        config.validate()?;

        CONFIG
            .set(config)
            .map_err(|_| CommonError::internal("配置已经初始化"))?;

        let config = Self::get()?;

        info!(
            environment = %config.environment.name,
            version = %config.environment.version,
            host = %config.server.host,
            port = config.server.port,
            "配置加载成功"
        );

        Ok(config)
    }

    /// 获取配置
    pub fn get() -> Result<&'static AppConfig, CommonError> {
        CONFIG
            .get()
            .ok_or_else(|| CommonError::internal("配置未初始化，请先调用 ConfigLoader::init()"))
    }

    /// 打印配置摘要
    pub fn print_summary(config: &AppConfig) {
        println!("=== Profile Studio 配置摘要 ===");
        println!("环境: {}", config.environment.name);
        println!("版本: {}", config.environment.version);
        println!("调试模式: {}", config.environment.debug);
        println!("服务器: {}:{}", config.server.host, config.server.port);
        println!("工作线程: {:?}", config.server.workers);
        println!(
            "数据库连接池: {}-{}",
            config.database.min_connections, config.database.max_connections
        );
        println!(
            "配置文件存储: {} ({:?})",
            config.catalog.config_store_enabled, config.catalog.config_store_path
        );
        println!("日志级别: {}", config.logging.level);
        println!("===============================");
    }
}

/// 配置错误转换辅助函数
pub fn convert_config_error(err: ConfigError) -> CommonError {
    CommonError::configuration(format!("配置错误: {}", err))
}
