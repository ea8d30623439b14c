// 应用程序设置和配置
// 定义配置结构体和加载逻辑

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use studio_common::CommonError;

/// 环境变量前缀，例如 `PROFILE_STUDIO_DATABASE__URL`
pub const ENV_PREFIX: &str = "PROFILE_STUDIO";

/// 应用程序配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
    pub environment: EnvironmentConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub keep_alive: u64,
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_lifetime: u64,
    /// 启动时自动应用待处理的迁移
    pub run_migrations: bool,
}

/// 安全配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// 用于校验访问令牌的 HS256 密钥
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
}

/// 配置文件形式的目录存储
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// 是否挂载 `/configs` 下的配置文件存储路由
    pub config_store_enabled: bool,
    /// JSON 文件路径；为空时仅保存在内存中
    pub config_store_path: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_enabled: bool,
    pub file_path: Option<String>,
}

/// 环境配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub name: String,
    pub debug: bool,
    pub version: String,
}

impl AppConfig {
    /// 从环境变量和配置文件加载配置
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    /// 从指定的配置文件加载配置，文件不存在时跳过
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Config::builder();

        // 1. 默认配置
        config = config.add_source(Config::try_from(&AppConfig::default())?);

        // 2. 配置文件
        if path.exists() {
            config = config.add_source(File::from(path));
        }

        // 3. 环境变量（优先级最高）
        config = config.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let mut app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.environment.version = env!("CARGO_PKG_VERSION").to_string();

        Ok(app_config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), CommonError> {
        use crate::config::ConfigValidator;

        ConfigValidator::validate_all(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            CommonError::configuration(format!("配置验证失败: {}", error_messages.join("; ")))
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment.name == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment.name == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                workers: None,
                keep_alive: 75,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/profile_studio".to_string(),
                max_connections: 10,
                min_connections: 1,
                connect_timeout: 30,
                idle_timeout: 600,
                max_lifetime: 1800,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: "change-this-jwt-secret-before-going-to-production".to_string(),
                cors_origins: vec!["*".to_string()],
            },
            catalog: CatalogConfig {
                config_store_enabled: true,
                config_store_path: Some("./data/catalog.json".to_string()),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                file_enabled: false,
                file_path: None,
            },
            environment: EnvironmentConfig {
                name: "development".to_string(),
                debug: true,
                version: "0.1.0".to_string(),
            },
        }
    }
}
