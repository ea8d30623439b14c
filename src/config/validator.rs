// 配置验证器
// 提供详细的配置验证逻辑

use crate::config::{
    AppConfig, CatalogConfig, DatabaseConfig, EnvironmentConfig, LoggingConfig, SecurityConfig,
    ServerConfig,
};
use std::path::Path;
use studio_common::CommonError;
use url::Url;

/// 配置验证器
pub struct ConfigValidator;

impl ConfigValidator {
    /// 验证完整配置，收集所有模块的错误
    pub fn validate_all(config: &AppConfig) -> Result<(), Vec<CommonError>> {
        let errors: Vec<CommonError> = [
            Self::validate_server(&config.server),
            Self::validate_database(&config.database),
            Self::validate_security(&config.security),
            Self::validate_catalog(&config.catalog),
            Self::validate_logging(&config.logging),
            Self::validate_environment(&config.environment),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 验证服务器配置
    pub fn validate_server(config: &ServerConfig) -> Result<(), CommonError> {
        if config.port == 0 {
            return Err(CommonError::validation("服务器端口不能为 0"));
        }

        if config.host.is_empty() {
            return Err(CommonError::validation("服务器主机地址不能为空"));
        }

        if let Some(workers) = config.workers {
            if workers == 0 {
                return Err(CommonError::validation("工作线程数不能为 0"));
            }
            if workers > 32 {
                return Err(CommonError::validation("工作线程数不建议超过 32"));
            }
        }

        Ok(())
    }

    /// 验证数据库配置
    pub fn validate_database(config: &DatabaseConfig) -> Result<(), CommonError> {
        if config.url.is_empty() {
            return Err(CommonError::validation("数据库 URL 不能为空"));
        }

        if Url::parse(&config.url).is_err() {
            return Err(CommonError::validation("数据库 URL 格式无效"));
        }

        if config.max_connections == 0 {
            return Err(CommonError::validation("数据库最大连接数不能为 0"));
        }

        if config.min_connections > config.max_connections {
            return Err(CommonError::validation("数据库最小连接数不能大于最大连接数"));
        }

        if config.connect_timeout == 0 {
            return Err(CommonError::validation("数据库连接超时不能为 0"));
        }

        Ok(())
    }

    /// 验证安全配置
    pub fn validate_security(config: &SecurityConfig) -> Result<(), CommonError> {
        if config.jwt_secret.len() < 32 {
            return Err(CommonError::validation("JWT 密钥长度不能少于 32 个字符"));
        }

        if config.cors_origins.is_empty() {
            return Err(CommonError::validation("CORS 来源列表不能为空"));
        }

        Ok(())
    }

    /// 验证配置文件存储
    pub fn validate_catalog(config: &CatalogConfig) -> Result<(), CommonError> {
        if let Some(ref path) = config.config_store_path {
            if path.trim().is_empty() {
                return Err(CommonError::validation("配置文件存储路径不能为空字符串"));
            }

            if Path::new(path).is_dir() {
                return Err(CommonError::validation(format!(
                    "配置文件存储路径指向一个目录: {}",
                    path
                )));
            }
        }

        Ok(())
    }

    /// 验证日志配置
    pub fn validate_logging(config: &LoggingConfig) -> Result<(), CommonError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.level.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志级别: {}，有效值: {:?}",
                config.level, valid_levels
            )));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&config.format.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的日志格式: {}，有效值: {:?}",
                config.format, valid_formats
            )));
        }

        if config.file_enabled && config.file_path.is_none() {
            return Err(CommonError::validation("启用文件日志时必须指定日志文件路径"));
        }

        Ok(())
    }

    /// 验证环境配置
    pub fn validate_environment(config: &EnvironmentConfig) -> Result<(), CommonError> {
        let valid_environments = ["development", "staging", "production", "test"];
        if !valid_environments.contains(&config.name.as_str()) {
            return Err(CommonError::validation(format!(
                "无效的环境名称: {}，有效值: {:?}",
                config.name, valid_environments
            )));
        }

        Ok(())
    }
}
