// 日志系统设置

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 日志系统初始化器
pub struct LoggingSetup;

impl LoggingSetup {
    /// 初始化日志系统
    ///
    /// 启用文件日志时返回后台写线程的 guard，调用方需要持有它直到进程退出。
    pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let (file_layer, guard) = match Self::file_target(config) {
            Some((dir, file_name)) => {
                std::fs::create_dir_all(&dir)
                    .with_context(|| format!("无法创建日志目录: {}", dir.display()))?;
                let appender = tracing_appender::rolling::daily(&dir, &file_name);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(Self::console_layer(&config.format))
            .with(file_layer)
            .try_init()
            .context("日志系统已经初始化")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            file = ?config.file_path.as_deref().filter(|_| config.file_enabled),
            "日志系统初始化完成"
        );

        Ok(guard)
    }

    /// 根据格式构建控制台输出层
    fn console_layer<S>(format: &str) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        match format {
            "json" => fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
            "pretty" => fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_names(true)
                .boxed(),
            "compact" => fmt::layer().compact().with_target(true).boxed(),
            _ => fmt::layer().with_target(true).boxed(),
        }
    }

    /// 文件日志的目录和文件名
    pub fn file_target(config: &LoggingConfig) -> Option<(PathBuf, String)> {
        if !config.file_enabled {
            return None;
        }

        let path = Path::new(config.file_path.as_deref()?);
        let file_name = path.file_name()?.to_string_lossy().to_string();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        Some((dir, file_name))
    }

    /// 解析日志级别
    pub fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    /// 开发环境日志配置
    pub fn development_config() -> LoggingConfig {
        LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
            file_enabled: false,
            file_path: None,
        }
    }

    /// 生产环境日志配置
    pub fn production_config() -> LoggingConfig {
        LoggingConfig {
            level: "info".to_string(),
            format: "json".to_string(),
            file_enabled: true,
            file_path: Some("./logs/profile-studio.log".to_string()),
        }
    }
}
