use std::path::Path;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use profile_studio::api::{configure_routes, ApiState, TokenVerifier};
use profile_studio::config::{AppConfig, ConfigLoader};
use profile_studio::db::{DatabaseManager, MigrationManager};
use profile_studio::errors::{RequestIdMiddleware, StudioError};
use profile_studio::health;
use profile_studio::logging::LoggingSetup;
use profile_studio::services::{CatalogService, ConfigCatalogStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 初始化配置
    let config = ConfigLoader::init()?;

    // 初始化结构化日志系统；guard 需要存活到进程退出
    let _log_guard = LoggingSetup::init(&config.logging)?;

    tracing::info!("🚀 启动 Profile Studio v{}", config.environment.version);

    // 初始化数据库连接
    let db_manager = DatabaseManager::init(config.database.clone()).await?;

    if config.database.run_migrations {
        let migration_manager = MigrationManager::new(db_manager.get_connection().clone());
        migration_manager.init().await?;

        let applied = migration_manager.migrate().await?;
        if !applied.is_empty() {
            tracing::info!("应用了 {} 个数据库迁移", applied.len());
        }
    }

    let state = ApiState {
        catalog: web::Data::new(CatalogService::with_database(
            db_manager.get_connection().clone(),
        )),
        config_catalog: open_config_catalog(config).await?.map(web::Data::new),
        verifier: web::Data::new(TokenVerifier::new(&config.security.jwt_secret)),
    };
    let db_data = web::Data::from(db_manager);

    if config.environment.debug {
        ConfigLoader::print_summary(config);
    }

    tracing::info!("🌐 服务器启动地址: http://{}:{}", config.server.host, config.server.port);
    tracing::info!("📋 健康检查: http://{}:{}/health", config.server.host, config.server.port);

    // 启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        let state = state.clone();

        App::new()
            .wrap(build_cors(config))
            .wrap(RequestIdMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(db_data.clone())
            .route("/", web::get().to(health::index))
            .route("/health", web::get().to(health::health_check))
            .configure(move |cfg| configure_routes(cfg, &state))
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind((config.server.host.clone(), config.server.port))?
        .run()
        .await?;

    Ok(())
}

/// 打开配置文件存储并修复反向引用
async fn open_config_catalog(config: &AppConfig) -> Result<Option<CatalogService>, StudioError> {
    if !config.catalog.config_store_enabled {
        return Ok(None);
    }

    let store = match config.catalog.config_store_path {
        Some(ref path) => ConfigCatalogStore::open(Path::new(path)).await?,
        None => ConfigCatalogStore::in_memory(),
    };

    let service = CatalogService::with_config_store(&store);
    let repaired = service.rebuild_back_references().await?;
    tracing::info!(repaired, "配置文件存储已就绪");

    Ok(Some(service))
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = &config.security.cors_origins;

    let cors = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allow_any_method().allow_any_header().max_age(3600)
}
