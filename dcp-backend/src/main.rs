// src/main.rs
use dcp_backend::api::{AppDependencies, AppState};
use dcp_backend::build_app;
use dcp_backend::config::AppConfig;
use dcp_backend::db::{create_db_pool, create_db_pool_with_schema, create_schema, schema_exists};
use dcp_backend::logging::init_tracing;
use dcp_backend::service::storage_service::{create_storage_service, StorageConfig};
use dcp_backend::utils::{email::EmailService, jwt::JwtManager, password::PasswordManager};
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

// 期限切れ割り当て・失効トークン掃除の間隔
const MAINTENANCE_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting DCP backend server...");

    let app_config = AppConfig::from_env()?;
    tracing::info!(
        environment = %app_config.environment,
        addr = %app_config.server_addr(),
        "Configuration loaded"
    );

    // データベース接続を作成
    let db_pool = if let Some(schema) = &app_config.db_schema {
        tracing::info!("Using schema: {}", schema);

        let base_pool = create_db_pool(&app_config).await?;
        if !schema_exists(&base_pool, schema).await? {
            tracing::info!("Schema does not exist, creating it: {}", schema);
            create_schema(&base_pool, schema).await?;
        }
        create_db_pool_with_schema(&app_config, schema).await?
    } else {
        create_db_pool(&app_config).await?
    };
    tracing::info!("Database pool created successfully.");

    Migrator::up(&db_pool, None).await?;
    tracing::info!("Database migrations applied.");

    // 外部資源
    let storage = create_storage_service(&StorageConfig::from_env()?)?;
    let deps = AppDependencies {
        jwt_manager: Arc::new(JwtManager::from_env()?),
        password_manager: Arc::new(PasswordManager::from_env()?),
        email_service: Arc::new(EmailService::from_env(app_config.otp.expiration_minutes)?),
        storage,
    };

    let app_state = AppState::new(db_pool, &app_config, deps);
    spawn_maintenance_task(app_state.clone());

    let app_router = build_app(app_state);

    let listener = TcpListener::bind(app_config.server_addr()).await?;
    tracing::info!("Server listening on {}", app_config.server_addr());
    axum::serve(listener, app_router.into_make_service()).await?;

    Ok(())
}

/// 定期メンテナンス（失敗してもサーバーは止めない）
fn spawn_maintenance_task(app_state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(MAINTENANCE_INTERVAL_SECS));
        loop {
            interval.tick().await;

            if let Err(e) = app_state.assignation_service.mark_overdue().await {
                tracing::error!(error = %e, "Failed to mark overdue assignations");
            }
            match app_state.auth_service.purge_revoked_tokens().await {
                Ok(count) if count > 0 => tracing::info!(count, "Expired revoked tokens purged"),
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Failed to purge revoked tokens"),
            }
        }
    });
}
