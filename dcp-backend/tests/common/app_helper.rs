// tests/common/app_helper.rs
use axum::Router;
use dcp_backend::{
    api::{AppDependencies, AppState},
    build_app,
    config::AppConfig,
    service::storage_service::LocalStorageService,
    utils::{
        email::{EmailConfig, EmailService},
        jwt::{JwtConfig, JwtManager},
        password::{Argon2Config, PasswordManager, PasswordPolicy},
    },
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::common;

/// テスト用アプリ一式
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub db: common::db::TestDatabase,
    /// ローカルストレージの保存先
    pub upload_dir: PathBuf,
}

/// 全ルーター付きアプリのセットアップ
pub async fn setup_full_app() -> TestApp {
    common::init_test_env();

    let db = common::db::TestDatabase::new().await;
    let app_config = AppConfig::for_testing();

    let password_manager = Arc::new(
        PasswordManager::new(Argon2Config::for_testing(), PasswordPolicy::default()).unwrap(),
    );
    let jwt_manager = Arc::new(JwtManager::new(JwtConfig::default()).unwrap());
    let email_service = Arc::new(
        EmailService::new(
            EmailConfig {
                development_mode: true,
                ..Default::default()
            },
            app_config.otp.expiration_minutes,
        )
        .unwrap(),
    );
    let upload_dir = std::env::temp_dir().join(format!("dcp-test-{}", Uuid::new_v4().simple()));

    let state = AppState::new(
        db.connection.clone(),
        &app_config,
        AppDependencies {
            jwt_manager,
            password_manager,
            email_service,
            storage: Arc::new(LocalStorageService::new(upload_dir.clone())),
        },
    );

    TestApp {
        router: build_app(state.clone()),
        state,
        db,
        upload_dir,
    }
}

/// 保存先配下の通常ファイル数
pub fn count_stored_files(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_stored_files(&path)
            } else {
                1
            }
        })
        .sum()
}
