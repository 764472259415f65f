// src/api/mod.rs
use crate::config::AppConfig;
use crate::repository::{
    assignation_repository::AssignationRepository,
    compte_entreprise_repository::CompteEntrepriseRepository,
    document_repository::DocumentRepository, entite_repository::EntiteRepository,
    feedback_repository::FeedbackRepository, historique_repository::HistoriqueRepository,
    notification_repository::NotificationRepository, otp_code_repository::OtpCodeRepository,
    rapprochement_repository::RapprochementRepository,
    renouvellement_repository::RenouvellementRepository,
    revoked_token_repository::RevokedTokenRepository, user_repository::UserRepository,
};
use crate::service::{
    assignation_service::AssignationService, auth_service::AuthService,
    demande_service::DemandeService, document_service::DocumentService,
    entite_service::EntiteService, entreprise_service::EntrepriseService,
    feedback_service::FeedbackService, import_service::ImportService,
    notification_service::NotificationService, public_service::PublicService,
    stats_service::StatsService, storage_service::StorageService, user_service::UserService,
    workflow_service::WorkflowService,
};
use crate::utils::email::EmailService;
use crate::utils::jwt::JwtManager;
use crate::utils::password::PasswordManager;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub mod dto;
pub mod handlers;

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub entite_service: Arc<EntiteService>,
    pub workflow_service: Arc<WorkflowService>,
    pub assignation_service: Arc<AssignationService>,
    pub feedback_service: Arc<FeedbackService>,
    pub entreprise_service: Arc<EntrepriseService>,
    pub demande_service: Arc<DemandeService>,
    pub document_service: Arc<DocumentService>,
    pub notification_service: Arc<NotificationService>,
    pub stats_service: Arc<StatsService>,
    pub public_service: Arc<PublicService>,
    pub import_service: Arc<ImportService>,
    pub compte_repo: Arc<CompteEntrepriseRepository>,
    pub user_repo: Arc<UserRepository>,
    pub jwt_manager: Arc<JwtManager>,
    pub db: Arc<DatabaseConnection>,
    pub cookie_config: CookieConfig,
    pub security_headers: SecurityHeaders,
    pub server_addr: String,
    pub config: Arc<AppConfig>,
}

/// 外部資源（DB 以外）
pub struct AppDependencies {
    pub jwt_manager: Arc<JwtManager>,
    pub password_manager: Arc<PasswordManager>,
    pub email_service: Arc<EmailService>,
    pub storage: Arc<dyn StorageService>,
}

/// Cookie設定
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub access_token_name: String,
    pub refresh_token_name: String,
    pub secure: bool,
    pub http_only: bool,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_token_name: "access_token".to_string(),
            refresh_token_name: "refresh_token".to_string(),
            secure: false,
            http_only: true,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    pub fn from_app_config(app_config: &AppConfig) -> Self {
        Self {
            secure: app_config.security.cookie_secure,
            ..Default::default()
        }
    }
}

/// セキュリティヘッダー設定
#[derive(Clone, Debug)]
pub struct SecurityHeaders {
    pub content_security_policy: String,
    pub x_frame_options: String,
    pub x_content_type_options: String,
    pub referrer_policy: String,
    pub permissions_policy: String,
}

impl Default for SecurityHeaders {
    fn default() -> Self {
        Self {
            content_security_policy: "default-src 'self'; frame-ancestors 'none'".to_string(),
            x_frame_options: "DENY".to_string(),
            x_content_type_options: "nosniff".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
            permissions_policy: "microphone=(), camera=()".to_string(),
        }
    }
}

impl AppState {
    /// リポジトリとサービスを組み立てる
    pub fn new(db: DatabaseConnection, app_config: &AppConfig, deps: AppDependencies) -> Self {
        let AppDependencies {
            jwt_manager,
            password_manager,
            email_service,
            storage,
        } = deps;
        let db_arc = Arc::new(db.clone());

        // リポジトリ
        let user_repo = Arc::new(UserRepository::new(db.clone()));
        let compte_repo = Arc::new(CompteEntrepriseRepository::new(db.clone()));
        let otp_repo = Arc::new(OtpCodeRepository::new(db.clone()));
        let revoked_token_repo = Arc::new(RevokedTokenRepository::new(db.clone()));
        let entite_repo = Arc::new(EntiteRepository::new(db.clone()));
        let historique_repo = Arc::new(HistoriqueRepository::new(db.clone()));
        let assignation_repo = Arc::new(AssignationRepository::new(db.clone()));
        let feedback_repo = Arc::new(FeedbackRepository::new(db.clone()));
        let document_repo = Arc::new(DocumentRepository::new(db.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(db.clone()));
        let rapprochement_repo = Arc::new(RapprochementRepository::new(db.clone()));
        let renouvellement_repo = Arc::new(RenouvellementRepository::new(db));

        // サービス
        let auth_service = Arc::new(AuthService::new(
            compte_repo.clone(),
            user_repo.clone(),
            otp_repo,
            revoked_token_repo,
            password_manager.clone(),
            jwt_manager.clone(),
            email_service,
            app_config.otp.clone(),
            app_config.security.password_expiry_days,
        ));
        let user_service = Arc::new(UserService::new(user_repo.clone(), password_manager));
        let entite_service = Arc::new(EntiteService::new(
            db_arc.clone(),
            entite_repo.clone(),
            document_repo.clone(),
            renouvellement_repo.clone(),
        ));
        let workflow_service = Arc::new(WorkflowService::new(db_arc.clone(), historique_repo));
        let assignation_service = Arc::new(AssignationService::new(
            db_arc.clone(),
            assignation_repo.clone(),
            entite_repo.clone(),
            user_repo.clone(),
        ));
        let feedback_service = Arc::new(FeedbackService::new(
            db_arc.clone(),
            feedback_repo,
            entite_repo.clone(),
            user_repo.clone(),
        ));
        let document_service = Arc::new(DocumentService::new(
            document_repo.clone(),
            storage,
            app_config.server.body_limit,
        ));
        let entreprise_service = Arc::new(EntrepriseService::new(
            entite_repo.clone(),
            compte_repo.clone(),
            rapprochement_repo.clone(),
            renouvellement_repo.clone(),
            notification_repo.clone(),
            entite_service.clone(),
            feedback_service.clone(),
            document_service.clone(),
            workflow_service.clone(),
        ));
        let demande_service = Arc::new(DemandeService::new(
            db_arc.clone(),
            rapprochement_repo,
            renouvellement_repo,
            document_repo,
            entite_repo.clone(),
            compte_repo.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(notification_repo));
        let stats_service = Arc::new(StatsService::new(
            entite_repo.clone(),
            assignation_repo,
            user_repo.clone(),
        ));
        let public_service = Arc::new(PublicService::new(entite_repo));
        let import_service = Arc::new(ImportService::new(entite_service.clone()));

        Self {
            auth_service,
            user_service,
            entite_service,
            workflow_service,
            assignation_service,
            feedback_service,
            entreprise_service,
            demande_service,
            document_service,
            notification_service,
            stats_service,
            public_service,
            import_service,
            compte_repo,
            user_repo,
            jwt_manager,
            db: db_arc,
            cookie_config: CookieConfig::from_app_config(app_config),
            security_headers: SecurityHeaders::default(),
            server_addr: app_config.server_addr(),
            config: Arc::new(app_config.clone()),
        }
    }
}
