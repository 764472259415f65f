// src/service/auth_service.rs

use crate::api::dto::auth_dto::*;
use crate::config::OtpConfig;
use crate::domain::compte_entreprise_model::{self, SafeCompte};
use crate::domain::otp_type::OtpType;
use crate::domain::principal::{PrincipalClaims, PrincipalKind};
use crate::domain::user_model::SafeUser;
use crate::error::{AppError, AppResult};
use crate::repository::compte_entreprise_repository::{CompteEntrepriseRepository, CreateCompte};
use crate::repository::otp_code_repository::OtpCodeRepository;
use crate::repository::revoked_token_repository::RevokedTokenRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::email::{mask_email, EmailService};
use crate::utils::jwt::{AccessTokenClaims, JwtManager};
use crate::utils::otp::generate_otp_code;
use crate::utils::password::PasswordManager;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Identifiants invalides.";

/// 認証サービス（企業アカウントとスタッフの両方）
pub struct AuthService {
    compte_repo: Arc<CompteEntrepriseRepository>,
    user_repo: Arc<UserRepository>,
    otp_repo: Arc<OtpCodeRepository>,
    revoked_token_repo: Arc<RevokedTokenRepository>,
    password_manager: Arc<PasswordManager>,
    jwt_manager: Arc<JwtManager>,
    email_service: Arc<EmailService>,
    otp_config: OtpConfig,
    password_expiry_days: i64,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        compte_repo: Arc<CompteEntrepriseRepository>,
        user_repo: Arc<UserRepository>,
        otp_repo: Arc<OtpCodeRepository>,
        revoked_token_repo: Arc<RevokedTokenRepository>,
        password_manager: Arc<PasswordManager>,
        jwt_manager: Arc<JwtManager>,
        email_service: Arc<EmailService>,
        otp_config: OtpConfig,
        password_expiry_days: i64,
    ) -> Self {
        Self {
            compte_repo,
            user_repo,
            otp_repo,
            revoked_token_repo,
            password_manager,
            jwt_manager,
            email_service,
            otp_config,
            password_expiry_days,
        }
    }

    fn password_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::days(self.password_expiry_days)
    }

    // --- 登録・OTP ---

    #[instrument(skip(self, input), fields(email = %mask_email(&input.email)))]
    pub async fn register(&self, input: RegisterRequest) -> AppResult<RegisterResponse> {
        input.validate()?;

        // 保存時と同じ正規化で重複を確認する
        let email = input.email.trim().to_lowercase();
        let numero_cc = input.numero_cc.trim().to_string();

        if self.compte_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "Un compte existe déjà avec cet email.".to_string(),
            ));
        }
        if self.compte_repo.is_numero_cc_taken(&numero_cc).await? {
            return Err(AppError::Conflict(
                "Un compte existe déjà avec ce numéro CC.".to_string(),
            ));
        }

        self.password_manager
            .validate_password_strength(&input.password)?;
        let password_hash = self.password_manager.hash_password(&input.password)?;

        let compte = self
            .compte_repo
            .create(CreateCompte {
                email,
                password_hash,
                denomination: input.denomination.trim().to_string(),
                numero_cc,
                telephone: input.telephone,
                adresse: input.adresse,
                ville: input.ville,
                region: input.region,
                password_expires_at: self.password_expires_at(),
            })
            .await?;

        info!(compte_id = %compte.id, "Entreprise account registered");

        self.issue_otp(&compte, OtpType::Inscription).await?;

        Ok(RegisterResponse {
            compte: SafeCompte::from(compte),
            message: "Compte créé. Un code de vérification a été envoyé par email.".to_string(),
        })
    }

    /// 同種の未使用コードを無効化してから新しいコードを保存する
    pub async fn create_otp(
        &self,
        compte: &compte_entreprise_model::Model,
        otp_type: OtpType,
    ) -> AppResult<String> {
        self.otp_repo.invalidate_unused(compte.id, otp_type).await?;

        let code = generate_otp_code(self.otp_config.length);
        let expires_at = Utc::now() + Duration::minutes(self.otp_config.expiration_minutes);
        self.otp_repo
            .create(compte.id, code.clone(), otp_type, expires_at)
            .await?;

        Ok(code)
    }

    async fn issue_otp(
        &self,
        compte: &compte_entreprise_model::Model,
        otp_type: OtpType,
    ) -> AppResult<()> {
        let code = self.create_otp(compte, otp_type).await?;

        // 送信失敗でもコード自体は有効。再送で回復できる
        if let Err(e) = self
            .email_service
            .send_otp_email(&compte.email, &code, otp_type)
            .await
        {
            warn!(compte_id = %compte.id, error = %e, "Failed to send OTP email");
        }

        info!(compte_id = %compte.id, otp_type = %otp_type, "OTP issued");
        Ok(())
    }

    pub async fn verify_otp(&self, input: VerifyOtpRequest) -> AppResult<()> {
        input.validate()?;

        let compte = self
            .compte_repo
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::NotFound("Compte non trouvé.".to_string()))?;

        let otp = self
            .otp_repo
            .find_unused(compte.id, input.code.trim(), input.otp_type)
            .await?
            .ok_or_else(|| AppError::BadRequest("Code OTP invalide.".to_string()))?;

        if otp.is_expired() {
            self.otp_repo.mark_used(otp).await?;
            return Err(AppError::BadRequest("Code OTP expiré.".to_string()));
        }

        self.otp_repo.mark_used(otp).await?;

        if input.otp_type == OtpType::Inscription && !compte.email_verified {
            let compte_id = compte.id;
            self.compte_repo.mark_email_verified(compte).await?;
            info!(compte_id = %compte_id, "Email verified");
        }

        Ok(())
    }

    /// 未登録のメールでも成功として扱う
    pub async fn resend_otp(&self, input: ResendOtpRequest) -> AppResult<()> {
        input.validate()?;

        match self.compte_repo.find_by_email(&input.email).await? {
            Some(compte) => self.issue_otp(&compte, input.otp_type).await,
            None => {
                info!(email = %mask_email(&input.email), "OTP resend requested for unknown email");
                Ok(())
            }
        }
    }

    // --- ログイン・トークン ---

    #[instrument(skip(self, input), fields(email = %mask_email(&input.email), login_type = %input.login_type))]
    pub async fn login(&self, input: LoginRequest) -> AppResult<LoginResponse> {
        input.validate()?;

        match input.login_type {
            PrincipalKind::Entreprise => self.login_entreprise(&input).await,
            PrincipalKind::Artci => self.login_artci(&input).await,
        }
    }

    async fn login_entreprise(&self, input: &LoginRequest) -> AppResult<LoginResponse> {
        let Some(compte) = self.compte_repo.find_by_email(&input.email).await? else {
            warn!("Login failed: unknown entreprise email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !compte.is_active {
            warn!(compte_id = %compte.id, "Login attempt on disabled account");
            return Err(AppError::Forbidden("Ce compte a été désactivé.".to_string()));
        }
        if !compte.email_verified {
            return Err(AppError::Forbidden(
                "Email non vérifié. Vérifiez votre code OTP.".to_string(),
            ));
        }

        if !self.verify_password(&input.password, &compte.password_hash)? {
            warn!(compte_id = %compte.id, "Login failed: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let tokens = self
            .jwt_manager
            .generate_token_pair(PrincipalClaims::entreprise(&compte))?;
        let password_expired = compte.is_password_expired();

        info!(compte_id = %compte.id, password_expired, "Entreprise login succeeded");

        Ok(LoginResponse {
            tokens,
            password_expired,
            profile: PrincipalProfile::Entreprise(SafeCompte::from(compte)),
        })
    }

    async fn login_artci(&self, input: &LoginRequest) -> AppResult<LoginResponse> {
        let Some(user) = self.user_repo.find_by_email(&input.email).await? else {
            warn!("Login failed: unknown staff email");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !self.verify_password(&input.password, &user.password_hash)? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login attempt on disabled staff account");
            return Err(AppError::Forbidden("Ce compte a été désactivé.".to_string()));
        }

        self.user_repo.update_last_login(user.id).await?;

        let tokens = self
            .jwt_manager
            .generate_token_pair(PrincipalClaims::staff(&user))?;

        info!(user_id = %user.id, role = %user.role, "Staff login succeeded");

        Ok(LoginResponse {
            tokens,
            password_expired: false,
            profile: PrincipalProfile::Artci(SafeUser::from(user)),
        })
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        self.password_manager
            .verify_password(password, hash)
            .map_err(|e| {
                error!(error = %e, "Password verification failed");
                AppError::InternalServerError("Password verification failed".to_string())
            })
    }

    /// リフレッシュトークンから主体を再読込してアクセストークンを再発行
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<RefreshResponse> {
        let claims = self.jwt_manager.verify_refresh_token(refresh_token)?;

        if self.revoked_token_repo.is_revoked(&claims.jti).await? {
            return Err(AppError::Unauthorized("Token révoqué.".to_string()));
        }

        let principal_id = claims.principal_id()?;
        let principal = match claims.kind {
            PrincipalKind::Entreprise => {
                let compte = self
                    .compte_repo
                    .find_by_id(principal_id)
                    .await?
                    .filter(|c| c.is_active)
                    .ok_or_else(|| AppError::Unauthorized("Compte introuvable.".to_string()))?;
                PrincipalClaims::entreprise(&compte)
            }
            PrincipalKind::Artci => {
                let user = self
                    .user_repo
                    .find_by_id(principal_id)
                    .await?
                    .filter(|u| u.is_active)
                    .ok_or_else(|| AppError::Unauthorized("Compte introuvable.".to_string()))?;
                PrincipalClaims::staff(&user)
            }
        };

        let access_token = self.jwt_manager.generate_access_token(principal)?;

        Ok(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_manager.access_token_expires_in(),
        })
    }

    /// アクセストークン（と任意でリフレッシュトークン）の jti を失効させる
    pub async fn logout(
        &self,
        access_claims: &AccessTokenClaims,
        refresh_token: Option<&str>,
    ) -> AppResult<()> {
        let principal_id = access_claims.principal.principal_id;
        self.revoked_token_repo
            .revoke(&access_claims.jti, principal_id, access_claims.expires_at())
            .await?;

        if let Some(token) = refresh_token {
            match self.jwt_manager.verify_refresh_token(token) {
                Ok(claims) => {
                    self.revoked_token_repo
                        .revoke(&claims.jti, principal_id, claims.expires_at())
                        .await?;
                }
                Err(e) => warn!(error = %e, "Ignoring invalid refresh token on logout"),
            }
        }

        info!(principal_id = %principal_id, "Logged out");
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: &str) -> AppResult<bool> {
        Ok(self.revoked_token_repo.is_revoked(jti).await?)
    }

    pub async fn purge_revoked_tokens(&self) -> AppResult<u64> {
        Ok(self.revoked_token_repo.purge_expired().await?)
    }

    pub async fn me(&self, principal: &PrincipalClaims) -> AppResult<PrincipalProfile> {
        match principal.kind {
            PrincipalKind::Entreprise => {
                let compte = self
                    .compte_repo
                    .find_by_id(principal.principal_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Compte non trouvé.".to_string()))?;
                Ok(PrincipalProfile::Entreprise(SafeCompte::from(compte)))
            }
            PrincipalKind::Artci => {
                let user = self
                    .user_repo
                    .find_by_id(principal.principal_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Utilisateur non trouvé.".to_string()))?;
                Ok(PrincipalProfile::Artci(SafeUser::from(user)))
            }
        }
    }

    // --- パスワード ---

    pub async fn forgot_password(&self, input: ForgotPasswordRequest) -> AppResult<()> {
        input.validate()?;

        if let Some(compte) = self.compte_repo.find_by_email(&input.email).await? {
            self.issue_otp(&compte, OtpType::ResetPassword).await?;
        } else {
            info!(email = %mask_email(&input.email), "Password reset requested for unknown email");
        }
        Ok(())
    }

    pub async fn reset_password(&self, input: ResetPasswordRequest) -> AppResult<()> {
        input.validate()?;

        let compte = self
            .compte_repo
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| AppError::NotFound("Compte non trouvé.".to_string()))?;

        let otp = self
            .otp_repo
            .find_unused(compte.id, input.code.trim(), OtpType::ResetPassword)
            .await?
            .ok_or_else(|| AppError::BadRequest("Code OTP invalide.".to_string()))?;

        if otp.is_expired() {
            self.otp_repo.mark_used(otp).await?;
            return Err(AppError::BadRequest("Code OTP expiré.".to_string()));
        }

        self.password_manager
            .validate_password_strength(&input.new_password)?;
        let password_hash = self.password_manager.hash_password(&input.new_password)?;

        self.otp_repo.mark_used(otp).await?;
        let compte = self
            .compte_repo
            .update_password(compte, password_hash, self.password_expires_at())
            .await?;

        info!(compte_id = %compte.id, "Password reset");
        Ok(())
    }

    pub async fn change_password(
        &self,
        compte_id: Uuid,
        input: ChangePasswordRequest,
    ) -> AppResult<()> {
        input.validate()?;

        let compte = self
            .compte_repo
            .find_by_id(compte_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Compte non trouvé.".to_string()))?;

        if !self.verify_password(&input.current_password, &compte.password_hash)? {
            return Err(AppError::BadRequest(
                "Mot de passe actuel incorrect.".to_string(),
            ));
        }
        if input.current_password == input.new_password {
            return Err(AppError::BadRequest(
                "Le nouveau mot de passe doit être différent de l'actuel.".to_string(),
            ));
        }

        self.password_manager
            .validate_password_strength(&input.new_password)?;
        let password_hash = self.password_manager.hash_password(&input.new_password)?;

        self.compte_repo
            .update_password(compte, password_hash, self.password_expires_at())
            .await?;

        info!(compte_id = %compte_id, "Password changed");
        Ok(())
    }
}
