// src/api/dto/auth_dto.rs

use crate::domain::compte_entreprise_model::SafeCompte;
use crate::domain::otp_type::OtpType;
use crate::domain::principal::PrincipalKind;
use crate::domain::user_model::SafeUser;
use crate::utils::jwt::TokenPair;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// --- リクエストDTO ---

/// 企業アカウント登録リクエスト
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_register_passwords"))]
pub struct RegisterRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Le mot de passe doit contenir entre 8 et 128 caractères."))]
    pub password: String,

    pub password_confirm: String,

    #[validate(length(min = 2, max = 255, message = "La dénomination doit contenir entre 2 et 255 caractères."))]
    pub denomination: String,

    #[validate(length(min = 2, max = 50, message = "Le numéro CC doit contenir entre 2 et 50 caractères."))]
    pub numero_cc: String,

    #[validate(length(max = 20))]
    pub telephone: Option<String>,

    #[validate(length(max = 500))]
    pub adresse: Option<String>,

    #[validate(length(max = 100))]
    pub ville: Option<String>,

    #[validate(length(max = 100))]
    pub region: Option<String>,
}

fn validate_register_passwords(req: &RegisterRequest) -> Result<(), ValidationError> {
    passwords_match(&req.password, &req.password_confirm)
}

fn passwords_match(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Les mots de passe ne correspondent pas.".into());
        return Err(err);
    }
    Ok(())
}

/// OTP 検証リクエスト
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[validate(length(min = 4, max = 10, message = "Code OTP invalide."))]
    pub code: String,

    #[serde(rename = "type", default)]
    pub otp_type: OtpType,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResendOtpRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[serde(rename = "type", default)]
    pub otp_type: OtpType,
}

/// ログインリクエスト（login_type 省略時は entreprise）
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[validate(length(min = 1, message = "Le mot de passe est requis."))]
    pub password: String,

    #[serde(default = "default_login_type")]
    pub login_type: PrincipalKind,
}

fn default_login_type() -> PrincipalKind {
    PrincipalKind::Entreprise
}

/// リフレッシュ（ボディ省略時は Cookie を使う）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_reset_passwords"))]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Adresse email invalide."))]
    pub email: String,

    #[validate(length(min = 4, max = 10, message = "Code OTP invalide."))]
    pub code: String,

    #[validate(length(min = 8, max = 128, message = "Le mot de passe doit contenir entre 8 et 128 caractères."))]
    pub new_password: String,

    pub new_password_confirm: String,
}

fn validate_reset_passwords(req: &ResetPasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.new_password, &req.new_password_confirm)
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_change_passwords"))]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Le mot de passe actuel est requis."))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128, message = "Le mot de passe doit contenir entre 8 et 128 caractères."))]
    pub new_password: String,

    pub new_password_confirm: String,
}

fn validate_change_passwords(req: &ChangePasswordRequest) -> Result<(), ValidationError> {
    passwords_match(&req.new_password, &req.new_password_confirm)
}

// --- レスポンスDTO ---

/// ログイン主体のプロフィール
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PrincipalProfile {
    Artci(SafeUser),
    Entreprise(SafeCompte),
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub password_expired: bool,
    pub profile: PrincipalProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub compte: SafeCompte,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_password_mismatch() {
        let req = RegisterRequest {
            email: "contact@societe.ci".to_string(),
            password: "Secret123!".to_string(),
            password_confirm: "Secret124!".to_string(),
            denomination: "Société".to_string(),
            numero_cc: "CC-01".to_string(),
            telephone: None,
            adresse: None,
            ville: None,
            region: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_type_defaults_to_entreprise() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.ci","password":"x"}"#).unwrap();
        assert_eq!(req.login_type, PrincipalKind::Entreprise);

        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.ci","password":"x","login_type":"artci"}"#)
                .unwrap();
        assert_eq!(req.login_type, PrincipalKind::Artci);
    }

    #[test]
    fn test_verify_otp_type_field() {
        let req: VerifyOtpRequest = serde_json::from_str(
            r#"{"email":"a@b.ci","code":"123456","type":"reset_password"}"#,
        )
        .unwrap();
        assert_eq!(req.otp_type, OtpType::ResetPassword);
        assert!(req.validate().is_ok());
    }
}
