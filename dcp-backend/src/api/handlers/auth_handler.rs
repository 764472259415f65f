// src/api/handlers/auth_handler.rs
use crate::api::dto::auth_dto::*;
use crate::api::{AppState, CookieConfig};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{jwt_auth_middleware, AuthenticatedEntreprise, AuthenticatedPrincipal};
use crate::types::ApiResponse;
use axum::{
    body::Bytes,
    extract::{Json, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::de::DeserializeOwned;
use tracing::info;

// --- 登録・OTP ---

/// 企業アカウント登録
pub async fn register_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let response = app_state.auth_service.register(payload).await?;
    let message = response.message.clone();
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message(message, response),
    ))
}

pub async fn verify_otp_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<ApiResponse<()>> {
    app_state.auth_service.verify_otp(payload).await?;
    Ok(ApiResponse::message("Code vérifié avec succès."))
}

pub async fn resend_otp_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ResendOtpRequest>,
) -> AppResult<ApiResponse<()>> {
    app_state.auth_service.resend_otp(payload).await?;
    Ok(ApiResponse::message(
        "Si un compte existe pour cet email, un nouveau code a été envoyé.",
    ))
}

// --- ログイン・トークン ---

/// ログイン（トークンは本文と Cookie の両方で返す）
pub async fn login_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Response> {
    let login = app_state.auth_service.login(payload).await?;

    let refresh_max_age = app_state.jwt_manager.config().refresh_token_expiry_days * 24 * 3600;
    let jar = CookieJar::new()
        .add(auth_cookie(
            &app_state.cookie_config,
            &app_state.cookie_config.access_token_name,
            login.tokens.access_token.clone(),
            login.tokens.expires_in,
        ))
        .add(auth_cookie(
            &app_state.cookie_config,
            &app_state.cookie_config.refresh_token_name,
            login.tokens.refresh_token.clone(),
            refresh_max_age,
        ));

    let message = if login.password_expired {
        "Connexion réussie. Votre mot de passe a expiré, veuillez le modifier."
    } else {
        "Connexion réussie."
    };

    Ok((jar, ApiResponse::success_with_message(message, login)).into_response())
}

/// アクセストークン再発行（本文になければ Cookie から）
pub async fn refresh_handler(
    State(app_state): State<AppState>,
    cookie_jar: CookieJar,
    body: Bytes,
) -> AppResult<Response> {
    let payload: RefreshTokenRequest = optional_json(&body)?;
    let refresh_token = payload
        .refresh_token
        .filter(|t| !t.is_empty())
        .or_else(|| {
            cookie_jar
                .get(&app_state.cookie_config.refresh_token_name)
                .map(|c| c.value().to_string())
        })
        .ok_or_else(|| AppError::Unauthorized("Refresh token manquant.".to_string()))?;

    let refreshed = app_state.auth_service.refresh(&refresh_token).await?;
    let jar = CookieJar::new().add(auth_cookie(
        &app_state.cookie_config,
        &app_state.cookie_config.access_token_name,
        refreshed.access_token.clone(),
        refreshed.expires_in,
    ));

    Ok((jar, ApiResponse::success(refreshed)).into_response())
}

/// ログアウト（jti を失効させ Cookie を削除）
pub async fn logout_handler(
    State(app_state): State<AppState>,
    principal: AuthenticatedPrincipal,
    cookie_jar: CookieJar,
    body: Bytes,
) -> AppResult<Response> {
    let payload: LogoutRequest = optional_json(&body)?;
    let refresh_token = payload.refresh_token.filter(|t| !t.is_empty()).or_else(|| {
        cookie_jar
            .get(&app_state.cookie_config.refresh_token_name)
            .map(|c| c.value().to_string())
    });

    app_state
        .auth_service
        .logout(&principal.claims, refresh_token.as_deref())
        .await?;

    let config = &app_state.cookie_config;
    let jar = CookieJar::new()
        .add(auth_cookie(config, &config.access_token_name, String::new(), 0))
        .add(auth_cookie(config, &config.refresh_token_name, String::new(), 0));

    Ok((jar, ApiResponse::message("Déconnexion réussie.")).into_response())
}

pub async fn me_handler(
    State(app_state): State<AppState>,
    principal: AuthenticatedPrincipal,
) -> AppResult<ApiResponse<PrincipalProfile>> {
    let profile = app_state.auth_service.me(principal.principal()).await?;
    Ok(ApiResponse::success(profile))
}

// --- パスワード ---

pub async fn forgot_password_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    app_state.auth_service.forgot_password(payload).await?;
    Ok(ApiResponse::message(
        "Si un compte existe pour cet email, un code de réinitialisation a été envoyé.",
    ))
}

pub async fn reset_password_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    app_state.auth_service.reset_password(payload).await?;
    Ok(ApiResponse::message("Mot de passe réinitialisé avec succès."))
}

/// 期限切れでも変更できるよう企業ガードは通さない
pub async fn change_password_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    app_state
        .auth_service
        .change_password(entreprise.compte_id(), payload)
        .await?;
    info!(compte_id = %entreprise.compte_id(), "Password change requested via API");
    Ok(ApiResponse::message("Mot de passe modifié avec succès."))
}

// --- ヘルパー関数 ---

fn auth_cookie(config: &CookieConfig, name: &str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name.to_string(), value))
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// 空のボディはデフォルト値として扱う
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Corps de requête invalide : {}", e)))
}

// --- ルーター ---

/// 認証ルーター（/api/auth 配下）
pub fn auth_router(app_state: AppState) -> Router {
    let protected = Router::new()
        .route("/logout", post(logout_handler))
        .route("/me", get(me_handler))
        .route("/change-password", put(change_password_handler))
        .route_layer(from_fn_with_state(app_state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/register", post(register_handler))
        .route("/verify-otp", post(verify_otp_handler))
        .route("/resend-otp", post(resend_otp_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/forgot-password", post(forgot_password_handler))
        .route("/reset-password", post(reset_password_handler))
        .merge(protected)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_json_accepts_empty_body() {
        let empty: RefreshTokenRequest = optional_json(&Bytes::new()).unwrap();
        assert!(empty.refresh_token.is_none());

        let parsed: RefreshTokenRequest =
            optional_json(&Bytes::from_static(br#"{"refresh_token":"abc"}"#)).unwrap();
        assert_eq!(parsed.refresh_token.as_deref(), Some("abc"));

        let invalid: AppResult<RefreshTokenRequest> = optional_json(&Bytes::from_static(b"{"));
        assert!(matches!(invalid, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let config = CookieConfig::default();
        let cookie = auth_cookie(&config, "access_token", "token".to_string(), 900);
        assert_eq!(cookie.name(), "access_token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(900)));
        assert!(cookie.to_string().contains("Path=/"));
    }
}
