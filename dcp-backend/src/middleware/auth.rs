// src/middleware/auth.rs

use crate::api::AppState;
use crate::domain::principal::{PrincipalClaims, PrincipalKind};
use crate::domain::user_role::UserRole;
use crate::error::AppError;
use crate::utils::jwt::AccessTokenClaims;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};
use uuid::Uuid;

/// 認証済み主体（リクエスト拡張に格納）
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub claims: AccessTokenClaims,
}

impl AuthenticatedPrincipal {
    pub fn principal(&self) -> &PrincipalClaims {
        &self.claims.principal
    }

    pub fn principal_id(&self) -> Uuid {
        self.claims.principal.principal_id
    }
}

/// ARTCI スタッフとして認証された主体
#[derive(Debug, Clone)]
pub struct AuthenticatedStaff(pub AuthenticatedPrincipal);

impl AuthenticatedStaff {
    pub fn user_id(&self) -> Uuid {
        self.0.principal_id()
    }

    pub fn principal(&self) -> &PrincipalClaims {
        self.0.principal()
    }

    /// 許可ロールのいずれかを要求する
    pub fn require(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if self.principal().has_any_role(allowed) {
            return Ok(());
        }
        warn!(
            user_id = %self.user_id(),
            role = ?self.principal().role,
            "Access denied: insufficient role"
        );
        Err(AppError::Forbidden(
            "Vous n'avez pas les droits nécessaires pour cette action.".to_string(),
        ))
    }
}

/// 企業アカウントとして認証された主体
#[derive(Debug, Clone)]
pub struct AuthenticatedEntreprise(pub AuthenticatedPrincipal);

impl AuthenticatedEntreprise {
    pub fn compte_id(&self) -> Uuid {
        self.0.principal_id()
    }
}

/// JWT 認証ミドルウェア（失効済み jti も拒否）
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    cookie_jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let token = extract_token(&headers, &cookie_jar, &state.cookie_config.access_token_name)
        .ok_or_else(|| {
            debug!(path = %path, "Missing authentication token");
            AppError::Unauthorized("Authentification requise.".to_string())
        })?;

    let claims = state.jwt_manager.verify_access_token(&token).map_err(|e| {
        warn!(path = %path, error = %e, "Invalid access token");
        AppError::from(e)
    })?;

    if state.auth_service.is_token_revoked(&claims.jti).await? {
        warn!(path = %path, principal_id = %claims.principal.principal_id, "Revoked token used");
        return Err(AppError::Unauthorized("Token révoqué.".to_string()));
    }

    debug!(
        principal_id = %claims.principal.principal_id,
        kind = %claims.principal.kind,
        path = %path,
        "Authenticated request"
    );
    request
        .extensions_mut()
        .insert(AuthenticatedPrincipal { claims });

    Ok(next.run(request).await)
}

/// 企業ポータル用ガード：メール確認済みかつパスワード期限内
pub async fn entreprise_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentification requise.".to_string()))?;

    if principal.principal().kind != PrincipalKind::Entreprise {
        return Err(AppError::Forbidden(
            "Accès réservé aux comptes entreprise.".to_string(),
        ));
    }

    let compte = state
        .compte_repo
        .find_by_id(principal.principal_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Compte introuvable.".to_string()))?;

    if !compte.is_active {
        return Err(AppError::Forbidden("Ce compte a été désactivé.".to_string()));
    }
    if !compte.email_verified {
        return Err(AppError::Forbidden(
            "Email non vérifié. Vérifiez votre code OTP.".to_string(),
        ));
    }
    if compte.is_password_expired() {
        warn!(compte_id = %compte.id, "Access attempt with expired password");
        return Err(AppError::PasswordExpired(
            "Votre mot de passe a expiré. Veuillez le modifier.".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

/// スタッフ用ガード：有効な artci ユーザーのみ通す。ロールは DB の現在値で差し替える
pub async fn staff_guard_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let mut principal = request
        .extensions()
        .get::<AuthenticatedPrincipal>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("Authentification requise.".to_string()))?;

    if !principal.principal().is_staff() {
        return Err(AppError::Forbidden(
            "Accès réservé au personnel de l'ARTCI.".to_string(),
        ));
    }

    let user = state
        .user_repo
        .find_by_id(principal.principal_id())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Utilisateur introuvable.".to_string()))?;

    if !user.is_active {
        warn!(user_id = %user.id, "Access attempt by deactivated staff user");
        return Err(AppError::Forbidden("Ce compte a été désactivé.".to_string()));
    }

    let role = user.user_role();
    if principal.principal().role != Some(role) {
        debug!(
            user_id = %user.id,
            token_role = ?principal.principal().role,
            current_role = %role,
            "Staff role changed since token issue"
        );
        principal.claims.principal.role = Some(role);
        request.extensions_mut().insert(principal);
    }

    Ok(next.run(request).await)
}

/// CORS 設定（許可オリジンは設定から）
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// セキュリティヘッダーミドルウェア
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let config = &state.security_headers;
    let headers = response.headers_mut();

    let values = [
        ("content-security-policy", &config.content_security_policy),
        ("x-frame-options", &config.x_frame_options),
        ("x-content-type-options", &config.x_content_type_options),
        ("referrer-policy", &config.referrer_policy),
        ("permissions-policy", &config.permissions_policy),
    ];
    for (name, value) in values {
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(name, value);
        }
    }

    response
}

// --- ヘルパー関数 ---

/// Authorization ヘッダー、なければ Cookie からトークンを取得
fn extract_token(headers: &HeaderMap, cookie_jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let cookie_token = cookie_jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string());

    auth_header.or(cookie_token)
}

// --- Axum Extractors ---

impl<S> FromRequestParts<S> for AuthenticatedPrincipal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentification requise.".to_string()))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = AuthenticatedPrincipal::from_request_parts(parts, state).await?;
        if !principal.principal().is_staff() {
            return Err(AppError::Forbidden(
                "Accès réservé au personnel de l'ARTCI.".to_string(),
            ));
        }
        Ok(AuthenticatedStaff(principal))
    }
}

impl<S> FromRequestParts<S> for AuthenticatedEntreprise
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = AuthenticatedPrincipal::from_request_parts(parts, state).await?;
        if principal.principal().kind != PrincipalKind::Entreprise {
            return Err(AppError::Forbidden(
                "Accès réservé aux comptes entreprise.".to_string(),
            ));
        }
        Ok(AuthenticatedEntreprise(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_extract_token_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer header-token".parse().unwrap());
        let jar = CookieJar::new().add(Cookie::new("access_token", "cookie-token"));

        assert_eq!(
            extract_token(&headers, &jar, "access_token"),
            Some("header-token".to_string())
        );

        headers.clear();
        assert_eq!(
            extract_token(&headers, &jar, "access_token"),
            Some("cookie-token".to_string())
        );
        assert_eq!(extract_token(&headers, &CookieJar::new(), "access_token"), None);
    }

    #[test]
    fn test_staff_role_requirement() {
        let principal = |role| AuthenticatedPrincipal {
            claims: AccessTokenClaims {
                sub: Uuid::nil().to_string(),
                iat: 0,
                exp: 0,
                nbf: 0,
                iss: "test".to_string(),
                aud: "test".to_string(),
                jti: "jti".to_string(),
                typ: "access".to_string(),
                principal: PrincipalClaims {
                    principal_id: Uuid::nil(),
                    kind: PrincipalKind::Artci,
                    email: "agent@artci.ci".to_string(),
                    role: Some(role),
                },
            },
        };

        let reader = AuthenticatedStaff(principal(UserRole::Reader));
        assert!(reader.require(UserRole::any_staff()).is_ok());
        assert!(matches!(
            reader.require(UserRole::editor_or_above()),
            Err(AppError::Forbidden(_))
        ));

        let admin = AuthenticatedStaff(principal(UserRole::Admin));
        assert!(admin.require(UserRole::admin_or_above()).is_ok());
    }
}
