// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Multiple validation errors")]
    ValidationErrors(Vec<String>),

    #[error("Failed to parse UUID: {0}")]
    UuidError(#[from] uuid::Error),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// パスワード期限切れ（403、error_type = "password_expired"）
    #[error("Password expired: {0}")]
    PasswordExpired(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl ErrorResponse {
    fn simple(message: String, error_type: &str) -> Self {
        Self {
            success: false,
            error: message.clone(),
            message,
            details: None,
            validation_errors: None,
            errors: None,
            error_type: error_type.to_string(),
        }
    }

    fn validation(field_errors: HashMap<String, Vec<String>>, errors: Vec<serde_json::Value>) -> Self {
        Self {
            success: false,
            error: "Validation failed".to_string(),
            message: "Validation failed".to_string(),
            details: None,
            validation_errors: Some(field_errors),
            errors: Some(errors),
            error_type: "validation_errors".to_string(),
        }
    }
}

// axum でエラーをHTTPレスポンスに変換するための実装
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::DbErr(db_err) => {
                error!(error = ?db_err, "Database error");

                let status = match db_err {
                    DbErr::RecordNotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let (message, details) = match &db_err {
                    DbErr::RecordNotFound(entity) => (
                        "The requested resource was not found".to_string(),
                        Some(json!({ "entity": entity })),
                    ),
                    DbErr::Exec(_) => (
                        "A database operation failed".to_string(),
                        Some(json!({ "operation": "exec" })),
                    ),
                    DbErr::Query(_) => (
                        "A database query failed".to_string(),
                        Some(json!({ "operation": "query" })),
                    ),
                    _ => ("A database error occurred".to_string(), None),
                };

                let mut body = ErrorResponse::simple(message, "database_error");
                body.details = details;
                (status, body)
            }
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::simple(message, "not_found"),
            ),
            AppError::ValidationError(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::simple(message, "validation_error"),
            ),
            AppError::ValidationErrors(errors) => {
                let mut field_errors = HashMap::new();
                for error in &errors {
                    if let Some((field, message)) = error.split_once(": ") {
                        field_errors
                            .entry(field.to_string())
                            .or_insert_with(Vec::new)
                            .push(message.to_string());
                    }
                }
                let errors_array = errors.iter().map(|e| json!({ "message": e })).collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::validation(field_errors, errors_array),
                )
            }
            AppError::UuidError(err) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::simple(format!("Identifiant invalide: {}", err), "invalid_uuid"),
            ),
            AppError::ValidationFailure(errors) => {
                let field_errors: HashMap<String, Vec<String>> = errors
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let messages = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map_or_else(|| "Valeur invalide".to_string(), |m| m.to_string())
                            })
                            .collect();
                        (field.to_string(), messages)
                    })
                    .collect();
                let errors_array = field_errors
                    .iter()
                    .flat_map(|(field, messages)| {
                        messages
                            .iter()
                            .map(move |msg| json!({ "message": format!("{}: {}", field, msg) }))
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::validation(field_errors, errors_array),
                )
            }
            AppError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::simple(message, "bad_request"),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::simple(message, "unauthorized"),
            ),
            AppError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::simple(message, "forbidden"),
            ),
            AppError::PasswordExpired(message) => (
                StatusCode::FORBIDDEN,
                ErrorResponse::simple(message, "password_expired"),
            ),
            AppError::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorResponse::simple(message, "conflict"),
            ),
            AppError::InternalServerError(message) => {
                error!(%message, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::simple(
                        "Une erreur interne est survenue".to_string(),
                        "internal_server_error",
                    ),
                )
            }
            AppError::ExternalServiceError(message) => {
                error!(%message, "External service error");
                let mut body = ErrorResponse::simple(
                    "Service externe indisponible".to_string(),
                    "external_service_error",
                );
                body.message = message;
                (StatusCode::SERVICE_UNAVAILABLE, body)
            }
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<crate::utils::jwt::JwtError> for AppError {
    fn from(err: crate::utils::jwt::JwtError) -> Self {
        use crate::utils::jwt::JwtError;
        match err {
            JwtError::TokenExpired => AppError::Unauthorized("Session expirée.".to_string()),
            JwtError::InvalidToken | JwtError::DecodingError(_) => {
                AppError::Unauthorized("Token invalide.".to_string())
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl From<crate::utils::password::PasswordError> for AppError {
    fn from(err: crate::utils::password::PasswordError) -> Self {
        match err {
            crate::utils::password::PasswordError::WeakPassword(errors) => {
                AppError::ValidationErrors(errors)
            }
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

impl AppError {
    /// 利用者向けのメッセージ（内部エラーの詳細は含めない）
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(m)
            | AppError::ValidationError(m)
            | AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::PasswordExpired(m)
            | AppError::Conflict(m) => m.clone(),
            AppError::ValidationErrors(errors) => errors.join(" "),
            AppError::ValidationFailure(errors) => errors
                .field_errors()
                .values()
                .flat_map(|errors| errors.iter())
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .collect::<Vec<_>>()
                .join(" "),
            AppError::UuidError(_) => "Identifiant invalide.".to_string(),
            AppError::DbErr(_) | AppError::InternalServerError(_) => {
                "Une erreur interne est survenue".to_string()
            }
            AppError::ExternalServiceError(_) => "Service externe indisponible".to_string(),
        }
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<HashMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<serde_json::Value>>,
    pub error_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_expired_is_forbidden() {
        let response = AppError::PasswordExpired("Mot de passe expiré".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::ValidationErrors(vec!["email: requis".into()])
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_weak_password_maps_to_validation_errors() {
        let err: AppError = crate::utils::password::PasswordError::WeakPassword(vec![
            "Le mot de passe doit contenir au moins un chiffre.".to_string(),
        ])
        .into();
        assert!(matches!(err, AppError::ValidationErrors(ref list) if list.len() == 1));
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        assert_eq!(
            AppError::Conflict("Déjà existant.".into()).user_message(),
            "Déjà existant."
        );
        assert_eq!(
            AppError::InternalServerError("pool exhausted".into()).user_message(),
            "Une erreur interne est survenue"
        );
    }
}
