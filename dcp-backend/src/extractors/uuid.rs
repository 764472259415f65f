// src/extractors/uuid.rs
use crate::error::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// 最後の ID らしきセグメントの直前からパラメータ名を推測
fn uuid_param_name(path: &str) -> &'static str {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    segments
        .windows(2)
        .rev()
        .find(|pair| pair[1].len() == 36 && pair[1].contains('-'))
        .map(|pair| match pair[0] {
            "entites" => "entite_id",
            "users" => "user_id",
            "assignations" => "assignation_id",
            "notifications" => "notification_id",
            "documents" => "document_id",
            "rapprochements" => "rapprochement_id",
            "renouvellements" => "renouvellement_id",
            "rapports" => "rapport_id",
            "demande" => "demande_id",
            _ => "id",
        })
        .unwrap_or("id")
}

/// パスパラメータから UUID を取り出して検証する
#[derive(Debug, Clone, Copy)]
pub struct ValidatedUuid(pub Uuid);

impl<S> FromRequestParts<S> for ValidatedUuid
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AppError::BadRequest(format!(
                    "Paramètre '{}' manquant.",
                    uuid_param_name(parts.uri.path())
                ))
            })?;

        let uuid = Uuid::parse_str(&raw).map_err(|_| {
            AppError::BadRequest(format!("Identifiant invalide : '{}'", raw))
        })?;

        Ok(ValidatedUuid(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new().route(
            "/entites/{id}",
            get(|ValidatedUuid(id): ValidatedUuid| async move { id.to_string() }),
        )
    }

    #[test]
    fn test_uuid_param_name() {
        let id = Uuid::new_v4();
        assert_eq!(uuid_param_name(&format!("/api/admin/entites/{}", id)), "entite_id");
        assert_eq!(
            uuid_param_name(&format!("/api/admin/users/{}/desactiver", id)),
            "user_id"
        );
        assert_eq!(uuid_param_name("/api/admin/unknown/abc"), "id");
    }

    #[tokio::test]
    async fn test_valid_uuid_is_extracted() {
        let id = Uuid::new_v4();
        let response = app()
            .oneshot(
                Request::builder()
                    .uri(format!("/entites/{}", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_uuid_is_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/entites/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
