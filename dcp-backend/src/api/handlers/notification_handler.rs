// src/api/handlers/notification_handler.rs
use crate::api::dto::notification_dto::NotificationQuery;
use crate::api::AppState;
use crate::domain::notification_model;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::types::ApiResponse;
use axum::extract::{Query, State};

/// 自分宛ての通知（スタッフ・企業共通）
pub async fn list_notifications_handler(
    State(app_state): State<AppState>,
    principal: AuthenticatedPrincipal,
    Query(query): Query<NotificationQuery>,
) -> AppResult<ApiResponse<Vec<notification_model::Model>>> {
    let notifications = app_state
        .notification_service
        .list(principal.principal(), query.into())
        .await?;
    Ok(ApiResponse::success(notifications))
}

pub async fn mark_notification_read_handler(
    State(app_state): State<AppState>,
    principal: AuthenticatedPrincipal,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<notification_model::Model>> {
    let notification = app_state
        .notification_service
        .mark_read(id, principal.principal())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Notification marquée comme lue.",
        notification,
    ))
}
