// src/api/handlers/user_handler.rs
use crate::api::dto::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::api::AppState;
use crate::domain::user_model::SafeUser;
use crate::domain::user_role::UserRole;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::middleware::auth::AuthenticatedStaff;
use crate::shared::types::PaginatedResponse;
use crate::types::{ApiResponse, PaginationQuery};
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;

pub async fn list_users_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<SafeUser>>> {
    staff.require(UserRole::admin_or_above())?;
    let (page, per_page) = pagination.get_pagination();
    let users = app_state.user_service.list(page, per_page).await?;
    Ok(ApiResponse::success(users))
}

pub async fn get_user_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<SafeUser>> {
    staff.require(UserRole::admin_or_above())?;
    let user = app_state.user_service.get(id).await?;
    Ok(ApiResponse::success(user))
}

pub async fn create_user_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<impl IntoResponse> {
    staff.require(UserRole::admin_or_above())?;
    let user = app_state.user_service.create(payload).await?;
    info!(user_id = %user.id, created_by = %staff.user_id(), "Staff user created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Utilisateur créé.", user),
    ))
}

pub async fn update_user_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<ApiResponse<SafeUser>> {
    staff.require(UserRole::admin_or_above())?;
    let user = app_state.user_service.update(id, payload).await?;
    Ok(ApiResponse::success_with_message("Utilisateur mis à jour.", user))
}

/// 物理削除はせず無効化する
pub async fn delete_user_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<SafeUser>> {
    staff.require(UserRole::admin_or_above())?;
    let user = app_state
        .user_service
        .deactivate(id, staff.user_id())
        .await?;
    Ok(ApiResponse::success_with_message("Utilisateur désactivé.", user))
}

// --- ルーター ---

/// 管理ルーターに合流させるユーザー管理ルート
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/users/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
}
