// src/api/handlers/public_handler.rs
use crate::api::dto::entite_dto::{EntiteSummaryResponse, PublicEntiteDetailResponse};
use crate::api::dto::public_dto::{ExportQuery, PublicListQuery};
use crate::api::dto::stats_dto::PublicStatsResponse;
use crate::api::AppState;
use crate::error::AppResult;
use crate::extractors::ValidatedUuid;
use crate::shared::types::PaginatedResponse;
use crate::types::ApiResponse;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};

/// 公開レジストリ（地図・一覧）
pub async fn list_entites_handler(
    State(app_state): State<AppState>,
    Query(query): Query<PublicListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<EntiteSummaryResponse>>> {
    let result = app_state.public_service.list(&query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn get_entite_handler(
    State(app_state): State<AppState>,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<PublicEntiteDetailResponse>> {
    let entite = app_state.public_service.detail(id).await?;
    Ok(ApiResponse::success(entite))
}

pub async fn stats_handler(
    State(app_state): State<AppState>,
) -> AppResult<ApiResponse<PublicStatsResponse>> {
    let stats = app_state.stats_service.public_stats().await?;
    Ok(ApiResponse::success(stats))
}

/// CSV 書き出し（添付ファイルとして返す）
pub async fn export_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<impl IntoResponse> {
    let file = app_state.public_service.export(&query).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.content,
    ))
}

/// 公開ルーター（/api/public 配下、認証なし）
pub fn public_router(app_state: AppState) -> Router {
    Router::new()
        .route("/entites", get(list_entites_handler))
        .route("/entites/{id}", get(get_entite_handler))
        .route("/stats", get(stats_handler))
        .route("/export", get(export_handler))
        .with_state(app_state)
}
