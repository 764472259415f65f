// src/api/handlers/entreprise_handler.rs
use crate::api::dto::demande_dto::{
    RapportResponse, RapprochementResponse, RenouvellementCreateRequest, RenouvellementResponse,
};
use crate::api::dto::entite_dto::{CreateEntiteRequest, EntiteDetailResponse, UpdateEntiteRequest};
use crate::api::dto::entreprise_dto::{
    DashboardResponse, RapprochementCreateRequest, UpdateProfilRequest,
};
use crate::api::dto::workflow_dto::FeedbackResponse;
use crate::api::handlers::notification_handler::{
    list_notifications_handler, mark_notification_read_handler,
};
use crate::api::AppState;
use crate::domain::compte_entreprise_model::SafeCompte;
use crate::error::{AppError, AppResult};
use crate::extractors::{MultipartForm, ValidatedUuid};
use crate::middleware::auth::{
    entreprise_guard_middleware, jwt_auth_middleware, AuthenticatedEntreprise,
};
use crate::types::ApiResponse;
use axum::{
    extract::{Json, Multipart, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

// --- ダッシュボード・申告 ---

pub async fn dashboard_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
) -> AppResult<ApiResponse<DashboardResponse>> {
    let dashboard = app_state
        .entreprise_service
        .dashboard(entreprise.compte_id())
        .await?;
    Ok(ApiResponse::success(dashboard))
}

/// 自社の申告（未作成なら data = null）
pub async fn mon_dossier_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
) -> AppResult<ApiResponse<Option<EntiteDetailResponse>>> {
    let dossier = app_state
        .entreprise_service
        .mon_dossier(entreprise.compte_id())
        .await?;
    Ok(ApiResponse::success(dossier))
}

pub async fn create_demande_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    Json(payload): Json<CreateEntiteRequest>,
) -> AppResult<impl IntoResponse> {
    let entite = app_state
        .entreprise_service
        .create_demande(entreprise.compte_id(), payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Demande créée.", entite),
    ))
}

pub async fn update_demande_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    ValidatedUuid(entite_id): ValidatedUuid,
    Json(payload): Json<UpdateEntiteRequest>,
) -> AppResult<ApiResponse<EntiteDetailResponse>> {
    let entite = app_state
        .entreprise_service
        .update_demande(entreprise.compte_id(), entite_id, payload)
        .await?;
    Ok(ApiResponse::success_with_message("Demande mise à jour.", entite))
}

pub async fn soumettre_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    ValidatedUuid(entite_id): ValidatedUuid,
) -> AppResult<ApiResponse<EntiteDetailResponse>> {
    let entite = app_state
        .entreprise_service
        .soumettre(entreprise.compte_id(), entite_id)
        .await?;
    Ok(ApiResponse::success_with_message("Demande soumise.", entite))
}

pub async fn feedbacks_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
) -> AppResult<ApiResponse<Vec<FeedbackResponse>>> {
    let feedbacks = app_state
        .entreprise_service
        .feedbacks(entreprise.compte_id())
        .await?;
    Ok(ApiResponse::success(feedbacks))
}

// --- プロフィール ---

pub async fn get_profil_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
) -> AppResult<ApiResponse<SafeCompte>> {
    let profil = app_state
        .entreprise_service
        .profil(entreprise.compte_id())
        .await?;
    Ok(ApiResponse::success(profil))
}

pub async fn update_profil_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    Json(payload): Json<UpdateProfilRequest>,
) -> AppResult<ApiResponse<SafeCompte>> {
    let profil = app_state
        .entreprise_service
        .update_profil(entreprise.compte_id(), payload)
        .await?;
    Ok(ApiResponse::success_with_message("Profil mis à jour.", profil))
}

// --- 適合後の手続き ---

/// 活動報告のアップロード（フィールド名 file）
pub async fn soumettre_rapport_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = MultipartForm::read(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("Aucun fichier fourni.".to_string()))?;

    let rapport: RapportResponse = app_state
        .entreprise_service
        .soumettre_rapport(entreprise.compte_id(), file)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Rapport soumis avec succès.", rapport),
    ))
}

pub async fn renouvellement_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    Json(payload): Json<RenouvellementCreateRequest>,
) -> AppResult<impl IntoResponse> {
    let renouvellement: RenouvellementResponse = app_state
        .entreprise_service
        .demander_renouvellement(entreprise.compte_id(), payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Demande de renouvellement créée.", renouvellement),
    ))
}

// --- 紐付け申請 ---

pub async fn list_rapprochements_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
) -> AppResult<ApiResponse<Vec<RapprochementResponse>>> {
    let demandes = app_state
        .entreprise_service
        .rapprochements(entreprise.compte_id())
        .await?;
    Ok(ApiResponse::success(demandes))
}

/// multipart: numero_cc, raison, justificatif（任意）
pub async fn create_rapprochement_handler(
    State(app_state): State<AppState>,
    entreprise: AuthenticatedEntreprise,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = MultipartForm::read(multipart).await?;
    let input = RapprochementCreateRequest {
        numero_cc: form.text("numero_cc"),
        raison: form.text("raison"),
    };
    let justificatif = form.take_file("justificatif");

    let demande = app_state
        .entreprise_service
        .create_rapprochement(entreprise.compte_id(), input, justificatif)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Demande de rapprochement créée.", demande),
    ))
}

// --- ルーター ---

/// 企業ポータル（/api/entreprise 配下、JWT + 企業ガード）
pub fn entreprise_router(app_state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/mon-dossier", get(mon_dossier_handler))
        .route("/demande", post(create_demande_handler))
        .route("/demande/{id}", put(update_demande_handler))
        .route("/demande/{id}/soumettre", post(soumettre_handler))
        .route("/feedbacks", get(feedbacks_handler))
        .route("/profil", get(get_profil_handler).put(update_profil_handler))
        .route("/rapports", post(soumettre_rapport_handler))
        .route("/renouvellement", post(renouvellement_handler))
        .route("/rapprochements", get(list_rapprochements_handler))
        .route("/rapprochement", post(create_rapprochement_handler))
        .route("/notifications", get(list_notifications_handler))
        .route(
            "/notifications/{id}/read",
            put(mark_notification_read_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            entreprise_guard_middleware,
        ))
        .route_layer(from_fn_with_state(app_state.clone(), jwt_auth_middleware))
        .with_state(app_state)
}
