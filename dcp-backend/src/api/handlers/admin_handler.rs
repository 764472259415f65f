// src/api/handlers/admin_handler.rs
use crate::api::dto::demande_dto::{
    DemandeListQuery, RapportResponse, RapprochementResponse, RenouvellementResponse,
    TraiterRapportRequest, TraiterRapprochementRequest, TraiterRenouvellementRequest,
};
use crate::api::dto::entite_dto::{
    CreateEntiteRequest, EntiteDetailResponse, EntiteListQuery, EntiteSummaryResponse,
    TransitionRequest, UpdateEntiteRequest,
};
use crate::api::dto::public_dto::ImportResult;
use crate::api::dto::stats_dto::{AdminStatsResponse, StatsQuery};
use crate::api::dto::workflow_dto::{
    AssignationCreateRequest, AssignationResponse, FeedbackCreateRequest, FeedbackListQuery,
    FeedbackResponse, HistoriqueQuery, ValidationN1Request,
};
use crate::api::handlers::notification_handler::{
    list_notifications_handler, mark_notification_read_handler,
};
use crate::api::handlers::user_handler::user_routes;
use crate::api::AppState;
use crate::domain::historique_statut_model;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::domain::user_role::UserRole;
use crate::error::{AppError, AppResult};
use crate::extractors::{MultipartForm, ValidatedUuid};
use crate::middleware::auth::{jwt_auth_middleware, staff_guard_middleware, AuthenticatedStaff};
use crate::repository::entite_repository::EntiteOrder;
use crate::repository::historique_repository::HistoriqueFilters;
use crate::service::entite_service::EntiteOrigin;
use crate::service::workflow_service::Transition;
use crate::shared::types::PaginatedResponse;
use crate::types::{ApiResponse, PaginationQuery};
use axum::{
    extract::{Json, Multipart, Query, State},
    http::{header, StatusCode},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};
use tracing::info;
use validator::Validate;

// --- ダッシュボード ---

/// /dashboard と /stats は同じ集計を返す
pub async fn stats_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<StatsQuery>,
) -> AppResult<ApiResponse<AdminStatsResponse>> {
    staff.require(UserRole::any_staff())?;
    let stats = app_state.stats_service.admin_stats(&query).await?;
    Ok(ApiResponse::success(stats))
}

// --- エンティティ ---

pub async fn list_entites_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<EntiteListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<EntiteSummaryResponse>>> {
    staff.require(UserRole::any_staff())?;
    let (page, per_page) = query.pagination.get_pagination();
    let result = app_state
        .entite_service
        .list(&query.to_filters(), EntiteOrder::CreatedDesc, page, per_page)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn get_entite_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<EntiteDetailResponse>> {
    staff.require(UserRole::any_staff())?;
    let entite = app_state.entite_service.get(id).await?;
    Ok(ApiResponse::success(entite))
}

/// ARTCI による直接登録（brouillon_artci から始まる）
pub async fn create_entite_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(payload): Json<CreateEntiteRequest>,
) -> AppResult<impl IntoResponse> {
    staff.require(UserRole::editor_or_above())?;
    let origin = EntiteOrigin {
        origine: OrigineSaisie::SaisieArtci,
        created_by: Some(staff.user_id()),
        compte_entreprise_id: None,
    };
    let aggregate = app_state.entite_service.create(payload, origin).await?;
    let entite = app_state.entite_service.detail(aggregate).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Entité créée.", entite),
    ))
}

pub async fn update_entite_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<UpdateEntiteRequest>,
) -> AppResult<ApiResponse<EntiteDetailResponse>> {
    staff.require(UserRole::editor_or_above())?;
    let aggregate = app_state.entite_service.update(id, payload).await?;
    let entite = app_state.entite_service.detail(aggregate).await?;
    Ok(ApiResponse::success_with_message("Entité mise à jour.", entite))
}

/// 手動の状態遷移
pub async fn transition_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<TransitionRequest>,
) -> AppResult<ApiResponse<EntiteDetailResponse>> {
    staff.require(UserRole::admin_or_above())?;
    payload.validate()?;

    app_state
        .workflow_service
        .transition(Transition {
            entite_id: id,
            nouveau: payload.statut,
            modifie_par: Some(staff.user_id()),
            commentaire: payload.commentaire,
        })
        .await?;

    let entite = app_state.entite_service.get(id).await?;
    Ok(ApiResponse::success_with_message("Statut mis à jour.", entite))
}

pub async fn historique_entite_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<Vec<historique_statut_model::Model>>> {
    staff.require(UserRole::any_staff())?;
    app_state.entite_service.get_aggregate(id).await?;
    let historique = app_state.workflow_service.historique_entite(id).await?;
    Ok(ApiResponse::success(historique))
}

// --- 割り当て・N+1 検証 ---

pub async fn panier_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
) -> AppResult<ApiResponse<Vec<AssignationResponse>>> {
    staff.require(UserRole::editor_or_above())?;
    let panier = app_state.assignation_service.panier(staff.user_id()).await?;
    Ok(ApiResponse::success(panier))
}

pub async fn assign_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(payload): Json<AssignationCreateRequest>,
) -> AppResult<impl IntoResponse> {
    staff.require(UserRole::admin_or_above())?;
    let assignation = app_state
        .assignation_service
        .assign(payload, staff.user_id())
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Demande assignée.", assignation),
    ))
}

pub async fn traiter_assignation_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<ApiResponse<AssignationResponse>> {
    staff.require(UserRole::editor_or_above())?;
    let assignation = app_state
        .assignation_service
        .traiter(id, staff.user_id())
        .await?;
    Ok(ApiResponse::success_with_message(
        "Demande traitée, en attente de validation.",
        assignation,
    ))
}

pub async fn pending_validations_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(pagination): Query<PaginationQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<AssignationResponse>>> {
    staff.require(UserRole::admin_or_above())?;
    let (page, per_page) = pagination.get_pagination();
    let result = app_state
        .assignation_service
        .pending_validations(page, per_page)
        .await?;
    Ok(ApiResponse::success(result))
}

pub async fn valider_n1_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<ValidationN1Request>,
) -> AppResult<ApiResponse<AssignationResponse>> {
    staff.require(UserRole::admin_or_above())?;
    let assignation = app_state
        .assignation_service
        .valider_n1(id, staff.user_id(), payload)
        .await?;
    Ok(ApiResponse::success_with_message(
        "Validation enregistrée.",
        assignation,
    ))
}

// --- フィードバック ---

pub async fn create_feedback_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Json(payload): Json<FeedbackCreateRequest>,
) -> AppResult<impl IntoResponse> {
    staff.require(UserRole::editor_or_above())?;
    let feedback = app_state
        .feedback_service
        .add_feedback(staff.user_id(), payload)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Feedback enregistré.", feedback),
    ))
}

pub async fn list_feedbacks_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<FeedbackListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<FeedbackResponse>>> {
    staff.require(UserRole::any_staff())?;
    let (page, per_page) = query.pagination.get_pagination();
    let result = app_state
        .feedback_service
        .list(query.entite_id, page, per_page)
        .await?;
    Ok(ApiResponse::success(result))
}

// --- インポート・ログ ---

/// CSV 一括登録（フィールド名 file）
pub async fn import_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    multipart: Multipart,
) -> AppResult<ApiResponse<ImportResult>> {
    staff.require(UserRole::admin_or_above())?;
    let mut form = MultipartForm::read(multipart).await?;
    let file = form
        .take_file("file")
        .ok_or_else(|| AppError::BadRequest("Aucun fichier fourni.".to_string()))?;

    let result = app_state
        .import_service
        .import_csv(file, staff.user_id())
        .await?;
    let message = format!("{} entité(s) importée(s).", result.imported);
    Ok(ApiResponse::success_with_message(message, result))
}

pub async fn logs_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<HistoriqueQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<historique_statut_model::Model>>> {
    staff.require(UserRole::admin_or_above())?;
    let (page, per_page) = query.pagination.get_pagination();
    let filters = HistoriqueFilters {
        entite_id: query.entite_id,
        modifie_par: query.modifie_par,
    };
    let result = app_state
        .workflow_service
        .historique(filters, page, per_page)
        .await?;
    Ok(ApiResponse::success(result))
}

/// 添付書類のダウンロード
pub async fn download_document_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
) -> AppResult<impl IntoResponse> {
    staff.require(UserRole::any_staff())?;
    let document = app_state.document_service.find(id).await?;
    let data = app_state.document_service.download(&document).await?;

    info!(document_id = %id, user_id = %staff.user_id(), "Document downloaded");

    let disposition = format!("attachment; filename=\"{}\"", document.nom_fichier);
    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type.clone()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

// --- 各種申請 ---

pub async fn list_rapprochements_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<DemandeListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<RapprochementResponse>>> {
    staff.require(UserRole::any_staff())?;
    let result = app_state.demande_service.list_rapprochements(&query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn traiter_rapprochement_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<TraiterRapprochementRequest>,
) -> AppResult<ApiResponse<RapprochementResponse>> {
    staff.require(UserRole::admin_or_above())?;
    let demande = app_state
        .demande_service
        .traiter_rapprochement(id, staff.user_id(), payload)
        .await?;
    Ok(ApiResponse::success_with_message(
        "Demande de rapprochement traitée.",
        demande,
    ))
}

pub async fn list_renouvellements_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<DemandeListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<RenouvellementResponse>>> {
    staff.require(UserRole::any_staff())?;
    let result = app_state.demande_service.list_renouvellements(&query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn traiter_renouvellement_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<TraiterRenouvellementRequest>,
) -> AppResult<ApiResponse<RenouvellementResponse>> {
    staff.require(UserRole::admin_or_above())?;
    let demande = app_state
        .demande_service
        .traiter_renouvellement(id, staff.user_id(), payload)
        .await?;
    Ok(ApiResponse::success_with_message(
        "Demande de renouvellement traitée.",
        demande,
    ))
}

pub async fn list_rapports_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    Query(query): Query<DemandeListQuery>,
) -> AppResult<ApiResponse<PaginatedResponse<RapportResponse>>> {
    staff.require(UserRole::any_staff())?;
    let result = app_state.demande_service.list_rapports(&query).await?;
    Ok(ApiResponse::success(result))
}

pub async fn traiter_rapport_handler(
    State(app_state): State<AppState>,
    staff: AuthenticatedStaff,
    ValidatedUuid(id): ValidatedUuid,
    Json(payload): Json<TraiterRapportRequest>,
) -> AppResult<ApiResponse<RapportResponse>> {
    staff.require(UserRole::admin_or_above())?;
    let rapport = app_state
        .demande_service
        .traiter_rapport(id, staff.user_id(), payload)
        .await?;
    Ok(ApiResponse::success_with_message("Rapport traité.", rapport))
}

// --- ルーター ---

/// 管理画面（/api/admin 配下、JWT + スタッフガード。ロールは各ハンドラーで確認）
pub fn admin_router(app_state: AppState) -> Router {
    Router::new()
        .route("/dashboard", get(stats_handler))
        .route("/stats", get(stats_handler))
        // エンティティ
        .route("/entites", get(list_entites_handler).post(create_entite_handler))
        .route(
            "/entites/{id}",
            get(get_entite_handler).put(update_entite_handler),
        )
        .route("/entites/{id}/statut", put(transition_handler))
        .route("/entites/{id}/historique", get(historique_entite_handler))
        // 割り当て・検証
        .route("/panier", get(panier_handler))
        .route("/assignation", post(assign_handler))
        .route("/assignation/{id}", put(traiter_assignation_handler))
        .route("/validation-n1", get(pending_validations_handler))
        .route("/validation-n1/{id}", put(valider_n1_handler))
        .route(
            "/feedbacks",
            get(list_feedbacks_handler).post(create_feedback_handler),
        )
        // 管理
        .route("/import", post(import_handler))
        .route("/logs", get(logs_handler))
        .route("/documents/{id}", get(download_document_handler))
        // 申請
        .route("/rapprochements", get(list_rapprochements_handler))
        .route("/rapprochements/{id}", put(traiter_rapprochement_handler))
        .route("/renouvellements", get(list_renouvellements_handler))
        .route("/renouvellements/{id}", put(traiter_renouvellement_handler))
        .route("/rapports", get(list_rapports_handler))
        .route("/rapports/{id}", put(traiter_rapport_handler))
        // 通知
        .route("/notifications", get(list_notifications_handler))
        .route(
            "/notifications/{id}/read",
            put(mark_notification_read_handler),
        )
        .merge(user_routes())
        .route_layer(from_fn_with_state(app_state.clone(), staff_guard_middleware))
        .route_layer(from_fn_with_state(app_state.clone(), jwt_auth_middleware))
        .with_state(app_state)
}
