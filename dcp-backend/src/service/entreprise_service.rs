// src/service/entreprise_service.rs

use crate::api::dto::demande_dto::{
    RapportResponse, RapprochementResponse, RenouvellementCreateRequest, RenouvellementResponse,
};
use crate::api::dto::entite_dto::{CreateEntiteRequest, EntiteDetailResponse, UpdateEntiteRequest};
use crate::api::dto::entreprise_dto::{
    DashboardResponse, RapprochementCreateRequest, UpdateProfilRequest,
};
use crate::api::dto::workflow_dto::FeedbackResponse;
use crate::domain::compte_entreprise_model::{self, SafeCompte};
use crate::domain::document_type::TypeDocument;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::domain::principal::PrincipalKind;
use crate::domain::workflow_status::StatutWorkflow;
use crate::error::{AppError, AppResult};
use crate::repository::compte_entreprise_repository::{CompteEntrepriseRepository, UpdateProfil};
use crate::repository::entite_repository::{EntiteAggregate, EntiteRepository};
use crate::repository::notification_repository::NotificationRepository;
use crate::repository::rapprochement_repository::RapprochementRepository;
use crate::repository::renouvellement_repository::RenouvellementRepository;
use crate::service::document_service::{DocumentOwner, DocumentService, UploadedFile};
use crate::service::entite_service::{EntiteOrigin, EntiteService};
use crate::service::feedback_service::FeedbackService;
use crate::service::workflow_service::{Transition, WorkflowService};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const AUCUNE_ENTITE: &str = "Aucune entité trouvée.";

/// 企業ポータルの操作（常に自アカウントのエンティティが対象）
pub struct EntrepriseService {
    entite_repo: Arc<EntiteRepository>,
    compte_repo: Arc<CompteEntrepriseRepository>,
    rapprochement_repo: Arc<RapprochementRepository>,
    renouvellement_repo: Arc<RenouvellementRepository>,
    notification_repo: Arc<NotificationRepository>,
    entite_service: Arc<EntiteService>,
    feedback_service: Arc<FeedbackService>,
    document_service: Arc<DocumentService>,
    workflow_service: Arc<WorkflowService>,
}

impl EntrepriseService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entite_repo: Arc<EntiteRepository>,
        compte_repo: Arc<CompteEntrepriseRepository>,
        rapprochement_repo: Arc<RapprochementRepository>,
        renouvellement_repo: Arc<RenouvellementRepository>,
        notification_repo: Arc<NotificationRepository>,
        entite_service: Arc<EntiteService>,
        feedback_service: Arc<FeedbackService>,
        document_service: Arc<DocumentService>,
        workflow_service: Arc<WorkflowService>,
    ) -> Self {
        Self {
            entite_repo,
            compte_repo,
            rapprochement_repo,
            renouvellement_repo,
            notification_repo,
            entite_service,
            feedback_service,
            document_service,
            workflow_service,
        }
    }

    pub async fn dashboard(&self, compte_id: Uuid) -> AppResult<DashboardResponse> {
        let notifications_non_lues = self
            .notification_repo
            .count_unread(PrincipalKind::Entreprise, compte_id)
            .await?;

        let Some(aggregate) = self.entite_repo.find_by_compte_with_details(compte_id).await?
        else {
            return Ok(DashboardResponse {
                entite_id: None,
                denomination: None,
                statut_workflow: None,
                statut_conformite: None,
                score_conformite: None,
                etape: 1,
                peut_soumettre: true,
                peut_rapporter: false,
                nombre_feedbacks: 0,
                notifications_non_lues,
            });
        };

        let statut = aggregate.statut_workflow();
        let nombre_feedbacks = self
            .feedback_service
            .count_for_entite(aggregate.entite.id)
            .await?;

        Ok(DashboardResponse {
            entite_id: Some(aggregate.entite.id),
            denomination: Some(aggregate.entite.denomination.clone()),
            statut_workflow: Some(statut.as_str().to_string()),
            statut_conformite: aggregate.statut_conformite().map(|s| s.as_str().to_string()),
            score_conformite: aggregate.conformite.as_ref().map(|c| c.score),
            etape: statut.etape(),
            peut_soumettre: statut == StatutWorkflow::Brouillon,
            peut_rapporter: aggregate.is_conforme(),
            nombre_feedbacks,
            notifications_non_lues,
        })
    }

    /// 自社エンティティの全内容（未作成なら None）
    pub async fn mon_dossier(&self, compte_id: Uuid) -> AppResult<Option<EntiteDetailResponse>> {
        match self.entite_repo.find_by_compte_with_details(compte_id).await? {
            Some(aggregate) => Ok(Some(self.entite_service.detail(aggregate).await?)),
            None => Ok(None),
        }
    }

    /// 申告の新規作成（1アカウント1エンティティ）
    pub async fn create_demande(
        &self,
        compte_id: Uuid,
        input: CreateEntiteRequest,
    ) -> AppResult<EntiteDetailResponse> {
        if self.entite_repo.find_by_compte(compte_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Vous avez déjà une demande en cours.".to_string(),
            ));
        }

        let aggregate = self
            .entite_service
            .create(
                input,
                EntiteOrigin {
                    origine: OrigineSaisie::AutoRecensement,
                    created_by: None,
                    compte_entreprise_id: Some(compte_id),
                },
            )
            .await?;

        info!(compte_id = %compte_id, entite_id = %aggregate.entite.id, "Demande created by entreprise");
        self.entite_service.detail(aggregate).await
    }

    pub async fn update_demande(
        &self,
        compte_id: Uuid,
        entite_id: Uuid,
        input: UpdateEntiteRequest,
    ) -> AppResult<EntiteDetailResponse> {
        let aggregate = self.owned_entite(compte_id, entite_id).await?;
        if !aggregate.statut_workflow().is_editable_by_entreprise() {
            return Err(AppError::BadRequest(
                "Seules les demandes en brouillon ou en attente de compléments peuvent être modifiées."
                    .to_string(),
            ));
        }

        let aggregate = self.entite_service.update(entite_id, input).await?;
        self.entite_service.detail(aggregate).await
    }

    pub async fn soumettre(&self, compte_id: Uuid, entite_id: Uuid) -> AppResult<EntiteDetailResponse> {
        self.owned_entite(compte_id, entite_id).await?;

        self.workflow_service
            .transition(Transition {
                entite_id,
                nouveau: StatutWorkflow::Soumis,
                modifie_par: None,
                commentaire: Some("Demande soumise par l'entreprise".to_string()),
            })
            .await?;

        self.entite_service.get(entite_id).await
    }

    pub async fn feedbacks(&self, compte_id: Uuid) -> AppResult<Vec<FeedbackResponse>> {
        match self.entite_repo.find_by_compte(compte_id).await? {
            Some(entite) => self.feedback_service.for_entite(entite.id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn profil(&self, compte_id: Uuid) -> AppResult<SafeCompte> {
        Ok(self.find_compte(compte_id).await?.into())
    }

    pub async fn update_profil(
        &self,
        compte_id: Uuid,
        input: UpdateProfilRequest,
    ) -> AppResult<SafeCompte> {
        input.validate()?;

        let compte = self.find_compte(compte_id).await?;
        let updated = self
            .compte_repo
            .update_profil(
                compte,
                UpdateProfil {
                    denomination: input.denomination.map(|d| d.trim().to_string()),
                    telephone: input.telephone,
                    adresse: input.adresse,
                    ville: input.ville,
                    region: input.region,
                },
            )
            .await?;

        info!(compte_id = %compte_id, "Entreprise profile updated");
        Ok(updated.into())
    }

    /// 活動報告書の提出（適合エンティティのみ）
    pub async fn soumettre_rapport(
        &self,
        compte_id: Uuid,
        file: UploadedFile,
    ) -> AppResult<RapportResponse> {
        let aggregate = self.conforme_entite(
            compte_id,
            "Les rapports sont disponibles uniquement pour les entités conformes.",
        )
        .await?;

        let document = self
            .document_service
            .store(
                file,
                TypeDocument::RapportActivite,
                DocumentOwner {
                    entite_id: Some(aggregate.entite.id),
                    compte_entreprise_id: Some(compte_id),
                },
            )
            .await?;

        info!(entite_id = %aggregate.entite.id, document_id = %document.id, "Rapport submitted");
        Ok(RapportResponse::new(
            document,
            Some(aggregate.entite.denomination),
        ))
    }

    pub async fn demander_renouvellement(
        &self,
        compte_id: Uuid,
        input: RenouvellementCreateRequest,
    ) -> AppResult<RenouvellementResponse> {
        input.validate()?;

        let aggregate = self
            .conforme_entite(
                compte_id,
                "Le renouvellement est disponible uniquement pour les entités conformes.",
            )
            .await?;
        let entite_id = aggregate.entite.id;

        if self.renouvellement_repo.has_open_request(entite_id).await? {
            return Err(AppError::Conflict(
                "Une demande de renouvellement est déjà en cours.".to_string(),
            ));
        }

        let demande = self
            .renouvellement_repo
            .create(entite_id, input.date_expiration, input.motif)
            .await?;

        info!(entite_id = %entite_id, renouvellement_id = %demande.id, "Renouvellement requested");
        Ok(RenouvellementResponse::new(
            demande,
            Some(aggregate.entite.denomination),
        ))
    }

    pub async fn rapprochements(&self, compte_id: Uuid) -> AppResult<Vec<RapprochementResponse>> {
        let compte = self.find_compte(compte_id).await?;
        let demandes = self.rapprochement_repo.find_by_compte(compte_id).await?;
        Ok(demandes
            .into_iter()
            .map(|d| RapprochementResponse::new(d, Some(compte.denomination.clone())))
            .collect())
    }

    /// 既存エンティティへの紐付け申請。証明書類は任意
    pub async fn create_rapprochement(
        &self,
        compte_id: Uuid,
        input: RapprochementCreateRequest,
        preuve: Option<UploadedFile>,
    ) -> AppResult<RapprochementResponse> {
        let numero_cc = input.numero_cc.trim().to_string();
        let raison = input.raison.trim().to_string();
        if numero_cc.is_empty() || raison.is_empty() {
            return Err(AppError::BadRequest(
                "Le N° CC et la raison sont requis.".to_string(),
            ));
        }
        RapprochementCreateRequest {
            numero_cc: numero_cc.clone(),
            raison: raison.clone(),
        }
        .validate()?;

        let compte = self.find_compte(compte_id).await?;
        let entite = self
            .entite_repo
            .find_by_numero_cc(&numero_cc)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Aucune entité trouvée avec le N° CC {}.", numero_cc))
            })?;

        if entite.compte_entreprise_id == Some(compte_id) {
            return Err(AppError::BadRequest(
                "Votre compte est déjà rattaché à cette entité.".to_string(),
            ));
        }
        if self.rapprochement_repo.has_pending(compte_id, entite.id).await? {
            return Err(AppError::Conflict(
                "Une demande de rapprochement est déjà en attente pour cette entité.".to_string(),
            ));
        }

        let document_preuve_id = match preuve.filter(|f| !f.filename.is_empty()) {
            Some(file) => Some(
                self.document_service
                    .store(
                        file,
                        TypeDocument::Autre,
                        DocumentOwner {
                            entite_id: None,
                            compte_entreprise_id: Some(compte_id),
                        },
                    )
                    .await?
                    .id,
            ),
            None => None,
        };

        let demande = self
            .rapprochement_repo
            .create(compte_id, entite.id, numero_cc, raison, document_preuve_id)
            .await?;

        info!(
            compte_id = %compte_id,
            entite_id = %entite.id,
            rapprochement_id = %demande.id,
            "Rapprochement requested"
        );
        Ok(RapprochementResponse::new(demande, Some(compte.denomination)))
    }

    async fn find_compte(&self, compte_id: Uuid) -> AppResult<compte_entreprise_model::Model> {
        self.compte_repo
            .find_by_id(compte_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Compte non trouvé.".to_string()))
    }

    /// 所有者確認付きでエンティティを取得
    async fn owned_entite(&self, compte_id: Uuid, entite_id: Uuid) -> AppResult<EntiteAggregate> {
        let aggregate = self
            .entite_repo
            .find_with_details(entite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Demande non trouvée.".to_string()))?;
        if aggregate.entite.compte_entreprise_id != Some(compte_id) {
            return Err(AppError::Forbidden(
                "Cette demande ne vous appartient pas.".to_string(),
            ));
        }
        Ok(aggregate)
    }

    async fn conforme_entite(&self, compte_id: Uuid, message: &str) -> AppResult<EntiteAggregate> {
        let aggregate = self
            .entite_repo
            .find_by_compte_with_details(compte_id)
            .await?
            .ok_or_else(|| AppError::NotFound(AUCUNE_ENTITE.to_string()))?;
        if !aggregate.is_conforme() {
            return Err(AppError::BadRequest(message.to_string()));
        }
        Ok(aggregate)
    }
}
