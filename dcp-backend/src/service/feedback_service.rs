// src/service/feedback_service.rs

use crate::api::dto::workflow_dto::{FeedbackCreateRequest, FeedbackResponse};
use crate::domain::entite_workflow_model::Entity as WorkflowEntity;
use crate::domain::feedback_verification_model::{
    self, ActiveModel as FeedbackActiveModel, ElementsManquants,
};
use crate::domain::notification_type::TypeNotification;
use crate::domain::principal::PrincipalKind;
use crate::domain::workflow_status::StatutWorkflow;
use crate::error::{AppError, AppResult};
use crate::repository::entite_repository::EntiteRepository;
use crate::repository::feedback_repository::FeedbackRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::notification_service::{notify, NewNotification};
use crate::service::workflow_service::{apply_transition, Transition};
use crate::shared::types::PaginatedResponse;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

pub struct FeedbackService {
    db: Arc<DatabaseConnection>,
    feedback_repo: Arc<FeedbackRepository>,
    entite_repo: Arc<EntiteRepository>,
    user_repo: Arc<UserRepository>,
}

impl FeedbackService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        feedback_repo: Arc<FeedbackRepository>,
        entite_repo: Arc<EntiteRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            db,
            feedback_repo,
            entite_repo,
            user_repo,
        }
    }

    /// 検証結果を記録し、不足書類があれば補完待ちへ移す
    pub async fn add_feedback(
        &self,
        agent_id: Uuid,
        input: FeedbackCreateRequest,
    ) -> AppResult<FeedbackResponse> {
        input.validate()?;

        let entite = self
            .entite_repo
            .find_by_id(input.entite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;

        let elements_manquants: Vec<String> = input
            .elements_manquants
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let demande_complements = !elements_manquants.is_empty();

        let txn = self.db.begin().await?;

        let feedback = FeedbackActiveModel {
            entite_id: Set(entite.id),
            agent_id: Set(Some(agent_id)),
            commentaires: Set(input.commentaires),
            elements_manquants: Set(ElementsManquants(elements_manquants)),
            delai_fourniture: Set(input.delai_fourniture),
            ..FeedbackActiveModel::new()
        }
        .insert(&txn)
        .await?;

        let statut = WorkflowEntity::find_by_id(entite.id)
            .one(&txn)
            .await?
            .map(|w| w.statut_workflow());

        if demande_complements && statut == Some(StatutWorkflow::EnVerification) {
            // 状態遷移の通知は apply_transition 側で送られる
            apply_transition(
                &txn,
                Transition {
                    entite_id: entite.id,
                    nouveau: StatutWorkflow::EnAttenteComplements,
                    modifie_par: Some(agent_id),
                    commentaire: Some("Compléments demandés par l'agent".to_string()),
                },
            )
            .await?;
        }

        if let Some(compte_id) = entite.compte_entreprise_id {
            notify(
                &txn,
                NewNotification {
                    destinataire_type: PrincipalKind::Entreprise,
                    destinataire_id: compte_id,
                    type_notification: TypeNotification::Feedback,
                    titre: "Nouveau retour de vérification".to_string(),
                    message: if demande_complements {
                        "L'ARTCI demande des compléments pour votre dossier.".to_string()
                    } else {
                        "L'ARTCI a ajouté un commentaire à votre dossier.".to_string()
                    },
                    entite_id: Some(entite.id),
                },
            )
            .await?;
        }

        txn.commit().await?;

        info!(
            feedback_id = %feedback.id,
            entite_id = %entite.id,
            demande_complements,
            "Verification feedback added"
        );

        let agent = self.user_repo.find_by_id(agent_id).await?;
        Ok(FeedbackResponse::new(feedback, agent.as_ref()))
    }

    pub async fn list(
        &self,
        entite_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> AppResult<PaginatedResponse<FeedbackResponse>> {
        let (items, total) = self
            .feedback_repo
            .find_paginated(entite_id, page, per_page)
            .await?;
        let items = self.to_responses(items).await?;
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    pub async fn for_entite(&self, entite_id: Uuid) -> AppResult<Vec<FeedbackResponse>> {
        let items = self.feedback_repo.find_by_entite(entite_id).await?;
        self.to_responses(items).await
    }

    pub async fn count_for_entite(&self, entite_id: Uuid) -> AppResult<u64> {
        Ok(self.feedback_repo.count_by_entite(entite_id).await?)
    }

    async fn to_responses(
        &self,
        feedbacks: Vec<feedback_verification_model::Model>,
    ) -> AppResult<Vec<FeedbackResponse>> {
        let agent_ids = feedbacks.iter().filter_map(|f| f.agent_id).collect();
        let agents = self.user_repo.find_by_ids(agent_ids).await?;

        Ok(feedbacks
            .into_iter()
            .map(|f| {
                let agent = f.agent_id.and_then(|id| agents.get(&id));
                FeedbackResponse::new(f, agent)
            })
            .collect())
    }
}
