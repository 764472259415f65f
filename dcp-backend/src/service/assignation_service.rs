// src/service/assignation_service.rs

use crate::api::dto::workflow_dto::{
    AssignationCreateRequest, AssignationResponse, ValidationN1Request,
};
use crate::domain::assignation_model::{self, ActiveModel as AssignationActiveModel};
use crate::domain::demande_status::{DecisionValidation, StatutAssignation};
use crate::domain::entite_workflow_model::{self, Entity as WorkflowEntity};
use crate::domain::notification_type::TypeNotification;
use crate::domain::principal::PrincipalKind;
use crate::domain::workflow_status::StatutWorkflow;
use crate::error::{AppError, AppResult};
use crate::repository::assignation_repository::AssignationRepository;
use crate::repository::entite_repository::EntiteRepository;
use crate::repository::user_repository::UserRepository;
use crate::service::notification_service::{notify, NewNotification};
use crate::service::workflow_service::{apply_transition, Transition};
use crate::shared::types::PaginatedResponse;
use chrono::Utc;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, EntityTrait, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct AssignationService {
    db: Arc<DatabaseConnection>,
    assignation_repo: Arc<AssignationRepository>,
    entite_repo: Arc<EntiteRepository>,
    user_repo: Arc<UserRepository>,
}

impl AssignationService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        assignation_repo: Arc<AssignationRepository>,
        entite_repo: Arc<EntiteRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            db,
            assignation_repo,
            entite_repo,
            user_repo,
        }
    }

    /// 提出済みの申告を担当者に割り当て、検証中へ進める
    pub async fn assign(
        &self,
        input: AssignationCreateRequest,
        assigne_par: Uuid,
    ) -> AppResult<AssignationResponse> {
        let entite = self
            .entite_repo
            .find_by_id(input.entite_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;

        let statut = self
            .entite_repo
            .find_workflow(entite.id)
            .await?
            .map(|w| w.statut_workflow());
        if statut != Some(StatutWorkflow::Soumis) {
            return Err(AppError::BadRequest(
                "Seules les demandes soumises peuvent être assignées.".to_string(),
            ));
        }

        let agent = self
            .user_repo
            .find_by_id(input.agent_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Agent non trouvé.".to_string()))?;
        if !agent.is_active {
            return Err(AppError::BadRequest("Cet agent est désactivé.".to_string()));
        }

        let txn = self.db.begin().await?;

        let assignation = AssignationActiveModel {
            entite_id: Set(entite.id),
            agent_id: Set(agent.id),
            assigne_par: Set(Some(assigne_par)),
            echeance: Set(input.echeance),
            ..AssignationActiveModel::new()
        }
        .insert(&txn)
        .await?;

        let workflow = apply_transition(
            &txn,
            Transition {
                entite_id: entite.id,
                nouveau: StatutWorkflow::EnVerification,
                modifie_par: Some(assigne_par),
                commentaire: Some(format!("Demande assignée à l'agent {}", agent.full_name())),
            },
        )
        .await?;

        let mut workflow: entite_workflow_model::ActiveModel = workflow.into();
        workflow.assigned_to = Set(Some(agent.id));
        workflow.update(&txn).await?;

        notify(
            &txn,
            NewNotification {
                destinataire_type: PrincipalKind::Artci,
                destinataire_id: agent.id,
                type_notification: TypeNotification::Assignation,
                titre: "Nouvelle demande assignée".to_string(),
                message: format!(
                    "La demande « {} » vous a été assignée. Échéance : {}.",
                    entite.denomination,
                    input.echeance.format("%d/%m/%Y")
                ),
                entite_id: Some(entite.id),
            },
        )
        .await?;

        txn.commit().await?;

        info!(
            assignation_id = %assignation.id,
            entite_id = %entite.id,
            agent_id = %agent.id,
            "Entite assigned to agent"
        );

        Ok(AssignationResponse::new(assignation, Some(&entite), Some(&agent)))
    }

    /// 担当者の panier（期限順）。一覧前に期限切れを反映する
    pub async fn panier(&self, agent_id: Uuid) -> AppResult<Vec<AssignationResponse>> {
        self.mark_overdue().await?;

        let assignations = self.assignation_repo.find_by_agent(agent_id).await?;
        self.to_responses(assignations).await
    }

    /// 担当者による処理完了の報告
    pub async fn traiter(&self, id: Uuid, agent_id: Uuid) -> AppResult<AssignationResponse> {
        let assignation = self.find(id).await?;

        if assignation.agent_id != agent_id {
            return Err(AppError::Forbidden(
                "Cette assignation n'est pas la vôtre.".to_string(),
            ));
        }
        if !assignation.statut_assignation().is_treatable() {
            return Err(AppError::BadRequest(
                "Cette assignation ne peut plus être traitée.".to_string(),
            ));
        }

        let mut active: assignation_model::ActiveModel = assignation.into();
        active.statut = Set(StatutAssignation::TraiteAttenteValidation.as_str().to_string());
        active.traite_le = Set(Some(Utc::now()));
        let updated = active.update(self.db.as_ref()).await?;

        info!(assignation_id = %id, agent_id = %agent_id, "Assignation treated, awaiting validation");
        self.to_response(updated).await
    }

    pub async fn pending_validations(
        &self,
        page: u64,
        per_page: u64,
    ) -> AppResult<PaginatedResponse<AssignationResponse>> {
        let (items, total) = self
            .assignation_repo
            .find_by_statut_paginated(StatutAssignation::TraiteAttenteValidation, page, per_page)
            .await?;
        let items = self.to_responses(items).await?;
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    /// N+1 検証：承認で適合へ、差し戻しで担当者へ戻す
    pub async fn valider_n1(
        &self,
        id: Uuid,
        validateur: Uuid,
        input: ValidationN1Request,
    ) -> AppResult<AssignationResponse> {
        let assignation = self.find(id).await?;

        if assignation.statut_assignation() != StatutAssignation::TraiteAttenteValidation {
            return Err(AppError::BadRequest(
                "Cette demande n'est pas en attente de validation.".to_string(),
            ));
        }

        let entite_id = assignation.entite_id;
        let agent_id = assignation.agent_id;
        let txn = self.db.begin().await?;

        let mut active: assignation_model::ActiveModel = assignation.into();
        active.commentaire_validation = Set(input.commentaire.clone());

        let updated = match input.action {
            DecisionValidation::Valider => {
                active.statut = Set(StatutAssignation::Valide.as_str().to_string());
                active.valide_par = Set(Some(validateur));
                active.valide_le = Set(Some(Utc::now()));
                let updated = active.update(&txn).await?;

                let statut = WorkflowEntity::find_by_id(entite_id)
                    .one(&txn)
                    .await?
                    .map(|w| w.statut_workflow());
                // 既に検証段階を過ぎている場合は状態を変えない
                if statut.is_some_and(|s| s.can_transition_to(StatutWorkflow::Conforme)) {
                    apply_transition(
                        &txn,
                        Transition {
                            entite_id,
                            nouveau: StatutWorkflow::Conforme,
                            modifie_par: Some(validateur),
                            commentaire: Some(
                                input
                                    .commentaire
                                    .clone()
                                    .unwrap_or_else(|| "Validation N+1".to_string()),
                            ),
                        },
                    )
                    .await?;
                }
                updated
            }
            DecisionValidation::Renvoyer => {
                active.statut = Set(StatutAssignation::EnCours.as_str().to_string());
                active.traite_le = Set(None);
                let updated = active.update(&txn).await?;

                notify(
                    &txn,
                    NewNotification {
                        destinataire_type: PrincipalKind::Artci,
                        destinataire_id: agent_id,
                        type_notification: TypeNotification::Assignation,
                        titre: "Assignation renvoyée".to_string(),
                        message: input
                            .commentaire
                            .clone()
                            .unwrap_or_else(|| "Votre traitement a été renvoyé pour révision.".to_string()),
                        entite_id: Some(entite_id),
                    },
                )
                .await?;
                updated
            }
        };

        txn.commit().await?;

        info!(
            assignation_id = %id,
            validateur = %validateur,
            action = ?input.action,
            "Validation N+1 recorded"
        );
        self.to_response(updated).await
    }

    /// 期限切れの en_cours を en_retard にする
    pub async fn mark_overdue(&self) -> AppResult<u64> {
        let today = Utc::now().date_naive();
        let count = self.assignation_repo.mark_overdue(today).await?;
        if count > 0 {
            info!(count, "Assignations marked overdue");
        }
        Ok(count)
    }

    async fn find(&self, id: Uuid) -> AppResult<assignation_model::Model> {
        self.assignation_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignation non trouvée.".to_string()))
    }

    async fn to_response(&self, assignation: assignation_model::Model) -> AppResult<AssignationResponse> {
        let mut responses = self.to_responses(vec![assignation]).await?;
        responses
            .pop()
            .ok_or_else(|| AppError::InternalServerError("Missing assignation".to_string()))
    }

    /// エンティティと担当者を一括で読み込んでレスポンスへ変換
    async fn to_responses(
        &self,
        assignations: Vec<assignation_model::Model>,
    ) -> AppResult<Vec<AssignationResponse>> {
        let entite_ids = assignations.iter().map(|a| a.entite_id).collect();
        let agent_ids = assignations.iter().map(|a| a.agent_id).collect();
        let entites = self.entite_repo.find_by_ids(entite_ids).await?;
        let agents = self.user_repo.find_by_ids(agent_ids).await?;

        Ok(assignations
            .into_iter()
            .map(|a| {
                let entite = entites.get(&a.entite_id);
                let agent = agents.get(&a.agent_id);
                AssignationResponse::new(a, entite, agent)
            })
            .collect())
    }
}
