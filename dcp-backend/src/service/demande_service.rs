// src/service/demande_service.rs

use crate::api::dto::demande_dto::*;
use crate::domain::demande_rapprochement_model;
use crate::domain::demande_status::{
    DecisionDemande, DecisionRapport, StatutRapport, StatutRapprochement, StatutRenouvellement,
};
use crate::domain::document_type::TypeDocument;
use crate::domain::entite_model::{self, Entity as EntiteEntity};
use crate::domain::notification_type::TypeNotification;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::domain::principal::PrincipalKind;
use crate::error::{AppError, AppResult};
use crate::repository::compte_entreprise_repository::CompteEntrepriseRepository;
use crate::repository::document_repository::DocumentRepository;
use crate::repository::entite_repository::EntiteRepository;
use crate::repository::rapprochement_repository::RapprochementRepository;
use crate::repository::renouvellement_repository::RenouvellementRepository;
use crate::service::notification_service::{notify, NewNotification};
use crate::shared::types::PaginatedResponse;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

const DEJA_TRAITEE: &str = "Cette demande a déjà été traitée.";

/// 管理者による各種申請（紐付け・更新・報告書）の審査
pub struct DemandeService {
    db: Arc<DatabaseConnection>,
    rapprochement_repo: Arc<RapprochementRepository>,
    renouvellement_repo: Arc<RenouvellementRepository>,
    document_repo: Arc<DocumentRepository>,
    entite_repo: Arc<EntiteRepository>,
    compte_repo: Arc<CompteEntrepriseRepository>,
}

impl DemandeService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        rapprochement_repo: Arc<RapprochementRepository>,
        renouvellement_repo: Arc<RenouvellementRepository>,
        document_repo: Arc<DocumentRepository>,
        entite_repo: Arc<EntiteRepository>,
        compte_repo: Arc<CompteEntrepriseRepository>,
    ) -> Self {
        Self {
            db,
            rapprochement_repo,
            renouvellement_repo,
            document_repo,
            entite_repo,
            compte_repo,
        }
    }

    // --- 紐付け申請 ---

    pub async fn list_rapprochements(
        &self,
        query: &DemandeListQuery,
    ) -> AppResult<PaginatedResponse<RapprochementResponse>> {
        let (page, per_page) = query.pagination.get_pagination();
        let statut = parse_statut::<StatutRapprochement>(&query.statut)?;

        let (items, total) = self
            .rapprochement_repo
            .find_paginated(statut, query.search.as_deref(), page, per_page)
            .await?;

        let compte_ids = items.iter().map(|d| d.compte_entreprise_id).collect();
        let comptes = self.compte_repo.find_by_ids(compte_ids).await?;
        let items = items
            .into_iter()
            .map(|d| {
                let denomination = comptes
                    .get(&d.compte_entreprise_id)
                    .map(|c| c.denomination.clone());
                RapprochementResponse::new(d, denomination)
            })
            .collect();

        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    /// 承認時は申請アカウントをエンティティに紐付ける
    pub async fn traiter_rapprochement(
        &self,
        id: Uuid,
        traite_par: Uuid,
        input: TraiterRapprochementRequest,
    ) -> AppResult<RapprochementResponse> {
        input.validate()?;

        let demande = self
            .rapprochement_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Demande non trouvée.".to_string()))?;
        if demande.statut_rapprochement() != Some(StatutRapprochement::EnAttente) {
            return Err(AppError::BadRequest(DEJA_TRAITEE.to_string()));
        }

        let compte_id = demande.compte_entreprise_id;
        let entite_id = demande.entite_id;
        let txn = self.db.begin().await?;

        let mut active: demande_rapprochement_model::ActiveModel = demande.into();
        active.traite_par = Set(Some(traite_par));
        active.traite_le = Set(Some(Utc::now()));

        let (titre, message) = match input.action {
            DecisionDemande::Approuver => {
                let entite = EntiteEntity::find_by_id(entite_id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;
                if entite
                    .compte_entreprise_id
                    .is_some_and(|owner| owner != compte_id)
                {
                    return Err(AppError::Conflict(
                        "Cette entité est déjà rattachée à un autre compte.".to_string(),
                    ));
                }
                let deja_rattache = EntiteEntity::find()
                    .filter(entite_model::Column::CompteEntrepriseId.eq(compte_id))
                    .filter(entite_model::Column::Id.ne(entite_id))
                    .one(&txn)
                    .await?
                    .is_some();
                if deja_rattache {
                    return Err(AppError::Conflict(
                        "Ce compte est déjà rattaché à une entité.".to_string(),
                    ));
                }

                let denomination = entite.denomination.clone();
                let mut entite: entite_model::ActiveModel = entite.into();
                entite.compte_entreprise_id = Set(Some(compte_id));
                entite.origine_saisie = Set(OrigineSaisie::Rapprochement.as_str().to_string());
                entite.update(&txn).await?;

                active.statut = Set(StatutRapprochement::Approuve.as_str().to_string());
                (
                    "Demande de rapprochement approuvée".to_string(),
                    format!("Votre compte est désormais rattaché à l'entité « {} ».", denomination),
                )
            }
            DecisionDemande::Rejeter => {
                active.statut = Set(StatutRapprochement::Rejete.as_str().to_string());
                active.motif_rejet = Set(input.motif.clone());
                (
                    "Demande de rapprochement rejetée".to_string(),
                    input
                        .motif
                        .clone()
                        .unwrap_or_else(|| "Votre demande de rapprochement a été rejetée.".to_string()),
                )
            }
        };

        let updated = active.update(&txn).await?;

        notify(
            &txn,
            NewNotification {
                destinataire_type: PrincipalKind::Entreprise,
                destinataire_id: compte_id,
                type_notification: TypeNotification::Rapprochement,
                titre,
                message,
                entite_id: Some(entite_id),
            },
        )
        .await?;

        txn.commit().await?;

        info!(
            rapprochement_id = %id,
            statut = %updated.statut,
            traite_par = %traite_par,
            "Rapprochement processed"
        );

        let denomination = self
            .compte_repo
            .find_by_id(compte_id)
            .await?
            .map(|c| c.denomination);
        Ok(RapprochementResponse::new(updated, denomination))
    }

    // --- 更新申請 ---

    pub async fn list_renouvellements(
        &self,
        query: &DemandeListQuery,
    ) -> AppResult<PaginatedResponse<RenouvellementResponse>> {
        let (page, per_page) = query.pagination.get_pagination();
        let statut = parse_statut::<StatutRenouvellement>(&query.statut)?;
        let entite_ids = self.search_entite_ids(&query.search).await?;

        let (items, total) = self
            .renouvellement_repo
            .find_paginated(statut, entite_ids, page, per_page)
            .await?;

        let ids = items.iter().map(|r| r.entite_id).collect();
        let entites = self.entite_repo.find_by_ids(ids).await?;
        let items = items
            .into_iter()
            .map(|r| {
                let denomination = entites.get(&r.entite_id).map(|e| e.denomination.clone());
                RenouvellementResponse::new(r, denomination)
            })
            .collect();

        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    pub async fn traiter_renouvellement(
        &self,
        id: Uuid,
        traite_par: Uuid,
        input: TraiterRenouvellementRequest,
    ) -> AppResult<RenouvellementResponse> {
        input.validate()?;

        let demande = self
            .renouvellement_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Demande non trouvée.".to_string()))?;
        if !demande.statut_renouvellement().is_some_and(|s| s.is_open()) {
            return Err(AppError::BadRequest(DEJA_TRAITEE.to_string()));
        }

        let statut = match input.action {
            DecisionDemande::Approuver => StatutRenouvellement::Approuve,
            DecisionDemande::Rejeter => StatutRenouvellement::Rejete,
        };
        let updated = self
            .renouvellement_repo
            .update_statut(demande, statut, input.commentaire.clone(), traite_par)
            .await?;

        let entite = self.entite_repo.find_by_id(updated.entite_id).await?;
        if let Some(compte_id) = entite.as_ref().and_then(|e| e.compte_entreprise_id) {
            notify(
                self.db.as_ref(),
                NewNotification {
                    destinataire_type: PrincipalKind::Entreprise,
                    destinataire_id: compte_id,
                    type_notification: TypeNotification::Renouvellement,
                    titre: match statut {
                        StatutRenouvellement::Approuve => "Renouvellement approuvé".to_string(),
                        _ => "Renouvellement rejeté".to_string(),
                    },
                    message: input.commentaire.unwrap_or_else(|| {
                        "Votre demande de renouvellement a été traitée.".to_string()
                    }),
                    entite_id: Some(updated.entite_id),
                },
            )
            .await?;
        }

        info!(renouvellement_id = %id, statut = %statut, "Renouvellement processed");
        Ok(RenouvellementResponse::new(
            updated,
            entite.map(|e| e.denomination),
        ))
    }

    // --- 活動報告書 ---

    pub async fn list_rapports(
        &self,
        query: &DemandeListQuery,
    ) -> AppResult<PaginatedResponse<RapportResponse>> {
        let (page, per_page) = query.pagination.get_pagination();
        let statut = parse_statut::<StatutRapport>(&query.statut)?;
        let entite_ids = self.search_entite_ids(&query.search).await?;

        let (items, total) = self
            .document_repo
            .find_rapports_paginated(statut, entite_ids, page, per_page)
            .await?;

        let ids = items.iter().filter_map(|d| d.entite_id).collect();
        let entites = self.entite_repo.find_by_ids(ids).await?;
        let items = items
            .into_iter()
            .map(|d| {
                let denomination = d
                    .entite_id
                    .and_then(|id| entites.get(&id))
                    .map(|e| e.denomination.clone());
                RapportResponse::new(d, denomination)
            })
            .collect();

        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    pub async fn traiter_rapport(
        &self,
        id: Uuid,
        traite_par: Uuid,
        input: TraiterRapportRequest,
    ) -> AppResult<RapportResponse> {
        input.validate()?;

        let rapport = self
            .document_repo
            .find_by_id(id)
            .await?
            .filter(|d| d.type_document == TypeDocument::RapportActivite.as_str())
            .ok_or_else(|| AppError::NotFound("Rapport non trouvé.".to_string()))?;
        if rapport.statut.parse::<StatutRapport>().ok() != Some(StatutRapport::EnAttente) {
            return Err(AppError::BadRequest(DEJA_TRAITEE.to_string()));
        }

        let statut = match input.action {
            DecisionRapport::Valider => StatutRapport::Valide,
            DecisionRapport::Rejeter => StatutRapport::Rejete,
        };
        let updated = self
            .document_repo
            .update_statut(rapport, statut, input.commentaire.clone())
            .await?;

        let entite = match updated.entite_id {
            Some(entite_id) => self.entite_repo.find_by_id(entite_id).await?,
            None => None,
        };
        let destinataire = updated
            .compte_entreprise_id
            .or_else(|| entite.as_ref().and_then(|e| e.compte_entreprise_id));
        if let Some(compte_id) = destinataire {
            notify(
                self.db.as_ref(),
                NewNotification {
                    destinataire_type: PrincipalKind::Entreprise,
                    destinataire_id: compte_id,
                    type_notification: TypeNotification::Rapport,
                    titre: match statut {
                        StatutRapport::Valide => "Rapport d'activité validé".to_string(),
                        _ => "Rapport d'activité rejeté".to_string(),
                    },
                    message: input
                        .commentaire
                        .unwrap_or_else(|| "Votre rapport d'activité a été examiné.".to_string()),
                    entite_id: updated.entite_id,
                },
            )
            .await?;
        }

        info!(document_id = %id, statut = %statut, traite_par = %traite_par, "Rapport processed");
        Ok(RapportResponse::new(updated, entite.map(|e| e.denomination)))
    }

    /// 検索語からエンティティIDを絞り込む（未指定なら None）
    async fn search_entite_ids(&self, search: &Option<String>) -> AppResult<Option<Vec<Uuid>>> {
        match search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => Ok(Some(self.entite_repo.find_ids_by_search(search).await?)),
            None => Ok(None),
        }
    }
}

/// 空文字は未指定、不明な値は 400
fn parse_statut<T: FromStr<Err = String>>(value: &Option<String>) -> AppResult<Option<T>> {
    match value.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(AppError::BadRequest),
        None => Ok(None),
    }
}
