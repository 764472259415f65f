// src/service/workflow_service.rs

use crate::domain::entite_conformite_model::{self, Entity as ConformiteEntity};
use crate::domain::entite_model::{self, Entity as EntiteEntity};
use crate::domain::entite_workflow_model::{self, Entity as WorkflowEntity};
use crate::domain::historique_statut_model::{self, ActiveModel as HistoriqueActiveModel};
use crate::domain::notification_type::TypeNotification;
use crate::domain::principal::PrincipalKind;
use crate::domain::workflow_status::StatutWorkflow;
use crate::error::{AppError, AppResult};
use crate::repository::historique_repository::{HistoriqueFilters, HistoriqueRepository};
use crate::service::notification_service::{notify, NewNotification};
use crate::shared::types::PaginatedResponse;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 状態遷移の入力
#[derive(Debug, Clone)]
pub struct Transition {
    pub entite_id: Uuid,
    pub nouveau: StatutWorkflow,
    pub modifie_par: Option<Uuid>,
    pub commentaire: Option<String>,
}

pub struct WorkflowService {
    db: Arc<DatabaseConnection>,
    historique_repo: Arc<HistoriqueRepository>,
}

impl WorkflowService {
    pub fn new(db: Arc<DatabaseConnection>, historique_repo: Arc<HistoriqueRepository>) -> Self {
        Self {
            db,
            historique_repo,
        }
    }

    /// 単独の状態遷移（トランザクション内で実行）
    pub async fn transition(&self, transition: Transition) -> AppResult<entite_workflow_model::Model> {
        let txn = self.db.begin().await?;
        let workflow = apply_transition(&txn, transition).await?;
        txn.commit().await?;
        Ok(workflow)
    }

    pub async fn historique_entite(
        &self,
        entite_id: Uuid,
    ) -> AppResult<Vec<historique_statut_model::Model>> {
        Ok(self.historique_repo.find_by_entite(entite_id).await?)
    }

    /// 変更ログ（管理者向け）
    pub async fn historique(
        &self,
        filters: HistoriqueFilters,
        page: u64,
        per_page: u64,
    ) -> AppResult<PaginatedResponse<historique_statut_model::Model>> {
        let (items, total) = self
            .historique_repo
            .find_paginated(&filters, page, per_page)
            .await?;
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }
}

/// 状態遷移の本体。呼び出し側のトランザクションに参加する
pub async fn apply_transition<C: ConnectionTrait>(
    conn: &C,
    transition: Transition,
) -> AppResult<entite_workflow_model::Model> {
    let Transition {
        entite_id,
        nouveau,
        modifie_par,
        commentaire,
    } = transition;

    let workflow = WorkflowEntity::find_by_id(entite_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;
    let ancien = workflow.statut_workflow();

    if !ancien.can_transition_to(nouveau) {
        let possibles = ancien
            .allowed_transitions()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(AppError::BadRequest(format!(
            "Transition non autorisée : {} -> {}. Transitions possibles : [{}]",
            ancien, nouveau, possibles
        )));
    }

    let now = Utc::now();
    let mut active: entite_workflow_model::ActiveModel = workflow.into();
    active.statut = Set(nouveau.as_str().to_string());
    stamp_dates(&mut active, nouveau, now, commentaire.as_deref());
    if nouveau == StatutWorkflow::Valide {
        active.numero_autorisation = Set(Some(numero_autorisation(entite_id, now)));
    }
    let updated = active.update(conn).await?;

    let entite = EntiteEntity::find_by_id(entite_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;

    if nouveau == StatutWorkflow::Publie && !entite.publie_sur_carte {
        let mut entite_active: entite_model::ActiveModel = entite.clone().into();
        entite_active.publie_sur_carte = Set(true);
        entite_active.update(conn).await?;
    }

    // 対応するラベルがない状態では既存のラベルを維持する
    if let Some(label) = nouveau.statut_conformite() {
        if let Some(conformite) = ConformiteEntity::find_by_id(entite_id).one(conn).await? {
            let mut conformite_active: entite_conformite_model::ActiveModel = conformite.into();
            conformite_active.statut_conformite = Set(Some(label.as_str().to_string()));
            conformite_active.update(conn).await?;
        }
    }

    HistoriqueActiveModel {
        entite_id: Set(entite_id),
        ancien_statut: Set(Some(ancien.as_str().to_string())),
        nouveau_statut: Set(nouveau.as_str().to_string()),
        modifie_par: Set(modifie_par),
        commentaire: Set(commentaire),
        ..HistoriqueActiveModel::new()
    }
    .insert(conn)
    .await?;

    if let Some(compte_id) = entite.compte_entreprise_id {
        notify(
            conn,
            NewNotification {
                destinataire_type: PrincipalKind::Entreprise,
                destinataire_id: compte_id,
                type_notification: TypeNotification::ChangementStatut,
                titre: "Changement de statut de votre dossier".to_string(),
                message: format!(
                    "Le statut de votre dossier « {} » est passé de « {} » à « {} ».",
                    entite.denomination, ancien, nouveau
                ),
                entite_id: Some(entite_id),
            },
        )
        .await?;
    }

    info!(
        entite_id = %entite_id,
        ancien = %ancien,
        nouveau = %nouveau,
        modifie_par = ?modifie_par,
        "Workflow transition applied"
    );

    Ok(updated)
}

/// 遷移先に応じて日付を記録する
fn stamp_dates(
    active: &mut entite_workflow_model::ActiveModel,
    nouveau: StatutWorkflow,
    now: DateTime<Utc>,
    commentaire: Option<&str>,
) {
    match nouveau {
        StatutWorkflow::Soumis => active.date_soumission = Set(Some(now)),
        StatutWorkflow::Conforme | StatutWorkflow::ConformeSousReserve | StatutWorkflow::Valide => {
            active.date_validation = Set(Some(now))
        }
        StatutWorkflow::Rejete => {
            active.date_rejet = Set(Some(now));
            if let Some(motif) = commentaire {
                active.motif_rejet = Set(Some(motif.to_string()));
            }
        }
        StatutWorkflow::Publie => active.date_publication = Set(Some(now)),
        _ => {}
    }
}

/// 承認番号（ARTCI-DCP-年-エンティティIDの先頭8桁）
pub fn numero_autorisation(entite_id: Uuid, now: DateTime<Utc>) -> String {
    let simple = entite_id.simple().to_string().to_uppercase();
    format!("ARTCI-DCP-{}-{}", now.format("%Y"), &simple[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn workflow() -> entite_workflow_model::ActiveModel {
        entite_workflow_model::ActiveModel::new()
    }

    #[test]
    fn test_stamp_dates_soumis() {
        let now = Utc::now();
        let mut active = workflow();
        stamp_dates(&mut active, StatutWorkflow::Soumis, now, None);
        assert_eq!(active.date_soumission, Set(Some(now)));
    }

    #[test]
    fn test_stamp_dates_rejete_keeps_motif() {
        let now = Utc::now();
        let mut active = workflow();
        stamp_dates(&mut active, StatutWorkflow::Rejete, now, Some("Dossier incomplet"));
        assert_eq!(active.date_rejet, Set(Some(now)));
        assert_eq!(active.motif_rejet, Set(Some("Dossier incomplet".to_string())));
    }

    #[test]
    fn test_stamp_dates_validation_group() {
        for statut in [
            StatutWorkflow::Conforme,
            StatutWorkflow::ConformeSousReserve,
            StatutWorkflow::Valide,
        ] {
            let now = Utc::now();
            let mut active = workflow();
            stamp_dates(&mut active, statut, now, None);
            assert_eq!(active.date_validation, Set(Some(now)));
        }
    }

    #[test]
    fn test_numero_autorisation_format() {
        let id = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        let date = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(numero_autorisation(id, date), "ARTCI-DCP-2025-0F8FAD5B");
    }
}
