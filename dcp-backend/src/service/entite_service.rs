// src/service/entite_service.rs

use crate::api::dto::entite_dto::{
    non_empty, CreateEntiteRequest, EntiteDetailResponse, EntiteSummaryResponse,
    UpdateEntiteRequest,
};
use crate::domain::dossier::Dossier;
use crate::domain::entite_conformite_model::{
    ActiveModel as ConformiteActiveModel, Entity as ConformiteEntity,
};
use crate::domain::entite_model::{self, ActiveModel as EntiteActiveModel, Entity as EntiteEntity};
use crate::domain::entite_workflow_model::ActiveModel as WorkflowActiveModel;
use crate::domain::historique_statut_model::ActiveModel as HistoriqueActiveModel;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::error::{AppError, AppResult};
use crate::repository::document_repository::DocumentRepository;
use crate::repository::entite_repository::{
    EntiteAggregate, EntiteFilters, EntiteOrder, EntiteRepository,
};
use crate::repository::renouvellement_repository::RenouvellementRepository;
use crate::shared::types::PaginatedResponse;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// 作成時の付帯情報
#[derive(Debug, Clone, Copy)]
pub struct EntiteOrigin {
    pub origine: OrigineSaisie,
    pub created_by: Option<Uuid>,
    pub compte_entreprise_id: Option<Uuid>,
}

pub struct EntiteService {
    db: Arc<DatabaseConnection>,
    entite_repo: Arc<EntiteRepository>,
    document_repo: Arc<DocumentRepository>,
    renouvellement_repo: Arc<RenouvellementRepository>,
}

impl EntiteService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        entite_repo: Arc<EntiteRepository>,
        document_repo: Arc<DocumentRepository>,
        renouvellement_repo: Arc<RenouvellementRepository>,
    ) -> Self {
        Self {
            db,
            entite_repo,
            document_repo,
            renouvellement_repo,
        }
    }

    pub async fn create(
        &self,
        input: CreateEntiteRequest,
        origin: EntiteOrigin,
    ) -> AppResult<EntiteAggregate> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let aggregate = insert_entite(&txn, input, origin).await?;
        txn.commit().await?;

        info!(
            entite_id = %aggregate.entite.id,
            origine = %origin.origine,
            "Entite created"
        );
        Ok(aggregate)
    }

    pub async fn update(&self, id: Uuid, input: UpdateEntiteRequest) -> AppResult<EntiteAggregate> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let entite = EntiteEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;
        update_entite(&txn, entite, input).await?;
        txn.commit().await?;

        info!(entite_id = %id, "Entite updated");
        self.get_aggregate(id).await
    }

    pub async fn get_aggregate(&self, id: Uuid) -> AppResult<EntiteAggregate> {
        self.entite_repo
            .find_with_details(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))
    }

    /// 書類・更新申請を含む詳細
    pub async fn get(&self, id: Uuid) -> AppResult<EntiteDetailResponse> {
        let aggregate = self.get_aggregate(id).await?;
        self.detail(aggregate).await
    }

    pub async fn detail(&self, aggregate: EntiteAggregate) -> AppResult<EntiteDetailResponse> {
        let id = aggregate.entite.id;
        let documents = self.document_repo.find_by_entite(id).await?;
        let renouvellements = self.renouvellement_repo.find_by_entite(id).await?;
        Ok(EntiteDetailResponse::new(aggregate, documents, renouvellements))
    }

    pub async fn list(
        &self,
        filters: &EntiteFilters,
        order: EntiteOrder,
        page: u64,
        per_page: u64,
    ) -> AppResult<PaginatedResponse<EntiteSummaryResponse>> {
        let (items, total) = self
            .entite_repo
            .find_paginated(filters, order, page, per_page)
            .await?;
        let items = items.iter().map(EntiteSummaryResponse::from).collect();
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    pub async fn numero_cc_exists(&self, numero_cc: &str) -> AppResult<bool> {
        Ok(self.entite_repo.numero_cc_exists(numero_cc).await?)
    }
}

/// エンティティと 1:1 の付随行、初期履歴を作成する
pub async fn insert_entite<C: ConnectionTrait>(
    conn: &C,
    input: CreateEntiteRequest,
    origin: EntiteOrigin,
) -> AppResult<EntiteAggregate> {
    let numero_cc = input.numero_cc.trim().to_string();
    let exists = EntiteEntity::find()
        .filter(entite_model::Column::NumeroCc.eq(numero_cc.as_str()))
        .one(conn)
        .await?
        .is_some();
    if exists {
        return Err(AppError::Conflict(format!(
            "Une entité existe déjà avec le N° CC {}.",
            numero_cc
        )));
    }

    let mut dossier = Dossier::default();
    dossier.apply(input.dossier);

    let entite = EntiteActiveModel {
        compte_entreprise_id: Set(origin.compte_entreprise_id),
        numero_cc: Set(numero_cc),
        denomination: Set(input.denomination.trim().to_string()),
        forme_juridique: Set(non_empty(&input.forme_juridique)),
        secteur_activite: Set(non_empty(&input.secteur_activite)),
        adresse: Set(non_empty(&input.adresse)),
        ville: Set(non_empty(&input.ville)),
        region: Set(non_empty(&input.region)),
        telephone: Set(non_empty(&input.telephone)),
        email: Set(non_empty(&input.email)),
        origine_saisie: Set(origin.origine.as_str().to_string()),
        dossier: Set(dossier.clone()),
        ..EntiteActiveModel::new()
    }
    .insert(conn)
    .await?;

    let statut = origin.origine.initial_statut();
    let workflow = WorkflowActiveModel {
        entite_id: Set(entite.id),
        statut: Set(statut.as_str().to_string()),
        created_by: Set(origin.created_by),
        ..WorkflowActiveModel::new()
    }
    .insert(conn)
    .await?;

    let (a_dpo, type_dpo) = dossier.dpo_summary();
    let conformite = ConformiteActiveModel {
        entite_id: Set(entite.id),
        score: Set(dossier.compute_score()),
        a_dpo: Set(a_dpo),
        type_dpo: Set(type_dpo.map(|t| t.as_str().to_string())),
        effectif_entreprise: Set(non_empty(&input.effectif_entreprise)),
        volume_donnees_traitees: Set(non_empty(&input.volume_donnees_traitees)),
        delai_mise_en_conformite: Set(non_empty(&input.delai_mise_en_conformite)),
        ..ConformiteActiveModel::new()
    }
    .insert(conn)
    .await?;

    HistoriqueActiveModel {
        entite_id: Set(entite.id),
        ancien_statut: Set(None),
        nouveau_statut: Set(statut.as_str().to_string()),
        modifie_par: Set(origin.created_by),
        commentaire: Set(Some("Création de l'entité".to_string())),
        ..HistoriqueActiveModel::new()
    }
    .insert(conn)
    .await?;

    Ok(EntiteAggregate {
        entite,
        workflow: Some(workflow),
        conformite: Some(conformite),
    })
}

/// 直接項目と申告内容を部分更新し、スコアを再計算する
pub async fn update_entite<C: ConnectionTrait>(
    conn: &C,
    entite: entite_model::Model,
    input: UpdateEntiteRequest,
) -> AppResult<()> {
    let entite_id = entite.id;
    let mut dossier = entite.dossier.clone();
    dossier.apply(input.dossier);

    let mut active: EntiteActiveModel = entite.into();
    if let Some(denomination) = input.denomination {
        active.denomination = Set(denomination.trim().to_string());
    }
    if input.forme_juridique.is_some() {
        active.forme_juridique = Set(non_empty(&input.forme_juridique));
    }
    if input.secteur_activite.is_some() {
        active.secteur_activite = Set(non_empty(&input.secteur_activite));
    }
    if input.adresse.is_some() {
        active.adresse = Set(non_empty(&input.adresse));
    }
    if input.ville.is_some() {
        active.ville = Set(non_empty(&input.ville));
    }
    if input.region.is_some() {
        active.region = Set(non_empty(&input.region));
    }
    if input.telephone.is_some() {
        active.telephone = Set(non_empty(&input.telephone));
    }
    if input.email.is_some() {
        active.email = Set(non_empty(&input.email));
    }
    active.dossier = Set(dossier.clone());
    active.update(conn).await?;

    let (a_dpo, type_dpo) = dossier.dpo_summary();
    let score = dossier.compute_score();

    let existing = ConformiteEntity::find_by_id(entite_id).one(conn).await?;
    let is_new = existing.is_none();
    let mut conformite: ConformiteActiveModel = match existing {
        Some(existing) => existing.into(),
        None => ConformiteActiveModel {
            entite_id: Set(entite_id),
            ..ConformiteActiveModel::new()
        },
    };

    conformite.score = Set(score);
    conformite.a_dpo = Set(a_dpo);
    conformite.type_dpo = Set(type_dpo.map(|t| t.as_str().to_string()));
    if input.effectif_entreprise.is_some() {
        conformite.effectif_entreprise = Set(non_empty(&input.effectif_entreprise));
    }
    if input.volume_donnees_traitees.is_some() {
        conformite.volume_donnees_traitees = Set(non_empty(&input.volume_donnees_traitees));
    }
    if input.delai_mise_en_conformite.is_some() {
        conformite.delai_mise_en_conformite = Set(non_empty(&input.delai_mise_en_conformite));
    }

    if is_new {
        conformite.insert(conn).await?;
    } else {
        conformite.update(conn).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dossier::{Dpo, DossierPatch, TypeDpo};

    #[test]
    fn test_create_request_requires_identity() {
        let input = CreateEntiteRequest {
            denomination: "A".to_string(),
            numero_cc: "".to_string(),
            forme_juridique: None,
            secteur_activite: None,
            adresse: None,
            ville: None,
            region: None,
            telephone: None,
            email: None,
            effectif_entreprise: None,
            volume_donnees_traitees: None,
            delai_mise_en_conformite: None,
            dossier: DossierPatch::default(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("denomination"));
        assert!(errors.field_errors().contains_key("numero_cc"));
    }

    #[test]
    fn test_dossier_patch_drives_dpo_summary() {
        let mut dossier = Dossier::default();
        dossier.apply(DossierPatch {
            dpos: Some(vec![Dpo {
                nom: "Koné".to_string(),
                prenom: None,
                email: None,
                telephone: None,
                type_dpo: TypeDpo::Externe,
                organisme: Some("Cabinet".to_string()),
                date_designation: None,
            }]),
            ..Default::default()
        });
        assert_eq!(dossier.dpo_summary(), (true, Some(TypeDpo::Externe)));
        assert!(dossier.compute_score() >= 20);
    }
}
