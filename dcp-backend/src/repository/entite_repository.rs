// src/repository/entite_repository.rs

use crate::domain::entite_conformite_model::{self, Entity as ConformiteEntity};
use crate::domain::entite_model::{self, Entity as EntiteEntity};
use crate::domain::entite_workflow_model::{self, Entity as WorkflowEntity};
use crate::domain::origine_saisie::OrigineSaisie;
use crate::domain::workflow_status::{StatutConformite, StatutWorkflow};
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    Condition, DbConn, DbErr, JoinType, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// エンティティ本体と 1:1 の付随データ
#[derive(Debug, Clone, Serialize)]
pub struct EntiteAggregate {
    pub entite: entite_model::Model,
    pub workflow: Option<entite_workflow_model::Model>,
    pub conformite: Option<entite_conformite_model::Model>,
}

impl EntiteAggregate {
    pub fn statut_workflow(&self) -> StatutWorkflow {
        self.workflow
            .as_ref()
            .map_or(StatutWorkflow::Brouillon, |w| w.statut_workflow())
    }

    pub fn statut_conformite(&self) -> Option<StatutConformite> {
        self.conformite.as_ref().and_then(|c| c.label())
    }

    pub fn is_conforme(&self) -> bool {
        self.statut_conformite() == Some(StatutConformite::Conforme)
    }
}

/// 一覧検索の条件
#[derive(Debug, Clone, Default)]
pub struct EntiteFilters {
    pub search: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub forme_juridique: Option<String>,
    pub origine_saisie: Option<OrigineSaisie>,
    pub publie_sur_carte: Option<bool>,
    /// 空なら絞り込まない
    pub statut_conformite: Vec<StatutConformite>,
    pub statut_workflow: Option<StatutWorkflow>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntiteOrder {
    #[default]
    CreatedDesc,
    Denomination,
}

/// 作成日での絞り込み範囲
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub debut: Option<DateTime<Utc>>,
    pub fin: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct EntiteRepository {
    db: DbConn,
}

impl EntiteRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<entite_model::Model>, DbErr> {
        EntiteEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_numero_cc(
        &self,
        numero_cc: &str,
    ) -> Result<Option<entite_model::Model>, DbErr> {
        EntiteEntity::find()
            .filter(entite_model::Column::NumeroCc.eq(numero_cc.trim()))
            .one(&self.db)
            .await
    }

    pub async fn numero_cc_exists(&self, numero_cc: &str) -> Result<bool, DbErr> {
        Ok(self.find_by_numero_cc(numero_cc).await?.is_some())
    }

    /// 名称・N° CC の部分一致でIDのみを取得（申請一覧の検索用）
    pub async fn find_ids_by_search(&self, search: &str) -> Result<Vec<Uuid>, DbErr> {
        let filters = EntiteFilters {
            search: Some(search.to_string()),
            ..Default::default()
        };
        Self::filtered_select(&filters)
            .select_only()
            .column(entite_model::Column::Id)
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
    }

    pub async fn find_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, entite_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(EntiteEntity::find()
            .filter(entite_model::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect())
    }

    pub async fn find_by_compte(
        &self,
        compte_id: Uuid,
    ) -> Result<Option<entite_model::Model>, DbErr> {
        EntiteEntity::find()
            .filter(entite_model::Column::CompteEntrepriseId.eq(compte_id))
            .order_by(entite_model::Column::CreatedAt, Order::Asc)
            .one(&self.db)
            .await
    }

    pub async fn find_workflow(
        &self,
        entite_id: Uuid,
    ) -> Result<Option<entite_workflow_model::Model>, DbErr> {
        WorkflowEntity::find_by_id(entite_id).one(&self.db).await
    }

    pub async fn find_with_details(&self, id: Uuid) -> Result<Option<EntiteAggregate>, DbErr> {
        let Some(entite) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        Ok(Some(self.load_details(entite).await?))
    }

    pub async fn find_by_compte_with_details(
        &self,
        compte_id: Uuid,
    ) -> Result<Option<EntiteAggregate>, DbErr> {
        let Some(entite) = self.find_by_compte(compte_id).await? else {
            return Ok(None);
        };
        Ok(Some(self.load_details(entite).await?))
    }

    async fn load_details(&self, entite: entite_model::Model) -> Result<EntiteAggregate, DbErr> {
        let workflow = WorkflowEntity::find_by_id(entite.id).one(&self.db).await?;
        let conformite = ConformiteEntity::find_by_id(entite.id).one(&self.db).await?;
        Ok(EntiteAggregate {
            entite,
            workflow,
            conformite,
        })
    }

    /// 条件付き一覧（ページネーションあり）
    pub async fn find_paginated(
        &self,
        filters: &EntiteFilters,
        order: EntiteOrder,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<EntiteAggregate>, u64), DbErr> {
        let query = Self::filtered_select(filters);
        let total_count = query.clone().count(&self.db).await?;

        let offset = (page.max(1) - 1) * per_page;
        let entites = Self::apply_order(query, order)
            .limit(per_page)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok((self.attach_details(entites).await?, total_count))
    }

    /// 条件付き一覧（全件）
    pub async fn find_all(
        &self,
        filters: &EntiteFilters,
        order: EntiteOrder,
    ) -> Result<Vec<EntiteAggregate>, DbErr> {
        let entites = Self::apply_order(Self::filtered_select(filters), order)
            .all(&self.db)
            .await?;
        self.attach_details(entites).await
    }

    pub async fn count(&self, range: DateRange) -> Result<u64, DbErr> {
        Self::with_range(EntiteEntity::find(), range)
            .count(&self.db)
            .await
    }

    /// エンティティのカラムで集計
    pub async fn count_by_entite_column(
        &self,
        column: entite_model::Column,
        filters: &EntiteFilters,
        range: DateRange,
    ) -> Result<Vec<(Option<String>, i64)>, DbErr> {
        Self::with_range(Self::filtered_select(filters), range)
            .select_only()
            .column(column)
            .column_as(
                Expr::col((EntiteEntity, entite_model::Column::Id)).count(),
                "count",
            )
            .group_by(column)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
    }

    pub async fn count_by_statut_workflow(
        &self,
        range: DateRange,
    ) -> Result<Vec<(Option<String>, i64)>, DbErr> {
        Self::with_range(Self::filtered_select(&EntiteFilters::default()), range)
            .select_only()
            .column(entite_workflow_model::Column::Statut)
            .column_as(
                Expr::col((EntiteEntity, entite_model::Column::Id)).count(),
                "count",
            )
            .group_by(entite_workflow_model::Column::Statut)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
    }

    pub async fn count_by_statut_conformite(
        &self,
        filters: &EntiteFilters,
        range: DateRange,
    ) -> Result<Vec<(Option<String>, i64)>, DbErr> {
        Self::with_range(Self::filtered_select(filters), range)
            .select_only()
            .column(entite_conformite_model::Column::StatutConformite)
            .column_as(
                Expr::col((EntiteEntity, entite_model::Column::Id)).count(),
                "count",
            )
            .group_by(entite_conformite_model::Column::StatutConformite)
            .into_tuple::<(Option<String>, i64)>()
            .all(&self.db)
            .await
    }

    /// 付随データを一括で読み込んで結合
    async fn attach_details(
        &self,
        entites: Vec<entite_model::Model>,
    ) -> Result<Vec<EntiteAggregate>, DbErr> {
        if entites.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = entites.iter().map(|e| e.id).collect();

        let mut workflows: HashMap<Uuid, entite_workflow_model::Model> = WorkflowEntity::find()
            .filter(entite_workflow_model::Column::EntiteId.is_in(ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|w| (w.entite_id, w))
            .collect();

        let mut conformites: HashMap<Uuid, entite_conformite_model::Model> =
            ConformiteEntity::find()
                .filter(entite_conformite_model::Column::EntiteId.is_in(ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|c| (c.entite_id, c))
                .collect();

        Ok(entites
            .into_iter()
            .map(|entite| EntiteAggregate {
                workflow: workflows.remove(&entite.id),
                conformite: conformites.remove(&entite.id),
                entite,
            })
            .collect())
    }

    fn filtered_select(filters: &EntiteFilters) -> Select<EntiteEntity> {
        let mut query = EntiteEntity::find()
            .join(JoinType::LeftJoin, entite_model::Relation::Workflow.def())
            .join(JoinType::LeftJoin, entite_model::Relation::Conformite.def());

        if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            EntiteEntity,
                            entite_model::Column::Denomination,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            EntiteEntity,
                            entite_model::Column::NumeroCc,
                        ))))
                        .like(pattern),
                    ),
            );
        }
        if let Some(secteur) = &filters.secteur_activite {
            query = query.filter(entite_model::Column::SecteurActivite.eq(secteur.as_str()));
        }
        if let Some(ville) = &filters.ville {
            query = query.filter(entite_model::Column::Ville.eq(ville.as_str()));
        }
        if let Some(region) = &filters.region {
            query = query.filter(entite_model::Column::Region.eq(region.as_str()));
        }
        if let Some(forme) = &filters.forme_juridique {
            query = query.filter(entite_model::Column::FormeJuridique.eq(forme.as_str()));
        }
        if let Some(origine) = filters.origine_saisie {
            query = query.filter(entite_model::Column::OrigineSaisie.eq(origine.as_str()));
        }
        if let Some(publie) = filters.publie_sur_carte {
            query = query.filter(entite_model::Column::PublieSurCarte.eq(publie));
        }
        if !filters.statut_conformite.is_empty() {
            let labels: Vec<&str> = filters.statut_conformite.iter().map(|s| s.as_str()).collect();
            query = query.filter(entite_conformite_model::Column::StatutConformite.is_in(labels));
        }
        if let Some(statut) = filters.statut_workflow {
            query = query.filter(entite_workflow_model::Column::Statut.eq(statut.as_str()));
        }

        query
    }

    fn with_range(query: Select<EntiteEntity>, range: DateRange) -> Select<EntiteEntity> {
        let mut query = query;
        if let Some(debut) = range.debut {
            query = query.filter(entite_model::Column::CreatedAt.gte(debut));
        }
        if let Some(fin) = range.fin {
            query = query.filter(entite_model::Column::CreatedAt.lte(fin));
        }
        query
    }

    fn apply_order(query: Select<EntiteEntity>, order: EntiteOrder) -> Select<EntiteEntity> {
        match order {
            EntiteOrder::CreatedDesc => query.order_by(entite_model::Column::CreatedAt, Order::Desc),
            EntiteOrder::Denomination => {
                query.order_by(entite_model::Column::Denomination, Order::Asc)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dossier::Dossier;

    fn aggregate(statut: Option<&str>, label: Option<&str>) -> EntiteAggregate {
        let now = Utc::now();
        let id = Uuid::new_v4();
        EntiteAggregate {
            entite: entite_model::Model {
                id,
                compte_entreprise_id: None,
                numero_cc: "CC0001".to_string(),
                denomination: "Société Test".to_string(),
                forme_juridique: None,
                secteur_activite: None,
                adresse: None,
                ville: None,
                region: None,
                telephone: None,
                email: None,
                origine_saisie: "auto_recensement".to_string(),
                publie_sur_carte: false,
                dossier: Dossier::default(),
                created_at: now,
                updated_at: now,
            },
            workflow: statut.map(|s| entite_workflow_model::Model {
                entite_id: id,
                statut: s.to_string(),
                numero_autorisation: None,
                date_soumission: None,
                date_validation: None,
                date_publication: None,
                date_rejet: None,
                motif_rejet: None,
                created_by: None,
                assigned_to: None,
                created_at: now,
                updated_at: now,
            }),
            conformite: label.map(|l| entite_conformite_model::Model {
                entite_id: id,
                score: 0,
                statut_conformite: Some(l.to_string()),
                a_dpo: false,
                type_dpo: None,
                effectif_entreprise: None,
                volume_donnees_traitees: None,
                delai_mise_en_conformite: None,
                updated_at: now,
            }),
        }
    }

    #[test]
    fn test_aggregate_defaults_to_brouillon() {
        let agg = aggregate(None, None);
        assert_eq!(agg.statut_workflow(), StatutWorkflow::Brouillon);
        assert_eq!(agg.statut_conformite(), None);
        assert!(!agg.is_conforme());
    }

    #[test]
    fn test_aggregate_reads_labels() {
        let agg = aggregate(Some("publie"), Some("Conforme"));
        assert_eq!(agg.statut_workflow(), StatutWorkflow::Publie);
        assert!(agg.is_conforme());

        let agg = aggregate(Some("soumis"), Some("Démarche en cours"));
        assert_eq!(agg.statut_conformite(), Some(StatutConformite::DemarcheEnCours));
        assert!(!agg.is_conforme());
    }
}
