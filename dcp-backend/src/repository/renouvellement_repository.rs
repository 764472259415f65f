// src/repository/renouvellement_repository.rs

use crate::domain::demande_status::StatutRenouvellement;
use crate::domain::renouvellement_model::{
    self, ActiveModel as RenouvellementActiveModel, Entity as RenouvellementEntity,
};
use chrono::{NaiveDate, Utc};
use sea_orm::entity::*;
use sea_orm::{
    DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RenouvellementRepository {
    db: DbConn,
}

impl RenouvellementRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<renouvellement_model::Model>, DbErr> {
        RenouvellementEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_entite(
        &self,
        entite_id: Uuid,
    ) -> Result<Vec<renouvellement_model::Model>, DbErr> {
        RenouvellementEntity::find()
            .filter(renouvellement_model::Column::EntiteId.eq(entite_id))
            .order_by(renouvellement_model::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
    }

    /// 未処理の申請が存在するか
    pub async fn has_open_request(&self, entite_id: Uuid) -> Result<bool, DbErr> {
        let count = RenouvellementEntity::find()
            .filter(renouvellement_model::Column::EntiteId.eq(entite_id))
            .filter(renouvellement_model::Column::Statut.is_in([
                StatutRenouvellement::EnAttente.as_str(),
                StatutRenouvellement::EnCours.as_str(),
            ]))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_paginated(
        &self,
        statut: Option<StatutRenouvellement>,
        entite_ids: Option<Vec<Uuid>>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<renouvellement_model::Model>, u64), DbErr> {
        let mut query = RenouvellementEntity::find();
        if let Some(statut) = statut {
            query = query.filter(renouvellement_model::Column::Statut.eq(statut.as_str()));
        }
        if let Some(ids) = entite_ids {
            query = query.filter(renouvellement_model::Column::EntiteId.is_in(ids));
        }

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(renouvellement_model::Column::CreatedAt, Order::Desc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }

    pub async fn create(
        &self,
        entite_id: Uuid,
        date_expiration: Option<NaiveDate>,
        motif: Option<String>,
    ) -> Result<renouvellement_model::Model, DbErr> {
        let demande = RenouvellementActiveModel {
            entite_id: Set(entite_id),
            date_expiration: Set(date_expiration),
            motif: Set(motif),
            ..RenouvellementActiveModel::new()
        };
        demande.insert(&self.db).await
    }

    pub async fn update_statut(
        &self,
        demande: renouvellement_model::Model,
        statut: StatutRenouvellement,
        commentaire: Option<String>,
        traite_par: Uuid,
    ) -> Result<renouvellement_model::Model, DbErr> {
        let mut active: RenouvellementActiveModel = demande.into();
        active.statut = Set(statut.as_str().to_string());
        active.commentaire = Set(commentaire);
        active.traite_par = Set(Some(traite_par));
        active.traite_le = Set(Some(Utc::now()));
        active.update(&self.db).await
    }
}
