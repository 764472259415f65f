// src/repository/historique_repository.rs

use crate::domain::historique_statut_model::{self, Entity as HistoriqueEntity};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct HistoriqueFilters {
    pub entite_id: Option<Uuid>,
    pub modifie_par: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct HistoriqueRepository {
    db: DbConn,
}

impl HistoriqueRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_entite(
        &self,
        entite_id: Uuid,
    ) -> Result<Vec<historique_statut_model::Model>, DbErr> {
        HistoriqueEntity::find()
            .filter(historique_statut_model::Column::EntiteId.eq(entite_id))
            .order_by(historique_statut_model::Column::DateChangement, Order::Asc)
            .all(&self.db)
            .await
    }

    pub async fn find_paginated(
        &self,
        filters: &HistoriqueFilters,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<historique_statut_model::Model>, u64), DbErr> {
        let mut query = HistoriqueEntity::find();
        if let Some(entite_id) = filters.entite_id {
            query = query.filter(historique_statut_model::Column::EntiteId.eq(entite_id));
        }
        if let Some(user_id) = filters.modifie_par {
            query = query.filter(historique_statut_model::Column::ModifiePar.eq(user_id));
        }

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(historique_statut_model::Column::DateChangement, Order::Desc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }
}
