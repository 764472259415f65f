// src/repository/rapprochement_repository.rs

use crate::domain::demande_rapprochement_model::{
    self, ActiveModel as RapprochementActiveModel, Entity as RapprochementEntity,
};
use crate::domain::demande_status::StatutRapprochement;
use sea_orm::entity::*;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RapprochementRepository {
    db: DbConn,
}

impl RapprochementRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<demande_rapprochement_model::Model>, DbErr> {
        RapprochementEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_compte(
        &self,
        compte_id: Uuid,
    ) -> Result<Vec<demande_rapprochement_model::Model>, DbErr> {
        RapprochementEntity::find()
            .filter(demande_rapprochement_model::Column::CompteEntrepriseId.eq(compte_id))
            .order_by(demande_rapprochement_model::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
    }

    /// 同じエンティティへの未処理申請があるか
    pub async fn has_pending(&self, compte_id: Uuid, entite_id: Uuid) -> Result<bool, DbErr> {
        let count = RapprochementEntity::find()
            .filter(demande_rapprochement_model::Column::CompteEntrepriseId.eq(compte_id))
            .filter(demande_rapprochement_model::Column::EntiteId.eq(entite_id))
            .filter(
                demande_rapprochement_model::Column::Statut
                    .eq(StatutRapprochement::EnAttente.as_str()),
            )
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn find_paginated(
        &self,
        statut: Option<StatutRapprochement>,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<demande_rapprochement_model::Model>, u64), DbErr> {
        let mut query = RapprochementEntity::find();
        if let Some(statut) = statut {
            query = query.filter(demande_rapprochement_model::Column::Statut.eq(statut.as_str()));
        }
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(
                    demande_rapprochement_model::Column::NumeroCc,
                )))
                .like(format!("%{}%", search.to_lowercase())),
            );
        }

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(demande_rapprochement_model::Column::CreatedAt, Order::Desc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }

    pub async fn create(
        &self,
        compte_id: Uuid,
        entite_id: Uuid,
        numero_cc: String,
        raison: String,
        document_preuve_id: Option<Uuid>,
    ) -> Result<demande_rapprochement_model::Model, DbErr> {
        let demande = RapprochementActiveModel {
            compte_entreprise_id: Set(compte_id),
            entite_id: Set(entite_id),
            numero_cc: Set(numero_cc),
            raison: Set(raison),
            document_preuve_id: Set(document_preuve_id),
            ..RapprochementActiveModel::new()
        };
        demande.insert(&self.db).await
    }
}
