// src/repository/assignation_repository.rs

use crate::domain::assignation_model::{self, Entity as AssignationEntity};
use crate::domain::demande_status::StatutAssignation;
use chrono::NaiveDate;
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AssignationRepository {
    db: DbConn,
}

impl AssignationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<assignation_model::Model>, DbErr> {
        AssignationEntity::find_by_id(id).one(&self.db).await
    }

    /// 担当者の担当一覧（期限順）
    pub async fn find_by_agent(
        &self,
        agent_id: Uuid,
    ) -> Result<Vec<assignation_model::Model>, DbErr> {
        AssignationEntity::find()
            .filter(assignation_model::Column::AgentId.eq(agent_id))
            .order_by(assignation_model::Column::Echeance, Order::Asc)
            .all(&self.db)
            .await
    }

    pub async fn find_by_statut_paginated(
        &self,
        statut: StatutAssignation,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<assignation_model::Model>, u64), DbErr> {
        let query = AssignationEntity::find()
            .filter(assignation_model::Column::Statut.eq(statut.as_str()));

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(assignation_model::Column::TraiteLe, Order::Asc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }

    pub async fn count_by_statut(&self, statut: StatutAssignation) -> Result<u64, DbErr> {
        AssignationEntity::find()
            .filter(assignation_model::Column::Statut.eq(statut.as_str()))
            .count(&self.db)
            .await
    }

    /// 期限切れの en_cours を en_retard に更新し、件数を返す
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, DbErr> {
        let result = AssignationEntity::update_many()
            .col_expr(
                assignation_model::Column::Statut,
                Expr::value(StatutAssignation::EnRetard.as_str()),
            )
            .filter(assignation_model::Column::Statut.eq(StatutAssignation::EnCours.as_str()))
            .filter(assignation_model::Column::Echeance.lt(today))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
