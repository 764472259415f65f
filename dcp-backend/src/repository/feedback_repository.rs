// src/repository/feedback_repository.rs

use crate::domain::feedback_verification_model::{self, Entity as FeedbackEntity};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    db: DbConn,
}

impl FeedbackRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_paginated(
        &self,
        entite_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<feedback_verification_model::Model>, u64), DbErr> {
        let mut query = FeedbackEntity::find();
        if let Some(entite_id) = entite_id {
            query = query.filter(feedback_verification_model::Column::EntiteId.eq(entite_id));
        }

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(feedback_verification_model::Column::DateFeedback, Order::Desc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }

    pub async fn find_by_entite(
        &self,
        entite_id: Uuid,
    ) -> Result<Vec<feedback_verification_model::Model>, DbErr> {
        FeedbackEntity::find()
            .filter(feedback_verification_model::Column::EntiteId.eq(entite_id))
            .order_by(feedback_verification_model::Column::DateFeedback, Order::Desc)
            .all(&self.db)
            .await
    }

    pub async fn count_by_entite(&self, entite_id: Uuid) -> Result<u64, DbErr> {
        FeedbackEntity::find()
            .filter(feedback_verification_model::Column::EntiteId.eq(entite_id))
            .count(&self.db)
            .await
    }
}
