// src/repository/notification_repository.rs

use crate::domain::notification_model::{self, Entity as NotificationEntity};
use crate::domain::notification_type::TypeNotification;
use crate::domain::principal::PrincipalKind;
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

/// 一覧取得の上限
pub const NOTIFICATION_LIST_LIMIT: u64 = 100;

#[derive(Debug, Clone, Default)]
pub struct NotificationFilters {
    pub type_notification: Option<TypeNotification>,
    pub lue: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DbConn,
}

impl NotificationRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<notification_model::Model>, DbErr> {
        NotificationEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_for(
        &self,
        kind: PrincipalKind,
        destinataire_id: Uuid,
        filters: &NotificationFilters,
    ) -> Result<Vec<notification_model::Model>, DbErr> {
        let mut query = NotificationEntity::find()
            .filter(notification_model::Column::DestinataireType.eq(kind.as_str()))
            .filter(notification_model::Column::DestinataireId.eq(destinataire_id));
        if let Some(type_notification) = filters.type_notification {
            query = query.filter(
                notification_model::Column::TypeNotification.eq(type_notification.as_str()),
            );
        }
        if let Some(lue) = filters.lue {
            query = query.filter(notification_model::Column::Lue.eq(lue));
        }

        query
            .order_by(notification_model::Column::CreatedAt, Order::Desc)
            .limit(NOTIFICATION_LIST_LIMIT)
            .all(&self.db)
            .await
    }

    pub async fn count_unread(
        &self,
        kind: PrincipalKind,
        destinataire_id: Uuid,
    ) -> Result<u64, DbErr> {
        NotificationEntity::find()
            .filter(notification_model::Column::DestinataireType.eq(kind.as_str()))
            .filter(notification_model::Column::DestinataireId.eq(destinataire_id))
            .filter(notification_model::Column::Lue.eq(false))
            .count(&self.db)
            .await
    }

    pub async fn mark_read(
        &self,
        notification: notification_model::Model,
    ) -> Result<notification_model::Model, DbErr> {
        let mut active: notification_model::ActiveModel = notification.into();
        active.lue = Set(true);
        active.update(&self.db).await
    }
}
