// src/service/notification_service.rs

use crate::domain::notification_model::{self, ActiveModel as NotificationActiveModel};
use crate::domain::notification_type::TypeNotification;
use crate::domain::principal::{PrincipalClaims, PrincipalKind};
use crate::error::{AppError, AppResult};
use crate::repository::notification_repository::{NotificationFilters, NotificationRepository};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DbErr, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 通知の内容
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub destinataire_type: PrincipalKind,
    pub destinataire_id: Uuid,
    pub type_notification: TypeNotification,
    pub titre: String,
    pub message: String,
    pub entite_id: Option<Uuid>,
}

/// 任意の接続（トランザクション含む）で通知を登録する
pub async fn notify<C: ConnectionTrait>(
    conn: &C,
    notification: NewNotification,
) -> Result<notification_model::Model, DbErr> {
    let model = NotificationActiveModel {
        destinataire_type: Set(notification.destinataire_type.as_str().to_string()),
        destinataire_id: Set(notification.destinataire_id),
        type_notification: Set(notification.type_notification.as_str().to_string()),
        titre: Set(notification.titre),
        message: Set(notification.message),
        entite_id: Set(notification.entite_id),
        ..NotificationActiveModel::new()
    };
    model.insert(conn).await
}

pub struct NotificationService {
    notification_repo: Arc<NotificationRepository>,
}

impl NotificationService {
    pub fn new(notification_repo: Arc<NotificationRepository>) -> Self {
        Self { notification_repo }
    }

    pub async fn list(
        &self,
        principal: &PrincipalClaims,
        filters: NotificationFilters,
    ) -> AppResult<Vec<notification_model::Model>> {
        Ok(self
            .notification_repo
            .find_for(principal.kind, principal.principal_id, &filters)
            .await?)
    }

    pub async fn count_unread(&self, kind: PrincipalKind, id: Uuid) -> AppResult<u64> {
        Ok(self.notification_repo.count_unread(kind, id).await?)
    }

    /// 既読にする（本人宛てのみ）
    pub async fn mark_read(
        &self,
        notification_id: Uuid,
        principal: &PrincipalClaims,
    ) -> AppResult<notification_model::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification non trouvée.".to_string()))?;

        if notification.destinataire_id != principal.principal_id
            || notification.destinataire_type != principal.kind.as_str()
        {
            return Err(AppError::Forbidden(
                "Cette notification ne vous appartient pas.".to_string(),
            ));
        }

        if notification.lue {
            return Ok(notification);
        }

        let updated = self.notification_repo.mark_read(notification).await?;
        info!(notification_id = %updated.id, "Notification marked as read");
        Ok(updated)
    }
}
