// src/api/dto/notification_dto.rs

use crate::domain::notification_type::TypeNotification;
use crate::repository::notification_repository::NotificationFilters;
use crate::types::query::deserialize_optional_bool;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(rename = "type")]
    pub type_notification: Option<TypeNotification>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub lue: Option<bool>,
}

impl From<NotificationQuery> for NotificationFilters {
    fn from(query: NotificationQuery) -> Self {
        Self {
            type_notification: query.type_notification,
            lue: query.lue,
        }
    }
}
