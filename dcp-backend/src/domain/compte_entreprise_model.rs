// src/domain/compte_entreprise_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

/// 企業アカウント
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comptes_entreprises")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,

    #[serde(skip_serializing)]
    pub password_hash: String,

    pub denomination: String,

    #[sea_orm(unique)]
    pub numero_cc: String,

    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,

    pub email_verified: bool,

    pub is_active: bool,

    pub password_last_changed: Option<DateTime<Utc>>,

    pub password_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::otp_code_model::Entity")]
    OtpCodes,
}

impl Related<super::otp_code_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpCodes.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            is_active: Set(true),
            email_verified: Set(false),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    /// パスワードの有効期限が切れているか
    pub fn is_password_expired(&self) -> bool {
        self.password_expires_at
            .is_some_and(|expires_at| expires_at < Utc::now())
    }
}

/// レスポンス用の企業アカウント情報
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeCompte {
    pub id: Uuid,
    pub email: String,
    pub denomination: String,
    pub numero_cc: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub email_verified: bool,
    pub is_active: bool,
    pub password_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for SafeCompte {
    fn from(compte: Model) -> Self {
        Self {
            id: compte.id,
            email: compte.email,
            denomination: compte.denomination,
            numero_cc: compte.numero_cc,
            telephone: compte.telephone,
            adresse: compte.adresse,
            ville: compte.ville,
            region: compte.region,
            email_verified: compte.email_verified,
            is_active: compte.is_active,
            password_expires_at: compte.password_expires_at,
            created_at: compte.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn compte(expires_at: Option<DateTime<Utc>>) -> Model {
        Model {
            id: Uuid::new_v4(),
            email: "contact@societe.ci".to_string(),
            password_hash: "hash".to_string(),
            denomination: "Société".to_string(),
            numero_cc: "CC-001".to_string(),
            telephone: None,
            adresse: None,
            ville: None,
            region: None,
            email_verified: true,
            is_active: true,
            password_last_changed: None,
            password_expires_at: expires_at,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_expiry() {
        assert!(!compte(None).is_password_expired());
        assert!(!compte(Some(Utc::now() + Duration::days(1))).is_password_expired());
        assert!(compte(Some(Utc::now() - Duration::minutes(1))).is_password_expired());
    }

    #[test]
    fn test_safe_compte_hides_hash() {
        let json = serde_json::to_value(compte(None)).unwrap();
        assert!(json.get("password_hash").is_none());
        let safe = serde_json::to_value(SafeCompte::from(compte(None))).unwrap();
        assert_eq!(safe["numero_cc"], "CC-001");
    }
}
