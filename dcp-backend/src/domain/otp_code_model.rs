// src/domain/otp_code_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "otp_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub compte_entreprise_id: Uuid,

    #[serde(skip_serializing)]
    pub code: String,

    pub otp_type: String,

    pub expires_at: DateTime<Utc>,

    pub used: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::compte_entreprise_model::Entity",
        from = "Column::CompteEntrepriseId",
        to = "super::compte_entreprise_model::Column::Id",
        on_delete = "Cascade"
    )]
    CompteEntreprise,
}

impl Related<super::compte_entreprise_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompteEntreprise.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            used: Set(false),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
