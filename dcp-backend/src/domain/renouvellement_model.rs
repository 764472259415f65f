// src/domain/renouvellement_model.rs

use super::demande_status::StatutRenouvellement;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "renouvellements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub entite_id: Uuid,

    pub date_expiration: Option<NaiveDate>,

    #[sea_orm(column_type = "Text", nullable)]
    pub motif: Option<String>,

    pub statut: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub commentaire: Option<String>,

    pub traite_par: Option<Uuid>,

    pub traite_le: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::entite_model::Entity",
        from = "Column::EntiteId",
        to = "super::entite_model::Column::Id",
        on_delete = "Cascade"
    )]
    Entite,
}

impl Related<super::entite_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            statut: Set(StatutRenouvellement::EnAttente.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    pub fn statut_renouvellement(&self) -> Option<StatutRenouvellement> {
        StatutRenouvellement::from_str(&self.statut)
    }
}
