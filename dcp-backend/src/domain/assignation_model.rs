// src/domain/assignation_model.rs

use super::demande_status::StatutAssignation;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub entite_id: Uuid,

    pub agent_id: Uuid,

    pub assigne_par: Option<Uuid>,

    pub echeance: NaiveDate,

    pub statut: String,

    pub traite_le: Option<DateTime<Utc>>,

    pub valide_par: Option<Uuid>,

    pub valide_le: Option<DateTime<Utc>>,

    #[sea_orm(column_type = "Text", nullable)]
    pub commentaire_validation: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
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

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            statut: Set(StatutAssignation::EnCours.as_str().to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
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
    pub fn statut_assignation(&self) -> StatutAssignation {
        StatutAssignation::from_str(&self.statut).unwrap_or(StatutAssignation::EnCours)
    }
}
