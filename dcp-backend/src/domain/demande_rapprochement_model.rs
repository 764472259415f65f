// src/domain/demande_rapprochement_model.rs

use super::demande_status::StatutRapprochement;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "demandes_rapprochement")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub compte_entreprise_id: Uuid,

    pub entite_id: Uuid,

    pub numero_cc: String,

    #[sea_orm(column_type = "Text")]
    pub raison: String,

    pub document_preuve_id: Option<Uuid>,

    pub statut: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub motif_rejet: Option<String>,

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
            statut: Set(StatutRapprochement::EnAttente.as_str().to_string()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    pub fn statut_rapprochement(&self) -> Option<StatutRapprochement> {
        StatutRapprochement::from_str(&self.statut)
    }
}
