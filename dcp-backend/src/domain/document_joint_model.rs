// src/domain/document_joint_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// アップロードされた添付書類
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents_joints")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub entite_id: Option<Uuid>,

    pub compte_entreprise_id: Option<Uuid>,

    pub type_document: String,

    pub nom_fichier: String,

    #[serde(skip_serializing)]
    pub chemin_fichier: String,

    pub taille: i64,

    pub mime_type: String,

    pub statut: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub commentaire: Option<String>,

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
            statut: Set("en_attente".to_string()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}
