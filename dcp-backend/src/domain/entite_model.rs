// src/domain/entite_model.rs

use super::dossier::Dossier;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

/// 登録エンティティ（データ管理者）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(nullable)]
    pub compte_entreprise_id: Option<Uuid>,

    #[sea_orm(unique)]
    pub numero_cc: String,

    pub denomination: String,
    pub forme_juridique: Option<String>,
    pub secteur_activite: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,

    pub origine_saisie: String,

    pub publie_sur_carte: bool,

    #[sea_orm(column_type = "JsonBinary")]
    pub dossier: Dossier,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::entite_workflow_model::Entity")]
    Workflow,

    #[sea_orm(has_one = "super::entite_conformite_model::Entity")]
    Conformite,

    #[sea_orm(
        belongs_to = "super::compte_entreprise_model::Entity",
        from = "Column::CompteEntrepriseId",
        to = "super::compte_entreprise_model::Column::Id",
        on_delete = "SetNull"
    )]
    CompteEntreprise,
}

impl Related<super::entite_workflow_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Workflow.def()
    }
}

impl Related<super::entite_conformite_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Conformite.def()
    }
}

impl Related<super::compte_entreprise_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompteEntreprise.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            publie_sur_carte: Set(false),
            dossier: Set(Dossier::default()),
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
