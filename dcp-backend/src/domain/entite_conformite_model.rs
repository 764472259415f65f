// src/domain/entite_conformite_model.rs

use super::workflow_status::StatutConformite;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entites_conformite")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entite_id: Uuid,

    pub score: i32,

    pub statut_conformite: Option<String>,

    pub a_dpo: bool,

    pub type_dpo: Option<String>,

    pub effectif_entreprise: Option<String>,

    pub volume_donnees_traitees: Option<String>,

    pub delai_mise_en_conformite: Option<String>,

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
            score: Set(0),
            a_dpo: Set(false),
            updated_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.updated_at = Set(Utc::now());
        Ok(self)
    }
}

impl Model {
    pub fn label(&self) -> Option<StatutConformite> {
        self.statut_conformite
            .as_deref()
            .and_then(StatutConformite::from_str)
    }

    pub fn is_conforme(&self) -> bool {
        self.label() == Some(StatutConformite::Conforme)
    }
}
