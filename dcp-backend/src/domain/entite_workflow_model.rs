// src/domain/entite_workflow_model.rs

use super::workflow_status::StatutWorkflow;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entites_workflow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub entite_id: Uuid,

    pub statut: String,

    pub numero_autorisation: Option<String>,

    pub date_soumission: Option<DateTime<Utc>>,
    pub date_validation: Option<DateTime<Utc>>,
    pub date_publication: Option<DateTime<Utc>>,
    pub date_rejet: Option<DateTime<Utc>>,

    #[sea_orm(column_type = "Text", nullable)]
    pub motif_rejet: Option<String>,

    pub created_by: Option<Uuid>,

    pub assigned_to: Option<Uuid>,

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
            statut: Set(StatutWorkflow::Brouillon.as_str().to_string()),
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
    /// 保存値が壊れている場合は下書き扱い
    pub fn statut_workflow(&self) -> StatutWorkflow {
        StatutWorkflow::from_str(&self.statut).unwrap_or(StatutWorkflow::Brouillon)
    }
}
