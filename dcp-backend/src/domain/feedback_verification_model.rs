// src/domain/feedback_verification_model.rs

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{FromJsonQueryResult, Set};
use serde::{Deserialize, Serialize};

/// 不足書類の一覧（JSONB）
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ElementsManquants(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "feedbacks_verification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub entite_id: Uuid,

    pub agent_id: Option<Uuid>,

    pub date_feedback: DateTime<Utc>,

    #[sea_orm(column_type = "Text")]
    pub commentaires: String,

    #[sea_orm(column_type = "JsonBinary")]
    pub elements_manquants: ElementsManquants,

    pub delai_fourniture: Option<NaiveDate>,
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
            date_feedback: Set(Utc::now()),
            elements_manquants: Set(ElementsManquants::default()),
            ..ActiveModelTrait::default()
        }
    }
}
