// src/api/dto/workflow_dto.rs

use crate::domain::assignation_model;
use crate::domain::demande_status::DecisionValidation;
use crate::domain::entite_model;
use crate::domain::feedback_verification_model;
use crate::domain::user_model;
use crate::domain::user_role::UserRole;
use crate::types::PaginationQuery;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- リクエストDTO ---

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignationCreateRequest {
    pub entite_id: Uuid,
    pub agent_id: Uuid,
    pub echeance: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ValidationN1Request {
    pub action: DecisionValidation,
    #[validate(length(max = 2000))]
    pub commentaire: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackCreateRequest {
    pub entite_id: Uuid,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub commentaires: String,
    #[serde(default)]
    pub elements_manquants: Vec<String>,
    pub delai_fourniture: Option<NaiveDate>,
}

/// 状態変更ログのクエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoriqueQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub entite_id: Option<Uuid>,
    pub modifie_par: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbackListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub entite_id: Option<Uuid>,
}

// --- レスポンスDTO ---

/// ネスト表示用のスタッフ要約
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub nom: String,
    pub prenom: String,
    pub role: UserRole,
}

impl From<&user_model::Model> for UserSummary {
    fn from(user: &user_model::Model) -> Self {
        Self {
            id: user.id,
            nom: user.nom.clone(),
            prenom: user.prenom.clone(),
            role: user.user_role(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignationResponse {
    pub id: Uuid,
    pub entite_id: Uuid,
    pub agent_id: Uuid,
    pub date_assignation: DateTime<Utc>,
    pub echeance: NaiveDate,
    pub statut: String,
    pub traite_le: Option<DateTime<Utc>>,
    pub valide_par: Option<Uuid>,
    pub valide_le: Option<DateTime<Utc>>,
    pub commentaire_validation: Option<String>,
    pub entite_denomination: Option<String>,
    pub entite_numero_cc: Option<String>,
    pub agent: Option<UserSummary>,
}

impl AssignationResponse {
    pub fn new(
        assignation: assignation_model::Model,
        entite: Option<&entite_model::Model>,
        agent: Option<&user_model::Model>,
    ) -> Self {
        Self {
            id: assignation.id,
            entite_id: assignation.entite_id,
            agent_id: assignation.agent_id,
            date_assignation: assignation.created_at,
            echeance: assignation.echeance,
            statut: assignation.statut,
            traite_le: assignation.traite_le,
            valide_par: assignation.valide_par,
            valide_le: assignation.valide_le,
            commentaire_validation: assignation.commentaire_validation,
            entite_denomination: entite.map(|e| e.denomination.clone()),
            entite_numero_cc: entite.map(|e| e.numero_cc.clone()),
            agent: agent.map(UserSummary::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub id: Uuid,
    pub entite_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub date_feedback: DateTime<Utc>,
    pub commentaires: String,
    pub elements_manquants: Vec<String>,
    pub delai_fourniture: Option<NaiveDate>,
    pub agent: Option<UserSummary>,
}

impl FeedbackResponse {
    pub fn new(
        feedback: feedback_verification_model::Model,
        agent: Option<&user_model::Model>,
    ) -> Self {
        Self {
            id: feedback.id,
            entite_id: feedback.entite_id,
            agent_id: feedback.agent_id,
            date_feedback: feedback.date_feedback,
            commentaires: feedback.commentaires,
            elements_manquants: feedback.elements_manquants.0,
            delai_fourniture: feedback.delai_fourniture,
            agent: agent.map(UserSummary::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_action_parsing() {
        let req: ValidationN1Request =
            serde_json::from_str(r#"{"action":"renvoyer","commentaire":"Incomplet"}"#).unwrap();
        assert_eq!(req.action, DecisionValidation::Renvoyer);
        assert!(serde_json::from_str::<ValidationN1Request>(r#"{"action":"ignorer"}"#).is_err());
    }

    #[test]
    fn test_feedback_defaults() {
        let req: FeedbackCreateRequest = serde_json::from_value(serde_json::json!({
            "entite_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(req.elements_manquants.is_empty());
        assert!(req.commentaires.is_empty());
    }
}
