// src/api/dto/demande_dto.rs

use crate::domain::demande_rapprochement_model;
use crate::domain::demande_status::{DecisionDemande, DecisionRapport};
use crate::domain::document_joint_model;
use crate::domain::renouvellement_model;
use crate::types::PaginationQuery;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 申請一覧の共通クエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DemandeListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub statut: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TraiterRapprochementRequest {
    pub action: DecisionDemande,
    #[validate(length(max = 2000))]
    pub motif: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TraiterRenouvellementRequest {
    pub action: DecisionDemande,
    #[validate(length(max = 2000))]
    pub commentaire: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TraiterRapportRequest {
    pub action: DecisionRapport,
    #[validate(length(max = 2000))]
    pub commentaire: Option<String>,
}

/// 企業側の更新申請
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenouvellementCreateRequest {
    #[serde(alias = "date_expiration_agrement")]
    pub date_expiration: Option<NaiveDate>,
    #[validate(length(max = 2000))]
    pub motif: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RapprochementResponse {
    pub id: Uuid,
    pub entite_id: Uuid,
    pub compte_entreprise_id: Uuid,
    pub entreprise_denomination: String,
    pub numero_cc: String,
    pub raison: String,
    pub document_preuve_id: Option<Uuid>,
    pub statut: String,
    pub motif_rejet: Option<String>,
    pub traite_par: Option<Uuid>,
    pub traite_le: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RapprochementResponse {
    pub fn new(demande: demande_rapprochement_model::Model, denomination: Option<String>) -> Self {
        Self {
            id: demande.id,
            entite_id: demande.entite_id,
            compte_entreprise_id: demande.compte_entreprise_id,
            entreprise_denomination: denomination.unwrap_or_default(),
            numero_cc: demande.numero_cc,
            raison: demande.raison,
            document_preuve_id: demande.document_preuve_id,
            statut: demande.statut,
            motif_rejet: demande.motif_rejet,
            traite_par: demande.traite_par,
            traite_le: demande.traite_le,
            created_at: demande.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenouvellementResponse {
    pub id: Uuid,
    pub entite_id: Uuid,
    pub entreprise_denomination: String,
    pub date_expiration: Option<NaiveDate>,
    pub motif: Option<String>,
    pub statut: String,
    pub commentaire: Option<String>,
    pub traite_par: Option<Uuid>,
    pub traite_le: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RenouvellementResponse {
    pub fn new(demande: renouvellement_model::Model, denomination: Option<String>) -> Self {
        Self {
            id: demande.id,
            entite_id: demande.entite_id,
            entreprise_denomination: denomination.unwrap_or_default(),
            date_expiration: demande.date_expiration,
            motif: demande.motif,
            statut: demande.statut,
            commentaire: demande.commentaire,
            traite_par: demande.traite_par,
            traite_le: demande.traite_le,
            created_at: demande.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RapportResponse {
    pub id: Uuid,
    pub entite_id: Option<Uuid>,
    pub entreprise_denomination: String,
    pub type_document: String,
    pub nom_fichier: String,
    pub taille: i64,
    pub date_soumission: DateTime<Utc>,
    pub statut: String,
    pub commentaire: Option<String>,
}

impl RapportResponse {
    pub fn new(doc: document_joint_model::Model, denomination: Option<String>) -> Self {
        Self {
            id: doc.id,
            entite_id: doc.entite_id,
            entreprise_denomination: denomination.unwrap_or_default(),
            type_document: doc.type_document,
            nom_fichier: doc.nom_fichier,
            taille: doc.taille,
            date_soumission: doc.created_at,
            statut: doc.statut,
            commentaire: doc.commentaire,
        }
    }
}
