// src/api/dto/entite_dto.rs

use crate::domain::document_joint_model;
use crate::domain::dossier::{Contact, Dossier, DossierPatch, Finalite};
use crate::domain::entite_workflow_model;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::domain::renouvellement_model;
use crate::domain::workflow_status::{StatutConformite, StatutWorkflow};
use crate::repository::entite_repository::{EntiteAggregate, EntiteFilters};
use crate::types::query::deserialize_optional_bool;
use crate::types::PaginationQuery;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// --- リクエストDTO ---

/// エンティティ作成（申告内容のセクションはトップレベルに並ぶ）
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEntiteRequest {
    #[validate(length(min = 2, max = 255, message = "La dénomination doit contenir entre 2 et 255 caractères."))]
    pub denomination: String,

    #[validate(length(min = 2, max = 50, message = "Le numéro CC doit contenir entre 2 et 50 caractères."))]
    pub numero_cc: String,

    #[validate(length(max = 100))]
    pub forme_juridique: Option<String>,
    #[validate(length(max = 100))]
    pub secteur_activite: Option<String>,
    #[validate(length(max = 500))]
    pub adresse: Option<String>,
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 20))]
    pub telephone: Option<String>,
    #[validate(email(message = "Adresse email invalide."))]
    pub email: Option<String>,

    pub effectif_entreprise: Option<String>,
    pub volume_donnees_traitees: Option<String>,
    pub delai_mise_en_conformite: Option<String>,

    #[serde(flatten)]
    #[validate(nested)]
    pub dossier: DossierPatch,
}

/// エンティティ部分更新
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEntiteRequest {
    #[validate(length(min = 2, max = 255, message = "La dénomination doit contenir entre 2 et 255 caractères."))]
    pub denomination: Option<String>,
    #[validate(length(max = 100))]
    pub forme_juridique: Option<String>,
    #[validate(length(max = 100))]
    pub secteur_activite: Option<String>,
    #[validate(length(max = 500))]
    pub adresse: Option<String>,
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
    #[validate(length(max = 20))]
    pub telephone: Option<String>,
    #[validate(email(message = "Adresse email invalide."))]
    pub email: Option<String>,

    pub effectif_entreprise: Option<String>,
    pub volume_donnees_traitees: Option<String>,
    pub delai_mise_en_conformite: Option<String>,

    #[serde(flatten)]
    #[validate(nested)]
    pub dossier: DossierPatch,
}

/// 管理画面の一覧クエリ
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntiteListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub forme_juridique: Option<String>,
    pub origine_saisie: Option<OrigineSaisie>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub publie_sur_carte: Option<bool>,
    /// カンマ区切り
    pub statut_conformite: Option<String>,
    pub statut_workflow: Option<StatutWorkflow>,
}

impl EntiteListQuery {
    pub fn to_filters(&self) -> EntiteFilters {
        EntiteFilters {
            search: non_empty(&self.search),
            secteur_activite: non_empty(&self.secteur_activite),
            ville: non_empty(&self.ville),
            region: non_empty(&self.region),
            forme_juridique: non_empty(&self.forme_juridique),
            origine_saisie: self.origine_saisie,
            publie_sur_carte: self.publie_sur_carte,
            statut_conformite: self
                .statut_conformite
                .as_deref()
                .map(StatutConformite::parse_list)
                .unwrap_or_default(),
            statut_workflow: self.statut_workflow,
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// 状態遷移リクエスト
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TransitionRequest {
    pub statut: StatutWorkflow,
    #[validate(length(max = 2000))]
    pub commentaire: Option<String>,
}

// --- レスポンスDTO ---

#[derive(Debug, Clone, Serialize)]
pub struct FinaliteTop {
    pub nom: String,
    pub pourcentage: i32,
}

/// 一覧表示用の要約
#[derive(Debug, Clone, Serialize)]
pub struct EntiteSummaryResponse {
    pub id: Uuid,
    pub denomination: String,
    pub numero_cc: String,
    pub forme_juridique: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub origine_saisie: String,
    pub publie_sur_carte: bool,
    pub statut_conformite: Option<String>,
    pub statut_workflow: Option<String>,
    pub score_conformite: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub a_dpo: Option<bool>,
    pub finalite_principale: Option<String>,
    pub finalites_top: Vec<FinaliteTop>,
    pub numero_autorisation: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&EntiteAggregate> for EntiteSummaryResponse {
    fn from(agg: &EntiteAggregate) -> Self {
        let entite = &agg.entite;
        let localisation = entite.dossier.localisation.as_ref();
        let finalites_top: Vec<FinaliteTop> = entite
            .dossier
            .top_finalites(3)
            .into_iter()
            .map(|f| FinaliteTop {
                nom: f.finalite.clone(),
                pourcentage: f.pourcentage.unwrap_or(0),
            })
            .collect();

        Self {
            id: entite.id,
            denomination: entite.denomination.clone(),
            numero_cc: entite.numero_cc.clone(),
            forme_juridique: entite.forme_juridique.clone(),
            secteur_activite: entite.secteur_activite.clone(),
            ville: entite.ville.clone(),
            region: entite.region.clone(),
            origine_saisie: entite.origine_saisie.clone(),
            publie_sur_carte: entite.publie_sur_carte,
            statut_conformite: agg.conformite.as_ref().and_then(|c| c.statut_conformite.clone()),
            statut_workflow: agg.workflow.as_ref().map(|w| w.statut.clone()),
            score_conformite: agg.conformite.as_ref().map(|c| c.score),
            latitude: localisation.and_then(|l| l.latitude),
            longitude: localisation.and_then(|l| l.longitude),
            a_dpo: agg.conformite.as_ref().map(|c| c.a_dpo),
            finalite_principale: finalites_top.first().map(|f| f.nom.clone()),
            finalites_top,
            numero_autorisation: agg
                .workflow
                .as_ref()
                .and_then(|w| w.numero_autorisation.clone()),
            created_at: entite.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConformiteResponse {
    pub score_conformite: i32,
    pub statut_conformite: Option<String>,
    pub a_dpo: bool,
    pub type_dpo: Option<String>,
    pub effectif_entreprise: Option<String>,
    pub volume_donnees_traitees: Option<String>,
    pub delai_mise_en_conformite: Option<String>,
}

/// 詳細表示（管理画面・企業ポータル）
#[derive(Debug, Clone, Serialize)]
pub struct EntiteDetailResponse {
    pub id: Uuid,
    pub compte_entreprise_id: Option<Uuid>,
    pub denomination: String,
    pub numero_cc: String,
    pub forme_juridique: Option<String>,
    pub secteur_activite: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub origine_saisie: String,
    pub publie_sur_carte: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub workflow: Option<entite_workflow_model::Model>,
    pub conformite: Option<ConformiteResponse>,
    #[serde(flatten)]
    pub dossier: Dossier,
    pub documents: Vec<document_joint_model::Model>,
    pub renouvellements: Vec<renouvellement_model::Model>,
}

impl EntiteDetailResponse {
    pub fn new(
        agg: EntiteAggregate,
        documents: Vec<document_joint_model::Model>,
        renouvellements: Vec<renouvellement_model::Model>,
    ) -> Self {
        let EntiteAggregate {
            entite,
            workflow,
            conformite,
        } = agg;

        Self {
            id: entite.id,
            compte_entreprise_id: entite.compte_entreprise_id,
            denomination: entite.denomination,
            numero_cc: entite.numero_cc,
            forme_juridique: entite.forme_juridique,
            secteur_activite: entite.secteur_activite,
            adresse: entite.adresse,
            ville: entite.ville,
            region: entite.region,
            telephone: entite.telephone,
            email: entite.email,
            origine_saisie: entite.origine_saisie,
            publie_sur_carte: entite.publie_sur_carte,
            created_at: entite.created_at,
            updated_at: entite.updated_at,
            workflow,
            conformite: conformite.map(|c| ConformiteResponse {
                score_conformite: c.score,
                statut_conformite: c.statut_conformite,
                a_dpo: c.a_dpo,
                type_dpo: c.type_dpo,
                effectif_entreprise: c.effectif_entreprise,
                volume_donnees_traitees: c.volume_donnees_traitees,
                delai_mise_en_conformite: c.delai_mise_en_conformite,
            }),
            dossier: entite.dossier,
            documents,
            renouvellements,
        }
    }
}

/// 公開用の詳細（内部の審査情報は含めない）
#[derive(Debug, Clone, Serialize)]
pub struct PublicEntiteDetailResponse {
    pub id: Uuid,
    pub denomination: String,
    pub numero_cc: String,
    pub forme_juridique: Option<String>,
    pub secteur_activite: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub statut_conformite: Option<String>,
    pub score_conformite: Option<i32>,
    pub a_dpo: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact: Option<Contact>,
    pub finalites: Vec<Finalite>,
}

impl From<EntiteAggregate> for PublicEntiteDetailResponse {
    fn from(agg: EntiteAggregate) -> Self {
        let entite = agg.entite;
        let localisation = entite.dossier.localisation.as_ref();
        Self {
            latitude: localisation.and_then(|l| l.latitude),
            longitude: localisation.and_then(|l| l.longitude),
            id: entite.id,
            denomination: entite.denomination,
            numero_cc: entite.numero_cc,
            forme_juridique: entite.forme_juridique,
            secteur_activite: entite.secteur_activite,
            adresse: entite.adresse,
            ville: entite.ville,
            region: entite.region,
            telephone: entite.telephone,
            email: entite.email,
            statut_conformite: agg.conformite.as_ref().and_then(|c| c.statut_conformite.clone()),
            score_conformite: agg.conformite.as_ref().map(|c| c.score),
            a_dpo: agg.conformite.as_ref().map(|c| c.a_dpo),
            contact: entite.dossier.contact,
            finalites: entite.dossier.finalites,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_to_filters() {
        let query: EntiteListQuery = serde_json::from_value(serde_json::json!({
            "search": "  ",
            "ville": "Abidjan",
            "statut_conformite": "Conforme,Inconnu",
            "statut_workflow": "soumis",
            "publie_sur_carte": "true",
            "page": "2"
        }))
        .unwrap();

        let filters = query.to_filters();
        assert_eq!(filters.search, None);
        assert_eq!(filters.ville.as_deref(), Some("Abidjan"));
        assert_eq!(filters.statut_conformite, vec![StatutConformite::Conforme]);
        assert_eq!(filters.statut_workflow, Some(StatutWorkflow::Soumis));
        assert_eq!(filters.publie_sur_carte, Some(true));
        assert_eq!(query.pagination.get_pagination().0, 2);
    }

    #[test]
    fn test_create_request_reads_flat_sections() {
        let req: CreateEntiteRequest = serde_json::from_value(serde_json::json!({
            "denomination": "Orange CI",
            "numero_cc": "CC-123",
            "dpos": [{"nom": "Koné", "type": "interne"}],
            "securite": {"politique_securite": true}
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        assert_eq!(req.dossier.dpos.as_ref().map(Vec::len), Some(1));
        assert!(req.dossier.securite.is_some());
        assert!(req.dossier.finalites.is_none());
    }
}
