// src/service/public_service.rs

use crate::api::dto::entite_dto::{EntiteSummaryResponse, PublicEntiteDetailResponse};
use crate::api::dto::public_dto::{ExportQuery, PublicListQuery};
use crate::error::{AppError, AppResult};
use crate::repository::entite_repository::{EntiteAggregate, EntiteOrder, EntiteRepository};
use crate::shared::types::PaginatedResponse;
use crate::utils::csv::CsvWriter;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const EXPORT_COLUMNS: [&str; 13] = [
    "Entité",
    "N° CC",
    "Forme juridique",
    "Secteur d'activité",
    "Adresse",
    "Ville",
    "Région",
    "Téléphone",
    "Email",
    "Statut conformité",
    "Score",
    "DPO",
    "Autorisation ARTCI",
];

/// 書き出したファイル
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub content: String,
}

/// 公開レジストリ（地図・一覧・書き出し）
pub struct PublicService {
    entite_repo: Arc<EntiteRepository>,
}

impl PublicService {
    pub fn new(entite_repo: Arc<EntiteRepository>) -> Self {
        Self { entite_repo }
    }

    pub async fn list(
        &self,
        query: &PublicListQuery,
    ) -> AppResult<PaginatedResponse<EntiteSummaryResponse>> {
        let (page, per_page) = query.pagination.get_pagination();
        let (items, total) = self
            .entite_repo
            .find_paginated(&query.to_filters(), EntiteOrder::Denomination, page, per_page)
            .await?;
        let items = items.iter().map(EntiteSummaryResponse::from).collect();
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    /// 適合エンティティのみ公開
    pub async fn detail(&self, id: Uuid) -> AppResult<PublicEntiteDetailResponse> {
        let aggregate = self
            .entite_repo
            .find_with_details(id)
            .await?
            .filter(EntiteAggregate::is_conforme)
            .ok_or_else(|| AppError::NotFound("Entité non trouvée.".to_string()))?;
        Ok(aggregate.into())
    }

    pub async fn export(&self, query: &ExportQuery) -> AppResult<ExportFile> {
        if !query.format.eq_ignore_ascii_case("csv") {
            return Err(AppError::BadRequest(format!(
                "Format d'export non supporté : {}. Formats disponibles : csv",
                query.format
            )));
        }

        let filters = query.to_filters();
        let entites = self
            .entite_repo
            .find_all(&filters, EntiteOrder::Denomination)
            .await?;

        let content = render_csv(&entites);
        info!(count = entites.len(), "Public registry exported");

        Ok(ExportFile {
            filename: format!("registre_dcp_{}.csv", Utc::now().format("%Y%m%d")),
            content_type: "text/csv; charset=utf-8",
            content,
        })
    }
}

fn render_csv(entites: &[EntiteAggregate]) -> String {
    let mut writer = CsvWriter::with_bom(';');
    writer.write_row(EXPORT_COLUMNS);

    for aggregate in entites {
        let entite = &aggregate.entite;
        let conformite = aggregate.conformite.as_ref();
        let a_dpo = conformite.is_some_and(|c| c.a_dpo);
        writer.write_row([
            entite.denomination.clone(),
            entite.numero_cc.clone(),
            entite.forme_juridique.clone().unwrap_or_default(),
            entite.secteur_activite.clone().unwrap_or_default(),
            entite.adresse.clone().unwrap_or_default(),
            entite.ville.clone().unwrap_or_default(),
            entite.region.clone().unwrap_or_default(),
            entite.telephone.clone().unwrap_or_default(),
            entite.email.clone().unwrap_or_default(),
            conformite
                .and_then(|c| c.statut_conformite.clone())
                .unwrap_or_default(),
            conformite.map(|c| c.score.to_string()).unwrap_or_default(),
            if a_dpo { "Oui" } else { "Non" }.to_string(),
            aggregate
                .workflow
                .as_ref()
                .and_then(|w| w.numero_autorisation.clone())
                .unwrap_or_default(),
        ]);
    }

    writer.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dossier::Dossier;
    use crate::domain::entite_conformite_model;
    use crate::domain::entite_model;
    use crate::utils::csv::UTF8_BOM;

    fn aggregate(denomination: &str, a_dpo: bool) -> EntiteAggregate {
        let now = Utc::now();
        let id = Uuid::new_v4();
        EntiteAggregate {
            entite: entite_model::Model {
                id,
                compte_entreprise_id: None,
                numero_cc: "CI-0001".to_string(),
                denomination: denomination.to_string(),
                forme_juridique: Some("SA".to_string()),
                secteur_activite: Some("Banque".to_string()),
                adresse: None,
                ville: Some("Abidjan".to_string()),
                region: None,
                telephone: None,
                email: None,
                origine_saisie: "saisie_artci".to_string(),
                publie_sur_carte: true,
                dossier: Dossier::default(),
                created_at: now,
                updated_at: now,
            },
            workflow: None,
            conformite: Some(entite_conformite_model::Model {
                entite_id: id,
                score: 85,
                statut_conformite: Some("Conforme".to_string()),
                a_dpo,
                type_dpo: None,
                effectif_entreprise: None,
                volume_donnees_traitees: None,
                delai_mise_en_conformite: None,
                updated_at: now,
            }),
        }
    }

    #[test]
    fn test_render_csv_layout() {
        let csv = render_csv(&[aggregate("Banque; Atlantique", true), aggregate("Orange", false)]);
        assert!(csv.starts_with(UTF8_BOM));

        let lines: Vec<&str> = csv.trim_start_matches(UTF8_BOM).lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Entité;N° CC;Forme juridique"));
        assert!(lines[1].starts_with("\"Banque; Atlantique\";CI-0001;SA;Banque"));
        assert!(lines[1].contains(";Conforme;85;Oui;"));
        assert!(lines[2].contains(";Non;"));
    }
}
