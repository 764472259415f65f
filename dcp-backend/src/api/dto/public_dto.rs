// src/api/dto/public_dto.rs

use crate::api::dto::entite_dto::non_empty;
use crate::domain::workflow_status::StatutConformite;
use crate::repository::entite_repository::EntiteFilters;
use crate::types::PaginationQuery;
use serde::{Deserialize, Serialize};

/// 公開一覧クエリ（statut_conformite 省略時は Conforme のみ）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublicListQuery {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub forme_juridique: Option<String>,
    pub statut_conformite: Option<String>,
}

impl PublicListQuery {
    pub fn to_filters(&self) -> EntiteFilters {
        let labels = self
            .statut_conformite
            .as_deref()
            .map(StatutConformite::parse_list)
            .filter(|labels| !labels.is_empty())
            .unwrap_or_else(|| vec![StatutConformite::Conforme]);

        EntiteFilters {
            search: non_empty(&self.search),
            secteur_activite: non_empty(&self.secteur_activite),
            ville: non_empty(&self.ville),
            region: non_empty(&self.region),
            forme_juridique: non_empty(&self.forme_juridique),
            publie_sur_carte: Some(true),
            statut_conformite: labels,
            ..Default::default()
        }
    }
}

/// 書き出しクエリ（一覧と同じ絞り込み、対象は公開済みの Conforme のみ）
#[derive(Debug, Clone, Deserialize)]
pub struct ExportQuery {
    #[serde(default = "default_format")]
    pub format: String,
    pub search: Option<String>,
    pub secteur_activite: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
}

impl Default for ExportQuery {
    fn default() -> Self {
        Self {
            format: default_format(),
            search: None,
            secteur_activite: None,
            ville: None,
            region: None,
        }
    }
}

impl ExportQuery {
    pub fn to_filters(&self) -> EntiteFilters {
        EntiteFilters {
            search: non_empty(&self.search),
            secteur_activite: non_empty(&self.secteur_activite),
            ville: non_empty(&self.ville),
            region: non_empty(&self.region),
            publie_sur_carte: Some(true),
            statut_conformite: vec![StatutConformite::Conforme],
            ..Default::default()
        }
    }
}

fn default_format() -> String {
    "csv".to_string()
}

/// インポート結果の行エラー
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportRowError {
    pub row: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportRowError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_filters_default_to_conforme() {
        let filters = PublicListQuery::default().to_filters();
        assert_eq!(filters.statut_conformite, vec![StatutConformite::Conforme]);
        assert_eq!(filters.publie_sur_carte, Some(true));
    }

    #[test]
    fn test_public_filters_ignore_unknown_labels() {
        let query = PublicListQuery {
            statut_conformite: Some("Démarche en cours, Bidon".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.to_filters().statut_conformite,
            vec![StatutConformite::DemarcheEnCours]
        );

        let query = PublicListQuery {
            statut_conformite: Some("Bidon".to_string()),
            ..Default::default()
        };
        assert_eq!(
            query.to_filters().statut_conformite,
            vec![StatutConformite::Conforme]
        );
    }

    #[test]
    fn test_export_filters_keep_published_conforme_only() {
        let query = ExportQuery {
            search: Some("orange".to_string()),
            ville: Some("  ".to_string()),
            region: Some("Lagunes".to_string()),
            ..Default::default()
        };
        let filters = query.to_filters();
        assert_eq!(filters.search.as_deref(), Some("orange"));
        assert!(filters.ville.is_none());
        assert_eq!(filters.region.as_deref(), Some("Lagunes"));
        assert_eq!(filters.publie_sur_carte, Some(true));
        assert_eq!(filters.statut_conformite, vec![StatutConformite::Conforme]);
        assert_eq!(query.format, "csv");
    }
}
