// src/service/stats_service.rs

use crate::api::dto::stats_dto::{AdminStatsResponse, PublicStatsResponse, StatsQuery};
use crate::domain::demande_status::StatutAssignation;
use crate::domain::entite_model;
use crate::domain::workflow_status::StatutConformite;
use crate::error::{AppError, AppResult};
use crate::repository::assignation_repository::AssignationRepository;
use crate::repository::entite_repository::{DateRange, EntiteFilters, EntiteRepository};
use crate::repository::user_repository::UserRepository;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// 集計サービス（管理ダッシュボード・公開統計）
pub struct StatsService {
    entite_repo: Arc<EntiteRepository>,
    assignation_repo: Arc<AssignationRepository>,
    user_repo: Arc<UserRepository>,
}

impl StatsService {
    pub fn new(
        entite_repo: Arc<EntiteRepository>,
        assignation_repo: Arc<AssignationRepository>,
        user_repo: Arc<UserRepository>,
    ) -> Self {
        Self {
            entite_repo,
            assignation_repo,
            user_repo,
        }
    }

    pub async fn admin_stats(&self, query: &StatsQuery) -> AppResult<AdminStatsResponse> {
        let range = date_range(query)?;
        let all = EntiteFilters::default();

        let total_entites = self.entite_repo.count(range).await?;
        let par_statut_workflow = into_map(self.entite_repo.count_by_statut_workflow(range).await?);
        let par_statut_conformite =
            into_map(self.entite_repo.count_by_statut_conformite(&all, range).await?);
        let par_secteur = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::SecteurActivite, &all, range)
                .await?,
        );
        let par_region = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::Region, &all, range)
                .await?,
        );
        let par_origine = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::OrigineSaisie, &all, range)
                .await?,
        );

        Ok(AdminStatsResponse {
            total_entites,
            par_statut_workflow,
            par_statut_conformite,
            par_secteur,
            par_region,
            par_origine,
            assignations_en_cours: self
                .assignation_repo
                .count_by_statut(StatutAssignation::EnCours)
                .await?,
            assignations_en_retard: self
                .assignation_repo
                .count_by_statut(StatutAssignation::EnRetard)
                .await?,
            utilisateurs_actifs: self.user_repo.count_active().await?,
        })
    }

    /// 公開統計。地域別などの内訳は適合エンティティのみ
    pub async fn public_stats(&self) -> AppResult<PublicStatsResponse> {
        let range = DateRange::default();
        let par_label = into_map(
            self.entite_repo
                .count_by_statut_conformite(&EntiteFilters::default(), range)
                .await?,
        );
        let label_count = |label: StatutConformite| par_label.get(label.as_str()).copied().unwrap_or(0);

        let conformes = EntiteFilters {
            statut_conformite: vec![StatutConformite::Conforme],
            ..Default::default()
        };
        let par_secteur = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::SecteurActivite, &conformes, range)
                .await?,
        );
        let par_region = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::Region, &conformes, range)
                .await?,
        );
        let par_ville = into_map(
            self.entite_repo
                .count_by_entite_column(entite_model::Column::Ville, &conformes, range)
                .await?,
        );

        Ok(PublicStatsResponse {
            total_entites_conformes: label_count(StatutConformite::Conforme),
            total_demarche_achevee: label_count(StatutConformite::DemarcheAchevee),
            total_demarche_en_cours: label_count(StatutConformite::DemarcheEnCours),
            par_secteur,
            par_region,
            par_ville,
        })
    }
}

/// date_debut は 0 時から、date_fin はその日の終わりまでを含む
fn date_range(query: &StatsQuery) -> AppResult<DateRange> {
    if let (Some(debut), Some(fin)) = (query.date_debut, query.date_fin) {
        if debut > fin {
            return Err(AppError::BadRequest(
                "La date de début doit précéder la date de fin.".to_string(),
            ));
        }
    }

    let at = |date: NaiveDate, time: NaiveTime| Utc.from_utc_datetime(&date.and_time(time));
    Ok(DateRange {
        debut: query.date_debut.map(|d| at(d, NaiveTime::MIN)),
        fin: query.date_fin.and_then(|d| {
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).map(|end| at(d, end))
        }),
    })
}

/// NULL・空文字のキーは除外
fn into_map(rows: Vec<(Option<String>, i64)>) -> BTreeMap<String, i64> {
    rows.into_iter()
        .filter_map(|(key, count)| {
            key.filter(|k| !k.trim().is_empty())
                .map(|k| (k, count))
        })
        .fold(BTreeMap::new(), |mut map, (key, count)| {
            *map.entry(key).or_insert(0) += count;
            map
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_map_drops_null_keys() {
        let map = into_map(vec![
            (Some("Banque".to_string()), 3),
            (None, 5),
            (Some("".to_string()), 1),
            (Some("Télécoms".to_string()), 2),
        ]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["Banque"], 3);
        assert_eq!(map["Télécoms"], 2);
    }

    #[test]
    fn test_date_range_bounds() {
        let query = StatsQuery {
            date_debut: NaiveDate::from_ymd_opt(2024, 1, 1),
            date_fin: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        let range = date_range(&query).unwrap();
        assert_eq!(range.debut.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(range.fin.unwrap() > Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 0).unwrap());

        let inverted = StatsQuery {
            date_debut: NaiveDate::from_ymd_opt(2024, 2, 1),
            date_fin: NaiveDate::from_ymd_opt(2024, 1, 1),
        };
        assert!(matches!(date_range(&inverted), Err(AppError::BadRequest(_))));
    }
}
