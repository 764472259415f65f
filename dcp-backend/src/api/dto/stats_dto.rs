// src/api/dto/stats_dto.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub date_debut: Option<NaiveDate>,
    pub date_fin: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStatsResponse {
    pub total_entites: u64,
    pub par_statut_workflow: BTreeMap<String, i64>,
    pub par_statut_conformite: BTreeMap<String, i64>,
    pub par_secteur: BTreeMap<String, i64>,
    pub par_region: BTreeMap<String, i64>,
    pub par_origine: BTreeMap<String, i64>,
    pub assignations_en_cours: u64,
    pub assignations_en_retard: u64,
    pub utilisateurs_actifs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicStatsResponse {
    pub total_entites_conformes: i64,
    pub total_demarche_achevee: i64,
    pub total_demarche_en_cours: i64,
    pub par_secteur: BTreeMap<String, i64>,
    pub par_region: BTreeMap<String, i64>,
    pub par_ville: BTreeMap<String, i64>,
}
