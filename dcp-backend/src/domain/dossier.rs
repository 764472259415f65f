// src/domain/dossier.rs

use chrono::NaiveDate;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

string_enum! {
    pub enum TypeDpo {
        Interne => "interne",
        Externe => "externe",
    }
}

string_enum! {
    /// 取り扱う個人データの区分
    pub enum CategorieDonnees {
        Identite => "identite",
        Contact => "contact",
        Financieres => "financieres",
        Sante => "sante",
        Biometriques => "biometriques",
        Localisation => "localisation",
        Professionnelles => "professionnelles",
        Sensibles => "sensibles",
        Mineurs => "mineurs",
        Autre => "autre",
    }
}

string_enum! {
    /// 処理の法的根拠
    pub enum BaseLegale {
        Consentement => "consentement",
        Contrat => "contrat",
        ObligationLegale => "obligation_legale",
        InteretVital => "interet_vital",
        MissionPublique => "mission_publique",
        InteretLegitime => "interet_legitime",
    }
}

string_enum! {
    pub enum TypeMesure {
        Technique => "technique",
        Organisationnelle => "organisationnelle",
        Physique => "physique",
    }
}

// --- 1:1 セクション ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Contact {
    #[validate(length(max = 200))]
    pub responsable_legal_nom: Option<String>,
    #[validate(length(max = 200))]
    pub responsable_legal_fonction: Option<String>,
    #[validate(email(message = "Email du responsable légal invalide"))]
    pub responsable_legal_email: Option<String>,
    #[validate(length(max = 20))]
    pub responsable_legal_telephone: Option<String>,
    #[validate(length(max = 500))]
    pub site_web: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Localisation {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude invalide"))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude invalide"))]
    pub longitude: Option<f64>,
    pub precision_gps: Option<String>,
    pub methode_geolocalisation: Option<String>,
    #[validate(length(max = 500))]
    pub adresse_complete: Option<String>,
    pub code_postal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Securite {
    pub politique_securite: Option<bool>,
    pub responsable_securite: Option<bool>,
    pub analyse_risques: Option<bool>,
    pub plan_continuite: Option<bool>,
    pub notification_violations: Option<bool>,
    #[validate(range(min = 0))]
    pub nombre_violations_12mois: Option<i32>,
    pub formation_personnel: Option<bool>,
    pub frequence_formation: Option<String>,
    pub dernier_audit: Option<NaiveDate>,
}

// --- 1:N セクション ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ResponsableLegal {
    #[validate(length(min = 1, max = 200, message = "Le nom est requis"))]
    pub nom: String,
    pub prenom: Option<String>,
    pub fonction: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub telephone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Dpo {
    #[validate(length(min = 1, max = 200, message = "Le nom du DPO est requis"))]
    pub nom: String,
    pub prenom: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub telephone: Option<String>,
    #[serde(rename = "type")]
    pub type_dpo: TypeDpo,
    pub organisme: Option<String>,
    pub date_designation: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConformiteAdministrative {
    pub connaissance_loi_2013: Option<bool>,
    pub declaration_artci: Option<bool>,
    pub numero_declaration: Option<String>,
    pub date_declaration: Option<NaiveDate>,
    pub autorisation_artci: Option<bool>,
    pub numero_autorisation: Option<String>,
    pub date_autorisation: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RegistreTraitement {
    #[validate(length(min = 1, max = 255, message = "Le nom du traitement est requis"))]
    pub nom_traitement: String,
    pub description: Option<String>,
    pub finalite: Option<String>,
    pub base_legale: Option<String>,
    pub categories_personnes: Option<String>,
    pub duree_conservation: Option<String>,
    pub destinataires: Option<String>,
    #[serde(default)]
    pub transfert_hors_ci: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CategorieDonneesTraitees {
    pub categorie: CategorieDonnees,
    pub description: Option<String>,
    pub volume_estime: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Finalite {
    #[validate(length(min = 1, max = 255, message = "La finalité est requise"))]
    pub finalite: String,
    pub base_legale: BaseLegale,
    #[validate(range(min = 0, max = 100, message = "Le pourcentage doit être compris entre 0 et 100"))]
    pub pourcentage: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SousTraitant {
    #[validate(length(min = 1, max = 255, message = "Le nom du sous-traitant est requis"))]
    pub nom_sous_traitant: String,
    pub pays: Option<String>,
    pub type_donnees_partagees: Option<String>,
    pub contrat_sous_traitance: Option<bool>,
    pub clauses_protection: Option<bool>,
    pub audit_sous_traitant: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TransfertInternational {
    #[validate(length(min = 1, max = 100, message = "Le pays de destination est requis"))]
    pub pays_destination: String,
    pub organisme_destinataire: Option<String>,
    pub base_juridique: Option<String>,
    pub garanties_appropriees: Option<String>,
    pub autorisation_artci: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MesureSecurite {
    pub type_mesure: TypeMesure,
    #[validate(length(min = 1, message = "La description de la mesure est requise"))]
    pub description: String,
    pub mise_en_oeuvre: Option<bool>,
    pub date_mise_en_oeuvre: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Certification {
    #[validate(length(min = 1, max = 255, message = "Le nom de la certification est requis"))]
    pub nom_certification: String,
    pub organisme_certificateur: Option<String>,
    pub date_obtention: Option<NaiveDate>,
    pub date_expiration: Option<NaiveDate>,
    pub numero_certificat: Option<String>,
}

/// エンティティの申告内容（JSONB カラムとして保存）
#[derive(
    Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, FromJsonQueryResult,
)]
#[serde(default)]
pub struct Dossier {
    #[validate(nested)]
    pub contact: Option<Contact>,
    #[validate(nested)]
    pub localisation: Option<Localisation>,
    #[validate(nested)]
    pub securite: Option<Securite>,
    #[validate(nested)]
    pub responsables_legaux: Vec<ResponsableLegal>,
    #[validate(nested)]
    pub dpos: Vec<Dpo>,
    #[validate(nested)]
    pub conformites_administratives: Vec<ConformiteAdministrative>,
    #[validate(nested)]
    pub registre_traitements: Vec<RegistreTraitement>,
    #[validate(nested)]
    pub categories_donnees: Vec<CategorieDonneesTraitees>,
    #[validate(nested)]
    pub finalites: Vec<Finalite>,
    #[validate(nested)]
    pub sous_traitants: Vec<SousTraitant>,
    #[validate(nested)]
    pub transferts: Vec<TransfertInternational>,
    #[validate(nested)]
    pub mesures_securite: Vec<MesureSecurite>,
    #[validate(nested)]
    pub certifications: Vec<Certification>,
}

/// 申告内容の部分更新。指定されたセクションのみ丸ごと置き換える
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DossierPatch {
    #[validate(nested)]
    pub contact: Option<Contact>,
    #[validate(nested)]
    pub localisation: Option<Localisation>,
    #[validate(nested)]
    pub securite: Option<Securite>,
    #[validate(nested)]
    pub responsables_legaux: Option<Vec<ResponsableLegal>>,
    #[validate(nested)]
    pub dpos: Option<Vec<Dpo>>,
    #[validate(nested)]
    pub conformites_administratives: Option<Vec<ConformiteAdministrative>>,
    #[validate(nested)]
    pub registre_traitements: Option<Vec<RegistreTraitement>>,
    #[validate(nested)]
    pub categories_donnees: Option<Vec<CategorieDonneesTraitees>>,
    #[validate(nested)]
    pub finalites: Option<Vec<Finalite>>,
    #[validate(nested)]
    pub sous_traitants: Option<Vec<SousTraitant>>,
    #[validate(nested)]
    pub transferts: Option<Vec<TransfertInternational>>,
    #[validate(nested)]
    pub mesures_securite: Option<Vec<MesureSecurite>>,
    #[validate(nested)]
    pub certifications: Option<Vec<Certification>>,
}

impl DossierPatch {
    pub fn is_empty(&self) -> bool {
        self.contact.is_none()
            && self.localisation.is_none()
            && self.securite.is_none()
            && self.responsables_legaux.is_none()
            && self.dpos.is_none()
            && self.conformites_administratives.is_none()
            && self.registre_traitements.is_none()
            && self.categories_donnees.is_none()
            && self.finalites.is_none()
            && self.sous_traitants.is_none()
            && self.transferts.is_none()
            && self.mesures_securite.is_none()
            && self.certifications.is_none()
    }
}

// 採点の配点
const SCORE_DPO: i32 = 20;
const SCORE_DECLARATION: i32 = 15;
const SCORE_REGISTRE: i32 = 15;
const SCORE_FINALITES: i32 = 10;
const SCORE_POLITIQUE: i32 = 10;
const SCORE_RESPONSABLE: i32 = 5;
const SCORE_ANALYSE: i32 = 5;
const SCORE_NOTIFICATION: i32 = 5;
const SCORE_FORMATION: i32 = 5;
const SCORE_MESURES: i32 = 5;
const SCORE_SOUS_TRAITANCE: i32 = 5;

impl Dossier {
    pub fn apply(&mut self, patch: DossierPatch) {
        if let Some(contact) = patch.contact {
            self.contact = Some(contact);
        }
        if let Some(localisation) = patch.localisation {
            self.localisation = Some(localisation);
        }
        if let Some(securite) = patch.securite {
            self.securite = Some(securite);
        }
        if let Some(items) = patch.responsables_legaux {
            self.responsables_legaux = items;
        }
        if let Some(items) = patch.dpos {
            self.dpos = items;
        }
        if let Some(items) = patch.conformites_administratives {
            self.conformites_administratives = items;
        }
        if let Some(items) = patch.registre_traitements {
            self.registre_traitements = items;
        }
        if let Some(items) = patch.categories_donnees {
            self.categories_donnees = items;
        }
        if let Some(items) = patch.finalites {
            self.finalites = items;
        }
        if let Some(items) = patch.sous_traitants {
            self.sous_traitants = items;
        }
        if let Some(items) = patch.transferts {
            self.transferts = items;
        }
        if let Some(items) = patch.mesures_securite {
            self.mesures_securite = items;
        }
        if let Some(items) = patch.certifications {
            self.certifications = items;
        }
    }

    /// 適合スコア（0..=100）
    pub fn compute_score(&self) -> i32 {
        let securite = self.securite.clone().unwrap_or_default();
        let flag = |value: Option<bool>, points: i32| if value == Some(true) { points } else { 0 };

        let mut score = 0;

        if !self.dpos.is_empty() {
            score += SCORE_DPO;
        }
        if self
            .conformites_administratives
            .iter()
            .any(|c| c.declaration_artci == Some(true))
        {
            score += SCORE_DECLARATION;
        }
        if !self.registre_traitements.is_empty() {
            score += SCORE_REGISTRE;
        }
        // base_legale は必須項目のため、finalité が1件以上あれば満たされる
        if !self.finalites.is_empty() {
            score += SCORE_FINALITES;
        }

        score += flag(securite.politique_securite, SCORE_POLITIQUE);
        score += flag(securite.responsable_securite, SCORE_RESPONSABLE);
        score += flag(securite.analyse_risques, SCORE_ANALYSE);
        score += flag(securite.notification_violations, SCORE_NOTIFICATION);
        score += flag(securite.formation_personnel, SCORE_FORMATION);

        if self
            .mesures_securite
            .iter()
            .any(|m| m.mise_en_oeuvre == Some(true))
        {
            score += SCORE_MESURES;
        }
        if self
            .sous_traitants
            .iter()
            .all(|s| s.contrat_sous_traitance == Some(true))
        {
            score += SCORE_SOUS_TRAITANCE;
        }

        score.clamp(0, 100)
    }

    /// 先頭の DPO から (a_dpo, type_dpo) を導出する
    pub fn dpo_summary(&self) -> (bool, Option<TypeDpo>) {
        match self.dpos.first() {
            Some(dpo) => (true, Some(dpo.type_dpo)),
            None => (false, None),
        }
    }

    /// 割合の大きい順に上位 n 件の目的
    pub fn top_finalites(&self, n: usize) -> Vec<&Finalite> {
        let mut finalites: Vec<&Finalite> = self.finalites.iter().collect();
        finalites.sort_by(|a, b| b.pourcentage.unwrap_or(0).cmp(&a.pourcentage.unwrap_or(0)));
        finalites.truncate(n);
        finalites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dpo(type_dpo: TypeDpo) -> Dpo {
        Dpo {
            nom: "Kouassi".to_string(),
            prenom: None,
            email: Some("dpo@example.ci".to_string()),
            telephone: None,
            type_dpo,
            organisme: None,
            date_designation: None,
        }
    }

    fn finalite(nom: &str, pourcentage: i32) -> Finalite {
        Finalite {
            finalite: nom.to_string(),
            base_legale: BaseLegale::Contrat,
            pourcentage: Some(pourcentage),
            description: None,
        }
    }

    fn full_dossier() -> Dossier {
        Dossier {
            dpos: vec![dpo(TypeDpo::Interne)],
            conformites_administratives: vec![ConformiteAdministrative {
                declaration_artci: Some(true),
                ..Default::default()
            }],
            registre_traitements: vec![RegistreTraitement {
                nom_traitement: "Gestion RH".to_string(),
                description: None,
                finalite: None,
                base_legale: None,
                categories_personnes: None,
                duree_conservation: None,
                destinataires: None,
                transfert_hors_ci: false,
            }],
            finalites: vec![finalite("Paie", 60)],
            securite: Some(Securite {
                politique_securite: Some(true),
                responsable_securite: Some(true),
                analyse_risques: Some(true),
                notification_violations: Some(true),
                formation_personnel: Some(true),
                ..Default::default()
            }),
            mesures_securite: vec![MesureSecurite {
                type_mesure: TypeMesure::Technique,
                description: "Chiffrement".to_string(),
                mise_en_oeuvre: Some(true),
                date_mise_en_oeuvre: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_dossier_score() {
        // 委託先なしの場合は契約要件を満たすとみなす
        assert_eq!(Dossier::default().compute_score(), 5);
    }

    #[test]
    fn test_full_dossier_score() {
        assert_eq!(full_dossier().compute_score(), 100);
    }

    #[test]
    fn test_sous_traitant_without_contract() {
        let mut dossier = full_dossier();
        dossier.sous_traitants = vec![SousTraitant {
            nom_sous_traitant: "Cloud SA".to_string(),
            pays: None,
            type_donnees_partagees: None,
            contrat_sous_traitance: Some(false),
            clauses_protection: None,
            audit_sous_traitant: None,
        }];
        assert_eq!(dossier.compute_score(), 95);
    }

    #[test]
    fn test_unimplemented_measure_scores_nothing() {
        let mut dossier = full_dossier();
        dossier.mesures_securite[0].mise_en_oeuvre = Some(false);
        dossier.dpos.clear();
        assert_eq!(dossier.compute_score(), 75);
    }

    #[test]
    fn test_apply_replaces_only_given_sections() {
        let mut dossier = full_dossier();
        let patch = DossierPatch {
            dpos: Some(vec![]),
            finalites: Some(vec![finalite("Marketing", 10), finalite("Paie", 90)]),
            ..Default::default()
        };
        dossier.apply(patch);

        assert!(dossier.dpos.is_empty());
        assert_eq!(dossier.finalites.len(), 2);
        assert_eq!(dossier.registre_traitements.len(), 1);
        assert!(dossier.securite.is_some());
    }

    #[test]
    fn test_dpo_summary() {
        assert_eq!(Dossier::default().dpo_summary(), (false, None));
        let dossier = Dossier {
            dpos: vec![dpo(TypeDpo::Externe), dpo(TypeDpo::Interne)],
            ..Default::default()
        };
        assert_eq!(dossier.dpo_summary(), (true, Some(TypeDpo::Externe)));
    }

    #[test]
    fn test_top_finalites() {
        let dossier = Dossier {
            finalites: vec![
                finalite("A", 10),
                finalite("B", 50),
                finalite("C", 30),
                finalite("D", 20),
            ],
            ..Default::default()
        };
        let top: Vec<&str> = dossier
            .top_finalites(3)
            .iter()
            .map(|f| f.finalite.as_str())
            .collect();
        assert_eq!(top, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_validation_rejects_bad_percentage() {
        let patch = DossierPatch {
            finalites: Some(vec![finalite("Paie", 150)]),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
        assert!(full_dossier().validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{
            "dpos": [{"nom": "Traoré", "type": "externe"}],
            "securite": {"politique_securite": true}
        }"#;
        let dossier: Dossier = serde_json::from_str(json).unwrap();
        assert_eq!(dossier.dpos[0].type_dpo, TypeDpo::Externe);
        assert!(dossier.finalites.is_empty());
        assert_eq!(dossier.compute_score(), 35);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let json = r#"{"finalites": [{"finalite": "X", "base_legale": "magie"}]}"#;
        assert!(serde_json::from_str::<Dossier>(json).is_err());
    }
}
