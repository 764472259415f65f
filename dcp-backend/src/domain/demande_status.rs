// src/domain/demande_status.rs

string_enum! {
    /// 担当者アサインの状態
    pub enum StatutAssignation {
        EnCours => "en_cours",
        TraiteAttenteValidation => "traite_attente_validation",
        Valide => "valide",
        EnRetard => "en_retard",
    }
}

impl StatutAssignation {
    /// 担当者が処理を完了できる状態か
    pub fn is_treatable(&self) -> bool {
        matches!(self, Self::EnCours | Self::EnRetard)
    }
}

string_enum! {
    /// アカウントとエンティティの紐付け申請の状態
    pub enum StatutRapprochement {
        EnAttente => "en_attente",
        Approuve => "approuve",
        Rejete => "rejete",
    }
}

string_enum! {
    pub enum StatutRenouvellement {
        EnAttente => "en_attente",
        EnCours => "en_cours",
        Approuve => "approuve",
        Rejete => "rejete",
    }
}

impl StatutRenouvellement {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::EnAttente | Self::EnCours)
    }
}

string_enum! {
    /// 活動報告書の審査状態
    pub enum StatutRapport {
        EnAttente => "en_attente",
        Valide => "valide",
        Rejete => "rejete",
    }
}

/// 承認/却下の判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionDemande {
    Approuver,
    Rejeter,
}

/// N+1 検証の判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionValidation {
    Valider,
    Renvoyer,
}

/// 報告書審査の判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRapport {
    Valider,
    Rejeter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignation_status() {
        assert!(StatutAssignation::EnCours.is_treatable());
        assert!(StatutAssignation::EnRetard.is_treatable());
        assert!(!StatutAssignation::TraiteAttenteValidation.is_treatable());
        assert!(!StatutAssignation::Valide.is_treatable());
        assert_eq!(
            StatutAssignation::from_str("traite_attente_validation"),
            Some(StatutAssignation::TraiteAttenteValidation)
        );
    }

    #[test]
    fn test_renouvellement_open() {
        assert!(StatutRenouvellement::EnAttente.is_open());
        assert!(StatutRenouvellement::EnCours.is_open());
        assert!(!StatutRenouvellement::Approuve.is_open());
    }

    #[test]
    fn test_decisions_deserialize() {
        let d: DecisionDemande = serde_json::from_str(r#""approuver""#).unwrap();
        assert_eq!(d, DecisionDemande::Approuver);
        let v: DecisionValidation = serde_json::from_str(r#""renvoyer""#).unwrap();
        assert_eq!(v, DecisionValidation::Renvoyer);
        assert!(serde_json::from_str::<DecisionRapport>(r#""approuver""#).is_err());
    }

    #[test]
    fn test_parse_error_lists_values() {
        let err = "termine".parse::<StatutRapprochement>().unwrap_err();
        assert!(err.contains("en_attente"));
        assert!(err.contains("approuve"));
    }
}
