// src/domain/workflow_status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// 申告（dossier）の処理状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatutWorkflow {
    Brouillon,
    BrouillonArtci,
    Soumis,
    EnVerification,
    EnAttenteComplements,
    Conforme,
    ConformeSousReserve,
    Valide,
    Rejete,
    Publie,
}

impl StatutWorkflow {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "brouillon" => Some(Self::Brouillon),
            "brouillon_artci" => Some(Self::BrouillonArtci),
            "soumis" => Some(Self::Soumis),
            "en_verification" => Some(Self::EnVerification),
            "en_attente_complements" => Some(Self::EnAttenteComplements),
            "conforme" => Some(Self::Conforme),
            "conforme_sous_reserve" => Some(Self::ConformeSousReserve),
            "valide" => Some(Self::Valide),
            "rejete" => Some(Self::Rejete),
            "publie" => Some(Self::Publie),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brouillon => "brouillon",
            Self::BrouillonArtci => "brouillon_artci",
            Self::Soumis => "soumis",
            Self::EnVerification => "en_verification",
            Self::EnAttenteComplements => "en_attente_complements",
            Self::Conforme => "conforme",
            Self::ConformeSousReserve => "conforme_sous_reserve",
            Self::Valide => "valide",
            Self::Rejete => "rejete",
            Self::Publie => "publie",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Self::Brouillon,
            Self::BrouillonArtci,
            Self::Soumis,
            Self::EnVerification,
            Self::EnAttenteComplements,
            Self::Conforme,
            Self::ConformeSousReserve,
            Self::Valide,
            Self::Rejete,
            Self::Publie,
        ]
    }

    /// この状態から遷移可能な状態
    pub fn allowed_transitions(&self) -> &'static [StatutWorkflow] {
        match self {
            Self::Brouillon | Self::BrouillonArtci => &[Self::Soumis],
            Self::Soumis => &[Self::EnVerification],
            Self::EnVerification => &[
                Self::EnAttenteComplements,
                Self::Conforme,
                Self::ConformeSousReserve,
                Self::Rejete,
            ],
            Self::EnAttenteComplements => &[Self::Soumis],
            Self::Conforme => &[Self::Valide],
            Self::ConformeSousReserve => &[Self::Valide, Self::Rejete],
            Self::Valide => &[Self::Publie],
            Self::Rejete | Self::Publie => &[],
        }
    }

    pub fn can_transition_to(&self, target: StatutWorkflow) -> bool {
        self.allowed_transitions().contains(&target)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// 企業側で申告内容を編集できる状態か
    pub fn is_editable_by_entreprise(&self) -> bool {
        matches!(self, Self::Brouillon | Self::EnAttenteComplements)
    }

    /// 遷移後に付与される適合ラベル。None の場合は既存ラベルを維持する
    pub fn statut_conformite(&self) -> Option<StatutConformite> {
        match self {
            Self::Conforme | Self::Valide | Self::Publie => Some(StatutConformite::Conforme),
            Self::ConformeSousReserve => Some(StatutConformite::DemarcheAchevee),
            Self::Soumis | Self::EnVerification | Self::EnAttenteComplements => {
                Some(StatutConformite::DemarcheEnCours)
            }
            Self::Brouillon | Self::BrouillonArtci | Self::Rejete => None,
        }
    }

    /// 企業ダッシュボードの進捗ステップ（1..=3）
    pub fn etape(&self) -> u8 {
        match self {
            Self::Brouillon | Self::BrouillonArtci | Self::Soumis => 1,
            Self::EnVerification | Self::EnAttenteComplements | Self::ConformeSousReserve => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for StatutWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatutWorkflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Statut invalide : '{}'. Statuts possibles : {}",
                s,
                Self::all()
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

impl From<StatutWorkflow> for String {
    fn from(status: StatutWorkflow) -> Self {
        status.as_str().to_string()
    }
}

impl TryFrom<String> for StatutWorkflow {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<&str> for StatutWorkflow {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

string_enum! {
    /// 公開される適合ラベル
    pub enum StatutConformite {
        Conforme => "Conforme",
        DemarcheAchevee => "Démarche achevée",
        DemarcheEnCours => "Démarche en cours",
    }
}

impl StatutConformite {
    /// カンマ区切りのフィルタ値を解釈する。未知の値は無視する
    pub fn parse_list(value: &str) -> Vec<Self> {
        value
            .split(',')
            .filter_map(|s| Self::from_str(s.trim()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(StatutWorkflow::from_str("brouillon"), Some(StatutWorkflow::Brouillon));
        assert_eq!(
            StatutWorkflow::from_str("EN_VERIFICATION"),
            Some(StatutWorkflow::EnVerification)
        );
        assert_eq!(StatutWorkflow::from_str("archive"), None);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(StatutWorkflow::BrouillonArtci.to_string(), "brouillon_artci");
        assert_eq!(
            StatutWorkflow::ConformeSousReserve.to_string(),
            "conforme_sous_reserve"
        );
    }

    #[test]
    fn test_main_path_transitions() {
        use StatutWorkflow::*;

        let path = [Brouillon, Soumis, EnVerification, Conforme, Valide, Publie];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_complements_loop() {
        use StatutWorkflow::*;

        assert!(EnVerification.can_transition_to(EnAttenteComplements));
        assert!(EnAttenteComplements.can_transition_to(Soumis));
        assert!(!EnAttenteComplements.can_transition_to(EnVerification));
    }

    #[test]
    fn test_forbidden_transitions() {
        use StatutWorkflow::*;

        assert!(!Brouillon.can_transition_to(Publie));
        assert!(!Brouillon.can_transition_to(EnVerification));
        assert!(!Soumis.can_transition_to(Conforme));
        assert!(!Conforme.can_transition_to(Rejete));
        assert!(!Valide.can_transition_to(Conforme));
    }

    #[test]
    fn test_terminal_states() {
        for status in StatutWorkflow::all() {
            assert!(!status.can_transition_to(status), "{} self loop", status);
        }
        assert!(StatutWorkflow::Rejete.is_terminal());
        assert!(StatutWorkflow::Publie.is_terminal());
        assert!(!StatutWorkflow::Valide.is_terminal());
    }

    #[test]
    fn test_statut_conformite_mapping() {
        use StatutWorkflow::*;

        assert_eq!(Conforme.statut_conformite(), Some(StatutConformite::Conforme));
        assert_eq!(Valide.statut_conformite(), Some(StatutConformite::Conforme));
        assert_eq!(Publie.statut_conformite(), Some(StatutConformite::Conforme));
        assert_eq!(
            ConformeSousReserve.statut_conformite(),
            Some(StatutConformite::DemarcheAchevee)
        );
        assert_eq!(
            EnAttenteComplements.statut_conformite(),
            Some(StatutConformite::DemarcheEnCours)
        );
        assert_eq!(Rejete.statut_conformite(), None);
        assert_eq!(Brouillon.statut_conformite(), None);
    }

    #[test]
    fn test_etape() {
        assert_eq!(StatutWorkflow::Brouillon.etape(), 1);
        assert_eq!(StatutWorkflow::Soumis.etape(), 1);
        assert_eq!(StatutWorkflow::EnAttenteComplements.etape(), 2);
        assert_eq!(StatutWorkflow::ConformeSousReserve.etape(), 2);
        assert_eq!(StatutWorkflow::Publie.etape(), 3);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&StatutWorkflow::EnAttenteComplements).unwrap();
        assert_eq!(json, r#""en_attente_complements""#);

        let label = serde_json::to_string(&StatutConformite::DemarcheAchevee).unwrap();
        assert_eq!(label, r#""Démarche achevée""#);
    }

    #[test]
    fn test_conformite_parse_list() {
        let list = StatutConformite::parse_list("Conforme, Démarche en cours,inconnu");
        assert_eq!(
            list,
            vec![StatutConformite::Conforme, StatutConformite::DemarcheEnCours]
        );
        assert!(StatutConformite::parse_list("").is_empty());
    }
}
