// src/domain/origine_saisie.rs

string_enum! {
    /// エンティティ登録の経路
    pub enum OrigineSaisie {
        AutoRecensement => "auto_recensement",
        SaisieArtci => "saisie_artci",
        Rapprochement => "rapprochement",
    }
}

impl OrigineSaisie {
    /// 作成直後のワークフロー状態
    pub fn initial_statut(&self) -> super::workflow_status::StatutWorkflow {
        use super::workflow_status::StatutWorkflow;
        match self {
            Self::SaisieArtci => StatutWorkflow::BrouillonArtci,
            Self::AutoRecensement | Self::Rapprochement => StatutWorkflow::Brouillon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow_status::StatutWorkflow;

    #[test]
    fn test_initial_statut() {
        assert_eq!(
            OrigineSaisie::SaisieArtci.initial_statut(),
            StatutWorkflow::BrouillonArtci
        );
        assert_eq!(
            OrigineSaisie::AutoRecensement.initial_statut(),
            StatutWorkflow::Brouillon
        );
    }
}
