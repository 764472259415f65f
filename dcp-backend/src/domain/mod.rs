// src/domain/mod.rs

/// 文字列で永続化される列挙型の共通実装
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $value)] $variant,)+
        }

        impl $name {
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(s: &str) -> Option<Self> {
                match s.trim() {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            pub fn all() -> Vec<Self> {
                vec![$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_str(s).ok_or_else(|| {
                    format!(
                        "Valeur invalide '{}'. Valeurs possibles : {}",
                        s,
                        Self::all()
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                })
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod demande_status;
pub mod document_type;
pub mod dossier;
pub mod notification_type;
pub mod origine_saisie;
pub mod otp_type;
pub mod principal;
pub mod user_role;
pub mod workflow_status;

pub mod assignation_model;
pub mod compte_entreprise_model;
pub mod demande_rapprochement_model;
pub mod document_joint_model;
pub mod entite_conformite_model;
pub mod entite_model;
pub mod entite_workflow_model;
pub mod feedback_verification_model;
pub mod historique_statut_model;
pub mod notification_model;
pub mod otp_code_model;
pub mod renouvellement_model;
pub mod revoked_token_model;
pub mod user_model;
