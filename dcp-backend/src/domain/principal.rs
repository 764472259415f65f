// src/domain/principal.rs

use super::user_role::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    /// トークンの主体の種別（ARTCIスタッフ or 企業アカウント）
    pub enum PrincipalKind {
        Artci => "artci",
        Entreprise => "entreprise",
    }
}

/// アクセストークンに埋め込む主体情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalClaims {
    pub principal_id: Uuid,
    pub kind: PrincipalKind,
    pub email: String,
    /// スタッフの場合のみ
    pub role: Option<UserRole>,
}

impl PrincipalClaims {
    pub fn staff(user: &super::user_model::Model) -> Self {
        Self {
            principal_id: user.id,
            kind: PrincipalKind::Artci,
            email: user.email.clone(),
            role: Some(user.user_role()),
        }
    }

    pub fn entreprise(compte: &super::compte_entreprise_model::Model) -> Self {
        Self {
            principal_id: compte.id,
            kind: PrincipalKind::Entreprise,
            email: compte.email.clone(),
            role: None,
        }
    }

    pub fn is_staff(&self) -> bool {
        self.kind == PrincipalKind::Artci
    }

    /// スタッフかつ許可されたロールを持つか
    pub fn has_any_role(&self, allowed: &[UserRole]) -> bool {
        self.is_staff() && self.role.is_some_and(|role| allowed.contains(&role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(kind: PrincipalKind, role: Option<UserRole>) -> PrincipalClaims {
        PrincipalClaims {
            principal_id: Uuid::new_v4(),
            kind,
            email: "agent@artci.ci".to_string(),
            role,
        }
    }

    #[test]
    fn test_principal_kind() {
        assert_eq!(PrincipalKind::from_str("artci"), Some(PrincipalKind::Artci));
        assert_eq!(PrincipalKind::Entreprise.to_string(), "entreprise");
        assert!("staff".parse::<PrincipalKind>().is_err());
    }

    #[test]
    fn test_has_any_role() {
        let editor = claims(PrincipalKind::Artci, Some(UserRole::Editor));
        assert!(editor.has_any_role(UserRole::editor_or_above()));
        assert!(!editor.has_any_role(UserRole::admin_or_above()));

        // 企業アカウントはロールを持たない
        let entreprise = claims(PrincipalKind::Entreprise, None);
        assert!(!entreprise.has_any_role(UserRole::any_staff()));

        // 種別が一致しないロール付きクレームは拒否
        let forged = claims(PrincipalKind::Entreprise, Some(UserRole::SuperAdmin));
        assert!(!forged.has_any_role(UserRole::any_staff()));
    }
}
