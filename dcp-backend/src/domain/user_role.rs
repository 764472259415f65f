// src/domain/user_role.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// ARTCI スタッフのロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Editor,
    Reader,
}

impl UserRole {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "super_admin" => Some(Self::SuperAdmin),
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "reader" => Some(Self::Reader),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::Reader => "reader",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![Self::SuperAdmin, Self::Admin, Self::Editor, Self::Reader]
    }

    /// super_admin / admin
    pub fn admin_or_above() -> &'static [Self] {
        &[Self::SuperAdmin, Self::Admin]
    }

    /// super_admin / admin / editor
    pub fn editor_or_above() -> &'static [Self] {
        &[Self::SuperAdmin, Self::Admin, Self::Editor]
    }

    pub fn any_staff() -> &'static [Self] {
        &[Self::SuperAdmin, Self::Admin, Self::Editor, Self::Reader]
    }

    pub fn is_admin_or_above(&self) -> bool {
        Self::admin_or_above().contains(self)
    }

    pub fn is_editor_or_above(&self) -> bool {
        Self::editor_or_above().contains(self)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Reader
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s).ok_or_else(|| {
            format!(
                "Rôle invalide : '{}'. Rôles possibles : {}",
                s,
                Self::all()
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(UserRole::from_str("super_admin"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("editor"), Some(UserRole::Editor));
        assert_eq!(UserRole::from_str("reader"), Some(UserRole::Reader));
        assert_eq!(UserRole::from_str("agent"), None);
    }

    #[test]
    fn test_role_groups() {
        assert!(UserRole::SuperAdmin.is_admin_or_above());
        assert!(UserRole::Admin.is_admin_or_above());
        assert!(!UserRole::Editor.is_admin_or_above());

        assert!(UserRole::Editor.is_editor_or_above());
        assert!(!UserRole::Reader.is_editor_or_above());

        assert_eq!(UserRole::any_staff().len(), 4);
    }

    #[test]
    fn test_serde() {
        let serialized = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(serialized, r#""super_admin""#);

        let role: UserRole = serde_json::from_str(r#""editor""#).unwrap();
        assert_eq!(role, UserRole::Editor);
    }
}
