// src/utils/password.rs

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::env;
use thiserror::Error;

/// 特殊文字として扱う記号
const SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?\"\\/~`";

/// パスワード関連のエラー
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingError(#[from] argon2::password_hash::Error),

    #[error("Argon2 parameter error: {0}")]
    Argon2Error(#[from] argon2::Error),

    /// ポリシー違反（利用者向けメッセージの一覧）
    #[error("Weak password: {}", .0.join(" "))]
    WeakPassword(Vec<String>),

    #[error("Password configuration error: {0}")]
    ConfigurationError(String),
}

/// パスワード強度要件
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// 環境変数から設定を読み込み
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_length = env::var("PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_length);

        let max_length = env::var("PASSWORD_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_length);

        Self {
            min_length,
            max_length,
            ..defaults
        }
    }

    pub fn validate(&self) -> Result<(), PasswordError> {
        if self.min_length < 4 {
            return Err(PasswordError::ConfigurationError(
                "Minimum password length must be at least 4".to_string(),
            ));
        }

        if self.max_length < self.min_length {
            return Err(PasswordError::ConfigurationError(
                "Maximum password length must be greater than minimum".to_string(),
            ));
        }

        Ok(())
    }
}

/// Argon2 設定
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// メモリコスト（KB）
    pub memory_cost: u32,
    /// 時間コスト（反復回数）
    pub time_cost: u32,
    pub parallelism: u32,
    pub output_length: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64MB
            time_cost: 3,
            parallelism: 4,
            output_length: 32,
        }
    }
}

impl Argon2Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let read = |key: &str, default: u32| {
            env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };

        Self {
            memory_cost: read("ARGON2_MEMORY_COST", defaults.memory_cost),
            time_cost: read("ARGON2_TIME_COST", defaults.time_cost),
            parallelism: read("ARGON2_PARALLELISM", defaults.parallelism),
            output_length: defaults.output_length,
        }
    }

    /// テスト用の軽量パラメータ
    pub fn for_testing() -> Self {
        Self {
            memory_cost: 8192,
            time_cost: 1,
            parallelism: 1,
            output_length: 32,
        }
    }
}

/// パスワードハッシュマネージャー
pub struct PasswordManager {
    argon2: Argon2<'static>,
    policy: PasswordPolicy,
}

impl PasswordManager {
    pub fn new(argon2_config: Argon2Config, policy: PasswordPolicy) -> Result<Self, PasswordError> {
        policy.validate()?;

        let argon2 = Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            argon2::Params::new(
                argon2_config.memory_cost,
                argon2_config.time_cost,
                argon2_config.parallelism,
                Some(argon2_config.output_length),
            )
            .map_err(PasswordError::Argon2Error)?,
        );

        Ok(Self { argon2, policy })
    }

    pub fn from_env() -> Result<Self, PasswordError> {
        Self::new(Argon2Config::from_env(), PasswordPolicy::from_env())
    }

    /// 強度チェックの後にハッシュ化
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.validate_password_strength(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(PasswordError::HashingError)?;

        Ok(password_hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(PasswordError::HashingError)?;

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::HashingError(e)),
        }
    }

    /// ポリシー違反をすべて列挙する
    pub fn validate_password_strength(&self, password: &str) -> Result<(), PasswordError> {
        let mut errors = Vec::new();
        let length = password.chars().count();

        if length < self.policy.min_length {
            errors.push(format!(
                "Le mot de passe doit contenir au moins {} caractères.",
                self.policy.min_length
            ));
        }

        if length > self.policy.max_length {
            errors.push(format!(
                "Le mot de passe ne doit pas dépasser {} caractères.",
                self.policy.max_length
            ));
        }

        if self.policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            errors.push("Le mot de passe doit contenir au moins une lettre majuscule.".to_string());
        }

        if self.policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            errors.push("Le mot de passe doit contenir au moins une lettre minuscule.".to_string());
        }

        if self.policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Le mot de passe doit contenir au moins un chiffre.".to_string());
        }

        if self.policy.require_special && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c))
        {
            errors.push("Le mot de passe doit contenir au moins un caractère spécial.".to_string());
        }

        if !errors.is_empty() {
            return Err(PasswordError::WeakPassword(errors));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> PasswordManager {
        PasswordManager::new(Argon2Config::for_testing(), PasswordPolicy::default()).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let pm = manager();
        let hash = pm.hash_password("Secur3!Pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(pm.verify_password("Secur3!Pass", &hash).unwrap());
        assert!(!pm.verify_password("Secur3!Pasz", &hash).unwrap());
    }

    #[test]
    fn test_weak_password_lists_every_failure() {
        let pm = manager();
        match pm.validate_password_strength("abc") {
            Err(PasswordError::WeakPassword(errors)) => {
                assert_eq!(errors.len(), 4);
                assert!(errors[0].contains("8 caractères"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_each_rule() {
        let pm = manager();
        assert!(pm.validate_password_strength("Abcdefg1!").is_ok());
        assert!(pm.validate_password_strength("abcdefg1!").is_err());
        assert!(pm.validate_password_strength("ABCDEFG1!").is_err());
        assert!(pm.validate_password_strength("Abcdefgh!").is_err());
        assert!(pm.validate_password_strength("Abcdefgh1").is_err());
    }

    #[test]
    fn test_verify_with_malformed_hash() {
        assert!(manager().verify_password("x", "not-a-hash").is_err());
    }

    #[test]
    fn test_invalid_policy() {
        let policy = PasswordPolicy {
            min_length: 2,
            ..Default::default()
        };
        assert!(PasswordManager::new(Argon2Config::for_testing(), policy).is_err());
    }
}
