// src/service/user_service.rs

use crate::api::dto::user_dto::{CreateUserRequest, UpdateUserRequest};
use crate::domain::user_model::{self, SafeUser};
use crate::error::{AppError, AppResult};
use crate::repository::user_repository::{CreateUser, UpdateUser, UserRepository};
use crate::shared::types::PaginatedResponse;
use crate::utils::password::PasswordManager;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// スタッフユーザー管理サービス
pub struct UserService {
    user_repo: Arc<UserRepository>,
    password_manager: Arc<PasswordManager>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>, password_manager: Arc<PasswordManager>) -> Self {
        Self {
            user_repo,
            password_manager,
        }
    }

    pub async fn list(&self, page: u64, per_page: u64) -> AppResult<PaginatedResponse<SafeUser>> {
        let (users, total) = self.user_repo.find_all_paginated(page, per_page).await?;
        let items = users.into_iter().map(SafeUser::from).collect();
        Ok(PaginatedResponse::new(items, page, per_page, total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SafeUser> {
        Ok(self.find(id).await?.into())
    }

    /// スタッフ作成
    pub async fn create(&self, input: CreateUserRequest) -> AppResult<SafeUser> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();
        if self.user_repo.is_email_taken(&email).await? {
            return Err(AppError::Conflict(
                "Un utilisateur existe déjà avec cet email.".to_string(),
            ));
        }

        self.password_manager
            .validate_password_strength(&input.password)?;
        let password_hash = self.password_manager.hash_password(&input.password)?;

        let user = self
            .user_repo
            .create(CreateUser {
                nom: input.nom.trim().to_string(),
                prenom: input.prenom.trim().to_string(),
                email,
                password_hash,
                role: input.role,
                telephone: input.telephone,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "Staff user created");
        Ok(user.into())
    }

    /// 部分更新（パスワードは指定時のみ再設定）
    pub async fn update(&self, id: Uuid, input: UpdateUserRequest) -> AppResult<SafeUser> {
        input.validate()?;

        let user = self.find(id).await?;

        let password_hash = match input.password.as_deref() {
            Some(password) => {
                self.password_manager.validate_password_strength(password)?;
                Some(self.password_manager.hash_password(password)?)
            }
            None => None,
        };

        let updated = self
            .user_repo
            .update(
                user,
                UpdateUser {
                    nom: input.nom.map(|n| n.trim().to_string()),
                    prenom: input.prenom.map(|p| p.trim().to_string()),
                    telephone: input.telephone,
                    role: input.role,
                    is_active: input.is_active,
                    password_hash,
                },
            )
            .await?;

        info!(user_id = %id, "Staff user updated");
        Ok(updated.into())
    }

    /// 論理削除（is_active = false）
    pub async fn deactivate(&self, id: Uuid, requested_by: Uuid) -> AppResult<SafeUser> {
        if id == requested_by {
            warn!(user_id = %id, "Attempt to deactivate own account");
            return Err(AppError::BadRequest(
                "Vous ne pouvez pas désactiver votre propre compte.".to_string(),
            ));
        }

        let user = self.find(id).await?;
        let updated = self
            .user_repo
            .update(
                user,
                UpdateUser {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %id, deactivated_by = %requested_by, "Staff user deactivated");
        Ok(updated.into())
    }

    async fn find(&self, id: Uuid) -> AppResult<user_model::Model> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Utilisateur non trouvé.".to_string()))
    }
}
