// src/repository/user_repository.rs

use crate::domain::user_model::{self, ActiveModel as UserActiveModel, Entity as UserEntity};
use crate::domain::user_role::UserRole;
use chrono::Utc;
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DbConn,
}

impl UserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user_model::Model>, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
    }

    pub async fn is_email_taken(&self, email: &str) -> Result<bool, DbErr> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// ページネーション付きでスタッフを取得
    pub async fn find_all_paginated(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<user_model::Model>, u64), DbErr> {
        let offset = (page.max(1) - 1) * per_page;

        let users = UserEntity::find()
            .order_by(user_model::Column::CreatedAt, Order::Desc)
            .limit(per_page)
            .offset(offset)
            .all(&self.db)
            .await?;

        let total_count = UserEntity::find().count(&self.db).await?;

        Ok((users, total_count))
    }

    pub async fn find_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, user_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(UserEntity::find()
            .filter(user_model::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect())
    }

    pub async fn count_active(&self) -> Result<u64, DbErr> {
        UserEntity::find()
            .filter(user_model::Column::IsActive.eq(true))
            .count(&self.db)
            .await
    }

    pub async fn create(&self, create_user: CreateUser) -> Result<user_model::Model, DbErr> {
        let new_user = UserActiveModel {
            nom: Set(create_user.nom),
            prenom: Set(create_user.prenom),
            email: Set(create_user.email.to_lowercase()),
            password_hash: Set(create_user.password_hash),
            role: Set(create_user.role.as_str().to_string()),
            telephone: Set(create_user.telephone),
            ..UserActiveModel::new()
        };

        new_user.insert(&self.db).await
    }

    pub async fn update(
        &self,
        user: user_model::Model,
        update: UpdateUser,
    ) -> Result<user_model::Model, DbErr> {
        let mut active: UserActiveModel = user.into();

        if let Some(nom) = update.nom {
            active.nom = Set(nom);
        }
        if let Some(prenom) = update.prenom {
            active.prenom = Set(prenom);
        }
        if let Some(telephone) = update.telephone {
            active.telephone = Set(Some(telephone));
        }
        if let Some(role) = update.role {
            active.role = Set(role.as_str().to_string());
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(password_hash) = update.password_hash {
            active.password_hash = Set(password_hash);
        }

        active.update(&self.db).await
    }

    pub async fn update_last_login(&self, id: Uuid) -> Result<(), DbErr> {
        UserEntity::update_many()
            .col_expr(
                user_model::Column::LastLogin,
                sea_orm::sea_query::Expr::value(Utc::now()),
            )
            .filter(user_model::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

/// スタッフ作成用の入力
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub telephone: Option<String>,
}

/// スタッフ更新用の入力（None は変更なし）
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub nom: Option<String>,
    pub prenom: Option<String>,
    pub telephone: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
    pub password_hash: Option<String>,
}
