// src/repository/revoked_token_repository.rs

use crate::domain::revoked_token_model::{
    self, ActiveModel as RevokedActiveModel, Entity as RevokedEntity,
};
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DbConn, DbErr, QueryFilter, Set};
use uuid::Uuid;

/// 失効トークン（jti）の永続化
#[derive(Debug, Clone)]
pub struct RevokedTokenRepository {
    db: DbConn,
}

impl RevokedTokenRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// jti を失効登録する（重複は無視）
    pub async fn revoke(
        &self,
        jti: &str,
        principal_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let model = RevokedActiveModel {
            jti: Set(jti.to_string()),
            principal_id: Set(principal_id),
            expires_at: Set(expires_at),
            ..RevokedActiveModel::new()
        };

        RevokedEntity::insert(model)
            .on_conflict(
                OnConflict::column(revoked_token_model::Column::Jti)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await?;
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, DbErr> {
        Ok(RevokedEntity::find_by_id(jti.to_string())
            .one(&self.db)
            .await?
            .is_some())
    }

    /// 有効期限を過ぎたエントリを削除
    pub async fn purge_expired(&self) -> Result<u64, DbErr> {
        let result = RevokedEntity::delete_many()
            .filter(revoked_token_model::Column::ExpiresAt.lt(Utc::now()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
