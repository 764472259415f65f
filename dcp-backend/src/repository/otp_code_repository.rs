// src/repository/otp_code_repository.rs

use crate::domain::otp_code_model::{self, ActiveModel as OtpActiveModel, Entity as OtpEntity};
use crate::domain::otp_type::OtpType;
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::sea_query::Expr;
use sea_orm::{DbConn, DbErr, QueryFilter, Set};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct OtpCodeRepository {
    db: DbConn,
}

impl OtpCodeRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// 同種の未使用コードをすべて使用済みにする
    pub async fn invalidate_unused(&self, compte_id: Uuid, otp_type: OtpType) -> Result<u64, DbErr> {
        let result = OtpEntity::update_many()
            .col_expr(otp_code_model::Column::Used, Expr::value(true))
            .filter(otp_code_model::Column::CompteEntrepriseId.eq(compte_id))
            .filter(otp_code_model::Column::OtpType.eq(otp_type.as_str()))
            .filter(otp_code_model::Column::Used.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn create(
        &self,
        compte_id: Uuid,
        code: String,
        otp_type: OtpType,
        expires_at: DateTime<Utc>,
    ) -> Result<otp_code_model::Model, DbErr> {
        let otp = OtpActiveModel {
            compte_entreprise_id: Set(compte_id),
            code: Set(code),
            otp_type: Set(otp_type.as_str().to_string()),
            expires_at: Set(expires_at),
            ..OtpActiveModel::new()
        };
        otp.insert(&self.db).await
    }

    pub async fn find_unused(
        &self,
        compte_id: Uuid,
        code: &str,
        otp_type: OtpType,
    ) -> Result<Option<otp_code_model::Model>, DbErr> {
        OtpEntity::find()
            .filter(otp_code_model::Column::CompteEntrepriseId.eq(compte_id))
            .filter(otp_code_model::Column::Code.eq(code))
            .filter(otp_code_model::Column::OtpType.eq(otp_type.as_str()))
            .filter(otp_code_model::Column::Used.eq(false))
            .one(&self.db)
            .await
    }

    pub async fn mark_used(&self, otp: otp_code_model::Model) -> Result<(), DbErr> {
        let mut active: OtpActiveModel = otp.into();
        active.used = Set(true);
        active.update(&self.db).await?;
        Ok(())
    }
}
