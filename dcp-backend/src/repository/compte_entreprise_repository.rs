// src/repository/compte_entreprise_repository.rs

use crate::domain::compte_entreprise_model::{
    self, ActiveModel as CompteActiveModel, Entity as CompteEntity,
};
use chrono::{DateTime, Utc};
use sea_orm::entity::*;
use sea_orm::{DbConn, DbErr, QueryFilter, Set};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct CompteEntrepriseRepository {
    db: DbConn,
}

impl CompteEntrepriseRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<compte_entreprise_model::Model>, DbErr> {
        CompteEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<compte_entreprise_model::Model>, DbErr> {
        CompteEntity::find()
            .filter(compte_entreprise_model::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await
    }

    pub async fn find_by_ids(
        &self,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, compte_entreprise_model::Model>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(CompteEntity::find()
            .filter(compte_entreprise_model::Column::Id.is_in(ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }

    pub async fn is_numero_cc_taken(&self, numero_cc: &str) -> Result<bool, DbErr> {
        Ok(CompteEntity::find()
            .filter(compte_entreprise_model::Column::NumeroCc.eq(numero_cc))
            .one(&self.db)
            .await?
            .is_some())
    }

    pub async fn create(&self, compte: CreateCompte) -> Result<compte_entreprise_model::Model, DbErr> {
        let model = CompteActiveModel {
            email: Set(compte.email.to_lowercase()),
            password_hash: Set(compte.password_hash),
            denomination: Set(compte.denomination),
            numero_cc: Set(compte.numero_cc),
            telephone: Set(compte.telephone),
            adresse: Set(compte.adresse),
            ville: Set(compte.ville),
            region: Set(compte.region),
            password_last_changed: Set(Some(Utc::now())),
            password_expires_at: Set(Some(compte.password_expires_at)),
            ..CompteActiveModel::new()
        };

        model.insert(&self.db).await
    }

    pub async fn mark_email_verified(&self, compte: compte_entreprise_model::Model) -> Result<(), DbErr> {
        let mut active: CompteActiveModel = compte.into();
        active.email_verified = Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn update_password(
        &self,
        compte: compte_entreprise_model::Model,
        password_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<compte_entreprise_model::Model, DbErr> {
        let mut active: CompteActiveModel = compte.into();
        active.password_hash = Set(password_hash);
        active.password_last_changed = Set(Some(Utc::now()));
        active.password_expires_at = Set(Some(expires_at));
        active.update(&self.db).await
    }

    pub async fn update_profil(
        &self,
        compte: compte_entreprise_model::Model,
        update: UpdateProfil,
    ) -> Result<compte_entreprise_model::Model, DbErr> {
        let mut active: CompteActiveModel = compte.into();

        if let Some(denomination) = update.denomination {
            active.denomination = Set(denomination);
        }
        if let Some(telephone) = update.telephone {
            active.telephone = Set(Some(telephone));
        }
        if let Some(adresse) = update.adresse {
            active.adresse = Set(Some(adresse));
        }
        if let Some(ville) = update.ville {
            active.ville = Set(Some(ville));
        }
        if let Some(region) = update.region {
            active.region = Set(Some(region));
        }

        active.update(&self.db).await
    }
}

#[derive(Debug, Clone)]
pub struct CreateCompte {
    pub email: String,
    pub password_hash: String,
    pub denomination: String,
    pub numero_cc: String,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
    pub password_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfil {
    pub denomination: Option<String>,
    pub telephone: Option<String>,
    pub adresse: Option<String>,
    pub ville: Option<String>,
    pub region: Option<String>,
}
