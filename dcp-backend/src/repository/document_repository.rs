// src/repository/document_repository.rs

use crate::domain::demande_status::StatutRapport;
use crate::domain::document_joint_model::{
    self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity,
};
use crate::domain::document_type::TypeDocument;
use sea_orm::entity::*;
use sea_orm::{
    DbConn, DbErr, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub entite_id: Option<Uuid>,
    pub compte_entreprise_id: Option<Uuid>,
    pub type_document: TypeDocument,
    pub nom_fichier: String,
    pub chemin_fichier: String,
    pub taille: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DbConn,
}

impl DocumentRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<document_joint_model::Model>, DbErr> {
        DocumentEntity::find_by_id(id).one(&self.db).await
    }

    pub async fn create(&self, doc: NewDocument) -> Result<document_joint_model::Model, DbErr> {
        let model = DocumentActiveModel {
            entite_id: Set(doc.entite_id),
            compte_entreprise_id: Set(doc.compte_entreprise_id),
            type_document: Set(doc.type_document.as_str().to_string()),
            nom_fichier: Set(doc.nom_fichier),
            chemin_fichier: Set(doc.chemin_fichier),
            taille: Set(doc.taille),
            mime_type: Set(doc.mime_type),
            ..DocumentActiveModel::new()
        };
        model.insert(&self.db).await
    }

    pub async fn find_by_entite(
        &self,
        entite_id: Uuid,
    ) -> Result<Vec<document_joint_model::Model>, DbErr> {
        DocumentEntity::find()
            .filter(document_joint_model::Column::EntiteId.eq(entite_id))
            .order_by(document_joint_model::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
    }

    /// 活動報告書の一覧
    pub async fn find_rapports_paginated(
        &self,
        statut: Option<StatutRapport>,
        entite_ids: Option<Vec<Uuid>>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<document_joint_model::Model>, u64), DbErr> {
        let mut query = DocumentEntity::find().filter(
            document_joint_model::Column::TypeDocument.eq(TypeDocument::RapportActivite.as_str()),
        );
        if let Some(statut) = statut {
            query = query.filter(document_joint_model::Column::Statut.eq(statut.as_str()));
        }
        if let Some(ids) = entite_ids {
            query = query.filter(document_joint_model::Column::EntiteId.is_in(ids));
        }

        let total_count = query.clone().count(&self.db).await?;
        let items = query
            .order_by(document_joint_model::Column::CreatedAt, Order::Desc)
            .limit(per_page)
            .offset((page.max(1) - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((items, total_count))
    }

    pub async fn update_statut(
        &self,
        doc: document_joint_model::Model,
        statut: StatutRapport,
        commentaire: Option<String>,
    ) -> Result<document_joint_model::Model, DbErr> {
        let mut active: DocumentActiveModel = doc.into();
        active.statut = Set(statut.as_str().to_string());
        active.commentaire = Set(commentaire);
        active.update(&self.db).await
    }
}
