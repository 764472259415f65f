// src/service/document_service.rs

use crate::domain::document_joint_model;
use crate::domain::document_type::{is_allowed_extension, TypeDocument, ALLOWED_EXTENSIONS};
use crate::error::{AppError, AppResult};
use crate::repository::document_repository::{DocumentRepository, NewDocument};
use crate::service::storage_service::{sanitize_filename, StorageService};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// multipart から取り出したファイル
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// 送信された Content-Type がなければ拡張子から推定
    pub fn mime_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|c| !c.is_empty() && c != mime::APPLICATION_OCTET_STREAM.essence_str())
            .unwrap_or_else(|| {
                mime_guess::from_path(&self.filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            })
    }
}

/// 書類の所有者
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentOwner {
    pub entite_id: Option<Uuid>,
    pub compte_entreprise_id: Option<Uuid>,
}

pub struct DocumentService {
    document_repo: Arc<DocumentRepository>,
    storage: Arc<dyn StorageService>,
    max_size: usize,
}

impl DocumentService {
    pub fn new(
        document_repo: Arc<DocumentRepository>,
        storage: Arc<dyn StorageService>,
        max_size: usize,
    ) -> Self {
        Self {
            document_repo,
            storage,
            max_size,
        }
    }

    pub fn validate_file(&self, file: &UploadedFile) -> AppResult<()> {
        validate_upload(file, self.max_size)
    }

    /// 検証後にストレージへ保存し、メタデータを登録する
    pub async fn store(
        &self,
        file: UploadedFile,
        type_document: TypeDocument,
        owner: DocumentOwner,
    ) -> AppResult<document_joint_model::Model> {
        self.validate_file(&file)?;

        let nom_fichier = sanitize_filename(&file.filename);
        let mime_type = file.mime_type();
        let taille = file.data.len() as i64;

        let chemin_fichier = self
            .storage
            .upload(type_document.as_str(), &nom_fichier, file.data, &mime_type)
            .await?;

        let created = self
            .document_repo
            .create(NewDocument {
                entite_id: owner.entite_id,
                compte_entreprise_id: owner.compte_entreprise_id,
                type_document,
                nom_fichier,
                chemin_fichier: chemin_fichier.clone(),
                taille,
                mime_type,
            })
            .await;

        // メタデータ登録に失敗したら保存済みファイルを消す
        let document = match created {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&chemin_fichier).await {
                    warn!(key = %chemin_fichier, error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(e.into());
            }
        };

        info!(
            document_id = %document.id,
            type_document = %type_document,
            taille,
            "Document stored"
        );
        Ok(document)
    }

    pub async fn find(&self, id: Uuid) -> AppResult<document_joint_model::Model> {
        self.document_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document non trouvé.".to_string()))
    }

    pub async fn download(&self, document: &document_joint_model::Model) -> AppResult<Vec<u8>> {
        self.storage.download(&document.chemin_fichier).await
    }
}

pub fn validate_upload(file: &UploadedFile, max_size: usize) -> AppResult<()> {
    if file.filename.trim().is_empty() || file.data.is_empty() {
        return Err(AppError::BadRequest("Aucun fichier fourni.".to_string()));
    }
    if !is_allowed_extension(&file.filename) {
        return Err(AppError::BadRequest(format!(
            "Type de fichier non autorisé. Extensions acceptées : {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    if file.data.len() > max_size {
        return Err(AppError::BadRequest(format!(
            "Fichier trop volumineux (maximum {} Mo).",
            max_size / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile {
            filename: name.to_string(),
            content_type: None,
            data: vec![0u8; size],
        }
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload(&file("rapport.pdf", 10), 1024).is_ok());
        assert!(matches!(
            validate_upload(&file("script.exe", 10), 1024),
            Err(AppError::BadRequest(_))
        ));
        assert!(validate_upload(&file("rapport.pdf", 2048), 1024).is_err());
        assert!(validate_upload(&file("rapport.pdf", 0), 1024).is_err());
    }

    #[test]
    fn test_mime_type_guess() {
        assert_eq!(file("scan.png", 1).mime_type(), "image/png");
        let explicit = UploadedFile {
            content_type: Some("application/pdf".to_string()),
            ..file("sans_extension", 1)
        };
        assert_eq!(explicit.mime_type(), "application/pdf");
    }
}
