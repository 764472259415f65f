// src/service/storage_service.rs

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{Client, Config};
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// ストレージプロバイダーの種類
#[derive(Debug, Clone, PartialEq)]
pub enum StorageProvider {
    Local,
    S3,
}

impl StorageProvider {
    pub fn from_env() -> Self {
        match std::env::var("STORAGE_PROVIDER")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "s3" | "minio" | "r2" => Self::S3,
            _ => Self::Local,
        }
    }
}

/// ストレージサービスのトレイト定義
#[async_trait]
pub trait StorageService: Send + Sync {
    /// ファイルを保存し、保存先キーを返す
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        file_data: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String>;

    async fn download(&self, key: &str) -> AppResult<Vec<u8>>;

    async fn delete(&self, key: &str) -> AppResult<()>;
}

/// 保存キーを生成（prefix/YYYY/MM/uuid_filename）
pub fn generate_key(prefix: &str, filename: &str) -> String {
    format!(
        "{}/{}/{}_{}",
        prefix.trim_matches('/'),
        Utc::now().format("%Y/%m"),
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

/// ローカルファイルシステムへの保存
pub struct LocalStorageService {
    root: PathBuf,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// キーがルート外を指さないことを確認してパスに変換
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::BadRequest("Chemin de fichier invalide".to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        file_data: Vec<u8>,
        _content_type: &str,
    ) -> AppResult<String> {
        let key = generate_key(prefix, filename);
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(error = %e, "Failed to create upload directory");
                AppError::InternalServerError("Failed to store file".to_string())
            })?;
        }

        tokio::fs::write(&path, file_data).await.map_err(|e| {
            error!(error = %e, key = %key, "Failed to write file");
            AppError::InternalServerError("Failed to store file".to_string())
        })?;

        info!(key = %key, "File stored locally");
        Ok(key)
    }

    async fn download(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|_| AppError::NotFound("Fichier introuvable".to_string()))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!(error = %e, key = %key, "Failed to delete file");
                Err(AppError::InternalServerError("Failed to delete file".to_string()))
            }
        }
    }
}

/// S3互換ストレージサービスの実装
pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(config: &StorageConfig) -> AppResult<Self> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "storage_service",
        );

        // MinIO などのためパススタイルを強制
        let s3_config = Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn upload(
        &self,
        prefix: &str,
        filename: &str,
        file_data: Vec<u8>,
        content_type: &str,
    ) -> AppResult<String> {
        let key = generate_key(prefix, filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(file_data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "S3 upload failed");
                AppError::ExternalServiceError("Failed to upload file".to_string())
            })?;

        Ok(key)
    }

    async fn download(&self, key: &str) -> AppResult<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::NotFound(format!("Fichier introuvable : {}", e)))?;

        let data = response.body.collect().await.map_err(|e| {
            error!(error = %e, "S3 read failed");
            AppError::ExternalServiceError("Failed to read file data".to_string())
        })?;

        Ok(data.to_vec())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "S3 delete failed");
                AppError::ExternalServiceError("Failed to delete file".to_string())
            })?;

        Ok(())
    }
}

/// ストレージ設定
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    /// ローカル保存先
    pub upload_folder: String,
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Local,
            upload_folder: "uploads".to_string(),
            endpoint: String::new(),
            bucket: String::new(),
            region: "us-east-1".to_string(),
            access_key: String::new(),
            secret_key: String::new(),
        }
    }
}

impl StorageConfig {
    pub fn from_env() -> AppResult<Self> {
        let provider = StorageProvider::from_env();
        let upload_folder =
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string());

        info!(provider = ?provider, "Storage provider selected");

        if provider == StorageProvider::Local {
            return Ok(Self {
                upload_folder,
                ..Default::default()
            });
        }

        let required = |key: &str| {
            std::env::var(key)
                .map_err(|_| AppError::InternalServerError(format!("{} not set", key)))
        };

        Ok(Self {
            provider,
            upload_folder,
            endpoint: required("STORAGE_ENDPOINT")?,
            bucket: required("STORAGE_BUCKET")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            access_key: required("STORAGE_ACCESS_KEY")?,
            secret_key: required("STORAGE_SECRET_KEY")?,
        })
    }
}

/// ストレージサービスのファクトリ関数
pub fn create_storage_service(config: &StorageConfig) -> AppResult<Arc<dyn StorageService>> {
    match config.provider {
        StorageProvider::Local => Ok(Arc::new(LocalStorageService::new(&config.upload_folder))),
        StorageProvider::S3 => Ok(Arc::new(S3StorageService::new(config)?)),
    }
}

/// ファイル名から危険な文字を取り除く
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "fichier".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("rapport 2024.pdf"), "rapport_2024.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\statuts.docx"), "statuts.docx");
        assert_eq!(sanitize_filename(".."), "fichier");
    }

    #[test]
    fn test_generate_key() {
        let key = generate_key("/rapports/", "bilan.pdf");
        assert!(key.starts_with("rapports/"));
        assert!(key.ends_with("_bilan.pdf"));
    }

    #[tokio::test]
    async fn test_local_storage_roundtrip() {
        let root = std::env::temp_dir().join(format!("dcp-storage-{}", Uuid::new_v4()));
        let storage = LocalStorageService::new(&root);

        let key = storage
            .upload("preuves", "cni.png", b"contenu".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(storage.download(&key).await.unwrap(), b"contenu".to_vec());

        storage.delete(&key).await.unwrap();
        assert!(storage.download(&key).await.is_err());
        // 存在しないキーの削除は成功扱い
        storage.delete(&key).await.unwrap();

        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let storage = LocalStorageService::new(std::env::temp_dir());
        assert!(storage.download("../secret").await.is_err());
    }
}
