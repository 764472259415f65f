// src/service/mod.rs
pub mod assignation_service;
pub mod auth_service;
pub mod demande_service;
pub mod document_service;
pub mod entite_service;
pub mod entreprise_service;
pub mod feedback_service;
pub mod import_service;
pub mod notification_service;
pub mod public_service;
pub mod stats_service;
pub mod storage_service;
pub mod user_service;
pub mod workflow_service;
