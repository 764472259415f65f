// src/repository/mod.rs

pub mod assignation_repository;
pub mod compte_entreprise_repository;
pub mod document_repository;
pub mod entite_repository;
pub mod feedback_repository;
pub mod historique_repository;
pub mod notification_repository;
pub mod otp_code_repository;
pub mod rapprochement_repository;
pub mod renouvellement_repository;
pub mod revoked_token_repository;
pub mod user_repository;
