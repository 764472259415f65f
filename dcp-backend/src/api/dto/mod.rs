// src/api/dto/mod.rs

pub mod auth_dto;
pub mod demande_dto;
pub mod entite_dto;
pub mod entreprise_dto;
pub mod notification_dto;
pub mod public_dto;
pub mod stats_dto;
pub mod user_dto;
pub mod workflow_dto;
