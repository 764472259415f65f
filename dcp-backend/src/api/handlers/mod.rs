// src/api/handlers/mod.rs

pub mod admin_handler;
pub mod auth_handler;
pub mod entreprise_handler;
pub mod notification_handler;
pub mod public_handler;
pub mod user_handler;
