// src/config.rs
mod app;

pub use app::{AppConfig, OtpConfig, SecurityConfig, ServerConfig};

pub type Config = AppConfig;
