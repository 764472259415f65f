// src/utils/mod.rs

pub mod csv;
pub mod email;
pub mod jwt;
pub mod otp;
pub mod password;
