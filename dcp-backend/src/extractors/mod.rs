// src/extractors/mod.rs
pub mod multipart;
pub mod uuid;

pub use multipart::MultipartForm;
pub use uuid::ValidatedUuid;
