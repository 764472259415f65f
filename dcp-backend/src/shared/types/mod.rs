// src/shared/types/mod.rs

pub mod pagination;

pub use pagination::{PaginatedResponse, PaginationMeta};

/// 1ページあたりのデフォルト件数
pub const DEFAULT_PAGE_SIZE: u32 = 50;
/// 1ページあたりの最大件数
pub const MAX_PAGE_SIZE: u32 = 200;
