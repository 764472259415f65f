// src/api/dto/entreprise_dto.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// 企業ダッシュボード
#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub entite_id: Option<Uuid>,
    pub denomination: Option<String>,
    pub statut_workflow: Option<String>,
    pub statut_conformite: Option<String>,
    pub score_conformite: Option<i32>,
    /// 1: 申告, 2: 審査, 3: 完了
    pub etape: u8,
    pub peut_soumettre: bool,
    pub peut_rapporter: bool,
    pub nombre_feedbacks: u64,
    pub notifications_non_lues: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfilRequest {
    #[validate(length(min = 2, max = 255, message = "La dénomination doit contenir entre 2 et 255 caractères."))]
    pub denomination: Option<String>,
    #[validate(length(max = 20))]
    pub telephone: Option<String>,
    #[validate(length(max = 500))]
    pub adresse: Option<String>,
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    #[validate(length(max = 100))]
    pub region: Option<String>,
}

/// 紐付け申請（multipart のテキスト項目）
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RapprochementCreateRequest {
    #[validate(length(min = 1, max = 50, message = "Le N° CC et la raison sont requis."))]
    pub numero_cc: String,
    #[validate(length(min = 1, max = 2000, message = "Le N° CC et la raison sont requis."))]
    pub raison: String,
}
