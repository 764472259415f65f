// tests/common/auth_helper.rs
use axum::{http::StatusCode, Router};
use dcp_backend::api::dto::user_dto::CreateUserRequest;
use dcp_backend::api::AppState;
use dcp_backend::domain::otp_code_model;
use dcp_backend::domain::user_role::UserRole;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::request::{create_request, read_json};

pub const TEST_PASSWORD: &str = "MyUniqueP@ssw0rd91";

/// ログイン済みの主体
#[derive(Debug, Clone)]
pub struct TestPrincipal {
    pub id: Uuid,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// 企業アカウントの登録リクエスト
pub fn register_payload(email: &str, numero_cc: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": TEST_PASSWORD,
        "password_confirm": TEST_PASSWORD,
        "denomination": format!("Société {}", numero_cc),
        "numero_cc": numero_cc,
        "ville": "Abidjan",
    })
}

/// 最新の未使用 OTP をデータベースから取得
pub async fn latest_otp(db: &DatabaseConnection, compte_id: Uuid, otp_type: &str) -> String {
    otp_code_model::Entity::find()
        .filter(otp_code_model::Column::CompteEntrepriseId.eq(compte_id))
        .filter(otp_code_model::Column::OtpType.eq(otp_type))
        .filter(otp_code_model::Column::Used.eq(false))
        .order_by_desc(otp_code_model::Column::CreatedAt)
        .one(db)
        .await
        .unwrap()
        .expect("otp code stored")
        .code
}

/// 登録のみ（OTP 未検証）。compte_id を返す
pub async fn register_entreprise(app: &Router, email: &str, numero_cc: &str) -> Uuid {
    let payload = register_payload(email, numero_cc);
    let res = app
        .clone()
        .oneshot(create_request("POST", "/api/auth/register", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = read_json(res).await;
    body["data"]["compte"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

pub async fn login(app: &Router, email: &str, password: &str, login_type: &str) -> TestPrincipal {
    let payload = json!({ "email": email, "password": password, "login_type": login_type });
    let res = app
        .clone()
        .oneshot(create_request("POST", "/api/auth/login", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK, "login failed for {}", email);

    let body = read_json(res).await;
    let data = &body["data"];
    TestPrincipal {
        id: data["profile"]["id"].as_str().unwrap().parse().unwrap(),
        email: email.to_string(),
        access_token: data["access_token"].as_str().unwrap().to_string(),
        refresh_token: data["refresh_token"].as_str().unwrap().to_string(),
    }
}

/// 登録・OTP 検証・ログインまで済ませた企業アカウント
pub async fn setup_entreprise(app: &Router, db: &DatabaseConnection) -> TestPrincipal {
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("contact{}@societe.ci", &suffix[..8]);
    let numero_cc = format!("CC{}", &suffix[..8]).to_uppercase();

    let compte_id = register_entreprise(app, &email, &numero_cc).await;
    let code = latest_otp(db, compte_id, "inscription").await;

    let payload = json!({ "email": email, "code": code, "type": "inscription" });
    let res = app
        .clone()
        .oneshot(create_request("POST", "/api/auth/verify-otp", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    login(app, &email, TEST_PASSWORD, "entreprise").await
}

/// サービス経由でスタッフを作成してログイン
pub async fn setup_staff(app: &Router, state: &AppState, role: UserRole) -> TestPrincipal {
    let suffix = Uuid::new_v4().simple().to_string();
    let email = format!("{}{}@artci.ci", role.as_str(), &suffix[..8]);

    state
        .user_service
        .create(CreateUserRequest {
            nom: "Kouassi".to_string(),
            prenom: "Aya".to_string(),
            email: email.clone(),
            password: TEST_PASSWORD.to_string(),
            role,
            telephone: None,
        })
        .await
        .unwrap();

    login(app, &email, TEST_PASSWORD, "artci").await
}
