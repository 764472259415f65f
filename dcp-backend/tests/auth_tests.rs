// tests/auth_tests.rs
mod common;

use axum::http::{header, StatusCode};
use dcp_backend::domain::user_role::UserRole;
use serde_json::json;
use tower::ServiceExt;

use common::app_helper::setup_full_app;
use common::auth_helper::{
    latest_otp, login, register_entreprise, register_payload, setup_entreprise, setup_staff,
    TEST_PASSWORD,
};
use common::request::{create_get_request, create_request, read_json};

#[tokio::test]
async fn test_register_then_login_requires_verified_email() {
    let app = setup_full_app().await;

    register_entreprise(&app.router, "contact@societe-a.ci", "CC-A001").await;

    // OTP 未検証のままログイン
    let payload = json!({ "email": "contact@societe-a.ci", "password": TEST_PASSWORD });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/login", None, Some(&payload)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = read_json(res).await;
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = setup_full_app().await;

    register_entreprise(&app.router, "dup@societe.ci", "CC-DUP1").await;

    let payload = register_payload("dup@societe.ci", "CC-DUP2");
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/register", None, Some(&payload)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_duplicate_numero_cc_with_spaces_conflict() {
    let app = setup_full_app().await;

    register_entreprise(&app.router, "cc@societe.ci", "CC-TRIM1").await;

    // 前後の空白や大文字を除いた値で重複判定される
    let payload = register_payload("autre@societe.ci", "  CC-TRIM1 ");
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/register", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let payload = register_payload("CC@Societe.CI", "CC-TRIM2");
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/register", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_weak_password_rejected() {
    let app = setup_full_app().await;

    let payload = json!({
        "email": "weak@societe.ci",
        "password": "password",
        "password_confirm": "password",
        "denomination": "Société Faible",
        "numero_cc": "CC-WEAK",
    });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/register", None, Some(&payload)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_otp_with_wrong_code() {
    let app = setup_full_app().await;

    register_entreprise(&app.router, "otp@societe.ci", "CC-OTP1").await;

    let payload = json!({ "email": "otp@societe.ci", "code": "000000x", "type": "inscription" });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/verify-otp", None, Some(&payload)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_cookies_and_me_returns_profile() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    // ログインレスポンスの Cookie
    let payload = json!({ "email": entreprise.email, "password": TEST_PASSWORD });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/login", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookies: Vec<_> = res
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
    assert!(cookies.iter().any(|c| c.starts_with("refresh_token=")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly")));

    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            "/api/auth/me",
            Some(&entreprise.access_token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["data"]["type"], "entreprise");
    assert_eq!(body["data"]["email"], entreprise.email);
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let app = setup_full_app().await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/auth/me", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(res).await;
    assert_eq!(body["error_type"], "unauthorized");
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let payload = json!({ "refresh_token": entreprise.refresh_token });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/refresh", None, Some(&payload)))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["access_token"].as_str().is_some());
}

#[tokio::test]
async fn test_logout_revokes_tokens() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let payload = json!({ "refresh_token": entreprise.refresh_token });
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/auth/logout",
            Some(&entreprise.access_token),
            Some(&payload),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // 失効済みアクセストークン
    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            "/api/auth/me",
            Some(&entreprise.access_token),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // 失効済みリフレッシュトークン
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/refresh", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_and_reset_password() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let payload = json!({ "email": entreprise.email });
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(&payload),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let code = latest_otp(&app.db.connection, entreprise.id, "reset_password").await;
    let new_password = "N0uveau!Secret42";
    let payload = json!({
        "email": entreprise.email,
        "code": code,
        "new_password": new_password,
        "new_password_confirm": new_password,
    });
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(&payload),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    login(&app.router, &entreprise.email, new_password, "entreprise").await;
}

#[tokio::test]
async fn test_forgot_password_unknown_email_is_silent() {
    let app = setup_full_app().await;

    let payload = json!({ "email": "inconnu@societe.ci" });
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(&payload),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_staff_login_and_wrong_password() {
    let app = setup_full_app().await;
    let staff = setup_staff(&app.router, &app.state, UserRole::Reader).await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/auth/me", Some(&staff.access_token)))
        .await
        .unwrap();
    let body = read_json(res).await;
    assert_eq!(body["data"]["type"], "artci");
    assert_eq!(body["data"]["role"], "reader");

    let payload = json!({ "email": staff.email, "password": "Wr0ng!Password", "login_type": "artci" });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/auth/login", None, Some(&payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_entreprise_cannot_reach_admin_routes() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            "/api/admin/dashboard",
            Some(&entreprise.access_token),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_staff_cannot_reach_entreprise_routes() {
    let app = setup_full_app().await;
    let staff = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            "/api/entreprise/dashboard",
            Some(&staff.access_token),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_password_blocks_entreprise_portal() {
    use chrono::{Duration, Utc};
    use dcp_backend::domain::compte_entreprise_model;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/entreprise/dashboard", Some(&entreprise.access_token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // 発行済みトークンのまま期限切れにする
    let compte = compte_entreprise_model::Entity::find_by_id(entreprise.id)
        .one(&app.db.connection)
        .await
        .unwrap()
        .unwrap();
    let mut active: compte_entreprise_model::ActiveModel = compte.into();
    active.password_expires_at = Set(Some(Utc::now() - Duration::days(1)));
    active.update(&app.db.connection).await.unwrap();

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/entreprise/dashboard", Some(&entreprise.access_token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = read_json(res).await;
    assert_eq!(body["error_type"], "password_expired");
}

#[tokio::test]
async fn test_staff_token_follows_current_account_state() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;
    let agent = setup_staff(&app.router, &app.state, UserRole::Editor).await;
    let entite = json!({ "denomination": "Moov Africa", "numero_cc": "CC-MOOV1" });

    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/admin/entites", Some(&agent.access_token), Some(&entite)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // 降格は既存トークンにも即時反映される
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "PUT",
            &format!("/api/admin/users/{}", agent.id),
            Some(&admin.access_token),
            Some(&json!({ "role": "reader" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let entite = json!({ "denomination": "Moov Africa Bis", "numero_cc": "CC-MOOV2" });
    let res = app
        .router
        .clone()
        .oneshot(create_request("POST", "/api/admin/entites", Some(&agent.access_token), Some(&entite)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/admin/entites", Some(&agent.access_token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // 無効化後は閲覧もできない
    let res = app
        .router
        .clone()
        .oneshot(create_request::<()>(
            "DELETE",
            &format!("/api/admin/users/{}", agent.id),
            Some(&admin.access_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/admin/entites", Some(&agent.access_token)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = read_json(res).await;
    assert_eq!(body["message"], "Ce compte a été désactivé.");
}
