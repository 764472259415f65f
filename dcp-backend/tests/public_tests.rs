// tests/public_tests.rs
mod common;

use axum::{
    body,
    http::{header, StatusCode},
};
use dcp_backend::domain::user_role::UserRole;
use serde_json::json;
use tower::ServiceExt;

use common::app_helper::{setup_full_app, TestApp};
use common::auth_helper::{setup_staff, TestPrincipal};
use common::request::{create_get_request, create_request, read_json};

/// 管理者が登録したエンティティを公開まで進める
async fn publish_entite(app: &TestApp, admin: &TestPrincipal, denomination: &str, numero_cc: &str) -> String {
    let payload = json!({
        "denomination": denomination,
        "numero_cc": numero_cc,
        "secteur_activite": "Télécommunications",
        "ville": "Abidjan",
        "region": "Lagunes",
    });
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/admin/entites",
            Some(&admin.access_token),
            Some(&payload),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let entite_id = read_json(res).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    for statut in ["soumis", "en_verification", "conforme", "valide", "publie"] {
        let res = app
            .router
            .clone()
            .oneshot(create_request(
                "PUT",
                &format!("/api/admin/entites/{}/statut", entite_id),
                Some(&admin.access_token),
                Some(&json!({ "statut": statut })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "transition to {}", statut);
    }

    entite_id
}

#[tokio::test]
async fn test_health_check_and_security_headers() {
    let app = setup_full_app().await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/health", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-frame-options"], "DENY");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_echoed_in_header_and_meta() {
    let app = setup_full_app().await;

    let mut req = create_get_request("/api/public/stats", None);
    req.headers_mut()
        .insert("x-request-id", "trace-public-stats".parse().unwrap());
    let res = app.router.clone().oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["x-request-id"], "trace-public-stats");
    let json = read_json(res).await;
    assert_eq!(json["meta"]["request_id"], "trace-public-stats");
}

#[tokio::test]
async fn test_published_entite_appears_in_registry() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    let entite_id = publish_entite(&app, &admin, "Orange Côte d'Ivoire", "CC-ORCI").await;

    // 未公開のエンティティは表示されない
    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "POST",
            "/api/admin/entites",
            Some(&admin.access_token),
            Some(&json!({ "denomination": "Brouillon SA", "numero_cc": "CC-BROU" })),
        ))
        .await
        .unwrap();
    let brouillon_id = read_json(res).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/entites", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], entite_id);
    assert_eq!(items[0]["statut_conformite"], "Conforme");
    assert!(items[0]["numero_autorisation"]
        .as_str()
        .unwrap()
        .starts_with("ARTCI-DCP-"));

    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            &format!("/api/public/entites/{}", entite_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .router
        .clone()
        .oneshot(create_get_request(
            &format!("/api/public/entites/{}", brouillon_id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registry_search_filter() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    publish_entite(&app, &admin, "Orange Côte d'Ivoire", "CC-ORCI").await;
    publish_entite(&app, &admin, "Moov Africa", "CC-MOOV").await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/entites?search=moov", None))
        .await
        .unwrap();
    let body = read_json(res).await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["denomination"], "Moov Africa");
    assert_eq!(body["data"]["pagination"]["total_count"], 1);
}

#[tokio::test]
async fn test_public_stats_and_export() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    publish_entite(&app, &admin, "Orange Côte d'Ivoire", "CC-ORCI").await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/stats", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = read_json(res).await;
    assert!(body["data"]["total_entites_conformes"].as_i64().unwrap() >= 1);

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/export?format=csv", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(res.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment; filename=\"registre_dcp_"));

    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let content = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(content.contains("Orange Côte d'Ivoire"));
    assert!(content.contains("CC-ORCI"));

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/export?format=xlsx", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

async fn export_csv(app: &TestApp, query: &str) -> String {
    let res = app
        .router
        .clone()
        .oneshot(create_get_request(&format!("/api/public/export?{}", query), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_export_applies_registry_filters() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    publish_entite(&app, &admin, "Moov Africa", "CC-MOOV").await;
    let autre = publish_entite(&app, &admin, "Société Générale CI", "CC-SGCI").await;

    let res = app
        .router
        .clone()
        .oneshot(create_request(
            "PUT",
            &format!("/api/admin/entites/{}", autre),
            Some(&admin.access_token),
            Some(&json!({ "ville": "Bouaké", "secteur_activite": "Banque" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let content = export_csv(&app, "format=csv").await;
    assert!(content.contains("CC-MOOV"));
    assert!(content.contains("CC-SGCI"));

    let content = export_csv(&app, "format=csv&search=moov").await;
    assert!(content.contains("CC-MOOV"));
    assert!(!content.contains("CC-SGCI"));

    let content = export_csv(&app, "format=csv&ville=Bouak%C3%A9").await;
    assert!(!content.contains("CC-MOOV"));
    assert!(content.contains("CC-SGCI"));

    let content = export_csv(&app, "secteur_activite=Banque").await;
    assert!(!content.contains("CC-MOOV"));
    assert!(content.contains("CC-SGCI"));

    // 該当なしでもヘッダー行は返す
    let content = export_csv(&app, "format=csv&region=Savanes").await;
    assert!(!content.contains("CC-MOOV"));
    assert!(!content.contains("CC-SGCI"));
    assert!(!content.is_empty());
}

#[tokio::test]
async fn test_public_entite_invalid_uuid() {
    let app = setup_full_app().await;

    let res = app
        .router
        .clone()
        .oneshot(create_get_request("/api/public/entites/abc", None))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
