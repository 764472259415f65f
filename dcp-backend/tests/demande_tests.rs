// tests/demande_tests.rs
mod common;

use axum::{http::StatusCode, Router};
use dcp_backend::domain::user_role::UserRole;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::app_helper::setup_full_app;
use common::auth_helper::{setup_entreprise, setup_staff, TestPrincipal};
use common::request::{create_multipart_request, read_json};
use common::workflow_helper::{create_and_submit, reach_conforme, send};

/// ARTCI 側で企業アカウントなしのエンティティを作る
async fn create_artci_entite(app: &Router, admin: &TestPrincipal, numero_cc: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/entites",
        &admin.access_token,
        Some(json!({ "denomination": "Société Ivoirienne de Banque", "numero_cc": numero_cc })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["compte_entreprise_id"].is_null());
    body["data"]["id"].as_str().unwrap().to_string()
}

async fn request_rapprochement(app: &Router, entreprise: &TestPrincipal, numero_cc: &str) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(create_multipart_request(
            "/api/entreprise/rapprochement",
            &entreprise.access_token,
            &[("numero_cc", numero_cc), ("raison", "Nous sommes le responsable du traitement.")],
            None,
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

async fn upload_rapport(app: &Router, entreprise: &TestPrincipal, filename: &str) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(create_multipart_request(
            "/api/entreprise/rapports",
            &entreprise.access_token,
            &[],
            Some(("file", filename, "application/pdf", b"%PDF-1.4 rapport")),
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

#[tokio::test]
async fn test_rapprochement_approval_links_account() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let entite_id = create_artci_entite(&app.router, &admin, "CC-LIEN1").await;

    // 前後の空白は無視される
    let (status, body) = request_rapprochement(&app.router, &entreprise, "  CC-LIEN1 ").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["statut"], "en_attente");
    assert_eq!(body["data"]["numero_cc"], "CC-LIEN1");
    let demande_id = body["data"]["id"].as_str().unwrap().to_string();

    // 審査待ちの重複申請
    let (status, _) = request_rapprochement(&app.router, &entreprise, "CC-LIEN1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapprochements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "approuver" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "approuve");
    assert_eq!(body["data"]["traite_par"], admin.id.to_string());

    let (_, body) = send(
        &app.router,
        "GET",
        &format!("/api/admin/entites/{}", entite_id),
        &admin.access_token,
        None,
    )
    .await;
    assert_eq!(body["data"]["compte_entreprise_id"], entreprise.id.to_string());
    assert_eq!(body["data"]["origine_saisie"], "rapprochement");

    // 紐付け後は企業側から自社エンティティとして見える
    let (_, body) = send(&app.router, "GET", "/api/entreprise/dashboard", &entreprise.access_token, None).await;
    assert_eq!(body["data"]["entite_id"], entite_id);

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapprochements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "rejeter" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cette demande a déjà été traitée.");
}

#[tokio::test]
async fn test_rapprochement_rejection_keeps_entite_unlinked() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let entite_id = create_artci_entite(&app.router, &admin, "CC-LIEN2").await;
    let (_, body) = request_rapprochement(&app.router, &entreprise, "CC-LIEN2").await;
    let demande_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapprochements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "rejeter", "motif": "Justificatif illisible" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "rejete");
    assert_eq!(body["data"]["motif_rejet"], "Justificatif illisible");

    let (_, body) = send(
        &app.router,
        "GET",
        &format!("/api/admin/entites/{}", entite_id),
        &admin.access_token,
        None,
    )
    .await;
    assert!(body["data"]["compte_entreprise_id"].is_null());
    assert_eq!(body["data"]["origine_saisie"], "saisie_artci");

    let (_, body) = send(&app.router, "GET", "/api/entreprise/rapprochements", &entreprise.access_token, None).await;
    assert_eq!(body["data"][0]["statut"], "rejete");

    // 却下後は再申請できる
    let (status, _) = request_rapprochement(&app.router, &entreprise, "CC-LIEN2").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_rapprochement_conflicts_when_account_owns_entite() {
    let app = setup_full_app().await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    create_and_submit(&app.router, &entreprise).await;
    let entite_id = create_artci_entite(&app.router, &admin, "CC-LIEN3").await;

    let (status, body) = request_rapprochement(&app.router, &entreprise, "CC-LIEN3").await;
    assert_eq!(status, StatusCode::CREATED);
    let demande_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapprochements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "approuver" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // ロールバックされ申請は審査待ちのまま
    let (_, body) = send(
        &app.router,
        "GET",
        "/api/admin/rapprochements?statut=en_attente",
        &admin.access_token,
        None,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["total_count"], 1);

    let (_, body) = send(
        &app.router,
        "GET",
        &format!("/api/admin/entites/{}", entite_id),
        &admin.access_token,
        None,
    )
    .await;
    assert!(body["data"]["compte_entreprise_id"].is_null());
}

#[tokio::test]
async fn test_rapprochement_unknown_numero_cc() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    let (status, _) = request_rapprochement(&app.router, &entreprise, "CC-INCONNU").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_renouvellement_requires_conforme_entite() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;
    let payload = json!({ "date_expiration": "2027-01-31", "motif": "Agrément arrivant à échéance" });

    // エンティティなし
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/entreprise/renouvellement",
        &entreprise.access_token,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 提出済みだが未適合
    create_and_submit(&app.router, &entreprise).await;
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/entreprise/renouvellement",
        &entreprise.access_token,
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("conformes"));
}

#[tokio::test]
async fn test_renouvellement_lifecycle() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    let entite_id = reach_conforme(&app.router, &entreprise, &admin).await;
    let payload = json!({ "date_expiration_agrement": "2027-01-31", "motif": "Renouvellement annuel" });

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/entreprise/renouvellement",
        &entreprise.access_token,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["statut"], "en_attente");
    assert_eq!(body["data"]["entite_id"], entite_id.to_string());
    assert_eq!(body["data"]["date_expiration"], "2027-01-31");
    let demande_id = body["data"]["id"].as_str().unwrap().to_string();

    // 未処理の申請がある間は重複不可
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/entreprise/renouvellement",
        &entreprise.access_token,
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/renouvellements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "approuver", "commentaire": "Renouvellement accordé" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "approuve");
    assert_eq!(body["data"]["commentaire"], "Renouvellement accordé");

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/renouvellements/{}", demande_id),
        &admin.access_token,
        Some(json!({ "action": "rejeter" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // 処理後は新しい申請を出せる
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/entreprise/renouvellement",
        &entreprise.access_token,
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app.router,
        "GET",
        "/api/admin/renouvellements?statut=en_attente",
        &admin.access_token,
        None,
    )
    .await;
    assert_eq!(body["data"]["pagination"]["total_count"], 1);
}

#[tokio::test]
async fn test_rapport_review_valider_and_rejeter() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;
    let admin = setup_staff(&app.router, &app.state, UserRole::Admin).await;

    reach_conforme(&app.router, &entreprise, &admin).await;

    let (status, body) = upload_rapport(&app.router, &entreprise, "rapport-2025.pdf").await;
    assert_eq!(status, StatusCode::CREATED);
    let premier = body["data"]["id"].as_str().unwrap().to_string();
    let (_, body) = upload_rapport(&app.router, &entreprise, "rapport-2026.pdf").await;
    let second = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapports/{}", premier),
        &admin.access_token,
        Some(json!({ "action": "valider", "commentaire": "Rapport complet" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "valide");
    assert_eq!(body["data"]["commentaire"], "Rapport complet");

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapports/{}", premier),
        &admin.access_token,
        Some(json!({ "action": "rejeter" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cette demande a déjà été traitée.");

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/api/admin/rapports/{}", second),
        &admin.access_token,
        Some(json!({ "action": "rejeter", "commentaire": "Signature manquante" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "rejete");

    let (_, body) = send(&app.router, "GET", "/api/admin/rapports?statut=valide", &admin.access_token, None).await;
    assert_eq!(body["data"]["pagination"]["total_count"], 1);

    // 企業には審査結果が通知される
    let (_, body) = send(&app.router, "GET", "/api/entreprise/notifications", &entreprise.access_token, None).await;
    let titres: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|n| n["titre"].as_str())
        .collect();
    assert!(titres.contains(&"Rapport d'activité validé"));
    assert!(titres.contains(&"Rapport d'activité rejeté"));
}

#[tokio::test]
async fn test_rapport_rejected_before_conformite() {
    let app = setup_full_app().await;
    let entreprise = setup_entreprise(&app.router, &app.db.connection).await;

    create_and_submit(&app.router, &entreprise).await;
    let (status, _) = upload_rapport(&app.router, &entreprise, "rapport.pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
