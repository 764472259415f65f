// tests/common/workflow_helper.rs
use axum::{http::StatusCode, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::auth_helper::TestPrincipal;
use crate::common::request::{create_request, read_json};

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let res = app
        .clone()
        .oneshot(create_request(method, uri, Some(token), body.as_ref()))
        .await
        .unwrap();
    let status = res.status();
    (status, read_json(res).await)
}

/// 企業側で申告を作成し提出する
pub async fn create_and_submit(app: &Router, entreprise: &TestPrincipal) -> Uuid {
    let payload = json!({
        "denomination": "Banque Atlantique",
        "numero_cc": format!("CC-{}", &Uuid::new_v4().simple().to_string()[..6]),
        "secteur_activite": "Banque",
        "ville": "Abidjan",
    });
    let (status, body) = send(
        app,
        "POST",
        "/api/entreprise/demande",
        &entreprise.access_token,
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["workflow"]["statut"], "brouillon");
    let entite_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(
        app,
        "POST",
        &format!("/api/entreprise/demande/{}/soumettre", entite_id),
        &entreprise.access_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["workflow"]["statut"], "soumis");

    entite_id
}

/// 管理者自身に割り当てる（en_verification へ進む）。assignation_id を返す
pub async fn assign_to_self(app: &Router, admin: &TestPrincipal, entite_id: Uuid) -> Uuid {
    let echeance = (Utc::now() + Duration::days(7)).date_naive();
    let (status, body) = send(
        app,
        "POST",
        "/api/admin/assignation",
        &admin.access_token,
        Some(json!({ "entite_id": entite_id, "agent_id": admin.id, "echeance": echeance })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

/// 提出から N+1 検証まで進めて Conforme にする
pub async fn reach_conforme(app: &Router, entreprise: &TestPrincipal, admin: &TestPrincipal) -> Uuid {
    let entite_id = create_and_submit(app, entreprise).await;
    let assignation_id = assign_to_self(app, admin, entite_id).await;

    let (status, _) = send(
        app,
        "PUT",
        &format!("/api/admin/assignation/{}", assignation_id),
        &admin.access_token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "PUT",
        &format!("/api/admin/validation-n1/{}", assignation_id),
        &admin.access_token,
        Some(json!({ "action": "valider" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statut"], "valide");

    entite_id
}
