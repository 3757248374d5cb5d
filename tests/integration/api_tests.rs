//! API integration tests
//!
//! These run against a live server with a migrated database and a bootstrap
//! administrator (see `auth.bootstrap_admin_*` in the configuration).

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn admin_credentials() -> (String, String) {
    (
        std::env::var("LABTRACK_TEST_ADMIN").unwrap_or_else(|_| "admin".to_string()),
        std::env::var("LABTRACK_TEST_PASSWORD").unwrap_or_else(|_| "change-me-now".to_string()),
    )
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn admin_token(client: &Client) -> String {
    let (username, password) = admin_credentials();
    login(client, &username, &password).await
}

async fn post(client: &Client, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn get(client: &Client, token: &str, path: &str) -> (StatusCode, Value) {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn create_lab(client: &Client, token: &str) -> i64 {
    let (status, body) = post(
        client,
        token,
        "/laboratories",
        json!({ "lab_name": unique("Lab"), "location": "Main building" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["lab_id"].as_i64().unwrap()
}

async fn create_workstation(client: &Client, token: &str, lab_id: i64) -> i64 {
    let (status, body) = post(
        client,
        token,
        "/workstations",
        json!({ "lab_id": lab_id, "workstation_name": unique("PC") }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["workstation_id"].as_i64().unwrap()
}

async fn create_asset(client: &Client, token: &str, lab_id: i64, ws: i64, unit_type: &str, status_name: &str) -> i64 {
    let (status, body) = post(
        client,
        token,
        "/inventory",
        json!({
            "property_tag": unique("PT"),
            "unit_type": unit_type,
            "status": status_name,
            "lab_id": lab_id,
            "workstation_id": ws
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["asset_id"].as_i64().unwrap()
}

async fn put(client: &Client, token: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = client
        .put(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    let status = response.status();
    let body = response.json().await.unwrap_or(Value::Null);
    (status, body)
}

async fn submit_lab_request(client: &Client, token: &str, lab_id: i64) -> Value {
    let (status, form) = post(
        client,
        token,
        "/public-forms/lab-requests",
        json!({
            "lab_id": lab_id,
            "requester_name": "Student",
            "purpose": "Review session",
            "details": {
                "kind": "lab_request",
                "date_needed": "2026-11-09",
                "time_start": "13:00",
                "time_end": "15:00"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", form);
    form
}

/// Creates a custodian and returns (user_id, username, password)
async fn new_custodian(client: &Client, token: &str, lab_id: Option<i64>) -> (i64, String, String) {
    let username = unique("custodian");
    let password = "custodian-pass".to_string();
    let (status, body) = post(
        client,
        token,
        "/users",
        json!({
            "username": username,
            "password": password,
            "full_name": "Lab Custodian",
            "role": "custodian",
            "lab_id": lab_id
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    (body["user_id"].as_i64().unwrap(), username, password)
}

async fn create_custodian(client: &Client, token: &str, lab_id: i64) -> (String, String) {
    let (_, username, password) = new_custodian(client, token, Some(lab_id)).await;
    (username, password)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let ready = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_login_and_me() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let (status, body) = get(&client, &token, "/auth/me").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_invalid_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": "nobody", "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/inventory", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_workstation_status_and_repeat_service() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab = create_lab(&client, &token).await;
    let ws = create_workstation(&client, &token, lab).await;
    let cpu = create_asset(&client, &token, lab, ws, "CPU", "Functional").await;
    let ram = create_asset(&client, &token, lab, ws, "RAM", "For Repair").await;
    create_asset(&client, &token, lab, ws, "Mouse", "For Replacement").await;

    let (_, details) = get(&client, &token, &format!("/workstations/{}", ws)).await;
    assert_eq!(details["system_status"], "For Repair");
    assert_eq!(details["peripherals"].as_array().unwrap().len(), 1);

    let submission = json!({
        "workstation_id": ws,
        "quarter": "2026-Q1",
        "asset_actions": [
            { "asset_id": cpu, "action": "CHECKED" },
            { "asset_id": ram, "action": "CHECKED", "status": "For Repair" }
        ]
    });
    let (status, first) = post(&client, &token, "/maintenance/pmc", submission.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    assert_eq!(first["report"]["service_count"], 1);
    assert_eq!(first["report"]["workstation_status"], "For Repair");

    let (status, second) = post(&client, &token, "/maintenance/pmc", submission).await;
    assert_eq!(status, StatusCode::OK, "{}", second);
    assert_eq!(second["report"]["service_count"], 2);
    assert_eq!(second["report"]["pmc_id"], first["report"]["pmc_id"]);

    let (_, state) = get(
        &client,
        &token,
        &format!("/maintenance/pmc/status?quarter=2026-Q1&lab_id={}", lab),
    )
    .await;
    let entry = state
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["workstation_id"] == ws)
        .expect("workstation missing from quarter status");
    assert_eq!(entry["state"], "Serviced");
    assert_eq!(entry["service_count"], 2);
}

#[tokio::test]
#[ignore]
async fn test_repair_log_records_before_and_after() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab = create_lab(&client, &token).await;
    let ws = create_workstation(&client, &token, lab).await;
    let ram = create_asset(&client, &token, lab, ws, "RAM", "For Replacement").await;
    let new_tag = unique("PT");

    let (status, log) = post(
        &client,
        &token,
        "/maintenance/pmc/repair",
        json!({
            "workstation_id": ws,
            "assets": [{
                "asset_id": ram,
                "action": "REPLACED",
                "new_property_tag": new_tag
            }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", log);
    assert_eq!(log["log_type"], "REPAIR");
    assert!(log["pmc_id"].is_null());
    let record = &log["asset_actions"][0];
    assert_eq!(record["status_before"], "For Replacement");
    assert_eq!(record["status_after"], "Functional");
    assert_eq!(record["new_property_tag"], new_tag.as_str());

    let (_, details) = get(&client, &token, &format!("/workstations/{}", ws)).await;
    assert_eq!(details["system_status"], "Functional");
}

#[tokio::test]
#[ignore]
async fn test_batch_with_duplicate_tag_persists_nothing() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab = create_lab(&client, &token).await;
    let existing = unique("PT");
    let (status, _) = post(
        &client,
        &token,
        "/inventory",
        json!({ "property_tag": existing, "unit_type": "Monitor", "lab_id": lab }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let tags = [unique("PT"), unique("PT"), existing.clone(), unique("PT"), unique("PT")];
    let assets: Vec<Value> = tags
        .iter()
        .map(|t| json!({ "property_tag": t, "unit_type": "Keyboard", "lab_id": lab }))
        .collect();

    let (status, body) = post(&client, &token, "/inventory/batch", json!({ "assets": assets })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().starts_with("Asset #3"));

    let (_, page) = get(&client, &token, &format!("/inventory?lab_id={}", lab)).await;
    assert_eq!(page["total"], 1);
}

#[tokio::test]
#[ignore]
async fn test_custodian_cannot_touch_other_lab() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab_a = create_lab(&client, &token).await;
    let lab_b = create_lab(&client, &token).await;
    let ws_b = create_workstation(&client, &token, lab_b).await;
    let (username, password) = create_custodian(&client, &token, lab_a).await;
    let custodian = login(&client, &username, &password).await;

    let (status, form) = post(
        &client,
        &token,
        "/public-forms/lab-requests",
        json!({
            "lab_id": lab_b,
            "requester_name": "Student",
            "purpose": "Thesis defense rehearsal",
            "details": {
                "kind": "lab_request",
                "date_needed": "2026-11-02",
                "time_start": "09:00",
                "time_end": "11:00"
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", form);

    let (status, _) = post(
        &client,
        &custodian,
        &format!("/forms/{}/approve", form["form_id"]),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post(
        &client,
        &custodian,
        "/maintenance/pmc",
        json!({
            "workstation_id": ws_b,
            "asset_actions": [{ "asset_id": 1 }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get(&client, &custodian, &format!("/inventory?lab_id={}", lab_b)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_software_installation_stops_at_custodian() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab = create_lab(&client, &token).await;
    let (username, password) = create_custodian(&client, &token, lab).await;
    let custodian = login(&client, &username, &password).await;

    let (status, form) = post(
        &client,
        &token,
        "/public-forms/software-installations",
        json!({
            "lab_id": lab,
            "requester_name": "Instructor",
            "purpose": "Programming course",
            "details": {
                "kind": "software_installation",
                "software_name": "Rust toolchain",
                "workstation_ids": []
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", form);
    let id = &form["form_id"];

    let (status, approved) = post(&client, &custodian, &format!("/forms/{}/approve", id), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "custodian_approved");

    let (status, _) = post(&client, &token, &format!("/forms/{}/approve", id), json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, current) = get(&client, &token, &format!("/forms/{}", id)).await;
    assert_eq!(current["status"], "custodian_approved");
}

#[tokio::test]
#[ignore]
async fn test_moved_custodian_loses_previous_lab() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab_a = create_lab(&client, &token).await;
    let lab_b = create_lab(&client, &token).await;
    let (user_id, username, password) = new_custodian(&client, &token, Some(lab_a)).await;
    // Issued while the custodian still holds lab A
    let custodian = login(&client, &username, &password).await;

    let (status, body) = put(
        &client,
        &token,
        &format!("/laboratories/{}/custodian", lab_b),
        json!({ "user_id": user_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let old_lab_form = submit_lab_request(&client, &token, lab_a).await;
    let (status, _) = post(
        &client,
        &custodian,
        &format!("/forms/{}/approve", old_lab_form["form_id"]),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let new_lab_form = submit_lab_request(&client, &token, lab_b).await;
    let (status, approved) = post(
        &client,
        &custodian,
        &format!("/forms/{}/approve", new_lab_form["form_id"]),
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", approved);
}

#[tokio::test]
#[ignore]
async fn test_replacing_custodian_detaches_previous_one() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab = create_lab(&client, &token).await;
    let (first_id, username, password) = new_custodian(&client, &token, Some(lab)).await;
    let first = login(&client, &username, &password).await;

    // A second custodian cannot be created for an occupied lab
    let (status, _) = post(
        &client,
        &token,
        "/users",
        json!({
            "username": unique("custodian"),
            "password": "custodian-pass",
            "full_name": "Second Custodian",
            "role": "custodian",
            "lab_id": lab
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (second_id, _, _) = new_custodian(&client, &token, None).await;
    let (status, body) = put(
        &client,
        &token,
        &format!("/laboratories/{}/custodian", lab),
        json!({ "user_id": second_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["in_charge_id"].as_i64(), Some(second_id));

    let (_, previous) = get(&client, &token, &format!("/users/{}", first_id)).await;
    assert!(previous["lab_id"].is_null());

    let form = submit_lab_request(&client, &token, lab).await;
    let (status, _) = post(&client, &first, &format!("/forms/{}/approve", form["form_id"]), json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_borrow_rejects_assets_outside_lab() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let lab_a = create_lab(&client, &token).await;
    let lab_b = create_lab(&client, &token).await;
    let ws_a = create_workstation(&client, &token, lab_a).await;
    let ws_b = create_workstation(&client, &token, lab_b).await;
    let own = create_asset(&client, &token, lab_a, ws_a, "Projector", "Functional").await;
    let foreign = create_asset(&client, &token, lab_b, ws_b, "Projector", "Functional").await;

    let borrow = |asset_ids: Vec<i64>| {
        json!({
            "lab_id": lab_a,
            "requester_name": "Instructor",
            "purpose": "Seminar",
            "details": {
                "kind": "equipment_borrow",
                "asset_ids": asset_ids,
                "borrow_date": "2026-11-03",
                "return_date": "2026-11-04"
            }
        })
    };

    let (status, body) = post(
        &client,
        &token,
        "/public-forms/equipment-borrows",
        borrow(vec![own, foreign, 99_999_999]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains(&foreign.to_string()));
    assert!(message.contains("99999999"));

    let (status, body) = post(&client, &token, "/public-forms/equipment-borrows", borrow(vec![own])).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, _) = post(
        &client,
        &token,
        "/public-forms/software-installations",
        json!({
            "lab_id": lab_a,
            "requester_name": "Instructor",
            "purpose": "Course",
            "details": {
                "kind": "software_installation",
                "software_name": "GIMP",
                "workstation_ids": [ws_b]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
