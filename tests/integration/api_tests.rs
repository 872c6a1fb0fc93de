//! API integration tests

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "admin-password";

/// Helper to get an authenticated client
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Suffix keeping names unique across runs
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn post_json(client: &Client, token: &str, path: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to send request")
}

async fn get_json(client: &Client, token: &str, path: &str) -> Value {
    let response = client
        .get(format!("{}{}", BASE_URL, path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success(), "GET {} failed", path);
    response.json().await.expect("Failed to parse response")
}

/// Reference rows every asset needs
struct Fixture {
    asset_type_id: i64,
    manufacturer_id: i64,
    location_id: i64,
}

async fn create_fixture(client: &Client, token: &str) -> Fixture {
    let asset_type: Value = post_json(client, token, "/asset-types", json!({ "name": unique("Server") }))
        .await
        .json()
        .await
        .expect("Failed to parse asset type");
    let manufacturer: Value = post_json(client, token, "/manufacturers", json!({ "name": unique("Dell") }))
        .await
        .json()
        .await
        .expect("Failed to parse manufacturer");
    let location: Value = post_json(
        client,
        token,
        "/locations",
        json!({ "name": unique("Kampala"), "country": "Uganda" }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse location");

    Fixture {
        asset_type_id: asset_type["id"].as_i64().expect("asset type id"),
        manufacturer_id: manufacturer["id"].as_i64().expect("manufacturer id"),
        location_id: location["id"].as_i64().expect("location id"),
    }
}

fn asset_body(fixture: &Fixture, tag: &str) -> Value {
    json!({
        "asset_tag": tag,
        "name": "Rack server",
        "asset_type_id": fixture.asset_type_id,
        "manufacturer_id": fixture.manufacturer_id,
        "location_id": fixture.location_id,
        "status": "active",
        "priority": "high"
    })
}

async fn create_user(client: &Client, token: &str) -> i64 {
    let username = unique("tech");
    let response = post_json(
        client,
        token,
        "/users",
        json!({
            "username": username,
            "password": "technician-pass",
            "id_number": unique("EMP"),
            "full_name": format!("Technician {}", username)
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse user");
    body["id"].as_i64().expect("user id")
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
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": ADMIN_PASSWORD
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["is_staff"], true);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": ADMIN_USERNAME,
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_unauthenticated_request_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_tag_is_case_insensitive() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let tag = unique("srv").to_uppercase();

    let response = post_json(&client, &token, "/assets", asset_body(&fixture, &tag)).await;
    assert_eq!(response.status(), 201);
    let created: Value = response.json().await.expect("Failed to parse asset");
    assert_eq!(created["asset_tag"], tag.as_str());

    let response = post_json(&client, &token, "/assets", asset_body(&fixture, &tag.to_lowercase())).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse error");
    assert_eq!(body["message"], "An asset with this tag already exists.");
}

#[tokio::test]
#[ignore]
async fn test_installation_before_purchase_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let tag = unique("SRV");

    let mut body = asset_body(&fixture, &tag);
    body["purchase_date"] = json!("2024-03-10");
    body["installation_date"] = json!("2024-03-01");

    let response = post_json(&client, &token, "/assets", body).await;
    assert_eq!(response.status(), 400);

    let response = client
        .get(format!("{}/assets/{}", BASE_URL, tag))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_asset_writes_created_log() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let tag = unique("SRV");

    let response = post_json(&client, &token, "/assets", asset_body(&fixture, &tag)).await;
    assert_eq!(response.status(), 201);

    let logs = get_json(&client, &token, &format!("/assets/{}/logs", tag)).await;
    assert_eq!(logs["total"], 1);
    assert_eq!(logs["items"][0]["event_type"], "created");
}

#[tokio::test]
#[ignore]
async fn test_reassignment_logs_once() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let first = create_user(&client, &token).await;
    let second = create_user(&client, &token).await;
    let tag = unique("SRV");

    let mut body = asset_body(&fixture, &tag);
    body["assigned_to_id"] = json!(first);
    let response = post_json(&client, &token, "/assets", body).await;
    assert_eq!(response.status(), 201);

    let response = client
        .put(format!("{}/assets/{}/assign", BASE_URL, tag))
        .bearer_auth(&token)
        .json(&json!({ "assigned_to_id": second }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let result: Value = response.json().await.expect("Failed to parse assignment");
    assert_eq!(result["asset"]["assigned_to_id"], second);
    assert_eq!(result["log"]["event_type"], "assignment_change");

    // Same assignee again: nothing to record
    let response = client
        .put(format!("{}/assets/{}/assign", BASE_URL, tag))
        .bearer_auth(&token)
        .json(&json!({ "assigned_to_id": second }))
        .send()
        .await
        .expect("Failed to send request");
    let result: Value = response.json().await.expect("Failed to parse assignment");
    assert!(result["log"].is_null());

    let logs = get_json(&client, &token, &format!("/assets/{}/logs", tag)).await;
    let changes = logs["items"]
        .as_array()
        .expect("items")
        .iter()
        .filter(|entry| entry["event_type"] == "assignment_change")
        .count();
    assert_eq!(changes, 1);
}

#[tokio::test]
#[ignore]
async fn test_schedule_maintenance_dates() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let tag = unique("SRV");

    let response = post_json(&client, &token, "/assets", asset_body(&fixture, &tag)).await;
    assert_eq!(response.status(), 201);

    let today = Utc::now().date_naive();
    let yesterday = today - Duration::days(1);
    let tomorrow = today + Duration::days(1);

    let response = post_json(
        &client,
        &token,
        "/maintenance",
        json!({
            "asset_tag": tag,
            "maintenance_type": "preventive",
            "scheduled_date": yesterday.to_string(),
            "description": "Replace fans"
        }),
    )
    .await;
    assert_eq!(response.status(), 400);

    let response = post_json(
        &client,
        &token,
        "/maintenance",
        json!({
            "asset_tag": tag,
            "maintenance_type": "preventive",
            "scheduled_date": tomorrow.to_string(),
            "description": "Replace fans"
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let record: Value = response.json().await.expect("Failed to parse maintenance");
    assert_eq!(record["status"], "scheduled");

    let logs = get_json(&client, &token, &format!("/assets/{}/logs", tag)).await;
    assert_eq!(logs["items"][0]["event_type"], "maintenance_scheduled");
}

#[tokio::test]
#[ignore]
async fn test_health_summary() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let summary = get_json(&client, &token, "/summary/health").await;
    let total = summary["total_assets"].as_i64().expect("total_assets");
    let percentage = summary["health_percentage"].as_f64().expect("health_percentage");
    assert!((0.0..=100.0).contains(&percentage));
    if total == 0 {
        assert_eq!(percentage, 0.0);
    }
}

#[tokio::test]
#[ignore]
async fn test_incident_context_and_related_assets() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let other_fixture = create_fixture(&client, &token).await;
    let holder = create_user(&client, &token).await;

    let tag = unique("UPS");
    let mut body = asset_body(&fixture, &tag);
    body["priority"] = json!("critical");
    body["assigned_to_id"] = json!(holder);
    assert_eq!(post_json(&client, &token, "/assets", body).await.status(), 201);

    // Same location and type
    let sibling = unique("UPS");
    assert_eq!(
        post_json(&client, &token, "/assets", asset_body(&fixture, &sibling)).await.status(),
        201
    );
    // Elsewhere, but held by the same user
    let held = unique("SRV");
    let mut body = asset_body(&other_fixture, &held);
    body["assigned_to_id"] = json!(holder);
    assert_eq!(post_json(&client, &token, "/assets", body).await.status(), 201);
    // Elsewhere and unassigned
    let unrelated = unique("SRV");
    assert_eq!(
        post_json(&client, &token, "/assets", asset_body(&other_fixture, &unrelated)).await.status(),
        201
    );

    for (name, value) in [("Power Rating", "600"), ("Rack Units", "4")] {
        let response = client
            .put(format!("{}/assets/{}/specifications", BASE_URL, tag))
            .bearer_auth(&token)
            .json(&json!({ "specification_name": name, "specification_value": value }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
    }

    let context = get_json(&client, &token, &format!("/assets/{}/incident-context", tag)).await;
    assert_eq!(context["is_critical"], true);
    assert_eq!(context["location"]["id"], fixture.location_id);
    assert_eq!(context["recent_logs"][0]["event_type"], "created");
    let specs = context["critical_specifications"].as_array().expect("specifications");
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0]["specification_name"], "Power Rating");

    let related = get_json(&client, &token, &format!("/assets/{}/related", tag)).await;
    let mut tags: Vec<String> = related
        .as_array()
        .expect("related assets")
        .iter()
        .filter_map(|asset| asset["asset_tag"].as_str().map(str::to_string))
        .collect();
    tags.sort();
    let mut expected = vec![sibling.to_uppercase(), held.to_uppercase()];
    expected.sort();
    assert_eq!(tags, expected);
}

#[tokio::test]
#[ignore]
async fn test_referenced_location_delete_conflicts() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let fixture = create_fixture(&client, &token).await;
    let tag = unique("SRV");
    assert_eq!(
        post_json(&client, &token, "/assets", asset_body(&fixture, &tag)).await.status(),
        201
    );

    let response = client
        .delete(format!("{}/locations/{}", BASE_URL, fixture.location_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}
