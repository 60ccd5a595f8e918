//! API integration tests
//!
//! These need a running server on localhost:8080 with a seeded admin account
//! (admin@toolshed.local / admin123). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api";

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Helper to get an admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@toolshed.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response
        .json()
        .await
        .expect("Failed to parse login response");
    body["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Helper to register a fresh user and return (token, user_id)
async fn register_user(client: &Client) -> (String, i64) {
    let email = format!("user{}@example.com", unique_suffix());
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let token = body["token"].as_str().expect("No token").to_string();
    let id = body["user"]["id"].as_i64().expect("No user id");
    (token, id)
}

/// Helper to create a tool as admin, returns (tool_id, qr_code)
async fn create_tool(client: &Client, admin_token: &str) -> (i64, String) {
    let qr = format!("QR-{}", unique_suffix());
    let response = client
        .post(format!("{}/tools", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "qr_code": qr,
            "name": "Cordless drill",
            "location": "Shelf A"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    (body["tool"]["id"].as_i64().expect("No tool id"), qr)
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
async fn test_register_and_login() {
    let client = Client::new();
    let email = format!("user{}@example.com", unique_suffix());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "name": "Login Test",
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "secret123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "usuario");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@toolshed.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_get_current_user() {
    let client = Client::new();
    let (token, id) = register_user(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["id"].as_i64(), Some(id));
}

#[tokio::test]
#[ignore]
async fn test_unknown_qr_returns_404() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;

    let response = client
        .get(format!("{}/tools/qr/NO-SUCH-CODE", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_request_listing_is_admin_only() {
    let client = Client::new();
    let (token, _) = register_user(&client).await;

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_pending_request_rejected() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (user_token, _) = register_user(&client).await;
    let (tool_id, _) = create_tool(&client, &admin_token).await;

    let request_body = json!({
        "tool_id": tool_id,
        "use_date": "2026-09-01",
        "return_date": "2026-09-05",
        "reason": "weekend project"
    });

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&request_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Same user, same tool, still pending
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&request_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_reject_requires_comment() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (user_token, _) = register_user(&client).await;
    let (tool_id, _) = create_tool(&client, &admin_token).await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({
            "tool_id": tool_id,
            "use_date": "2026-09-01",
            "return_date": "2026-09-05"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["request"]["id"].as_i64().expect("No request id");

    let response = client
        .put(format!("{}/requests/{}/reject", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_full_lending_workflow() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (user_token, _) = register_user(&client).await;
    let (tool_id, qr_code) = create_tool(&client, &admin_token).await;

    // User requests the tool
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({
            "tool_id": tool_id,
            "use_date": "2026-09-01",
            "return_date": "2026-09-05"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["request"]["id"].as_i64().expect("No request id");

    // Admin approves, loan opens
    let response = client
        .put(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({ "comment": "have fun" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["loan_id"].as_i64().expect("No loan id");

    // Tool is now loaned
    let response = client
        .get(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["tool"]["state"], "loaned");

    // Approving again conflicts
    let response = client
        .put(format!("{}/requests/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Deleting the tool while loaned conflicts
    let response = client
        .delete(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Scanned code resolves the user's active loan
    let response = client
        .get(format!("{}/returns/loan-by-qr/{}", BASE_URL, qr_code))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["id"].as_i64(), Some(loan_id));

    // User submits the return for review
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({
            "loan_id": loan_id,
            "tool_id": tool_id,
            "condition_report": "light scratches"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let return_id = body["submission"]["id"].as_i64().expect("No return id");

    // A second pending submission for the same loan conflicts
    let response = client
        .post(format!("{}/returns", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&json!({
            "loan_id": loan_id,
            "tool_id": tool_id,
            "condition_report": "still scratched"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Admin approves the return into maintenance
    let response = client
        .put(format!("{}/returns/{}/approve", BASE_URL, return_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "new_tool_state": "maintenance",
            "admin_notes": "needs a new chuck"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Loan closed, tool in maintenance
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["loan"]["state"], "returned");

    let response = client
        .get(format!("{}/tools/{}", BASE_URL, tool_id))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["tool"]["state"], "maintenance");
}

#[tokio::test]
#[ignore]
async fn test_direct_loan_conflicts_on_unavailable_tool() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (user_token, _) = register_user(&client).await;
    let (tool_id, _) = create_tool(&client, &admin_token).await;

    let loan_body = json!({
        "tool_id": tool_id,
        "estimated_return_date": "2026-09-10"
    });

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&loan_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // Second scan of the same tool conflicts and names the state
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .json(&loan_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["message"]
        .as_str()
        .expect("No message")
        .contains("loaned"));
}

#[tokio::test]
#[ignore]
async fn test_stats_requires_admin() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (user_token, _) = register_user(&client).await;

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", user_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_tools"].is_number());
    assert!(body["tools_by_state"].is_array());
}
