//! Lending workflow invariant tests
//!
//! These run against a real Postgres database (DATABASE_URL must be set) and
//! exercise the repository layer directly. Run with: cargo test -- --ignored

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use std::time::{SystemTime, UNIX_EPOCH};

use toolshed_server::models::enums::{LoanState, RequestState, ReturnState, ToolState};
use toolshed_server::models::loan::CreateLoan;
use toolshed_server::models::request::CreateRequest;
use toolshed_server::models::tool_return::CreateReturn;
use toolshed_server::repository::Repository;
use toolshed_server::AppError;

async fn repo() -> Repository {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    Repository::new(pool)
}

fn unique_suffix() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

async fn seed_user(repo: &Repository, role: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role)
         VALUES ('Test', $1, 'not-a-hash', $2) RETURNING id",
    )
    .bind(format!("wf{}@example.com", unique_suffix()))
    .bind(role)
    .fetch_one(&repo.pool)
    .await
    .expect("Failed to seed user")
}

async fn seed_tool(repo: &Repository, state: &str) -> i32 {
    sqlx::query_scalar(
        "INSERT INTO tools (qr_code, name, state)
         VALUES ($1, 'Test tool', $2) RETURNING id",
    )
    .bind(format!("WF-{}", unique_suffix()))
    .bind(state)
    .fetch_one(&repo.pool)
    .await
    .expect("Failed to seed tool")
}

fn sample_request(tool_id: i32) -> CreateRequest {
    CreateRequest {
        tool_id,
        use_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        return_date: NaiveDate::from_ymd_opt(2026, 9, 5).unwrap(),
        reason: None,
    }
}

async fn active_loan_count(repo: &Repository, tool_id: i32) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE tool_id = $1 AND state = 'active'")
        .bind(tool_id)
        .fetch_one(&repo.pool)
        .await
        .expect("count failed")
}

async fn tool_state(repo: &Repository, tool_id: i32) -> ToolState {
    sqlx::query_scalar("SELECT state FROM tools WHERE id = $1")
        .bind(tool_id)
        .fetch_one(&repo.pool)
        .await
        .expect("state lookup failed")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn concurrent_approvals_open_exactly_one_loan() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let alice = seed_user(&repo, "usuario").await;
    let bob = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    let r1 = repo
        .requests
        .create(alice, &sample_request(tool))
        .await
        .expect("first request");
    let r2 = repo
        .requests
        .create(bob, &sample_request(tool))
        .await
        .expect("second request");

    let (a, b) = tokio::join!(
        repo.requests.approve(r1, admin, None),
        repo.requests.approve(r2, admin, None)
    );

    // Exactly one approval wins; the other sees the tool already loaned.
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    assert_eq!(active_loan_count(&repo, tool).await, 1);
    assert_eq!(tool_state(&repo, tool).await, ToolState::Loaned);
}

#[tokio::test]
#[ignore]
async fn approve_on_unavailable_tool_changes_nothing() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "maintenance").await;

    let request_id = repo
        .requests
        .create(user, &sample_request(tool))
        .await
        .expect("request");

    let err = repo
        .requests
        .approve(request_id, admin, None)
        .await
        .expect_err("approval must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    let state: RequestState =
        sqlx::query_scalar("SELECT state FROM requests WHERE id = $1")
            .bind(request_id)
            .fetch_one(&repo.pool)
            .await
            .expect("request lookup");
    assert_eq!(state, RequestState::Pending);
    assert_eq!(active_loan_count(&repo, tool).await, 0);
    assert_eq!(tool_state(&repo, tool).await, ToolState::Maintenance);
}

#[tokio::test]
#[ignore]
async fn mismatched_scan_code_creates_no_return_row() {
    let repo = repo().await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;
    let other_tool = seed_tool(&repo, "available").await;

    let loan_id = repo
        .loans
        .create_direct(
            user,
            &CreateLoan {
                tool_id: tool,
                estimated_return_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
                notes: None,
            },
        )
        .await
        .expect("loan");

    let err = repo
        .returns
        .submit(
            user,
            &CreateReturn {
                loan_id,
                tool_id: other_tool,
                condition_report: "fine".into(),
                user_notes: None,
            },
        )
        .await
        .expect_err("mismatched scan must fail");
    assert!(matches!(err, AppError::Validation(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM returns WHERE loan_id = $1")
        .bind(loan_id)
        .fetch_one(&repo.pool)
        .await
        .expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
#[ignore]
async fn re_review_conflicts_without_duplicate_effects() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    let request_id = repo
        .requests
        .create(user, &sample_request(tool))
        .await
        .expect("request");
    let loan_id = repo
        .requests
        .approve(request_id, admin, Some("ok"))
        .await
        .expect("approve");

    let return_id = repo
        .returns
        .submit(
            user,
            &CreateReturn {
                loan_id,
                tool_id: tool,
                condition_report: "fine".into(),
                user_notes: None,
            },
        )
        .await
        .expect("submit");

    repo.returns
        .approve(return_id, admin, ToolState::Available, None)
        .await
        .expect("first approval");

    // Second review attempt conflicts, whatever the verb.
    let err = repo
        .returns
        .approve(return_id, admin, ToolState::Available, None)
        .await
        .expect_err("second approval must fail");
    assert!(matches!(err, AppError::Conflict(_)));
    let err = repo
        .returns
        .reject(return_id, admin, "too late")
        .await
        .expect_err("reject after approve must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    let loan_state: LoanState = sqlx::query_scalar("SELECT state FROM loans WHERE id = $1")
        .bind(loan_id)
        .fetch_one(&repo.pool)
        .await
        .expect("loan lookup");
    assert_eq!(loan_state, LoanState::Returned);
    assert_eq!(tool_state(&repo, tool).await, ToolState::Available);

    let history_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM history
         WHERE action = 'approve_return' AND entity_type = 'return' AND entity_id = $1",
    )
    .bind(return_id)
    .fetch_one(&repo.pool)
    .await
    .expect("history count");
    assert_eq!(history_rows, 1);
}

#[tokio::test]
#[ignore]
async fn rejected_return_leaves_loan_active_for_resubmission() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    let loan_id = repo
        .loans
        .create_direct(
            user,
            &CreateLoan {
                tool_id: tool,
                estimated_return_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
                notes: None,
            },
        )
        .await
        .expect("loan");

    let submit = |report: &str| CreateReturn {
        loan_id,
        tool_id: tool,
        condition_report: report.into(),
        user_notes: None,
    };

    let return_id = repo
        .returns
        .submit(user, &submit("missing a battery"))
        .await
        .expect("submit");
    repo.returns
        .reject(return_id, admin, "find the battery first")
        .await
        .expect("reject");

    let loan_state: LoanState = sqlx::query_scalar("SELECT state FROM loans WHERE id = $1")
        .bind(loan_id)
        .fetch_one(&repo.pool)
        .await
        .expect("loan lookup");
    assert_eq!(loan_state, LoanState::Active);
    assert_eq!(tool_state(&repo, tool).await, ToolState::Loaned);

    // The rejection frees the loan for a new submission.
    let second = repo
        .returns
        .submit(user, &submit("battery found"))
        .await
        .expect("resubmit");
    let state: ReturnState = sqlx::query_scalar("SELECT state FROM returns WHERE id = $1")
        .bind(second)
        .fetch_one(&repo.pool)
        .await
        .expect("return lookup");
    assert_eq!(state, ReturnState::Pending);
}

#[tokio::test]
#[ignore]
async fn end_to_end_writes_one_history_row_per_transition() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    let request_id = repo
        .requests
        .create(user, &sample_request(tool))
        .await
        .expect("request");
    let loan_id = repo
        .requests
        .approve(request_id, admin, None)
        .await
        .expect("approve");
    let return_id = repo
        .returns
        .submit(
            user,
            &CreateReturn {
                loan_id,
                tool_id: tool,
                condition_report: "good as new".into(),
                user_notes: None,
            },
        )
        .await
        .expect("submit");
    repo.returns
        .approve(return_id, admin, ToolState::Available, None)
        .await
        .expect("approve return");

    let request_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM history
         WHERE action = 'approve_request' AND entity_type = 'request' AND entity_id = $1",
    )
    .bind(request_id)
    .fetch_one(&repo.pool)
    .await
    .expect("history count");
    let return_rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM history
         WHERE action = 'approve_return' AND entity_type = 'return' AND entity_id = $1",
    )
    .bind(return_id)
    .fetch_one(&repo.pool)
    .await
    .expect("history count");
    assert_eq!(request_rows, 1);
    assert_eq!(return_rows, 1);
    assert_eq!(tool_state(&repo, tool).await, ToolState::Available);
}

#[tokio::test]
#[ignore]
async fn deleting_a_loaned_tool_always_conflicts() {
    let repo = repo().await;
    let admin = seed_user(&repo, "admin").await;
    let user = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    repo.loans
        .create_direct(
            user,
            &CreateLoan {
                tool_id: tool,
                estimated_return_date: NaiveDate::from_ymd_opt(2026, 9, 10).unwrap(),
                notes: None,
            },
        )
        .await
        .expect("loan");

    let err = repo
        .tools
        .delete(tool, admin)
        .await
        .expect_err("delete must fail");
    assert!(matches!(err, AppError::Conflict(_)));

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tools WHERE id = $1)")
        .bind(tool)
        .fetch_one(&repo.pool)
        .await
        .expect("exists");
    assert!(exists);
}

#[tokio::test]
#[ignore]
async fn only_the_owner_may_cancel_a_request() {
    let repo = repo().await;
    let alice = seed_user(&repo, "usuario").await;
    let bob = seed_user(&repo, "usuario").await;
    let tool = seed_tool(&repo, "available").await;

    let request_id = repo
        .requests
        .create(alice, &sample_request(tool))
        .await
        .expect("request");

    let err = repo
        .requests
        .cancel(request_id, bob)
        .await
        .expect_err("stranger cancel must fail");
    assert!(matches!(err, AppError::Authorization(_)));

    repo.requests
        .cancel(request_id, alice)
        .await
        .expect("owner cancel");
    let state: RequestState = sqlx::query_scalar("SELECT state FROM requests WHERE id = $1")
        .bind(request_id)
        .fetch_one(&repo.pool)
        .await
        .expect("request lookup");
    assert_eq!(state, RequestState::Cancelled);
}
