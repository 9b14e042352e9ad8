//! API integration tests
//!
//! These run against a live server with a seeded `admin`/`admin` librarian
//! account. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in and get a bearer token
async fn get_token(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

async fn get_admin_token(client: &Client) -> String {
    get_token(client, "admin", "admin").await
}

/// Create a borrower account (no capability) and return (username, token)
async fn create_borrower(client: &Client, admin_token: &str) -> (String, String) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let username = format!("borrower{}", suffix);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "username": username,
            "password": "reader-pass",
            "can_mark_returned": false
        }))
        .send()
        .await
        .expect("Failed to create borrower");
    assert_eq!(response.status(), 201);

    let token = get_token(client, &username, "reader-pass").await;
    (username, token)
}

/// Create an author, language and book, returning the book id
async fn create_book(client: &Client, admin_token: &str) -> i64 {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();

    let author: Value = client
        .post(format!("{}/authors", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"first_name": "John", "last_name": "Smith"}))
        .send()
        .await
        .expect("Failed to create author")
        .json()
        .await
        .expect("Failed to parse author");

    let language: Value = client
        .post(format!("{}/languages", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"name": format!("Lang {}", suffix)}))
        .send()
        .await
        .expect("Failed to create language")
        .json()
        .await
        .expect("Failed to parse language");

    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({
            "title": "Book Title",
            "summary": "My book summary",
            "isbn": format!("{:013}", suffix % 10_000_000_000_000),
            "author_id": author["id"],
            "language_id": language["id"]
        }))
        .send()
        .await
        .expect("Failed to create book")
        .json()
        .await
        .expect("Failed to parse book");

    book["id"].as_i64().expect("No book id")
}

/// Create an available copy of a book and return its id
async fn create_available_copy(client: &Client, admin_token: &str, book_id: i64) -> String {
    let copy: Value = client
        .post(format!("{}/books/{}/copies", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"imprint": "Unlikely Imprint, 2016", "status": "available"}))
        .send()
        .await
        .expect("Failed to create copy")
        .json()
        .await
        .expect("Failed to parse copy");

    copy["id"].as_str().expect("No copy id").to_string()
}

fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}

#[tokio::test]
#[ignore]
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_loans_require_authentication() {
    let client = Client::new();

    for path in ["/loans/mine", "/loans"] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 401, "{} should require auth", path);
    }
}

#[tokio::test]
#[ignore]
async fn test_all_loans_forbidden_without_capability() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (_, borrower_token) = create_borrower(&client, &admin_token).await;

    // A 403, not an empty list
    let response = client
        .get(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // The self-service view stays accessible
    let response = client
        .get(format!("{}/loans/mine", BASE_URL))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_renewal_forbidden_without_capability() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (_, borrower_token) = create_borrower(&client, &admin_token).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let response = client
        .get(format!("{}/copies/{}/renewal", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", borrower_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_renewal_form_proposes_three_weeks() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let response = client
        .get(format!("{}/copies/{}/renewal", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    let expected = (today() + chrono::Duration::days(21)).to_string();
    assert_eq!(body["proposed_due_back"], expected.as_str());
}

#[tokio::test]
#[ignore]
async fn test_renewal_form_unknown_copy_is_404() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;

    let response = client
        .get(format!(
            "{}/copies/00000000-0000-4000-8000-000000000000/renewal",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_renew_within_window_succeeds() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let new_date = (today() + chrono::Duration::days(14)).to_string();
    let response = client
        .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"due_back": new_date}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["due_back"], new_date.as_str());
}

#[tokio::test]
#[ignore]
async fn test_renew_in_past_rejected() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let past = (today() - chrono::Duration::days(7)).to_string();
    let response = client
        .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"due_back": past}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "due_back");
    assert_eq!(body["message"], "Invalid date - renewal in past");
}

#[tokio::test]
#[ignore]
async fn test_renew_too_far_ahead_rejected() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let far = (today() + chrono::Duration::days(35)).to_string();
    let response = client
        .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"due_back": far}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["field"], "due_back");
    assert_eq!(body["message"], "Invalid date - renewal more than 4 weeks ahead");
}

#[tokio::test]
#[ignore]
async fn test_my_loans_scoped_to_borrower_and_ordered() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (username_a, token_a) = create_borrower(&client, &admin_token).await;
    let (_, _token_b) = create_borrower(&client, &admin_token).await;
    let book_id = create_book(&client, &admin_token).await;

    // Borrower A's user id, to lend copies to them
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let user_a = me["user_id"].as_i64().unwrap();

    // 10 copies: even ones stay in maintenance, odd ones are lent to A
    // with staggered due dates (renewed after borrowing to vary them)
    let mut lent = 0;
    for i in 0..10i64 {
        let copy_id = create_available_copy(&client, &admin_token, book_id).await;
        if i % 2 == 0 {
            continue;
        }

        let response = client
            .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&json!({"user_id": user_a}))
            .send()
            .await
            .expect("Failed to borrow");
        assert_eq!(response.status(), 200);

        let due = (today() + chrono::Duration::days(i % 5)).to_string();
        let response = client
            .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&json!({"due_back": due}))
            .send()
            .await
            .expect("Failed to renew");
        assert_eq!(response.status(), 200);
        lent += 1;
    }

    let body: Value = client
        .get(format!("{}/loans/mine?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = body["items"].as_array().expect("items not an array");
    assert_eq!(items.len(), lent);

    let mut last_due = String::new();
    for item in items {
        assert_eq!(item["status"], "on_loan");
        assert_eq!(item["borrower"]["username"], username_a.as_str());

        let due = item["due_back"].as_str().expect("no due date").to_string();
        assert!(last_due <= due, "loans not ordered by due date");
        last_due = due;
    }
}

#[tokio::test]
#[ignore]
async fn test_all_loans_ordered_across_borrowers() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (username_a, token_a) = create_borrower(&client, &admin_token).await;
    let (username_b, token_b) = create_borrower(&client, &admin_token).await;
    let book_id = create_book(&client, &admin_token).await;

    // Resolve both borrowers' user ids
    let mut user_ids = Vec::new();
    for token in [&token_a, &token_b] {
        let me: Value = client
            .get(format!("{}/auth/me", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse response");
        user_ids.push(me["user_id"].as_i64().unwrap());
    }

    // Lend 6 copies alternating between the two borrowers, with due dates
    // deliberately not in insertion order
    for i in 0..6i64 {
        let copy_id = create_available_copy(&client, &admin_token, book_id).await;

        let response = client
            .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&json!({"user_id": user_ids[(i % 2) as usize]}))
            .send()
            .await
            .expect("Failed to borrow");
        assert_eq!(response.status(), 200);

        let due = (today() + chrono::Duration::days((i * 11) % 7)).to_string();
        let response = client
            .post(format!("{}/copies/{}/renew", BASE_URL, copy_id))
            .header("Authorization", format!("Bearer {}", admin_token))
            .json(&json!({"due_back": due}))
            .send()
            .await
            .expect("Failed to renew");
        assert_eq!(response.status(), 200);
    }

    let body: Value = client
        .get(format!("{}/loans?per_page=100", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let items = body["items"].as_array().expect("items not an array");

    // Ordering is non-decreasing in due_back across the whole listing,
    // regardless of borrower
    let mut last_due = String::new();
    let mut seen = std::collections::HashSet::new();
    for item in items {
        assert_eq!(item["status"], "on_loan");

        let due = item["due_back"].as_str().expect("no due date").to_string();
        assert!(last_due <= due, "all-loans not ordered by due date");
        last_due = due;

        if let Some(username) = item["borrower"]["username"].as_str() {
            seen.insert(username.to_string());
        }
    }
    assert!(seen.contains(&username_a), "borrower A's loans missing");
    assert!(seen.contains(&username_b), "borrower B's loans missing");
}

#[tokio::test]
#[ignore]
async fn test_return_clears_loan_fields() {
    let client = Client::new();
    let admin_token = get_admin_token(&client).await;
    let (_, token_a) = create_borrower(&client, &admin_token).await;
    let book_id = create_book(&client, &admin_token).await;
    let copy_id = create_available_copy(&client, &admin_token, book_id).await;

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token_a))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(format!("{}/copies/{}/borrow", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .json(&json!({"user_id": me["user_id"]}))
        .send()
        .await
        .expect("Failed to borrow");
    assert_eq!(response.status(), 200);

    let body: Value = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to return")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["status"], "available");
    assert!(body["borrower_id"].is_null());
    assert!(body["due_back"].is_null());

    // Returning twice is a conflict
    let response = client
        .post(format!("{}/copies/{}/return", BASE_URL, copy_id))
        .header("Authorization", format!("Bearer {}", admin_token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_summary_counts_visits_per_session() {
    let client = Client::new();
    let session = format!(
        "session-{}",
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos()
    );

    let first: Value = client
        .get(format!("{}/summary", BASE_URL))
        .header("x-session-id", &session)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let second: Value = client
        .get(format!("{}/summary", BASE_URL))
        .header("x-session-id", &session)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(first["num_visits"], 1);
    assert_eq!(second["num_visits"], 2);
    assert!(second["num_books"].is_number());
}
