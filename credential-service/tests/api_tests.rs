mod common;

use std::time::Duration;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

async fn register(app: &TestApp, email: &str, password: &str) -> reqwest::Response {
    app.post("/api/v1/auth/registration")
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn login(app: &TestApp, email: &str, password: &str) -> Value {
    let response = app
        .post("/api/v1/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    response.json().await.expect("Failed to parse response")
}

fn access_token(body: &Value) -> String {
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_registration_success() {
    let app = TestApp::spawn().await;

    let response = register(&app, "alice@example.com", "correct horse battery").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["is_active"], true);
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"].get("password_hash").is_none());
    assert!(body["data"].get("rotation_tag").is_none());
}

#[tokio::test]
async fn test_registration_duplicate_email() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;

    let response = register(&app, "alice@example.com", "another good password").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_rejects_weak_password_and_bad_email() {
    let app = TestApp::spawn().await;

    let weak = register(&app, "alice@example.com", "short").await;
    assert_eq!(weak.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_email = register(&app, "not-an-email", "correct horse battery").await;
    assert_eq!(bad_email.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_and_profile() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;

    let body = login(&app, "alice@example.com", "correct horse battery").await;
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["refresh_token"].is_string());

    let response = app
        .get_authenticated("/api/v1/user/profile", &access_token(&body))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(profile["data"]["email"], "alice@example.com");
    assert!(profile["data"]["last_login"].is_string());
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_alike() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;

    let mut messages = Vec::new();
    for (email, password) in [
        ("alice@example.com", "wrong password!"),
        ("nobody@example.com", "correct horse battery"),
        ("not-an-email", "correct horse battery"),
    ] {
        let response = app
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body: Value = response.json().await.expect("Failed to parse response");
        messages.push(body["data"]["message"].clone());
    }

    assert!(messages.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/v1/user/profile")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get_authenticated("/api/v1/user/profile", "garbage")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_flow() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;
    let body = login(&app, "alice@example.com", "correct horse battery").await;

    let response = app
        .post("/api/v1/auth/refresh-token")
        .json(&json!({ "refresh_token": body["data"]["refresh_token"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let refreshed: Value = response.json().await.expect("Failed to parse response");
    let response = app
        .get_authenticated("/api/v1/user/profile", &access_token(&refreshed))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    // An access token is not accepted as a refresh token.
    let response = app
        .post("/api/v1/auth/refresh-token")
        .json(&json!({ "refresh_token": access_token(&body) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_all_revokes_tokens() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;
    let first = login(&app, "alice@example.com", "correct horse battery").await;
    let second = login(&app, "alice@example.com", "correct horse battery").await;

    let response = app
        .post_authenticated("/api/v1/auth/logout-all", &access_token(&first))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    for body in [&first, &second] {
        let response = app
            .get_authenticated("/api/v1/user/profile", &access_token(body))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .post("/api/v1/auth/refresh-token")
            .json(&json!({ "refresh_token": body["data"]["refresh_token"] }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;
    let body = login(&app, "alice@example.com", "correct horse battery").await;
    let old_token = access_token(&body);

    let response = app
        .post_authenticated("/api/v1/auth/change-password", &old_token)
        .json(&json!({ "old_password": "wrong password!", "new_password": "staple battery horse" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_authenticated("/api/v1/auth/change-password", &old_token)
        .json(&json!({
            "old_password": "correct horse battery",
            "new_password": "staple battery horse",
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let changed: Value = response.json().await.expect("Failed to parse response");

    let response = app
        .get_authenticated("/api/v1/user/profile", &old_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get_authenticated("/api/v1/user/profile", &access_token(&changed))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    login(&app, "alice@example.com", "staple battery horse").await;
}

#[tokio::test]
async fn test_forgot_password_flow() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;

    let response = app
        .post("/api/v1/auth/forgot-password-request")
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    app.context.mailer.wait_for(1).await;
    let token = app
        .context
        .mailer
        .last_reset_token()
        .expect("No reset link was mailed");

    let reset = |password: &'static str| {
        app.post("/api/v1/auth/forgot-password-reset")
            .json(&json!({ "token": token, "new_password": password }))
            .send()
    };

    let response = reset("brand new password").await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = reset("another new password").await.expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "Reset token already used");

    login(&app, "alice@example.com", "brand new password").await;

    let notices = app.context.mailer.wait_for(2).await;
    assert_eq!(notices.last().unwrap().subject, "New password set");
}

#[tokio::test]
async fn test_forgot_password_request_does_not_reveal_accounts() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;

    let mut bodies = Vec::new();
    for email in ["alice@example.com", "nobody@example.com", "not-an-email"] {
        let response = app
            .post("/api/v1/auth/forgot-password-request")
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        bodies.push(response.json::<Value>().await.expect("Failed to parse response"));
    }

    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(app.context.mailer.wait_for(1).await.len(), 1);
}

#[tokio::test]
async fn test_forgot_password_request_answers_before_mail_is_sent() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;
    app.context.mailer.stall_deliveries(Duration::from_secs(30));

    for email in ["alice@example.com", "nobody@example.com"] {
        let response = tokio::time::timeout(
            Duration::from_secs(2),
            app.post("/api/v1/auth/forgot-password-request")
                .json(&json!({ "email": email }))
                .send(),
        )
        .await
        .expect("request waited on the mail relay")
        .expect("Failed to execute request");

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}

#[tokio::test]
async fn test_forgot_password_reset_unknown_token() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/v1/auth/forgot-password-reset")
        .json(&json!({ "token": "deadbeef", "new_password": "brand new password" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_whoami() {
    let app = TestApp::spawn().await;
    register(&app, "alice@example.com", "correct horse battery").await;
    let body = login(&app, "alice@example.com", "correct horse battery").await;

    let anonymous: Value = app
        .get("/api/v1/auth/whoami")
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(anonymous["data"]["anonymous"], true);

    let known: Value = app
        .get_authenticated("/api/v1/auth/whoami", &access_token(&body))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(known["data"]["email"], "alice@example.com");

    let response = app
        .get_authenticated("/api/v1/auth/whoami", "forged")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_subject_is_forbidden() {
    let app = TestApp::spawn().await;
    let response = register(&app, "alice@example.com", "correct horse battery").await;
    let created: Value = response.json().await.expect("Failed to parse response");
    let id = created["data"]["id"].as_i64().unwrap();
    let body = login(&app, "alice@example.com", "correct horse battery").await;

    app.context.store.set_active(id, false);

    let response = app
        .get_authenticated("/api/v1/user/profile", &access_token(&body))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_subject_lookup_requires_superuser() {
    let app = TestApp::spawn().await;
    let created: Value = register(&app, "alice@example.com", "correct horse battery")
        .await
        .json()
        .await
        .expect("Failed to parse response");
    let alice_id = created["data"]["id"].as_i64().unwrap();
    let path = format!("/api/v1/admin/subjects/{}", alice_id);

    let alice = login(&app, "alice@example.com", "correct horse battery").await;
    let response = app
        .get_authenticated(&path, &access_token(&alice))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.context.seed_subject(100, "admin-tag", "administrator password");
    app.context.store.promote(100);
    let admin = login(&app, "subject100@example.com", "administrator password").await;

    let response = app
        .get_authenticated(&path, &access_token(&admin))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert_eq!(body["data"]["is_superuser"], false);

    let response = app
        .get_authenticated("/api/v1/admin/subjects/999999", &access_token(&admin))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
