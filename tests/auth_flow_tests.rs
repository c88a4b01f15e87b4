use warden::testing::TestApp;

#[tokio::test]
async fn test_register_returns_created_user_without_password_hash() {
    let app = TestApp::new().await;

    let body = serde_json::json!({
        "name": "A",
        "email": "a@x.com",
        "password": "longpass1",
        "password_confirmation": "longpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 201, "{}", res.body);
    assert!(res.is_success());

    let data = res.data();
    assert_eq!(data["email"], "a@x.com");
    assert_eq!(data["name"], "A");
    assert!(data.get("password_hash").is_none());
    assert!(data.get("refresh_token").is_none());
}

#[tokio::test]
async fn test_register_validation_failures() {
    let app = TestApp::new().await;

    // Short password
    let body = serde_json::json!({
        "name": "A",
        "email": "a@x.com",
        "password": "short",
        "password_confirmation": "short",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 400);
    assert!(!res.is_success());
    assert!(!res.errors().is_null());

    // Confirmation mismatch
    let body = serde_json::json!({
        "name": "A",
        "email": "a@x.com",
        "password": "longpass1",
        "password_confirmation": "different1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 400);

    // Bad email
    let body = serde_json::json!({
        "name": "A",
        "email": "not-an-email",
        "password": "longpass1",
        "password_confirmation": "longpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;
    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn test_duplicate_email_rejected_case_insensitively() {
    let app = TestApp::new().await;

    app.register_user("A", "dup@example.com", "longpass1").await;

    let body = serde_json::json!({
        "name": "B",
        "email": "DUP@Example.COM",
        "password": "longpass1",
        "password_confirmation": "longpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/register"), &body.to_string())
        .await;

    assert_eq!(res.status, 409, "{}", res.body);
    assert!(!res.is_success());
}

#[tokio::test]
async fn test_login_issues_tokens_that_authenticate() {
    let app = TestApp::new().await;
    app.register_user("A", "login@example.com", "longpass1").await;

    let (token, refresh_token) = app.login("login@example.com", "longpass1").await;
    assert!(!token.is_empty());
    assert!(!refresh_token.is_empty());

    let res = app
        .client
        .get_with_auth(&app.url("/api/user/me"), &token)
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    assert_eq!(res.data()["email"], "login@example.com");
}

#[tokio::test]
async fn test_login_wrong_password_issues_nothing() {
    let app = TestApp::new().await;
    app.register_user("A", "a@x.com", "longpass1").await;

    let body = serde_json::json!({"email": "a@x.com", "password": "wrong"});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 401, "{}", res.body);
    assert!(!res.is_success());
    assert!(res.data().is_null());
}

#[tokio::test]
async fn test_login_unknown_email_is_not_found() {
    let app = TestApp::new().await;

    let body = serde_json::json!({"email": "ghost@x.com", "password": "longpass1"});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;

    assert_eq!(res.status, 404, "{}", res.body);
}

#[tokio::test]
async fn test_logout_revokes_all_access_tokens() {
    let app = TestApp::new().await;
    app.register_user("A", "out@example.com", "longpass1").await;

    // Two devices
    let (token1, _) = app.login("out@example.com", "longpass1").await;
    let (token2, _) = app.login("out@example.com", "longpass1").await;

    let res = app
        .client
        .post_with_auth(&app.url("/api/auth/logout"), &token1, "{}")
        .await;
    assert_eq!(res.status, 200, "{}", res.body);

    // Both tokens are now rejected
    for token in [&token1, &token2] {
        let res = app
            .client
            .get_with_auth(&app.url("/api/user/me"), token)
            .await;
        assert_eq!(res.status, 401);
    }
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::new().await;

    let res = app.client.post(&app.url("/api/auth/logout"), "{}").await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_refresh_rotates_and_old_token_dies() {
    let app = TestApp::new().await;
    app.register_user("A", "rot@example.com", "longpass1").await;
    let (_, refresh_token) = app.login("rot@example.com", "longpass1").await;

    let body = serde_json::json!({"refresh_token": refresh_token});
    let res = app
        .client
        .post(&app.url("/api/auth/refresh"), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "{}", res.body);

    let data = res.data();
    let new_refresh = data["refresh_token"].as_str().unwrap();
    let new_access = data["token"].as_str().unwrap();
    assert_ne!(new_refresh, refresh_token);

    // The fresh access token authenticates
    let res = app
        .client
        .get_with_auth(&app.url("/api/user/me"), new_access)
        .await;
    assert_eq!(res.status, 200);

    // Replaying the consumed refresh token fails
    let res = app
        .client
        .post(&app.url("/api/auth/refresh"), &body.to_string())
        .await;
    assert_eq!(res.status, 401, "{}", res.body);
}

#[tokio::test]
async fn test_refresh_does_not_revoke_access_tokens() {
    let app = TestApp::new().await;
    app.register_user("A", "keep@example.com", "longpass1").await;
    let (access, refresh_token) = app.login("keep@example.com", "longpass1").await;

    let body = serde_json::json!({"refresh_token": refresh_token});
    let res = app
        .client
        .post(&app.url("/api/auth/refresh"), &body.to_string())
        .await;
    assert_eq!(res.status, 200);

    // Multi-device sessions survive a refresh
    let res = app
        .client
        .get_with_auth(&app.url("/api/user/me"), &access)
        .await;
    assert_eq!(res.status, 200);
}

#[tokio::test]
async fn test_forgot_password_flow_end_to_end() {
    let app = TestApp::new().await;
    app.register_user("A", "a@x.com", "longpass1").await;

    // Request a reset; the token goes to the mailer, not the response
    let body = serde_json::json!({"email": "a@x.com"});
    let res = app
        .client
        .post(&app.url("/api/auth/forgot-password"), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "{}", res.body);
    assert!(res.data().is_null());
    assert!(!res.body.contains(&app.mailer.last_reset_token().unwrap()));

    let token = app.mailer.last_reset_token().unwrap();

    // An altered token is rejected
    let altered = format!("{}x", &token[..token.len() - 1]);
    let body = serde_json::json!({
        "email": "a@x.com",
        "token": altered,
        "password": "resetpass1",
        "password_confirmation": "resetpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body.to_string())
        .await;
    assert_eq!(res.status, 401, "{}", res.body);

    // The original token still works
    let body = serde_json::json!({
        "email": "a@x.com",
        "token": token,
        "password": "resetpass1",
        "password_confirmation": "resetpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "{}", res.body);

    // Old password dead, new one works
    let body = serde_json::json!({"email": "a@x.com", "password": "longpass1"});
    let res = app
        .client
        .post(&app.url("/api/auth/login"), &body.to_string())
        .await;
    assert_eq!(res.status, 401);

    app.login("a@x.com", "resetpass1").await;
}

#[tokio::test]
async fn test_forgot_password_unknown_email_is_not_found() {
    let app = TestApp::new().await;

    let body = serde_json::json!({"email": "ghost@x.com"});
    let res = app
        .client
        .post(&app.url("/api/auth/forgot-password"), &body.to_string())
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(app.mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_reset_password_revokes_outstanding_sessions() {
    let app = TestApp::new().await;
    app.register_user("A", "revoke@example.com", "longpass1").await;
    let (access, refresh_token) = app.login("revoke@example.com", "longpass1").await;

    let body = serde_json::json!({"email": "revoke@example.com"});
    app.client
        .post(&app.url("/api/auth/forgot-password"), &body.to_string())
        .await;
    let token = app.mailer.last_reset_token().unwrap();

    let body = serde_json::json!({
        "email": "revoke@example.com",
        "token": token,
        "password": "resetpass1",
        "password_confirmation": "resetpass1",
    });
    let res = app
        .client
        .post(&app.url("/api/auth/reset-password"), &body.to_string())
        .await;
    assert_eq!(res.status, 200, "{}", res.body);

    // The pre-reset access token and refresh token are both dead
    let res = app
        .client
        .get_with_auth(&app.url("/api/user/me"), &access)
        .await;
    assert_eq!(res.status, 401);

    let body = serde_json::json!({"refresh_token": refresh_token});
    let res = app
        .client
        .post(&app.url("/api/auth/refresh"), &body.to_string())
        .await;
    assert_eq!(res.status, 401);
}

#[tokio::test]
async fn test_envelope_shape_on_success_and_failure() {
    let app = TestApp::new().await;

    let res = app
        .client
        .post(&app.url("/api/auth/login"), r#"{"email":"x@y.zz","password":"p"}"#)
        .await;
    let json = res.json();
    assert_eq!(json["status"], false);
    assert!(json["message"].is_string());
    assert!(json["data"].is_null());

    app.register_user("A", "env@example.com", "longpass1").await;
    let res = app
        .client
        .post(
            &app.url("/api/auth/login"),
            r#"{"email":"env@example.com","password":"longpass1"}"#,
        )
        .await;
    let json = res.json();
    assert_eq!(json["status"], true);
    assert_eq!(json["message"], "Login successful");
    assert!(json["errors"].is_null());
}
