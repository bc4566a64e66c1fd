//! Integration tests for the form submission flow.

use axum::http::StatusCode;

mod common;

async fn fetch_csrf_token(client: &reqwest::Client, addr: std::net::SocketAddr) -> String {
    let res = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    common::extract_csrf_token(&res.text().await.unwrap())
}

#[tokio::test]
async fn test_successful_submission() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();

    let token = fetch_csrf_token(&client, addr).await;
    let res = client
        .post(format!("http://{addr}/submit-form"))
        .form(&[
            ("csrf_token", token.as_str()),
            ("name", "O'Brien-Smith"),
            ("email", "user@example.com"),
            ("year", "senior"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("user@example.com"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_token_valid_for_repeated_submissions() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();

    let token = fetch_csrf_token(&client, addr).await;
    for _ in 0..2 {
        let res = client
            .post(format!("http://{addr}/submit-form"))
            .form(&[
                ("csrf_token", token.as_str()),
                ("name", "Jane Doe"),
                ("email", "jane@example.com"),
                ("year", "freshman"),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_csrf_mismatch_rejected_before_field_validation() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();

    // Establish a session, then present the wrong token alongside fields
    // that would fail validation. The response must be the CSRF 403, not a
    // field-validation 400.
    fetch_csrf_token(&client, addr).await;
    let res = client
        .post(format!("http://{addr}/submit-form"))
        .form(&[
            ("csrf_token", "A".repeat(43).as_str()),
            ("name", "x"),
            ("email", "not-an-email"),
            ("year", "sophomore"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request");

    shutdown.trigger();
}

#[tokio::test]
async fn test_submission_without_prior_visit_rejected() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();

    let res = client
        .post(format!("http://{addr}/submit-form"))
        .form(&[
            ("csrf_token", "never-issued"),
            ("name", "Jane Doe"),
            ("email", "jane@example.com"),
            ("year", "junior"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    shutdown.trigger();
}

#[tokio::test]
async fn test_non_form_body_rejected_with_json_error() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();

    // A JSON post carries no parseable form fields, so it must fail the
    // CSRF check with the uniform JSON error body, never a framework
    // plain-text rejection.
    fetch_csrf_token(&client, addr).await;
    let res = client
        .post(format!("http://{addr}/submit-form"))
        .json(&serde_json::json!({ "name": "Jane Doe" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.headers()["content-type"], "application/json");
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request");

    shutdown.trigger();
}

#[tokio::test]
async fn test_field_validation_errors() {
    let (addr, shutdown) = common::spawn_server(|_| {}).await;
    let client = common::client();
    let token = fetch_csrf_token(&client, addr).await;

    let cases = [
        ("a1", "good@example.com", "senior", "Invalid name format"),
        ("Jane Doe", "not-an-email", "senior", "Invalid email format"),
        ("Jane Doe", "good@example.com", "sophomore year", "Invalid year selection"),
    ];

    for (name, email, year, expected) in cases {
        let res = client
            .post(format!("http://{addr}/submit-form"))
            .form(&[
                ("csrf_token", token.as_str()),
                ("name", name),
                ("email", email),
                ("year", year),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "case {name}/{email}/{year}");
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["error"], expected);
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_form_endpoint_rate_limit_is_independent() {
    let (addr, shutdown) = common::spawn_server(|config| {
        config.rate_limit.form_limit = 1;
    })
    .await;
    let client = common::client();
    let token = fetch_csrf_token(&client, addr).await;

    let form = [
        ("csrf_token", token.as_str()),
        ("name", "Jane Doe"),
        ("email", "jane@example.com"),
        ("year", "graduate"),
    ];

    let res = client
        .post(format!("http://{addr}/submit-form"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Second submission trips the endpoint throttle...
    let res = client
        .post(format!("http://{addr}/submit-form"))
        .form(&form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // ...while the broad throttle still admits other routes
    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    shutdown.trigger();
}
