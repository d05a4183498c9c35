// ABOUTME: HTTP tests for the token, token-info and health routes
// ABOUTME: Drives the full axum router with tower oneshot requests and checks OAuth2 response bodies
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use m2m_token_service::{
    constants::paths, oauth2_server::routes::basic_authorization_header, server,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const DOMAIN_HEADER: &str = "X-OAUTH-IDENTITY-DOMAIN-NAME";
const FORM: &str = "application/x-www-form-urlencoded";

fn app() -> Router {
    server::router(Arc::new(common::token_service()))
}

fn token_request(
    credentials: Option<(&str, &str)>,
    domain: Option<&str>,
    body: &str,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(paths::TOKEN)
        .header(header::CONTENT_TYPE, FORM);
    if let Some((id, secret)) = credentials {
        builder = builder.header(header::AUTHORIZATION, basic_authorization_header(id, secret));
    }
    if let Some(domain) = domain {
        builder = builder.header(DOMAIN_HEADER, domain);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

fn token_info_request(token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("{}?access_token={token}", paths::TOKEN_INFO))
        .header(DOMAIN_HEADER, "acme.example")
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn issue_token(app: &Router) -> String {
    let (status, body) = send(
        app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            Some("acme.example"),
            "grant_type=CLIENT_CREDENTIALS&scope=read",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["access_token"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn test_token_endpoint_issues_bearer_token() {
    let app = app();

    let (status, body) = send(
        &app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            Some("acme.example"),
            "grant_type=CLIENT_CREDENTIALS&scope=read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["scope"], "read");
    assert_eq!(body["access_token"].as_str().unwrap().split('.').count(), 3);
}

#[tokio::test]
async fn test_token_info_round_trip() {
    let app = app();
    let token = issue_token(&app).await;

    let (status, body) = send(&app, token_info_request(&token)).await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["iss"], common::TEST_ISSUER);
    assert_eq!(body["aud"], serde_json::json!([common::TEST_AUDIENCE]));
    assert_eq!(body["sub"], "acme-client");
    assert_eq!(body["client"], "acme-client");
    assert_eq!(body["domain"], "acme.example");
    assert_eq!(body["scope"], serde_json::json!(["read"]));
    assert_eq!(body["v"], "1.0");
    assert_eq!(body["userRole"], "USER");
    assert_eq!(
        body["exp"].as_i64().unwrap() - body["iat"].as_i64().unwrap(),
        3600
    );
    assert!(!body["jti"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_grant_type_is_unsupported() {
    let app = app();
    let (status, body) = send(
        &app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            Some("acme.example"),
            "grant_type=client_credentials&scope=read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_grant_type");
}

#[tokio::test]
async fn test_missing_domain_header_is_invalid_request() {
    let app = app();
    let (status, body) = send(
        &app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            None,
            "grant_type=CLIENT_CREDENTIALS&scope=read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn test_missing_scope_is_invalid_request() {
    let app = app();
    let (status, body) = send(
        &app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            Some("acme.example"),
            "grant_type=CLIENT_CREDENTIALS",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn test_bad_credentials_are_invalid_client() {
    let app = app();
    let form = "grant_type=CLIENT_CREDENTIALS&scope=read";

    for (credentials, domain) in [
        (None, "acme.example"),
        (Some(("acme-client", "wrong")), "acme.example"),
        (Some(("acme-client", "s3cr3t")), "globex.example"),
        (Some(("ghost", "s3cr3t")), "acme.example"),
    ] {
        let (status, body) = send(&app, token_request(credentials, Some(domain), form)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{credentials:?} in {domain}");
        assert_eq!(body["error"], "invalid_client");
    }
}

#[tokio::test]
async fn test_malformed_basic_header_is_invalid_client() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri(paths::TOKEN)
        .header(header::CONTENT_TYPE, FORM)
        .header(header::AUTHORIZATION, "Basic not*base64")
        .header(DOMAIN_HEADER, "acme.example")
        .body(Body::from("grant_type=CLIENT_CREDENTIALS&scope=read"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn test_unreadable_form_body_is_invalid_request() {
    let app = app();
    let without_content_type = Request::builder()
        .method("POST")
        .uri(paths::TOKEN)
        .header(header::AUTHORIZATION, basic_authorization_header("acme-client", "s3cr3t"))
        .header(DOMAIN_HEADER, "acme.example")
        .body(Body::from("grant_type=CLIENT_CREDENTIALS&scope=read"))
        .unwrap();
    let wrong_content_type = Request::builder()
        .method("POST")
        .uri(paths::TOKEN)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, basic_authorization_header("acme-client", "s3cr3t"))
        .header(DOMAIN_HEADER, "acme.example")
        .body(Body::from(r#"{"grant_type":"CLIENT_CREDENTIALS"}"#))
        .unwrap();

    for request in [without_content_type, wrong_content_type] {
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
        assert!(body["error_description"]
            .as_str()
            .unwrap()
            .contains("Invalid token request body"));
    }
}

#[tokio::test]
async fn test_disallowed_scope_is_invalid_request() {
    let app = app();
    let (status, body) = send(
        &app,
        token_request(
            Some(("acme-client", "s3cr3t")),
            Some("acme.example"),
            "grant_type=CLIENT_CREDENTIALS&scope=write",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(body["error_description"]
        .as_str()
        .unwrap()
        .contains("write"));
}

#[tokio::test]
async fn test_token_info_rejects_tampered_and_garbage_tokens() {
    let app = app();
    let token = issue_token(&app).await;

    let last = token.chars().last().unwrap();
    let replacement = if last == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}{replacement}", &token[..token.len() - 1]);

    for candidate in [tampered.as_str(), "garbage", "a.b.c"] {
        let (status, body) = send(&app, token_info_request(candidate)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{candidate}");
        assert_eq!(body["error"], "invalid_token");
    }
}

#[tokio::test]
async fn test_token_info_without_token_is_invalid_request() {
    let app = app();
    let request = Request::builder()
        .method("GET")
        .uri(paths::TOKEN_INFO)
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = app();

    for (path, expected) in [(paths::HEALTH, "healthy"), (paths::READY, "ready")] {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], expected);
    }
}
