// Integration tests for the authentication and signature stages

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sentinel_web::config::GatewayConfig;
use serde_json::json;

use crate::common::*;
use crate::fixtures::routes;

/// Authentication on, signing and encryption off
fn auth_only() -> GatewayConfig {
    GatewayConfig {
        sign_enable: false,
        enc_enable: false,
        ..GatewayConfig::default()
    }
}

/// Authentication and signing on, encryption off
fn auth_and_sign() -> GatewayConfig {
    GatewayConfig {
        enc_enable: false,
        ..GatewayConfig::default()
    }
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-token", token)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_valid_token_reaches_handler() {
    let response = send(
        app(routes(), auth_only()),
        get_with_token("/user/info", &alice_token()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"code": 0, "msg": "ok", "data": {"id": 42, "username": "alice"}})
    );
}

#[tokio::test]
async fn test_missing_or_invalid_token_rejected() {
    let missing = Request::get("/user/info").body(Body::empty()).unwrap();
    let response = send(app(routes(), auth_only()), missing).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await, json!({"code": 1, "msg": "token invalid"}));

    let response = send(
        app(routes(), auth_only()),
        get_with_token("/user/info", "not-a-token"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["msg"], "token invalid");
}

#[tokio::test]
async fn test_token_from_another_deployment_rejected() {
    let foreign = sentinel_web::core::token::TokenCodec::new(b"abcdefghijklmnop".to_vec())
        .unwrap()
        .mint(42, "alice", SECRET)
        .unwrap();

    let response = send(app(routes(), auth_only()), get_with_token("/user/info", &foreign)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["msg"], "token invalid");
}

#[tokio::test]
async fn test_login_prefix_exempt() {
    let request = Request::post("/login/token")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"username":"alice"}"#))
        .unwrap();

    let response = send(app(routes(), GatewayConfig::default()), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-enc").is_none());

    let body = body_json(response).await;
    let token = body["data"]["token"].as_str().unwrap();
    let principal = test_codec().decode(token).unwrap();
    assert_eq!(principal.username, "alice");
    assert_eq!(principal.secret, SECRET);
}

#[tokio::test]
async fn test_exempt_prefix_skips_authentication() {
    let config = auth_only().with_exempt_prefixes(vec!["/ping".to_string()]);

    let response = send(app(routes(), config), Request::get("/ping").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["code"], 0);
}

#[tokio::test]
async fn test_auth_disabled_lets_requests_through() {
    let response = send(
        app(routes(), open_config()),
        Request::get("/ping").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // nothing attaches a principal, so the principal slot fails
    let response = send(
        app(routes(), open_config()),
        Request::get("/user/info").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["msg"], "p1 resolve err");
}

#[tokio::test]
async fn test_signed_query_accepted() {
    let response = send(
        app(routes(), auth_and_sign()),
        signed_get("/orders/list", "status=open&rows=5", &alice_token()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["owner"], "alice");
    assert_eq!(body["data"]["status"], "open");
    assert_eq!(body["data"]["rows"], 5);
    assert_eq!(body["data"]["page"], 1);
}

#[tokio::test]
async fn test_signature_rejections() {
    let token = alice_token();

    let mut tampered = signed_get("/orders/list", "status=open", &token);
    tampered
        .headers_mut()
        .insert("x-sign", sign("status=closed", SECRET).parse().unwrap());
    let response = send(app(routes(), auth_and_sign()), tampered).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["msg"], "sign err");

    let response = send(
        app(routes(), auth_and_sign()),
        get_with_token("/orders/list?status=open", &token),
    )
    .await;
    assert_eq!(body_json(response).await["msg"], "x-sign err");

    let response = send(
        app(routes(), auth_and_sign()),
        signed_get("/orders/list", "", &token),
    )
    .await;
    assert_eq!(body_json(response).await["msg"], "qs err");
}

#[tokio::test]
async fn test_principal_without_secret_cannot_sign() {
    let token = test_codec().mint(7, "bob", "").unwrap();
    let response = send(
        app(routes(), auth_and_sign()),
        signed_get("/orders/list", "status=open", &token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await["msg"],
        "use x-sign, but secret not found"
    );
}

#[tokio::test]
async fn test_signed_body_over_trimmed_content() {
    let payload = r#"{"item":"pen","qty":2}"#;
    let request = Request::post("/orders")
        .header("x-token", alice_token())
        .header("x-sign", sign(payload, SECRET))
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap();

    let response = send(app(routes(), auth_and_sign()), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!({"owner": "alice", "item": "pen", "qty": 2}));
}
