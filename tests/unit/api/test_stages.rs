// Unit tests for envelope and translation stages

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use sentinel_web::bind::handlers::use_handler;
use sentinel_web::config::GatewayConfig;
use sentinel_web::core::models::Message;
use serde_json::json;

use crate::common::*;

fn routes() -> Router {
    Router::new()
        .route("/ping", get(use_handler(|| async { Message::ok() })))
        .route("/raw", get(|| async { "plain handler" }))
        .route("/teapot", get(|| async { StatusCode::IM_A_TEAPOT }))
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_bound_handler_message_rendered() {
    let response = send(app(routes(), open_config()), request("GET", "/ping")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"code": 0, "msg": "ok"}));
}

#[tokio::test]
async fn test_plain_success_passes_through() {
    let response = send(app(routes(), open_config()), request("GET", "/raw")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "plain handler");
}

#[tokio::test]
async fn test_unknown_route_translated() {
    let response = send(app(routes(), open_config()), request("GET", "/missing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"code": 1, "msg": "not found"}));
}

#[tokio::test]
async fn test_wrong_method_translated() {
    let response = send(app(routes(), open_config()), request("POST", "/ping")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["msg"], "method not allowed");
}

#[tokio::test]
async fn test_forbidden_translated() {
    let response = send(app(routes(), open_config()), request("GET", "/forbidden")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["msg"], "not authorized");
}

#[tokio::test]
async fn test_untranslated_errors_become_internal() {
    let config = GatewayConfig {
        translate_errors: false,
        ..open_config()
    };
    let response = send(app(routes(), config), request("GET", "/missing")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["msg"], "InternalServerError");

    let response = send(app(routes(), open_config()), request("GET", "/teapot")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_gateway_rejects_sign_without_auth() {
    let config = GatewayConfig {
        auth_enable: false,
        sign_enable: true,
        ..GatewayConfig::default()
    };
    assert!(sentinel_web::api::Gateway::new(config, test_codec()).is_err());
}

#[test]
fn test_gateway_stage_list_follows_flags() {
    use sentinel_web::api::pipeline::Stage;

    let config = GatewayConfig {
        sign_enable: false,
        enc_enable: false,
        ..GatewayConfig::default()
    };
    let gateway = test_gateway(config);
    assert_eq!(
        gateway.pipeline().stages(),
        &[Stage::Envelope, Stage::Translate, Stage::Authenticate]
    );
}
