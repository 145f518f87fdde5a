// Application routes shared by the integration tests

use axum::{
    routing::{get, post},
    Router,
};
use sentinel_web::bind::bind2;
use sentinel_web::bind::handlers::{
    use_handler, use_params, use_user, use_user_body, use_user_page_params,
};
use sentinel_web::bind::resolvers::{resolve_int, resolve_principal};
use sentinel_web::core::errors::GatewayError;
use sentinel_web::core::models::{Message, Page, Params, Principal};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::common::*;

#[derive(Debug, Deserialize)]
pub struct NewOrder {
    pub item: String,
    pub qty: u32,
}

pub fn routes() -> Router {
    Router::new()
        .route(
            "/login/token",
            post(use_params(|params: Params| async move {
                let username = params.get("username").unwrap_or_default().to_string();
                test_codec()
                    .mint(42, &username, SECRET)
                    .map(|token| Message::ok_with(json!({ "token": token })))
            })),
        )
        .route("/ping", get(use_handler(|| async { Message::ok() })))
        .route(
            "/user/info",
            get(use_user(|user: Arc<Principal>| async move {
                Message::ok_with(json!({ "id": user.id, "username": user.username }))
            })),
        )
        .route(
            "/orders/list",
            get(use_user_page_params(
                |user: Arc<Principal>, page: Page, params: Params| async move {
                    Message::ok_with(json!({
                        "owner": user.username,
                        "page": page.page,
                        "rows": page.rows,
                        "status": params.get("status"),
                    }))
                },
            )),
        )
        .route(
            "/orders",
            post(use_user_body(|user: Arc<Principal>, order: NewOrder| async move {
                Message::ok_with(json!({
                    "owner": user.username,
                    "item": order.item,
                    "qty": order.qty,
                }))
            })),
        )
        .route(
            "/orders/qty",
            get(bind2(
                |_: Arc<Principal>, qty: i64| async move { Message::ok_with(json!(qty)) },
                resolve_principal(),
                resolve_int::<i64>("qty"),
            )),
        )
        .route(
            "/boom",
            get(use_handler(|| async {
                Err::<Message, _>(GatewayError::Internal("db down at 10.0.0.3".to_string()))
            })),
        )
}
