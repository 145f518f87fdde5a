// Unit tests for fixed-arity binders

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use sentinel_web::api::Reply;
use sentinel_web::bind::resolvers::{resolve_flag, resolve_id, resolve_param};
use sentinel_web::bind::{bind0, bind2, bind3, Resolver};
use sentinel_web::core::errors::GatewayError;
use sentinel_web::core::models::{Flag, Message};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::common::*;

fn reply_of(response: &axum::response::Response) -> Reply {
    response.extensions().get::<Reply>().cloned().expect("reply")
}

fn counting<T: Send + 'static>(
    counter: Arc<AtomicUsize>,
    result: Result<T, GatewayError>,
) -> Resolver<T>
where
    T: Clone + Sync,
{
    Resolver::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        result.clone()
    })
}

#[tokio::test]
async fn test_second_resolver_failure_short_circuits() {
    let r1_calls = Arc::new(AtomicUsize::new(0));
    let r3_calls = Arc::new(AtomicUsize::new(0));
    let handler_calls = Arc::new(AtomicUsize::new(0));

    let calls = Arc::clone(&handler_calls);
    let handler = bind3(
        move |_: u8, _: u8, _: u8| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Message::ok()
            }
        },
        counting(Arc::clone(&r1_calls), Ok(1u8)),
        Resolver::new(|_| Err(GatewayError::Parameter("boom".to_string()))),
        counting(Arc::clone(&r3_calls), Ok(3u8)),
    );

    let router = Router::new().route("/x", get(handler));
    let response = send(router, Request::get("/x").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        reply_of(&response),
        Reply::Failure(GatewayError::Resolution { position: 2 })
    );
    assert_eq!(r1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(r3_calls.load(Ordering::SeqCst), 0);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_resolved_values_reach_handler_in_order() {
    let handler = bind2(
        |flag: Flag, name: String| async move {
            Message::ok_with(serde_json::json!({ "list": flag.is_list, "name": name }))
        },
        resolve_flag(),
        resolve_param("name"),
    );

    let router = Router::new().route("/items/list", get(handler));
    let response = send(
        router,
        Request::get("/items/list?name=pen").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(
        reply_of(&response),
        Reply::Message(Message::ok_with(
            serde_json::json!({ "list": true, "name": "pen" })
        ))
    );
}

#[tokio::test]
async fn test_path_variable_binding() {
    let handler = sentinel_web::bind::bind1(
        |id: i64| async move { Message::ok_with(serde_json::json!(id)) },
        resolve_id(),
    );

    let router = Router::new().route("/orders/:id", post(handler));
    let response = send(router, Request::post("/orders/31").body(Body::empty()).unwrap()).await;
    assert_eq!(
        reply_of(&response),
        Reply::Message(Message::ok_with(serde_json::json!(31)))
    );
}

#[tokio::test]
async fn test_handler_errors_and_empty_replies() {
    let failing = bind0(|| async { Err::<Message, _>(GatewayError::Internal("db".into())) });
    let empty = bind0(|| async { None::<Message> });

    let router = Router::new()
        .route("/fail", get(failing))
        .route("/empty", get(empty));

    let response = send(router.clone(), Request::get("/fail").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(matches!(reply_of(&response), Reply::Failure(GatewayError::Internal(_))));

    let response = send(router, Request::get("/empty").body(Body::empty()).unwrap()).await;
    assert_eq!(reply_of(&response), Reply::Empty);
}
