//! Fixed-arity binders.
//!
//! `bind0`..`bind4` adapt an async handler taking up to four typed
//! arguments into an axum handler. Each argument comes from its own
//! [`Resolver`]; resolvers run left to right and the first failure ends
//! the request with `p{n} resolve err`, without running later resolvers
//! or the handler.

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::api::responses::Reply;
use crate::bind::context::RequestContext;
use crate::bind::resolver::Resolver;
use crate::core::errors::GatewayError;

/// Boxed future returned by every bound handler
pub type BoxResponseFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// An axum handler produced by a binder
pub trait BoundHandler: Fn(Request) -> BoxResponseFuture + Clone + Send + Sync + 'static {}

impl<H> BoundHandler for H where H: Fn(Request) -> BoxResponseFuture + Clone + Send + Sync + 'static {}

fn resolve_at<T>(position: usize, resolver: &Resolver<T>, ctx: &RequestContext) -> Result<T, Response> {
    resolver.resolve(ctx).map_err(|e| {
        debug!(position, path = %ctx.path(), error = %e, "Resolver failed");
        Reply::Failure(GatewayError::Resolution { position }).into_response()
    })
}

/// Bind a four-argument handler
pub fn bind4<F, Fut, R, T1, T2, T3, T4>(
    handler: F,
    r1: Resolver<T1>,
    r2: Resolver<T2>,
    r3: Resolver<T3>,
    r4: Resolver<T4>,
) -> impl BoundHandler
where
    F: Fn(T1, T2, T3, T4) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
    T1: Send + 'static,
    T2: Send + 'static,
    T3: Send + 'static,
    T4: Send + 'static,
{
    move |request: Request| {
        let handler = handler.clone();
        let (r1, r2, r3, r4) = (r1.clone(), r2.clone(), r3.clone(), r4.clone());

        Box::pin(async move {
            let ctx = match RequestContext::from_request(request).await {
                Ok(ctx) => ctx,
                Err(e) => return Reply::Failure(e).into_response(),
            };

            let p1 = match resolve_at(1, &r1, &ctx) {
                Ok(v) => v,
                Err(response) => return response,
            };
            let p2 = match resolve_at(2, &r2, &ctx) {
                Ok(v) => v,
                Err(response) => return response,
            };
            let p3 = match resolve_at(3, &r3, &ctx) {
                Ok(v) => v,
                Err(response) => return response,
            };
            let p4 = match resolve_at(4, &r4, &ctx) {
                Ok(v) => v,
                Err(response) => return response,
            };
            drop(ctx);

            let reply: Reply = handler(p1, p2, p3, p4).await.into();
            reply.into_response()
        }) as BoxResponseFuture
    }
}

/// Bind a three-argument handler
pub fn bind3<F, Fut, R, T1, T2, T3>(
    handler: F,
    r1: Resolver<T1>,
    r2: Resolver<T2>,
    r3: Resolver<T3>,
) -> impl BoundHandler
where
    F: Fn(T1, T2, T3) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
    T1: Send + 'static,
    T2: Send + 'static,
    T3: Send + 'static,
{
    bind4(
        move |p1, p2, p3, _: ()| handler(p1, p2, p3),
        r1,
        r2,
        r3,
        Resolver::none(),
    )
}

/// Bind a two-argument handler
pub fn bind2<F, Fut, R, T1, T2>(
    handler: F,
    r1: Resolver<T1>,
    r2: Resolver<T2>,
) -> impl BoundHandler
where
    F: Fn(T1, T2) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
    T1: Send + 'static,
    T2: Send + 'static,
{
    bind4(
        move |p1, p2, _: (), _: ()| handler(p1, p2),
        r1,
        r2,
        Resolver::none(),
        Resolver::none(),
    )
}

/// Bind a one-argument handler
pub fn bind1<F, Fut, R, T1>(
    handler: F,
    r1: Resolver<T1>,
) -> impl BoundHandler
where
    F: Fn(T1) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
    T1: Send + 'static,
{
    bind4(
        move |p1, _: (), _: (), _: ()| handler(p1),
        r1,
        Resolver::none(),
        Resolver::none(),
        Resolver::none(),
    )
}

/// Bind a handler that takes no arguments
pub fn bind0<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind4(
        move |_: (), _: (), _: (), _: ()| handler(),
        Resolver::none(),
        Resolver::none(),
        Resolver::none(),
        Resolver::none(),
    )
}
