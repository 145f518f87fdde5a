// Convenience binders for the common handler shapes

use serde::de::DeserializeOwned;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::responses::Reply;
use crate::bind::binder::{bind0, bind1, bind2, bind3, BoundHandler};
use crate::bind::resolvers::*;
use crate::core::models::{Flag, Page, Params, Principal};

/// Handler without arguments
pub fn use_handler<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind0(handler)
}

/// Handler receiving the authenticated principal
pub fn use_user<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Arc<Principal>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_principal())
}

/// Handler receiving the attached principal or one read from `x-token`
pub fn use_opt_user<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Arc<Principal>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_optional_principal())
}

pub fn use_user_param<F, Fut, R>(handler: F, name: &str) -> impl BoundHandler
where
    F: Fn(Arc<Principal>, String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_principal(), resolve_param(name))
}

pub fn use_user_params2<F, Fut, R>(handler: F, name1: &str, name2: &str) -> impl BoundHandler
where
    F: Fn(Arc<Principal>, String, String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind3(handler, resolve_principal(), resolve_param(name1), resolve_param(name2))
}

pub fn use_user_body<T, F, Fut, R>(handler: F) -> impl BoundHandler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(Arc<Principal>, T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_principal(), resolve_body::<T>())
}

pub fn use_user_page_params<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Arc<Principal>, Page, Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind3(handler, resolve_principal(), resolve_page(), resolve_params())
}

pub fn use_user_page_body<T, F, Fut, R>(handler: F) -> impl BoundHandler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(Arc<Principal>, Page, T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind3(handler, resolve_principal(), resolve_page(), resolve_body::<T>())
}

pub fn use_user_with_is_count<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Arc<Principal>, bool) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_principal(), resolve_is_count())
}

/// Handler receiving integer parameter `name`
pub fn use_int<T, F, Fut, R>(handler: F, name: &str) -> impl BoundHandler
where
    T: FromStr + Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_int::<T>(name))
}

/// Handler receiving the `id` parameter
pub fn use_id<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(i64) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_id())
}

pub fn use_param<F, Fut, R>(handler: F, name: &str) -> impl BoundHandler
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_param(name))
}

pub fn use_params<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_params())
}

pub fn use_path_vars<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_path_vars())
}

pub fn use_form<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_form())
}

pub fn use_body<T, F, Fut, R>(handler: F) -> impl BoundHandler
where
    T: DeserializeOwned + Send + 'static,
    F: Fn(T) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_body::<T>())
}

pub fn use_page<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Page) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind1(handler, resolve_page())
}

pub fn use_page_count<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Page, bool) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_page(), resolve_is_count())
}

pub fn use_page_flag<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Page, Flag) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_page(), resolve_flag())
}

pub fn use_page_params<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Page, Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind2(handler, resolve_page(), resolve_params())
}

pub fn use_page_flag_params<F, Fut, R>(handler: F) -> impl BoundHandler
where
    F: Fn(Page, Flag, Params) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<Reply> + 'static,
{
    bind3(handler, resolve_page(), resolve_flag(), resolve_params())
}
