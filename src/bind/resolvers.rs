// Derived-value resolvers
//
// Write methods (POST, PUT, PATCH) read parameters from the body or the
// matched path; every other method reads the query string.

use axum::{extract::Query, http::header::CONTENT_TYPE, http::Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::bind::context::RequestContext;
use crate::bind::resolver::Resolver;
use crate::core::constants::headers;
use crate::core::errors::{GatewayError, TokenFault};
use crate::core::models::{Flag, Page, Params, Principal};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// The principal attached by the authentication stage
pub fn resolve_principal() -> Resolver<Arc<Principal>> {
    Resolver::new(|ctx| ctx.principal().cloned().ok_or(GatewayError::Principal))
}

/// The attached principal, or one parsed from `x-token` on exempt routes
pub fn resolve_optional_principal() -> Resolver<Arc<Principal>> {
    Resolver::new(|ctx| {
        if let Some(principal) = ctx.principal() {
            return Ok(Arc::clone(principal));
        }
        let codec = ctx.codec().ok_or(GatewayError::Principal)?;
        let token = ctx
            .header(headers::TOKEN)
            .ok_or(GatewayError::Token(TokenFault::Blank))?;
        codec.decode(token).map(Arc::new)
    })
}

/// Integer parameter `name`: path variable on write methods, query
/// parameter otherwise
pub fn resolve_int<T>(name: &str) -> Resolver<T>
where
    T: FromStr + Send + 'static,
{
    let name = name.to_string();
    Resolver::new(move |ctx| {
        let raw = if ctx.is_write() {
            ctx.path_param(&name).map(str::to_string)
        } else {
            query_params(ctx).get(&name).map(str::to_string)
        };

        let raw = raw.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(GatewayError::Parameter(format!("{} missing", name)));
        }
        raw.trim()
            .parse::<T>()
            .map_err(|_| GatewayError::Parameter(format!("{} invalid", name)))
    })
}

/// The `id` parameter as `i64`
pub fn resolve_id() -> Resolver<i64> {
    resolve_int::<i64>("id")
}

/// All matched path variables on write methods, empty otherwise
pub fn resolve_path_vars() -> Resolver<Params> {
    Resolver::new(|ctx| {
        if !ctx.is_write() {
            return Ok(Params::new());
        }
        Ok(ctx
            .path_params()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    })
}

/// Form-encoded body fields on write methods, empty otherwise
pub fn resolve_form() -> Resolver<Params> {
    Resolver::new(|ctx| {
        if !ctx.is_write() || !has_content_type(ctx, FORM_CONTENT_TYPE) {
            return Ok(Params::new());
        }
        form_params(ctx)
    })
}

/// Request parameters: query on read methods, body fields on write methods
pub fn resolve_params() -> Resolver<Params> {
    Resolver::new(request_params)
}

/// Single parameter from [`resolve_params`]; empty when absent
pub fn resolve_param(name: &str) -> Resolver<String> {
    let name = name.to_string();
    Resolver::new(move |ctx| {
        let params = request_params(ctx)?;
        Ok(params.get_or(&name, "").to_string())
    })
}

/// Typed body: JSON on write methods, query string on GET and HEAD
pub fn resolve_body<T>() -> Resolver<T>
where
    T: DeserializeOwned + Send + 'static,
{
    Resolver::new(|ctx| {
        if ctx.is_write() {
            return serde_json::from_slice(ctx.body())
                .map_err(|e| GatewayError::Parameter(format!("body err: {}", e)));
        }
        if *ctx.method() == Method::GET || *ctx.method() == Method::HEAD {
            return Query::<T>::try_from_uri(ctx.uri())
                .map(|Query(value)| value)
                .map_err(|e| GatewayError::Parameter(format!("query err: {}", e)));
        }
        Err(GatewayError::Parameter("not support use body".to_string()))
    })
}

/// Pagination from `page`/`current` and `rows`/`pageSize`; never fails
pub fn resolve_page() -> Resolver<Page> {
    Resolver::new(|ctx| {
        let params = if ctx.is_write() {
            body_params(ctx).unwrap_or_default()
        } else {
            query_params(ctx)
        };

        let mut page = Page::default();
        if let Some(value) = params.first_of(&["page", "current"]) {
            page.set_page(value.trim().parse().unwrap_or(0));
        }
        if let Some(value) = params.first_of(&["rows", "pageSize"]) {
            page.set_rows(value.trim().parse().unwrap_or(0));
        }
        Ok(page)
    })
}

/// Whether the path asks for a count (`.../count`)
pub fn resolve_is_count() -> Resolver<bool> {
    Resolver::new(|ctx| Ok(ctx.path().ends_with("/count")))
}

/// View flags from the path suffix
pub fn resolve_flag() -> Resolver<Flag> {
    Resolver::new(|ctx| {
        let path = ctx.path();
        let is_count = path.ends_with("/count");
        Ok(Flag {
            is_list: path.ends_with("/list"),
            is_count,
            is_summary: !is_count && path.ends_with("/sum"),
        })
    })
}

fn request_params(ctx: &RequestContext) -> Result<Params, GatewayError> {
    if ctx.is_write() {
        body_params(ctx)
    } else {
        Ok(query_params(ctx))
    }
}

fn query_params(ctx: &RequestContext) -> Params {
    Params::from_urlencoded(ctx.query())
}

fn has_content_type(ctx: &RequestContext, expected: &str) -> bool {
    ctx.header(CONTENT_TYPE.as_str())
        .map(|v| v.trim().to_ascii_lowercase().starts_with(expected))
        .unwrap_or(false)
}

fn form_params(ctx: &RequestContext) -> Result<Params, GatewayError> {
    let body = std::str::from_utf8(ctx.body())
        .map_err(|_| GatewayError::Parameter("body err".to_string()))?;
    Ok(Params::from_urlencoded(body))
}

/// Body fields: a JSON object with scalar values, or a form
fn body_params(ctx: &RequestContext) -> Result<Params, GatewayError> {
    let body = ctx.body();
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Params::new());
    }

    let looks_like_json = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .map(|&b| b == b'{')
        .unwrap_or(false);

    if has_content_type(ctx, JSON_CONTENT_TYPE) || (looks_like_json && !has_content_type(ctx, FORM_CONTENT_TYPE)) {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| GatewayError::Parameter(format!("body err: {}", e)))?;
        let Value::Object(map) = value else {
            return Err(GatewayError::Parameter("body err: expected an object".to_string()));
        };
        return Ok(map
            .into_iter()
            .map(|(k, v)| (k, stringify(v)))
            .collect());
    }

    form_params(ctx)
}

fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => nested.to_string(),
    }
}
