// Payload encryption stages
//
// Payloads travel as base64(AES-ECB(plaintext, principal.secret)).

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, uri::PathAndQuery, HeaderValue, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;

use crate::api::pipeline::GatewayState;
use crate::api::responses::{replace_reply, Reply};
use crate::bind::context::is_write_method;
use crate::core::constants::headers;
use crate::core::crypto;
use crate::core::errors::GatewayError;
use crate::core::models::Principal;

/// Encrypts every response outside the login prefix with the caller's secret
pub async fn encrypt_stage(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let skip = !state.config.enc_enable || state.config.is_login_path(&path);

    let response = next.run(request).await;
    if skip {
        return response;
    }

    let has_reply = response.extensions().get::<Reply>().is_some();
    if !has_reply && !response.status().is_success() {
        return response;
    }

    let Some(principal) = response.extensions().get::<Arc<Principal>>().cloned() else {
        warn!(path = %path, "No principal to encrypt the response for");
        return Reply::Failure(GatewayError::PrincipalMissing).into_response();
    };

    let (mut parts, body) = response.into_parts();
    let (plain, original) = match parts.extensions.get::<Reply>().cloned() {
        Some(reply) => match reply.payload() {
            Ok(text) => (text.into_bytes(), body),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to serialize reply for encryption");
                return Response::from_parts(parts, body);
            }
        },
        None => match axum::body::to_bytes(body, state.config.body_limit_bytes).await {
            Ok(bytes) => (bytes.to_vec(), Body::from(bytes)),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to buffer response for encryption");
                return Reply::Failure(GatewayError::Internal(e.to_string())).into_response();
            }
        },
    };

    match crypto::seal(&plain, principal.secret_bytes()) {
        Ok(cipher) => {
            debug!(path = %path, "Response encrypted");
            parts
                .headers
                .insert(headers::ENC, HeaderValue::from_static(headers::ENC_ON));
            replace_reply(parts, Reply::Text(cipher))
        }
        Err(e) => {
            error!(path = %path, error = %e, "Response encryption failed");
            Response::from_parts(parts, original)
        }
    }
}

/// Decrypts requests marked `x-enc: 1` in place before they reach the handler
pub async fn decrypt_stage(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    let marked = request
        .headers()
        .get(headers::ENC)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == headers::ENC_ON)
        .unwrap_or(false);

    if !state.config.enc_enable || !marked {
        return next.run(request).await;
    }

    let Some(principal) = request.extensions().get::<Arc<Principal>>().cloned() else {
        warn!(path = %request.uri().path(), "Encrypted request without a principal");
        return Reply::Failure(GatewayError::PrincipalMissing).into_response();
    };
    if !principal.has_secret() {
        warn!(path = %request.uri().path(), "Encrypted request but principal has no secret");
        return Reply::Failure(GatewayError::Decryption(
            "use x-enc, but secret not found".to_string(),
        ))
        .into_response();
    }

    let path = request.uri().path().to_string();
    match decrypt_request(request, principal.secret_bytes(), state.config.body_limit_bytes).await {
        Ok(request) => next.run(request).await,
        Err(e) => {
            warn!(path = %path, error = %e, "Request decryption failed");
            Reply::Failure(e).into_response()
        }
    }
}

/// Replace the raw query (read methods) or the quote-trimmed body (write
/// methods) with its plaintext; empty payloads are left alone
pub async fn decrypt_request(
    request: Request,
    secret: &[u8],
    body_limit_bytes: usize,
) -> Result<Request, GatewayError> {
    if is_write_method(request.method()) {
        let (mut parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, body_limit_bytes)
            .await
            .map_err(|e| GatewayError::Decryption(format!("body err: {}", e)))?;

        let trimmed = crypto::trim_quotes(&bytes);
        if trimmed.is_empty() {
            return Ok(Request::from_parts(parts, Body::from(bytes)));
        }

        let text = std::str::from_utf8(trimmed)
            .map_err(|_| GatewayError::Decryption("body is not base64 text".to_string()))?;
        let plain = crypto::open(text, secret).map_err(|e| GatewayError::Decryption(e.to_string()))?;

        parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(plain.len()));
        return Ok(Request::from_parts(parts, Body::from(plain)));
    }

    let query = request.uri().query().unwrap_or("");
    if query.is_empty() {
        return Ok(request);
    }

    let plain = crypto::open(query, secret).map_err(|e| GatewayError::Decryption(e.to_string()))?;
    let plain = String::from_utf8(plain)
        .map_err(|_| GatewayError::Decryption("query is not text".to_string()))?;

    let (mut parts, body) = request.into_parts();
    parts.uri = with_query(&parts.uri, &plain)?;
    Ok(Request::from_parts(parts, body))
}

/// Percent-encode the bytes a URI query may not carry (space, `"`, `#`,
/// `<`, `>`, controls, non-ASCII); existing escapes are kept
fn encode_query(query: &str) -> Result<String, GatewayError> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| GatewayError::Decryption(format!("query err: {}", e)))?;
    url.set_query(Some(query));
    Ok(url.query().unwrap_or_default().to_string())
}

fn with_query(uri: &Uri, query: &str) -> Result<Uri, GatewayError> {
    let path_and_query = if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), encode_query(query)?)
    };

    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(
        PathAndQuery::try_from(path_and_query)
            .map_err(|e| GatewayError::Decryption(format!("query err: {}", e)))?,
    );
    Uri::from_parts(uri_parts).map_err(|e| GatewayError::Decryption(format!("query err: {}", e)))
}
