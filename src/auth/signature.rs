// Request signature verification
//
// Canonical content is the raw query string for read methods and the
// quote-trimmed body for write methods. The signature is the lowercase
// hex HMAC-SHA256 of that content keyed by the principal's secret.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::api::pipeline::GatewayState;
use crate::api::responses::Reply;
use crate::bind::context::is_write_method;
use crate::core::constants::headers;
use crate::core::crypto;
use crate::core::errors::GatewayError;
use crate::core::models::Principal;

pub async fn signature_stage(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.sign_enable || !state.config.auth_enable {
        return next.run(request).await;
    }

    let Some(principal) = request.extensions().get::<Arc<Principal>>().cloned() else {
        return next.run(request).await;
    };

    let path = request.uri().path().to_string();
    match verify_request(request, &principal, state.config.body_limit_bytes).await {
        Ok(request) => next.run(request).await,
        Err(e) => {
            warn!(path = %path, id = principal.id, error = %e, "Signature rejected");
            Reply::Failure(e).into_response()
        }
    }
}

/// Check `x-sign` against the canonical content; hands the request back
/// with its body intact
pub async fn verify_request(
    request: Request,
    principal: &Principal,
    body_limit_bytes: usize,
) -> Result<Request, GatewayError> {
    if !principal.has_secret() {
        return Err(GatewayError::Signature(
            "use x-sign, but secret not found".to_string(),
        ));
    }

    let signature = request
        .headers()
        .get(headers::SIGN)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default();
    if signature.is_empty() {
        return Err(GatewayError::Signature("x-sign err".to_string()));
    }

    if is_write_method(request.method()) {
        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, body_limit_bytes)
            .await
            .map_err(|_| GatewayError::Signature("body err".to_string()))?;

        let content = crypto::trim_quotes(&bytes);
        if content.is_empty() {
            return Err(GatewayError::Signature("body err".to_string()));
        }
        if !crypto::verify(content, principal.secret_bytes(), &signature) {
            return Err(GatewayError::Signature("sign err".to_string()));
        }
        return Ok(Request::from_parts(parts, Body::from(bytes)));
    }

    let content = request.uri().query().unwrap_or("");
    if content.is_empty() {
        return Err(GatewayError::Signature("qs err".to_string()));
    }
    if !crypto::verify(content.as_bytes(), principal.secret_bytes(), &signature) {
        return Err(GatewayError::Signature("sign err".to_string()));
    }
    Ok(request)
}
