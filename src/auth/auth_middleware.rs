// Axum authentication middleware

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::pipeline::GatewayState;
use crate::api::responses::Reply;
use crate::core::constants::headers;

/// Authentication stage
///
/// Decodes the `x-token` header into a principal and attaches it to the
/// request extensions for the inner stages and handlers. The same
/// principal is copied onto the response so that the encryption stage,
/// which sits outside this one, can key the response with it.
pub async fn auth_stage(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.auth_enable {
        return next.run(request).await;
    }

    let path = request.uri().path();
    if state.config.is_exempt(path) {
        debug!(path = %path, "Authentication skipped for exempt path");
        return next.run(request).await;
    }

    // 1. Extract token from header
    let token = extract_token(request.headers()).unwrap_or_default();

    // 2. Decode and validate
    let principal = match state.codec.decode(&token) {
        Ok(principal) => Arc::new(principal),
        Err(e) => {
            warn!(path = %path, error = %e, "Token rejected");
            return Reply::Failure(e).into_response();
        }
    };

    debug!(id = principal.id, username = %principal.username, "Principal attached");

    // 3. Set extensions for inner stages and handlers
    request.extensions_mut().insert(Arc::clone(&principal));

    // 4. Continue, then expose the principal on the way out
    let mut response = next.run(request).await;
    response.extensions_mut().insert(principal);
    response
}

/// Extract principal token from request headers
fn extract_token(header_map: &HeaderMap) -> Option<String> {
    header_map
        .get(headers::TOKEN)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
}
