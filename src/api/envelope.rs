// Envelope and transport error translation stages

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::pipeline::GatewayState;
use crate::api::responses::{internal_error, render, replace_reply, Reply};
use crate::bind::context::GatewayContext;
use crate::core::errors::GatewayError;

/// Outermost stage: hands bound handlers the gateway context and renders
/// whatever reply comes back.
///
/// Responses without a reply pass through when successful; any other
/// status without a reply is an unclassified fault.
pub async fn envelope_stage(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(GatewayContext {
        codec: Arc::clone(&state.codec),
        body_limit_bytes: state.config.body_limit_bytes,
    });

    let response = next.run(request).await;
    envelope(response)
}

fn envelope(response: Response) -> Response {
    let (parts, body) = response.into_parts();

    let Some(reply) = parts.extensions.get::<Reply>() else {
        if parts.status.is_client_error() || parts.status.is_server_error() {
            warn!(status = %parts.status, "Unclassified error response");
            return internal_error();
        }
        return Response::from_parts(parts, body);
    };

    debug!(status = %parts.status, ?reply, "Rendering reply");
    let mut rendered = render(reply, parts.status);

    for name in parts.headers.keys() {
        if name == header::CONTENT_TYPE
            || name == header::CONTENT_LENGTH
            || rendered.headers().contains_key(name)
        {
            continue;
        }
        for value in parts.headers.get_all(name) {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered
}

/// Turns reply-less transport errors into replies the envelope can render
pub async fn translate_stage(
    State(state): State<Arc<GatewayState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !state.config.translate_errors || response.extensions().get::<Reply>().is_some() {
        return response;
    }

    let reply = match response.status() {
        StatusCode::NOT_FOUND => Reply::NotFound,
        StatusCode::METHOD_NOT_ALLOWED => Reply::Failure(GatewayError::MethodNotAllowed),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Reply::Failure(GatewayError::NotAuthorized)
        }
        _ => return response,
    };

    debug!(status = %response.status(), "Translated transport error");
    let (parts, _) = response.into_parts();
    replace_reply(parts, reply)
}
