// Reply type produced by bound handlers and classified by the pipeline

use axum::{
    body::Body,
    http::{header, response::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::core::constants::messages;
use crate::core::errors::GatewayError;
use crate::core::models::Message;

/// Result of a handler or a pipeline stage.
///
/// A `Reply` travels in the response extensions with an empty body; the
/// envelope stage renders it once every inner stage has seen it.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Structured message, rendered as JSON
    Message(Message),
    /// Raw text, rendered as `text/plain`
    Text(String),
    /// Nothing matched the request
    NotFound,
    /// A stage or handler failed
    Failure(GatewayError),
    /// Handler produced nothing
    Empty,
}

impl Reply {
    /// Status the rendered reply is sent with
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Message(_) | Reply::Text(_) => StatusCode::OK,
            Reply::NotFound => StatusCode::NOT_FOUND,
            Reply::Failure(e) if e.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
            Reply::Failure(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Reply::Empty => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message the client receives; `None` for text replies
    pub fn message(&self) -> Option<Message> {
        match self {
            Reply::Message(m) => Some(m.clone()),
            Reply::Text(_) => None,
            Reply::NotFound => Some(Message::err(messages::NOT_FOUND)),
            Reply::Failure(e) if e.is_internal() => {
                Some(Message::err(messages::INTERNAL_SERVER_ERROR))
            }
            Reply::Failure(e) => Some(Message::err(e.user_message())),
            Reply::Empty => Some(Message::err(messages::INTERNAL_SERVER_ERROR)),
        }
    }

    /// Wire text of the rendered reply: JSON for messages, raw for text
    pub fn payload(&self) -> Result<String, GatewayError> {
        match self {
            Reply::Text(text) => Ok(text.clone()),
            other => {
                let message = other.message().unwrap_or_else(Message::ok);
                serde_json::to_string(&message).map_err(|e| GatewayError::Encoding(e.to_string()))
            }
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<Message> for Reply {
    fn from(message: Message) -> Self {
        Reply::Message(message)
    }
}

impl From<GatewayError> for Reply {
    fn from(err: GatewayError) -> Self {
        Reply::Failure(err)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Reply::Empty)
    }
}

impl<T, E> From<Result<T, E>> for Reply
where
    T: Into<Reply>,
    E: Into<Reply>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(err) => err.into(),
        }
    }
}

/// Render a reply into its final HTTP form.
///
/// `status` is the status of the response that carried the reply; only
/// text replies keep it.
pub fn render(reply: &Reply, status: StatusCode) -> Response {
    match reply {
        Reply::Text(text) => (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text.clone(),
        )
            .into_response(),
        Reply::Failure(e) if e.is_internal() => {
            error!(error = %e, "Internal failure");
            internal_error()
        }
        Reply::Empty => {
            error!(reason = messages::EMPTY_REPLY, "Empty reply");
            internal_error()
        }
        other => {
            let message = other
                .message()
                .unwrap_or_else(|| Message::err(messages::INTERNAL_SERVER_ERROR));
            (other.status(), Json(message)).into_response()
        }
    }
}

/// The fixed response for unclassified faults
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(Message::err(messages::INTERNAL_SERVER_ERROR)),
    )
        .into_response()
}

/// Rebuild a response around a new reply, keeping status and headers
pub fn replace_reply(mut parts: Parts, reply: Reply) -> Response {
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.remove(header::CONTENT_TYPE);
    parts.extensions.insert(reply);
    Response::from_parts(parts, Body::empty())
}
