// Buffered per-request view handed to resolvers

use axum::{
    body::Bytes,
    extract::{FromRequestParts, RawPathParams, Request},
    http::{HeaderMap, HeaderName, HeaderValue, Method, Uri},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::constants::defaults;
use crate::core::errors::GatewayError;
use crate::core::models::Principal;
use crate::core::token::TokenCodec;

/// Gateway handles a bound handler needs, inserted into the request
/// extensions by the envelope stage
#[derive(Debug, Clone)]
pub struct GatewayContext {
    pub codec: Arc<TokenCodec>,
    pub body_limit_bytes: usize,
}

/// Everything a resolver may look at for one request.
///
/// The body is buffered once when the context is built, so every
/// resolver sees the same bytes regardless of order.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: BTreeMap<String, String>,
    principal: Option<Arc<Principal>>,
    codec: Option<Arc<TokenCodec>>,
}

impl RequestContext {
    /// Empty context for `method` and `uri`; malformed URIs become `/`
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.parse().unwrap_or_default(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            path_params: BTreeMap::new(),
            principal: None,
            codec: None,
        }
    }

    /// Consume an axum request, buffering its body up to the configured limit
    pub async fn from_request(request: Request) -> Result<Self, GatewayError> {
        let (mut parts, body) = request.into_parts();

        let path_params = match RawPathParams::from_request_parts(&mut parts, &()).await {
            Ok(raw) => raw
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            Err(e) => {
                debug!(error = %e, "No matched path parameters");
                BTreeMap::new()
            }
        };

        let gateway = parts.extensions.get::<GatewayContext>().cloned();
        let limit = gateway
            .as_ref()
            .map(|g| g.body_limit_bytes)
            .unwrap_or(defaults::BODY_LIMIT_BYTES);

        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| GatewayError::Parameter(format!("body err: {}", e)))?;

        Ok(Self {
            principal: parts.extensions.get::<Arc<Principal>>().cloned(),
            codec: gateway.map(|g| g.codec),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            path_params,
        })
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(HeaderName::from_static(name), value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(Arc::new(principal));
        self
    }

    pub fn with_codec(mut self, codec: Arc<TokenCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// POST, PUT and PATCH carry their parameters in the body
    pub fn is_write(&self) -> bool {
        is_write_method(&self.method)
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw (still percent-encoded) query string, empty when absent
    pub fn query(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn path_params(&self) -> &BTreeMap<String, String> {
        &self.path_params
    }

    pub fn principal(&self) -> Option<&Arc<Principal>> {
        self.principal.as_ref()
    }

    pub fn codec(&self) -> Option<&Arc<TokenCodec>> {
        self.codec.as_ref()
    }
}

/// Whether `method` is a write method (POST, PUT, PATCH)
pub fn is_write_method(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}
