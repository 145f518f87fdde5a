// Axum web server layer

use axum::Router;
use std::sync::Arc;
use tracing::info;

pub mod cipher;
pub mod envelope;
pub mod middleware;
pub mod pipeline;
pub mod responses;

use crate::config::{Config, GatewayConfig};
use crate::core::errors::GatewayError;
use crate::core::token::TokenCodec;
use pipeline::Pipeline;

pub use responses::Reply;

/// A configured gateway: policy, token codec and the stage list built
/// from them. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: Arc<GatewayConfig>,
    codec: Arc<TokenCodec>,
    pipeline: Pipeline,
}

impl Gateway {
    pub fn new(config: GatewayConfig, codec: TokenCodec) -> Result<Self, GatewayError> {
        config.validate()?;

        let config = Arc::new(config);
        let codec = Arc::new(codec);
        let pipeline = Pipeline::from_config(Arc::clone(&config), Arc::clone(&codec));

        Ok(Self {
            config,
            codec,
            pipeline,
        })
    }

    /// Build from application configuration
    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let codec = TokenCodec::new(config.token_key.as_bytes().to_vec())?;
        Self::new(config.gateway(), codec)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Codec for minting tokens in login handlers
    pub fn codec(&self) -> Arc<TokenCodec> {
        Arc::clone(&self.codec)
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Wrap application routes in the security pipeline
    pub fn wrap<S>(&self, routes: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.pipeline.apply(routes)
    }
}

/// Create the Axum router: application routes inside the pipeline
///
/// Middleware stack (outermost to innermost):
/// - Tracing middleware (tower-http::trace)
/// - Security pipeline stages, see [`pipeline`]
pub fn create_router(routes: Router, gateway: &Gateway) -> Router {
    info!(stages = ?gateway.pipeline().stages(), "Creating router");
    gateway.wrap(routes).layer(middleware::tracing_layer())
}
