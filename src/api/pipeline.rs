//! Ordered security stages.
//!
//! Request phase runs outermost first; each stage's response handling
//! runs after `next.run(..)` returns, so the response phase unwinds
//! innermost first. Outer to inner:
//!
//! 1. envelope (render replies, normalize faults)
//! 2. response encryption
//! 3. transport error translation
//! 4. authentication
//! 5. signature verification
//! 6. request decryption

use axum::{middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tracing::debug;

use crate::api::cipher::{decrypt_stage, encrypt_stage};
use crate::api::envelope::{envelope_stage, translate_stage};
use crate::auth::auth_middleware::auth_stage;
use crate::auth::signature::signature_stage;
use crate::config::GatewayConfig;
use crate::core::token::TokenCodec;

/// Read-only state shared by every stage
#[derive(Debug)]
pub struct GatewayState {
    pub config: Arc<GatewayConfig>,
    pub codec: Arc<TokenCodec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Envelope,
    Encrypt,
    Translate,
    Authenticate,
    VerifySignature,
    Decrypt,
}

impl Stage {
    fn attach<S>(self, router: Router<S>, state: Arc<GatewayState>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        match self {
            Stage::Envelope => router.layer(from_fn_with_state(state, envelope_stage)),
            Stage::Encrypt => router.layer(from_fn_with_state(state, encrypt_stage)),
            Stage::Translate => router.layer(from_fn_with_state(state, translate_stage)),
            Stage::Authenticate => router.layer(from_fn_with_state(state, auth_stage)),
            Stage::VerifySignature => router.layer(from_fn_with_state(state, signature_stage)),
            Stage::Decrypt => router.layer(from_fn_with_state(state, decrypt_stage)),
        }
    }
}

/// The stage list of one server instance
#[derive(Debug, Clone)]
pub struct Pipeline {
    state: Arc<GatewayState>,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Build the stage list once; disabled stages are left out
    pub fn from_config(config: Arc<GatewayConfig>, codec: Arc<TokenCodec>) -> Self {
        let mut stages = vec![Stage::Envelope];
        if config.enc_enable {
            stages.push(Stage::Encrypt);
        }
        if config.translate_errors {
            stages.push(Stage::Translate);
        }
        if config.auth_enable {
            stages.push(Stage::Authenticate);
            if config.sign_enable {
                stages.push(Stage::VerifySignature);
            }
        }
        if config.enc_enable {
            stages.push(Stage::Decrypt);
        }

        debug!(?stages, "Pipeline built");

        Self {
            state: Arc::new(GatewayState { config, codec }),
            stages,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn state(&self) -> Arc<GatewayState> {
        Arc::clone(&self.state)
    }

    /// Wrap every route of `router`; the first stage ends up outermost
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.stages
            .iter()
            .rev()
            .fold(router, |router, stage| stage.attach(router, self.state()))
    }
}
