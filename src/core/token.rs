//! Principal token codec.
//!
//! Wire format: `base64(AES-ECB(json(Principal), server_key))`.
//!
//! ECB leaks equal-block patterns; the per-token `random` field is what
//! keeps two tokens for the same subject from sharing ciphertext blocks.
//! The format is kept for compatibility with existing clients.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretVec};
use std::fmt;
use tracing::debug;

use crate::core::constants::crypto::{PRINCIPAL_KEY_LENGTH, RANDOM_LENGTH};
use crate::core::crypto;
use crate::core::errors::{GatewayError, TokenFault};
use crate::core::models::Principal;

/// Mints and decodes principal tokens under one deployment-wide key
pub struct TokenCodec {
    server_key: SecretVec<u8>,
}

impl TokenCodec {
    /// Create a codec; the key must be 16, 24 or 32 bytes
    pub fn new(server_key: impl Into<Vec<u8>>) -> Result<Self, GatewayError> {
        let server_key = server_key.into();
        crypto::validate_key(&server_key).map_err(|e| {
            GatewayError::Configuration(format!("Invalid token key: {}", e))
        })?;
        Ok(Self {
            server_key: SecretVec::new(server_key),
        })
    }

    /// Mint a token for `id`/`username` carrying the per-principal `secret`.
    ///
    /// `key`, `random` and `timestamp` are generated here.
    pub fn mint(&self, id: i64, username: &str, secret: &str) -> Result<String, GatewayError> {
        let principal = Principal {
            id,
            username: username.to_string(),
            key: crypto::new_id32(),
            secret: secret.to_string(),
            random: crypto::random_string(RANDOM_LENGTH),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        debug_assert_eq!(principal.key.len(), PRINCIPAL_KEY_LENGTH);
        self.encode(&principal)
    }

    /// Serialize and encrypt an already built principal
    pub fn encode(&self, principal: &Principal) -> Result<String, GatewayError> {
        let json = serde_json::to_vec(principal)
            .map_err(|e| GatewayError::Encoding(format!("Failed to serialize principal: {}", e)))?;
        let encrypted = crypto::aes_ecb_encrypt(&json, self.server_key.expose_secret())
            .map_err(|e| GatewayError::Encoding(format!("Failed to encrypt principal: {}", e)))?;
        Ok(STANDARD.encode(encrypted))
    }

    /// Decode and validate a token.
    ///
    /// Every failure is a `GatewayError::Token` whose fault records the
    /// stage; the client-facing message is the same for all of them.
    pub fn decode(&self, token: &str) -> Result<Principal, GatewayError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GatewayError::Token(TokenFault::Blank));
        }

        let raw = STANDARD
            .decode(token)
            .map_err(|_| GatewayError::Token(TokenFault::Base64))?;

        let plain = crypto::aes_ecb_decrypt(&raw, self.server_key.expose_secret())
            .map_err(|_| GatewayError::Token(TokenFault::Decrypt))?;

        let principal: Principal = serde_json::from_slice(&plain)
            .map_err(|_| GatewayError::Token(TokenFault::Deserialize))?;

        if !principal.is_valid() {
            debug!(id = principal.id, "Token principal failed validation");
            return Err(GatewayError::Token(TokenFault::Invalid));
        }

        Ok(principal)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("server_key", &"<REDACTED>")
            .finish()
    }
}

/// Mint a token without keeping a codec around
pub fn mint_token(
    id: i64,
    username: &str,
    secret: &str,
    server_key: &[u8],
) -> Result<String, GatewayError> {
    TokenCodec::new(server_key)
        .map_err(|e| GatewayError::Encoding(e.to_string()))?
        .mint(id, username, secret)
}

/// Decode a token without keeping a codec around
pub fn decode_token(token: &str, server_key: &[u8]) -> Result<Principal, GatewayError> {
    TokenCodec::new(server_key)
        .map_err(|_| GatewayError::Token(TokenFault::Decrypt))?
        .decode(token)
}
