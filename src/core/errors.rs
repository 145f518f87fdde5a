// Domain error types - Secure error handling with no information disclosure

use std::fmt;
use thiserror::Error;

/// Stage at which a token was rejected.
///
/// Kept for logs and tests only; clients always see the same
/// "token invalid" message regardless of the fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFault {
    /// Header missing or blank
    Blank,
    /// Not valid standard base64
    Base64,
    /// AES decryption or padding check failed
    Decrypt,
    /// Plaintext is not a principal document
    Deserialize,
    /// Principal failed the validity invariants
    Invalid,
}

impl TokenFault {
    /// Short reason code, as written to the logs
    pub fn code(&self) -> &'static str {
        match self {
            TokenFault::Blank => "B",
            TokenFault::Base64 => "DC",
            TokenFault::Decrypt => "0",
            TokenFault::Deserialize => "1",
            TokenFault::Invalid => "2",
        }
    }
}

impl fmt::Display for TokenFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token err({})", self.code())
    }
}

/// Main error type for the gateway
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Malformed or invalid principal token (HTTP 401)
    #[error("Token error: {0}")]
    Token(TokenFault),

    /// Missing, blank or mismatched request signature (HTTP 401)
    #[error("Signature error: {0}")]
    Signature(String),

    /// Response encryption failed (HTTP 500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Request decryption failed (HTTP 400)
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Token or payload serialization failed (HTTP 500)
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A bound handler parameter could not be resolved (HTTP 400)
    #[error("p{position} resolve err")]
    Resolution { position: usize },

    /// A named request parameter was missing or malformed (HTTP 400)
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// Handler asked for a principal that authentication did not attach (HTTP 401)
    #[error("principal error")]
    Principal,

    /// A stage required an attached identity but none exists (HTTP 401)
    #[error("Principal missing")]
    PrincipalMissing,

    /// Route exists but not for this method (HTTP 405)
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Transport layer refused the request (HTTP 401)
    #[error("Not authorized")]
    NotAuthorized,

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Anything unclassified (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Cryptographic primitive errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key is not a valid AES-128/192/256 key
    #[error("Invalid key length: {0} bytes")]
    InvalidKeyLength(usize),

    /// Ciphertext is empty or not a whole number of blocks
    #[error("Invalid ciphertext length: {0} bytes")]
    InvalidCiphertextLength(usize),

    /// PKCS#7 padding check failed
    #[error("Invalid padding")]
    InvalidPadding,

    /// Text is not standard base64
    #[error("Invalid base64: {0}")]
    Base64(String),

    /// HMAC could not be keyed
    #[error("Failed to key MAC: {0}")]
    MacKey(String),
}

impl From<CryptoError> for GatewayError {
    fn from(err: CryptoError) -> Self {
        GatewayError::Encryption(err.to_string())
    }
}

impl GatewayError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Token(_) => 401,
            GatewayError::Signature(_) => 401,
            GatewayError::Encryption(_) => 500,
            GatewayError::Decryption(_) => 400,
            GatewayError::Encoding(_) => 500,
            GatewayError::Resolution { .. } => 400,
            GatewayError::Parameter(_) => 400,
            GatewayError::Principal => 401,
            GatewayError::PrincipalMissing => 401,
            GatewayError::MethodNotAllowed => 405,
            GatewayError::NotAuthorized => 401,
            GatewayError::Configuration(_) => 500,
            GatewayError::Internal(_) => 500,
        }
    }

    /// Get user-friendly error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Token(_) => "token invalid".to_string(),
            GatewayError::Signature(reason) => reason.clone(),
            GatewayError::Encryption(_) => "enc err".to_string(),
            GatewayError::Decryption(_) => "dec err".to_string(),
            GatewayError::Encoding(_) => "InternalServerError".to_string(),
            GatewayError::Resolution { position } => format!("p{} resolve err", position),
            GatewayError::Parameter(reason) => reason.clone(),
            GatewayError::Principal => "principal error".to_string(),
            GatewayError::PrincipalMissing => "user not found".to_string(),
            GatewayError::MethodNotAllowed => "method not allowed".to_string(),
            GatewayError::NotAuthorized => "not authorized".to_string(),
            GatewayError::Configuration(_) => "InternalServerError".to_string(),
            GatewayError::Internal(_) => "InternalServerError".to_string(),
        }
    }

    /// Whether this error is an unclassified internal fault
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GatewayError::Internal(_) | GatewayError::Configuration(_) | GatewayError::Encoding(_)
        )
    }
}
