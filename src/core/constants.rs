//! Gateway constants - single source of truth for header names, wire
//! markers and defaults shared by the pipeline stages and resolvers.

/// Request/response header names
pub mod headers {
    /// Opaque principal token
    pub const TOKEN: &str = "x-token";
    /// Signature over the canonical content
    pub const SIGN: &str = "x-sign";
    /// Marks an encrypted request or response payload
    pub const ENC: &str = "x-enc";
    /// Value of [`ENC`] that switches encryption on
    pub const ENC_ON: &str = "1";
}

/// Cryptographic constants
pub mod crypto {
    /// AES block size in bytes
    pub const BLOCK_SIZE: usize = 16;
    /// Length of the minted principal key
    pub const PRINCIPAL_KEY_LENGTH: usize = 32;
    /// Length of the per-token random nonce
    pub const RANDOM_LENGTH: usize = 32;
    /// Byte trimmed from both ends of encrypted or signed bodies
    pub const QUOTE: u8 = b'"';
}

/// Gateway defaults
pub mod defaults {
    /// Path prefix that is never authenticated nor response-encrypted
    pub const LOGIN_PREFIX: &str = "/login";
    /// Largest request body a stage or resolver will buffer
    pub const BODY_LIMIT_BYTES: usize = 2 * 1024 * 1024;
    /// Page number used when none (or a non-positive one) is supplied
    pub const PAGE: u32 = 1;
    /// Page size used when none (or a non-positive one) is supplied
    pub const ROWS: u32 = 20;
}

/// Messages rendered to clients
pub mod messages {
    /// Substituted for every unclassified fault
    pub const INTERNAL_SERVER_ERROR: &str = "InternalServerError";
    /// Rendered for the not-found sentinel
    pub const NOT_FOUND: &str = "not found";
    /// Rendered when a handler produced no message
    pub const EMPTY_REPLY: &str = "handler returned an empty message";
}
