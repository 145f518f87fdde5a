//! Cryptographic primitives shared by the token codec and the pipeline.
//!
//! - AES-ECB with PKCS#7 padding (tokens and payloads)
//! - HMAC-SHA256 request signatures, hex encoded
//! - random identifiers for minted principals

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256, Block};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::Sha256;
use uuid::Uuid;

use crate::core::constants::crypto::{BLOCK_SIZE, QUOTE};
use crate::core::errors::CryptoError;

type HmacSha256 = Hmac<Sha256>;

/// AES block cipher keyed with a 16, 24 or 32 byte key
enum AesKey {
    A128(Aes128),
    A192(Aes192),
    A256(Aes256),
}

impl AesKey {
    fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Aes128::new_from_slice(key).map(AesKey::A128).map_err(invalid),
            24 => Aes192::new_from_slice(key).map(AesKey::A192).map_err(invalid),
            32 => Aes256::new_from_slice(key).map(AesKey::A256).map_err(invalid),
            other => Err(CryptoError::InvalidKeyLength(other)),
        }
    }

    fn encrypt_block(&self, block: &mut Block) {
        match self {
            AesKey::A128(c) => c.encrypt_block(block),
            AesKey::A192(c) => c.encrypt_block(block),
            AesKey::A256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut Block) {
        match self {
            AesKey::A128(c) => c.decrypt_block(block),
            AesKey::A192(c) => c.decrypt_block(block),
            AesKey::A256(c) => c.decrypt_block(block),
        }
    }
}

/// Check that `key` is usable as an AES key
pub fn validate_key(key: &[u8]) -> Result<(), CryptoError> {
    AesKey::new(key).map(|_| ())
}

/// Encrypt `plaintext` with AES in ECB mode, PKCS#7 padded
pub fn aes_ecb_encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = AesKey::new(key)?;

    let pad = BLOCK_SIZE - plaintext.len() % BLOCK_SIZE;
    let mut buf = Vec::with_capacity(plaintext.len() + pad);
    buf.extend_from_slice(plaintext);
    buf.resize(plaintext.len() + pad, pad as u8);

    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block(Block::from_mut_slice(chunk));
    }
    Ok(buf)
}

/// Decrypt AES-ECB ciphertext and strip PKCS#7 padding
pub fn aes_ecb_decrypt(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = AesKey::new(key)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidCiphertextLength(ciphertext.len()));
    }

    let mut buf = ciphertext.to_vec();
    for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
        cipher.decrypt_block(Block::from_mut_slice(chunk));
    }

    let pad = usize::from(*buf.last().ok_or(CryptoError::InvalidPadding)?);
    if pad == 0 || pad > BLOCK_SIZE || pad > buf.len() {
        return Err(CryptoError::InvalidPadding);
    }
    if !buf[buf.len() - pad..].iter().all(|&b| usize::from(b) == pad) {
        return Err(CryptoError::InvalidPadding);
    }
    buf.truncate(buf.len() - pad);
    Ok(buf)
}

/// `base64(AES-ECB(plaintext, key))`, the wire form of every encrypted payload
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<String, CryptoError> {
    let encrypted = aes_ecb_encrypt(plaintext, key)?;
    Ok(STANDARD.encode(encrypted))
}

/// Inverse of [`seal`]
pub fn open(text: &str, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let raw = STANDARD
        .decode(text)
        .map_err(|e| CryptoError::Base64(e.to_string()))?;
    aes_ecb_decrypt(&raw, key)
}

/// Hex-encoded HMAC-SHA256 of `content` under `secret`
pub fn sign(content: &[u8], secret: &[u8]) -> Result<String, CryptoError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret)
        .map_err(|e| CryptoError::MacKey(e.to_string()))?;
    mac.update(content);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature produced by [`sign`] using constant-time comparison
pub fn verify(content: &[u8], secret: &[u8], signature: &str) -> bool {
    let provided = match hex::decode(signature.trim()) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac = match <HmacSha256 as Mac>::new_from_slice(secret) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(content);
    mac.verify_slice(&provided).is_ok()
}

/// Strip every leading and trailing `"` byte from an encrypted or signed body
pub fn trim_quotes(body: &[u8]) -> &[u8] {
    let start = body.iter().position(|&b| b != QUOTE).unwrap_or(body.len());
    let end = body.iter().rposition(|&b| b != QUOTE).map_or(start, |i| i + 1);
    &body[start..end]
}

/// Random alphanumeric string of `len` characters
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 32-character unique identifier (hyphen-less UUID v4)
pub fn new_id32() -> String {
    Uuid::new_v4().simple().to_string()
}
