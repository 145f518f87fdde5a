// Domain models: principal, result message, pagination and view flags

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::constants::defaults;
use crate::core::errors::GatewayError;

/// The authenticated identity carried inside a token.
///
/// Self-contained: there is no server-side session behind it. The
/// `secret` doubles as the AES key for this principal's payloads and as
/// the HMAC key for request signatures; an empty secret disables both.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    /// Token instance id minted with the token, not derived from the subject
    pub key: String,
    pub secret: String,
    /// Per-token nonce, the only entropy ECB gets beyond the content
    pub random: String,
    /// Mint time, milliseconds since the epoch. Never checked for expiry.
    pub timestamp: i64,
}

impl Principal {
    /// Validity invariant: non-zero id and timestamp, non-blank username and key
    pub fn is_valid(&self) -> bool {
        self.id != 0
            && !self.username.trim().is_empty()
            && !self.key.trim().is_empty()
            && self.timestamp != 0
    }

    /// Whether this principal can sign and encrypt
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("key", &self.key)
            .field("secret", &"<REDACTED>")
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// Structured success/error envelope returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub code: i32,
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Message {
    pub const CODE_OK: i32 = 0;
    pub const CODE_ERR: i32 = 1;

    /// Success without payload
    pub fn ok() -> Self {
        Self {
            code: Self::CODE_OK,
            msg: "ok".to_string(),
            data: None,
        }
    }

    /// Success carrying `data`
    pub fn ok_with(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok()
        }
    }

    /// Success carrying any serializable payload
    pub fn data<T: Serialize>(data: &T) -> Result<Self, GatewayError> {
        let value =
            serde_json::to_value(data).map_err(|e| GatewayError::Encoding(e.to_string()))?;
        Ok(Self::ok_with(value))
    }

    /// Failure with a client-facing message
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            code: Self::CODE_ERR,
            msg: msg.into(),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == Self::CODE_OK
    }
}

/// Pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub rows: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: defaults::PAGE,
            rows: defaults::ROWS,
        }
    }
}

impl Page {
    /// Set the page number; non-positive values keep the current one
    pub fn set_page(&mut self, page: i64) {
        if let Ok(page) = u32::try_from(page) {
            if page > 0 {
                self.page = page;
            }
        }
    }

    /// Set the page size; non-positive values keep the current one
    pub fn set_rows(&mut self, rows: i64) {
        if let Ok(rows) = u32::try_from(rows) {
            if rows > 0 {
                self.rows = rows;
            }
        }
    }

    /// Number of rows preceding this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.rows)
    }
}

/// View flags derived from the request path suffix
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub is_list: bool,
    pub is_count: bool,
    pub is_summary: bool,
}

/// Ordered name -> value request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string (query or form body)
    pub fn from_urlencoded(input: &str) -> Self {
        url::form_urlencoded::parse(input.as_bytes())
            .into_owned()
            .collect()
    }

    /// Value of `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Value of `name`, or `default` when absent
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Value of `name` parsed as a number; `None` when absent or malformed
    pub fn get_int<T: FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// First non-blank value among `names`, in order
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|n| self.get(n))
            .find(|v| !v.trim().is_empty())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
