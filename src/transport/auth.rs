//! Handshake authentication tokens.
//!
//! The shared secret never crosses the wire. Each connection attempt derives
//! a fresh token by signing the protocol context label and the issue time
//! with HMAC-SHA256; the collector recomputes the MAC and checks freshness.

use std::{fmt, time::Duration};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use chrono::Utc;
use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Protocol version marker sent before the token.
pub const PROTOCOL_VERSION: i32 = 1;
/// Context label bound into every log upload token.
pub const AUTH_CONTEXT: &str = "logupload1";
/// Default clock skew tolerated by collectors when verifying tokens.
pub const DEFAULT_MAX_SKEW: Duration = Duration::from_secs(300);

/// Token presented during the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

fn keyed_mac(secret: &str, context: &str, issued_at: i64) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(context.as_bytes());
    mac.update(b".");
    mac.update(issued_at.to_string().as_bytes());
    Ok(mac)
}

impl AuthToken {
    /// Derive a token for the current time.
    pub fn derive(secret: &str, context: &str) -> Result<Self, InvalidLength> {
        Self::derive_at(secret, context, Utc::now().timestamp())
    }

    /// Derive a token stamped with `issued_at` (Unix seconds).
    pub fn derive_at(secret: &str, context: &str, issued_at: i64) -> Result<Self, InvalidLength> {
        let tag = keyed_mac(secret, context, issued_at)?
            .finalize()
            .into_bytes();
        Ok(Self(format!(
            "{issued_at}.{}",
            BASE64_STANDARD.encode(tag)
        )))
    }

    /// Wrap a token string received from the wire.
    pub fn from_wire(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the MAC in constant time and that the token was issued within
    /// `max_skew` of `now` (Unix seconds).
    pub fn verify(&self, secret: &str, context: &str, now: i64, max_skew: Duration) -> bool {
        let Some((stamp, encoded)) = self.0.split_once('.') else {
            return false;
        };
        let Ok(issued_at) = stamp.parse::<i64>() else {
            return false;
        };
        if now.abs_diff(issued_at) > max_skew.as_secs() {
            return false;
        }
        let Ok(tag) = BASE64_STANDARD.decode(encoded) else {
            return false;
        };
        keyed_mac(secret, context, issued_at)
            .map(|mac| mac.verify_slice(&tag).is_ok())
            .unwrap_or(false)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"[REDACTED]").finish()
    }
}
