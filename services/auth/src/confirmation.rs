//! Confirmation codes proving control of a registration email
//!
//! Codes are stateless: `<issued-at in base36>-<truncated HMAC-SHA256>`. The
//! MAC covers the user's id, email and last login, so a code stops working
//! once a token has been issued with it or when the email changes.

use anyhow::Result;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::models::User;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the MAC kept in the code
const SIGNATURE_LEN: usize = 12;

/// Default code lifetime: three days
const DEFAULT_CODE_TTL: i64 = 3 * 24 * 60 * 60;

/// Confirmation code configuration
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    /// Key for the code MAC
    pub secret: String,
    /// Code lifetime in seconds
    pub ttl_seconds: i64,
}

impl ConfirmationConfig {
    /// Create a new ConfirmationConfig from environment variables
    ///
    /// # Environment Variables
    /// - `CONFIRMATION_SECRET`: MAC key (required, must not be empty)
    /// - `CONFIRMATION_CODE_TTL`: Code lifetime in seconds (default: 259200)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("CONFIRMATION_SECRET")
            .map_err(|_| anyhow::anyhow!("CONFIRMATION_SECRET environment variable not set"))?;
        if secret.is_empty() {
            anyhow::bail!("CONFIRMATION_SECRET must not be empty");
        }

        let ttl_seconds = std::env::var("CONFIRMATION_CODE_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CODE_TTL);

        Ok(Self {
            secret,
            ttl_seconds,
        })
    }
}

/// Issues and checks confirmation codes
#[derive(Clone)]
pub struct ConfirmationCodes {
    /// MAC keyed with the secret; cloned for every code
    keyed: HmacSha256,
    ttl_seconds: i64,
}

impl ConfirmationCodes {
    pub fn new(config: ConfirmationConfig) -> Result<Self> {
        let keyed = HmacSha256::new_from_slice(config.secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid confirmation secret: {e}"))?;

        Ok(Self {
            keyed,
            ttl_seconds: config.ttl_seconds,
        })
    }

    /// Issue a code for the user's current state
    pub fn make_code(&self, user: &User) -> String {
        self.make_code_at(user, Utc::now().timestamp())
    }

    /// Check a code against the user's current state
    pub fn check_code(&self, user: &User, code: &str) -> bool {
        self.check_code_at(user, code, Utc::now().timestamp())
    }

    pub fn make_code_at(&self, user: &User, issued_at: i64) -> String {
        let signature = self.mac(user, issued_at).finalize().into_bytes();
        format!(
            "{}-{}",
            to_base36(issued_at),
            hex::encode(&signature[..SIGNATURE_LEN])
        )
    }

    pub fn check_code_at(&self, user: &User, code: &str, now: i64) -> bool {
        let Some((timestamp, signature)) = code.split_once('-') else {
            return false;
        };
        let Some(issued_at) = from_base36(timestamp) else {
            return false;
        };
        if issued_at > now || now - issued_at > self.ttl_seconds {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        if signature.len() != SIGNATURE_LEN {
            return false;
        }

        self.mac(user, issued_at)
            .verify_truncated_left(&signature)
            .is_ok()
    }

    fn mac(&self, user: &User, issued_at: i64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        let last_login = user
            .last_login
            .map(|at| at.timestamp_micros().to_string())
            .unwrap_or_default();

        mac.update(user.id.to_string().as_bytes());
        mac.update(b"|");
        mac.update(user.email.as_bytes());
        mac.update(b"|");
        mac.update(last_login.as_bytes());
        mac.update(b"|");
        mac.update(issued_at.to_string().as_bytes());
        mac
    }
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut value = value.max(0) as u64;
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn from_base36(encoded: &str) -> Option<i64> {
    if encoded.is_empty() || encoded.len() > 12 {
        return None;
    }
    i64::from_str_radix(encoded, 36).ok().filter(|v| *v >= 0)
}
