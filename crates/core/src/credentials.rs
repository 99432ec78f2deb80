//! Session and CSRF token primitives.
//!
//! Session tokens and CSRF tokens are 256-bit random values, hex encoded.
//! Only a keyed HMAC-SHA256 digest of a session token is ever persisted, so a
//! leaked `user_sessions` table cannot be replayed without the server secret.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::types::DbId;

/// Number of random bytes in a session or CSRF token.
pub const TOKEN_BYTES: usize = 32;

/// Length of a hex-encoded token.
pub const TOKEN_HEX_LENGTH: usize = TOKEN_BYTES * 2;

type HmacSha256 = Hmac<Sha256>;

/// Generate a fresh random token from the thread-local CSPRNG.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Keyed digest of a session token, as stored in `user_sessions.token_hash`.
pub fn hash_token(secret: &[u8], token: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Compare two tokens in constant time.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// The value carried in the session cookie: `<user_id>.<token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookieValue {
    pub user_id: DbId,
    pub token: String,
}

impl SessionCookieValue {
    pub fn new(user_id: DbId, token: String) -> Self {
        Self { user_id, token }
    }

    pub fn encode(&self) -> String {
        format!("{}.{}", self.user_id, self.token)
    }

    /// Parse a cookie value. Anything malformed is treated as "no session".
    pub fn parse(raw: &str) -> Option<Self> {
        let (id, token) = raw.split_once('.')?;
        let user_id: DbId = id.parse().ok()?;
        if user_id <= 0
            || token.len() != TOKEN_HEX_LENGTH
            || !token.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return None;
        }
        Some(Self {
            user_id,
            token: token.to_ascii_lowercase(),
        })
    }
}
