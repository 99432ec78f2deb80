//! Credential handling: password hashing and the session cookie.

pub mod password;
pub mod session;
