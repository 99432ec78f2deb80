//! The session cookie.
//!
//! `attendft_session=<user_id>.<token>`, `HttpOnly`, `SameSite=Strict`,
//! `Path=/`, `Secure` per configuration, `Max-Age` equal to the session
//! lifetime.

use attendft_core::credentials::SessionCookieValue;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::config::SessionConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "attendft_session";

/// Request header carrying the CSRF token on state-changing requests.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Build the cookie that carries a freshly issued session.
pub fn session_cookie(value: &SessionCookieValue, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value.encode()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .secure(config.cookie_secure)
        .max_age(::cookie::time::Duration::hours(config.lifetime_hours))
        .build()
}

/// Read and parse the session cookie, if present and well-formed.
pub fn read_session_cookie(jar: &CookieJar) -> Option<SessionCookieValue> {
    jar.get(SESSION_COOKIE)
        .and_then(|c| SessionCookieValue::parse(c.value()))
}

/// Remove the session cookie from the client.
pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
