//! Assertions over `Set-Cookie` values issued for the session credential.

use axum_extra::extract::cookie::{Cookie, SameSite};
use http::{HeaderMap, header};
use time::OffsetDateTime;

/// Parse every `Set-Cookie` header named `name` from a response.
pub fn set_cookies(headers: &HeaderMap, name: &str) -> Vec<Cookie<'static>> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v.to_owned()).ok())
        .filter(|c| c.name() == name)
        .collect()
}

/// Assert the cookie follows the session contract and expires in the future.
pub fn assert_session_cookie(cookie: &Cookie<'_>, expected_value: &str) {
    assert_eq!(cookie.value(), expected_value, "session cookie value");
    assert_eq!(cookie.path(), Some("/"), "session cookie path");
    assert_eq!(cookie.http_only(), Some(true), "session cookie HttpOnly");
    assert_eq!(cookie.same_site(), Some(SameSite::Lax), "session cookie SameSite");
    let expires = cookie
        .expires_datetime()
        .expect("session cookie has an absolute expiry");
    assert!(
        expires > OffsetDateTime::now_utc(),
        "session cookie must expire in the future, got {expires}"
    );
}

/// Assert the cookie clears the session: empty value, expiry in the past.
pub fn assert_cleared_cookie(cookie: &Cookie<'_>) {
    assert_eq!(cookie.value(), "", "cleared cookie value");
    assert_eq!(cookie.path(), Some("/"), "cleared cookie path");
    let expires = cookie
        .expires_datetime()
        .expect("cleared cookie has an absolute expiry");
    assert!(
        expires < OffsetDateTime::now_utc(),
        "cleared cookie must expire in the past, got {expires}"
    );
}
