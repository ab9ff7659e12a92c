//! Cookie builders for the session credential.
//!
//! Every session cookie is `HttpOnly`, `SameSite=Lax`, `Path=/`, and carries an
//! absolute expiry 24 hours after it was issued or refreshed. `Secure` follows
//! the request: see [`is_secure_request`].

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::{HeaderMap, Uri};
use time::{Duration, OffsetDateTime};

/// Default cookie name for the session credential.
pub const DEFAULT_SESSION_COOKIE: &str = "paddock_session";

/// Absolute lifetime of a session cookie from issuance or refresh.
pub const SESSION_COOKIE_TTL: Duration = Duration::hours(24);

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Build a session cookie expiring [`SESSION_COOKIE_TTL`] from now.
///
/// ```
/// use paddock_auth_types::cookie::session_cookie;
///
/// let cookie = session_cookie("paddock_session", "tok".to_string(), true);
/// assert_eq!(cookie.path(), Some("/"));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// assert!(cookie.expires_datetime().unwrap() > time::OffsetDateTime::now_utc());
/// ```
pub fn session_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_owned(), value))
        .path("/")
        .expires(OffsetDateTime::now_utc() + SESSION_COOKIE_TTL)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Set (or refresh) the session cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use paddock_auth_types::cookie::set_session_cookie;
///
/// let jar = set_session_cookie(CookieJar::new(), "paddock_session", "tok".to_string(), false);
/// let cookie = jar.get("paddock_session").unwrap();
/// assert_eq!(cookie.value(), "tok");
/// assert_eq!(cookie.secure(), Some(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, name: &str, value: String, secure: bool) -> CookieJar {
    jar.add(session_cookie(name, value, secure))
}

/// Clear the session cookie: empty value, expiry at the UNIX epoch, `Max-Age=0`.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use paddock_auth_types::cookie::{clear_session_cookie, set_session_cookie};
///
/// let jar = set_session_cookie(CookieJar::new(), "paddock_session", "tok".to_string(), true);
/// let jar = clear_session_cookie(jar, "paddock_session", true);
/// let cookie = jar.get("paddock_session").unwrap();
/// assert_eq!(cookie.value(), "");
/// assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
/// ```
pub fn clear_session_cookie(jar: CookieJar, name: &str, secure: bool) -> CookieJar {
    let cookie = Cookie::build((name.to_owned(), ""))
        .path("/")
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Whether the request reached us over TLS.
///
/// True when the request URI itself carries the `https` scheme, or when
/// `trust_forwarded_proto` is set and the first `X-Forwarded-Proto` hop says `https`.
pub fn is_secure_request(headers: &HeaderMap, uri: &Uri, trust_forwarded_proto: bool) -> bool {
    if uri
        .scheme_str()
        .is_some_and(|s| s.eq_ignore_ascii_case("https"))
    {
        return true;
    }
    if !trust_forwarded_proto {
        return false;
    }
    headers
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"))
}
