//! Mock session helpers for integration tests.
//!
//! Tenant routes read the session credential from a cookie. `MockSession` builds
//! that cookie directly, so tests can present any credential the fake provider
//! has been scripted to accept (or reject).

use axum_extra::extract::cookie::Cookie;

use paddock_auth_types::cookie::DEFAULT_SESSION_COOKIE;

/// A session credential presented by a test client.
pub struct MockSession {
    pub cookie_name: String,
    pub credential: String,
}

impl MockSession {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            cookie_name: DEFAULT_SESSION_COOKIE.to_owned(),
            credential: credential.into(),
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// The request-side cookie (name and value only).
    pub fn cookie(&self) -> Cookie<'static> {
        Cookie::new(self.cookie_name.clone(), self.credential.clone())
    }
}
