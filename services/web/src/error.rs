use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Web service error variants.
///
/// Messages are fixed strings. Persistence and provider details stay in the
/// logs and never reach the client.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("missing token")]
    MissingToken,
    #[error("invalid form: {0}")]
    InvalidForm(&'static str),
    #[error("invalid or expired login link")]
    InvalidLink,
    #[error("invalid session")]
    InvalidSession,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("farm not found")]
    FarmNotFound,
    #[error("horse not found")]
    HorseNotFound,
    #[error("couldn't send login link")]
    LinkNotSent,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl WebError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "MISSING_TOKEN",
            Self::InvalidForm(_) => "INVALID_FORM",
            Self::InvalidLink => "INVALID_LINK",
            Self::InvalidSession => "INVALID_SESSION",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::FarmNotFound => "FARM_NOT_FOUND",
            Self::HorseNotFound => "HORSE_NOT_FOUND",
            Self::LinkNotSent => "LINK_NOT_SENT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::InvalidLink | Self::InvalidSession | Self::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::FarmNotFound | Self::HorseNotFound => StatusCode::NOT_FOUND,
            Self::LinkNotSent => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the error if it is a 500. Called wherever the error is turned into a
    /// response, JSON or HTML.
    pub fn report(&self) {
        // TraceLayer already records status for every request; only the anyhow
        // chain of an internal error needs logging here.
        if let Self::Internal(e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        self.report();
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}
