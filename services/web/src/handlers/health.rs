use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::repository::Store;
use crate::state::AppState;

/// Handler for `GET /readyz`: ready once the store answers a ping.
pub async fn readyz<S: Store>(State(state): State<AppState<S>>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            e.report();
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
