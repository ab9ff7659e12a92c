use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

use paddock_core::health::healthz;
use paddock_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::domain::repository::Store;
use crate::handlers::{
    auth::{consume_callback, index, issue_link, logout, render_login},
    farm::{create_farm, dashboard, new_farm_form},
    health::readyz,
    horse::{create_horse, delete_horse, get_horse, list_horses},
    profile::{profile_form, update_profile},
};
use crate::middleware::require_session;
use crate::state::AppState;

pub fn build_router<S: Store>(state: AppState<S>, request_timeout: Duration) -> Router {
    // Tenant routes: every request passes the session gate first.
    let tenant = Router::new()
        // Onboarding
        .route("/new/farm", get(new_farm_form::<S>).post(create_farm::<S>))
        // Profile
        .route("/profile", get(profile_form::<S>).post(update_profile::<S>))
        // Dashboard
        .route("/farm/{farm_id}", get(dashboard::<S>))
        // Horses
        .route(
            "/farm/{farm_id}/horses",
            get(list_horses::<S>).post(create_horse::<S>),
        )
        .route(
            "/farm/{farm_id}/horses/{horse_id}",
            get(get_horse::<S>).delete(delete_horse::<S>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session::<S>,
        ));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<S>))
        // Landing
        .route("/", get(index))
        // Auth flow
        .route("/login", get(render_login::<S>).post(issue_link::<S>))
        .route("/auth/callback", get(consume_callback::<S>))
        .route("/logout", post(logout::<S>))
        .merge(tenant)
        .with_state(state)
        // Outermost first: the request id exists before the trace span opens.
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(trace_layer())
                .layer(propagate_request_id_layer())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                )),
        )
}
