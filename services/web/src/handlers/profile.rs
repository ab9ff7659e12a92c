use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use paddock_auth_types::identity::SessionIdentity;

use crate::domain::repository::Store;
use crate::domain::types::Home;
use crate::error::WebError;
use crate::state::AppState;
use crate::usecase::login::LOGIN_PATH;
use crate::usecase::profile::{GetProfileUseCase, ProfileInput, UpdateProfileUseCase};
use crate::views::{self, ProfilePage, error_message};

// ── GET /profile ──────────────────────────────────────────────────────────────

pub async fn profile_form<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
) -> Response {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    match usecase.execute(&identity.external_id).await {
        Ok(user) => views::page(&ProfilePage {
            name: user.name,
            email: user.email,
            error: None,
        }),
        Err(WebError::UserNotFound) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── POST /profile ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

pub async fn update_profile<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Form(form): Form<ProfileForm>,
) -> Response {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let input = ProfileInput {
        name: form.name.clone(),
        email: form.email.clone(),
    };
    match usecase.execute(&identity.external_id, input).await {
        Ok(user) => Redirect::to(&Home::for_user(&user).path()).into_response(),
        Err(WebError::UserNotFound) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => {
            let page = ProfilePage {
                name: form.name,
                email: form.email,
                error: Some(error_message(&e)),
            };
            views::render_with_error(&page, &e)
        }
    }
}
