use axum::{
    Form,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use paddock_auth_types::identity::SessionIdentity;
use paddock_domain::id::FarmId;

use crate::domain::repository::Store;
use crate::domain::types::Home;
use crate::error::WebError;
use crate::state::AppState;
use crate::usecase::farm::{AuthorizeFarmUseCase, CreateFarmUseCase};
use crate::usecase::horse::ListHorsesUseCase;
use crate::usecase::login::{LOGIN_PATH, ResolveHomeUseCase};
use crate::views::{self, DashboardPage, NewFarmPage, error_message};

// ── GET /new/farm ─────────────────────────────────────────────────────────────

pub async fn new_farm_form<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
) -> Response {
    let usecase = ResolveHomeUseCase {
        users: state.user_repo(),
    };
    match usecase.execute(&identity.external_id).await {
        Ok(Some(Home::NewFarm)) => views::page(&NewFarmPage::default()),
        Ok(Some(home)) => Redirect::to(&home.path()).into_response(),
        Ok(None) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => e.into_response(),
    }
}

// ── POST /new/farm ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NewFarmForm {
    #[serde(default)]
    pub name: String,
}

pub async fn create_farm<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Form(form): Form<NewFarmForm>,
) -> Response {
    let usecase = CreateFarmUseCase {
        users: state.user_repo(),
        farms: state.farm_repo(),
    };
    match usecase.execute(&identity.external_id, &form.name).await {
        Ok(farm) => Redirect::to(&Home::Dashboard(farm.id).path()).into_response(),
        Err(WebError::UserNotFound) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => {
            let page = NewFarmPage {
                name: form.name,
                error: Some(error_message(&e)),
            };
            views::render_with_error(&page, &e)
        }
    }
}

// ── GET /farm/{farm_id} ───────────────────────────────────────────────────────

pub async fn dashboard<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Path(farm_id): Path<Uuid>,
) -> Result<Html<String>, WebError> {
    let access = AuthorizeFarmUseCase {
        users: state.user_repo(),
        farms: state.farm_repo(),
    }
    .execute(&identity.external_id, FarmId(farm_id))
    .await?;

    let horses = ListHorsesUseCase {
        horses: state.horse_repo(),
    }
    .execute(access.farm.id)
    .await?;

    views::render(&DashboardPage::new(
        &access.farm,
        &horses,
        Utc::now().date_naive(),
    ))
}
