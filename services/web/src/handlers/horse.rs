use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use paddock_auth_types::identity::SessionIdentity;
use paddock_core::serde::{to_iso_date, to_rfc3339_ms};
use paddock_domain::horse::Gender;
use paddock_domain::id::{FarmId, HorseId};

use crate::domain::repository::Store;
use crate::domain::types::Horse;
use crate::error::WebError;
use crate::state::AppState;
use crate::usecase::farm::AuthorizeFarmUseCase;
use crate::usecase::horse::{
    CreateHorseInput, CreateHorseUseCase, DeleteHorseUseCase, GetHorseUseCase, ListHorsesUseCase,
};

#[derive(Serialize)]
pub struct HorseResponse {
    pub id: HorseId,
    pub farm_id: FarmId,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "to_iso_date")]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub age: u32,
    /// Colt, Filly, Stallion, Mare or Gelding.
    pub label: &'static str,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

impl HorseResponse {
    fn new(horse: Horse, today: NaiveDate) -> Self {
        Self {
            age: horse.age(today),
            label: horse.label(today),
            id: horse.id,
            farm_id: horse.farm_id,
            name: horse.name,
            description: horse.description,
            date_of_birth: horse.date_of_birth,
            gender: horse.gender,
            created_at: horse.created_at,
        }
    }
}

async fn authorize<S: Store>(
    state: &AppState<S>,
    identity: &SessionIdentity,
    farm_id: Uuid,
) -> Result<FarmId, WebError> {
    let access = AuthorizeFarmUseCase {
        users: state.user_repo(),
        farms: state.farm_repo(),
    }
    .execute(&identity.external_id, FarmId(farm_id))
    .await?;
    Ok(access.farm.id)
}

// ── GET /farm/{farm_id}/horses ────────────────────────────────────────────────

pub async fn list_horses<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Path(farm_id): Path<Uuid>,
) -> Result<Json<Vec<HorseResponse>>, WebError> {
    let farm_id = authorize(&state, &identity, farm_id).await?;
    let horses = ListHorsesUseCase {
        horses: state.horse_repo(),
    }
    .execute(farm_id)
    .await?;
    let today = Utc::now().date_naive();
    Ok(Json(
        horses
            .into_iter()
            .map(|h| HorseResponse::new(h, today))
            .collect(),
    ))
}

// ── POST /farm/{farm_id}/horses ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateHorseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date_of_birth: String,
    pub gender: String,
}

pub async fn create_horse<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Path(farm_id): Path<Uuid>,
    Json(body): Json<CreateHorseRequest>,
) -> Result<impl IntoResponse, WebError> {
    let farm_id = authorize(&state, &identity, farm_id).await?;
    let horse = CreateHorseUseCase {
        horses: state.horse_repo(),
    }
    .execute(
        farm_id,
        CreateHorseInput {
            name: body.name,
            description: body.description,
            date_of_birth: body.date_of_birth,
            gender: body.gender,
        },
    )
    .await?;
    let today = Utc::now().date_naive();
    Ok((StatusCode::CREATED, Json(HorseResponse::new(horse, today))))
}

// ── GET /farm/{farm_id}/horses/{horse_id} ─────────────────────────────────────

pub async fn get_horse<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Path((farm_id, horse_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HorseResponse>, WebError> {
    let farm_id = authorize(&state, &identity, farm_id).await?;
    let horse = GetHorseUseCase {
        horses: state.horse_repo(),
    }
    .execute(farm_id, HorseId(horse_id))
    .await?;
    Ok(Json(HorseResponse::new(horse, Utc::now().date_naive())))
}

// ── DELETE /farm/{farm_id}/horses/{horse_id} ──────────────────────────────────

pub async fn delete_horse<S: Store>(
    State(state): State<AppState<S>>,
    identity: SessionIdentity,
    Path((farm_id, horse_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, WebError> {
    let farm_id = authorize(&state, &identity, farm_id).await?;
    DeleteHorseUseCase {
        horses: state.horse_repo(),
    }
    .execute(farm_id, HorseId(horse_id))
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
