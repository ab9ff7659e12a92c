use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use paddock_domain::horse::{Gender, parse_date_of_birth};
use paddock_domain::id::{FarmId, HorseId};

use crate::domain::repository::HorseRepository;
use crate::domain::types::Horse;
use crate::error::WebError;

pub struct CreateHorseInput {
    pub name: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    /// `stallion`, `gelding` or `mare`, case-insensitive.
    pub gender: String,
}

impl CreateHorseInput {
    fn parse(&self, today: NaiveDate) -> Result<(String, NaiveDate, Gender), WebError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(WebError::InvalidForm("horse name is required"));
        }
        let date_of_birth = parse_date_of_birth(&self.date_of_birth)
            .ok_or(WebError::InvalidForm("date of birth must be YYYY-MM-DD"))?;
        if date_of_birth > today {
            return Err(WebError::InvalidForm("date of birth is in the future"));
        }
        let gender = self
            .gender
            .parse::<Gender>()
            .map_err(|_| WebError::InvalidForm("gender must be stallion, gelding or mare"))?;
        Ok((name.to_owned(), date_of_birth, gender))
    }
}

// ── CreateHorse ───────────────────────────────────────────────────────────────

pub struct CreateHorseUseCase<H: HorseRepository> {
    pub horses: H,
}

impl<H: HorseRepository> CreateHorseUseCase<H> {
    pub async fn execute(&self, farm_id: FarmId, input: CreateHorseInput) -> Result<Horse, WebError> {
        let now = Utc::now();
        let (name, date_of_birth, gender) = input.parse(now.date_naive())?;
        let horse = Horse {
            id: HorseId(Uuid::now_v7()),
            farm_id,
            name,
            description: input.description.trim().to_owned(),
            date_of_birth,
            gender,
            created_at: now,
        };
        self.horses.create(&horse).await?;
        Ok(horse)
    }
}

// ── ListHorses / GetHorse / DeleteHorse ───────────────────────────────────────

pub struct ListHorsesUseCase<H: HorseRepository> {
    pub horses: H,
}

impl<H: HorseRepository> ListHorsesUseCase<H> {
    pub async fn execute(&self, farm_id: FarmId) -> Result<Vec<Horse>, WebError> {
        self.horses.list_by_farm(farm_id).await
    }
}

pub struct GetHorseUseCase<H: HorseRepository> {
    pub horses: H,
}

impl<H: HorseRepository> GetHorseUseCase<H> {
    pub async fn execute(&self, farm_id: FarmId, id: HorseId) -> Result<Horse, WebError> {
        self.horses
            .find(farm_id, id)
            .await?
            .ok_or(WebError::HorseNotFound)
    }
}

pub struct DeleteHorseUseCase<H: HorseRepository> {
    pub horses: H,
}

impl<H: HorseRepository> DeleteHorseUseCase<H> {
    pub async fn execute(&self, farm_id: FarmId, id: HorseId) -> Result<(), WebError> {
        if !self.horses.delete(farm_id, id).await? {
            return Err(WebError::HorseNotFound);
        }
        Ok(())
    }
}
