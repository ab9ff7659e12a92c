use chrono::{DateTime, NaiveDate, Utc};

use paddock_domain::horse::{Gender, age_in_years};
use paddock_domain::id::{ExternalId, FarmId, HorseId, UserId};

/// Local user linked to a provider identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub external_id: ExternalId,
    pub name: String,
    pub email: String,
    /// `None` until the user has onboarded a farm.
    pub farm_id: Option<FarmId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Farm {
    pub id: FarmId,
    pub name: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Horse {
    pub id: HorseId,
    pub farm_id: FarmId,
    pub name: String,
    pub description: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl Horse {
    pub fn age(&self, today: NaiveDate) -> u32 {
        age_in_years(self.date_of_birth, today)
    }

    /// "Colt", "Filly", "Stallion", "Mare" or "Gelding".
    pub fn label(&self, today: NaiveDate) -> &'static str {
        self.gender.label(self.age(today))
    }
}

/// Where an authenticated user lands after login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Home {
    NewFarm,
    Dashboard(FarmId),
}

impl Home {
    pub fn for_user(user: &User) -> Self {
        match user.farm_id {
            Some(farm_id) => Self::Dashboard(farm_id),
            None => Self::NewFarm,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::NewFarm => "/new/farm".to_owned(),
            Self::Dashboard(farm_id) => format!("/farm/{farm_id}"),
        }
    }
}
