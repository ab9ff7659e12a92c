use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionError, TransactionTrait,
    sea_query::OnConflict,
};
use uuid::Uuid;

use paddock_core::sea_ext::is_unique_violation;
use paddock_domain::horse::Gender;
use paddock_domain::id::{ExternalId, FarmId, HorseId, UserId};
use paddock_web_schema::{farms, horses, users};

use crate::domain::repository::{FarmRepository, HorseRepository, Store, UserRepository};
use crate::domain::types::{Farm, Horse, User};
use crate::error::WebError;

// ── Store ─────────────────────────────────────────────────────────────────────

/// Postgres-backed store. Cloning shares the connection pool.
#[derive(Clone)]
pub struct DbStore {
    pub db: DatabaseConnection,
}

impl Store for DbStore {
    type Users = DbUserRepository;
    type Farms = DbFarmRepository;
    type Horses = DbHorseRepository;

    fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    fn farm_repo(&self) -> DbFarmRepository {
        DbFarmRepository {
            db: self.db.clone(),
        }
    }

    fn horse_repo(&self) -> DbHorseRepository {
        DbHorseRepository {
            db: self.db.clone(),
        }
    }

    async fn ping(&self) -> Result<(), WebError> {
        self.db.ping().await.context("database ping")?;
        Ok(())
    }
}

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<User>, WebError> {
        let model = users::Entity::find()
            .filter(users::Column::ExternalId.eq(external_id.as_str()))
            .one(&self.db)
            .await
            .context("find user by external id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, WebError> {
        let model = users::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn upsert(
        &self,
        external_id: &ExternalId,
        name: &str,
        email: &str,
    ) -> Result<User, WebError> {
        let now = Utc::now();
        let model = users::ActiveModel {
            id: Set(Uuid::now_v7()),
            external_id: Set(external_id.as_str().to_owned()),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            farm_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        // The unique index on external_id turns a concurrent double insert into
        // an update of the row that won.
        let model = users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::ExternalId)
                    .update_columns([
                        users::Column::Name,
                        users::Column::Email,
                        users::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .context("upsert user")?;
        Ok(user_from_model(model))
    }

    async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        email: &str,
    ) -> Result<Option<User>, WebError> {
        let result = users::ActiveModel {
            id: Set(id.0),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await;
        match result {
            Ok(model) => Ok(Some(user_from_model(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("update user profile").into()),
        }
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: UserId(model.id),
        external_id: ExternalId::from(model.external_id),
        name: model.name,
        email: model.email,
        farm_id: model.farm_id.map(FarmId),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Farm repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbFarmRepository {
    pub db: DatabaseConnection,
}

impl FarmRepository for DbFarmRepository {
    async fn find_by_id(&self, id: FarmId) -> Result<Option<Farm>, WebError> {
        let model = farms::Entity::find_by_id(id.0)
            .one(&self.db)
            .await
            .context("find farm by id")?;
        Ok(model.map(farm_from_model))
    }

    async fn create_or_attach(&self, name: &str, user_id: UserId) -> Result<Farm, WebError> {
        let name = name.to_owned();
        let result = self
            .db
            .transaction::<_, Option<farms::Model>, DbErr>(|txn| {
                Box::pin(async move { attach_in_txn(txn, &name, user_id.0).await })
            })
            .await;

        match result {
            Ok(Some(model)) => Ok(farm_from_model(model)),
            Ok(None) => Err(WebError::UserNotFound),
            // Lost a race against another transaction for the same owner: the
            // winner's farm is the user's farm.
            Err(TransactionError::Transaction(e)) if is_unique_violation(&e) => {
                let model = farms::Entity::find()
                    .filter(farms::Column::OwnerId.eq(user_id.0))
                    .one(&self.db)
                    .await
                    .context("re-read farm after owner conflict")?
                    .context("owner conflict without a farm")?;
                Ok(farm_from_model(model))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("create or attach farm")
                .into()),
        }
    }
}

/// Runs inside the create-or-attach transaction. Returns `None` when the user
/// does not exist.
async fn attach_in_txn(
    txn: &DatabaseTransaction,
    name: &str,
    user_id: Uuid,
) -> Result<Option<farms::Model>, DbErr> {
    // Row lock serialises concurrent submissions for the same user.
    let Some(user) = users::Entity::find_by_id(user_id)
        .lock_exclusive()
        .one(txn)
        .await?
    else {
        return Ok(None);
    };

    if let Some(farm_id) = user.farm_id {
        if let Some(farm) = farms::Entity::find_by_id(farm_id).one(txn).await? {
            return Ok(Some(farm));
        }
    }

    let owned = farms::Entity::find()
        .filter(farms::Column::OwnerId.eq(user.id))
        .one(txn)
        .await?;
    let now = Utc::now();
    let farm = match owned {
        Some(farm) => farm,
        None => {
            farms::ActiveModel {
                id: Set(Uuid::now_v7()),
                name: Set(name.to_owned()),
                owner_id: Set(user.id),
                created_at: Set(now),
            }
            .insert(txn)
            .await?
        }
    };

    users::ActiveModel {
        id: Set(user.id),
        farm_id: Set(Some(farm.id)),
        updated_at: Set(now),
        ..Default::default()
    }
    .update(txn)
    .await?;

    Ok(Some(farm))
}

fn farm_from_model(model: farms::Model) -> Farm {
    Farm {
        id: FarmId(model.id),
        name: model.name,
        owner_id: UserId(model.owner_id),
        created_at: model.created_at,
    }
}

// ── Horse repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbHorseRepository {
    pub db: DatabaseConnection,
}

impl HorseRepository for DbHorseRepository {
    async fn list_by_farm(&self, farm_id: FarmId) -> Result<Vec<Horse>, WebError> {
        let models = horses::Entity::find()
            .filter(horses::Column::FarmId.eq(farm_id.0))
            .order_by_asc(horses::Column::Name)
            .all(&self.db)
            .await
            .context("list horses by farm")?;
        models.into_iter().map(horse_from_model).collect()
    }

    async fn find(&self, farm_id: FarmId, id: HorseId) -> Result<Option<Horse>, WebError> {
        let model = horses::Entity::find_by_id(id.0)
            .filter(horses::Column::FarmId.eq(farm_id.0))
            .one(&self.db)
            .await
            .context("find horse")?;
        model.map(horse_from_model).transpose()
    }

    async fn create(&self, horse: &Horse) -> Result<(), WebError> {
        horses::ActiveModel {
            id: Set(horse.id.0),
            farm_id: Set(horse.farm_id.0),
            name: Set(horse.name.clone()),
            description: Set(horse.description.clone()),
            date_of_birth: Set(horse.date_of_birth),
            gender: Set(horse.gender.as_i16()),
            created_at: Set(horse.created_at),
        }
        .insert(&self.db)
        .await
        .context("create horse")?;
        Ok(())
    }

    async fn delete(&self, farm_id: FarmId, id: HorseId) -> Result<bool, WebError> {
        let result = horses::Entity::delete_many()
            .filter(horses::Column::Id.eq(id.0))
            .filter(horses::Column::FarmId.eq(farm_id.0))
            .exec(&self.db)
            .await
            .context("delete horse")?;
        Ok(result.rows_affected > 0)
    }
}

fn horse_from_model(model: horses::Model) -> Result<Horse, WebError> {
    let gender = Gender::from_i16(model.gender)
        .with_context(|| format!("stored horse {} has unknown gender {}", model.id, model.gender))?;
    Ok(Horse {
        id: HorseId(model.id),
        farm_id: FarmId(model.farm_id),
        name: model.name,
        description: model.description,
        date_of_birth: model.date_of_birth,
        gender,
        created_at: model.created_at,
    })
}
