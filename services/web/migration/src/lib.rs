pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_users;
mod m20261018_000002_create_farms;
mod m20261018_000003_add_users_farm_fk;
mod m20261018_000004_create_horses;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261018_000001_create_users::Migration),
            Box::new(m20261018_000002_create_farms::Migration),
            Box::new(m20261018_000003_add_users_farm_fk::Migration),
            Box::new(m20261018_000004_create_horses::Migration),
        ]
    }
}
