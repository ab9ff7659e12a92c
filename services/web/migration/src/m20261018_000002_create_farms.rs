use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // owner_id is unique: a concurrent second insert for the same owner fails
        // and the caller re-reads the winner's farm.
        manager
            .create_table(
                Table::create()
                    .table(Farms::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Farms::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Farms::Name).string().not_null())
                    .col(ColumnDef::new(Farms::OwnerId).uuid().not_null().unique_key())
                    .col(
                        ColumnDef::new(Farms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_farms_owner_id")
                            .from(Farms::Table, Farms::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Farms::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Farms {
    Table,
    Id,
    Name,
    OwnerId,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
