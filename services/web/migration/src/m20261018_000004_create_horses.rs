use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Horses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Horses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Horses::FarmId).uuid().not_null())
                    .col(ColumnDef::new(Horses::Name).string().not_null())
                    .col(
                        ColumnDef::new(Horses::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Horses::DateOfBirth).date().not_null())
                    .col(ColumnDef::new(Horses::Gender).small_integer().not_null())
                    .col(
                        ColumnDef::new(Horses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_horses_farm_id")
                            .from(Horses::Table, Horses::FarmId)
                            .to(Farms::Table, Farms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Horses::Table)
                    .col(Horses::FarmId)
                    .col(Horses::Name)
                    .name("idx_horses_farm_id_name")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Horses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Horses {
    Table,
    Id,
    FarmId,
    Name,
    Description,
    DateOfBirth,
    Gender,
    CreatedAt,
}

#[derive(Iden)]
enum Farms {
    Table,
    Id,
}
