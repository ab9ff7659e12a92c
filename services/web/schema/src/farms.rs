use sea_orm::entity::prelude::*;

/// A tenant. Each farm has exactly one owner, and a user owns at most one farm.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub owner_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::horses::Entity")]
    Horses,
}

impl Related<super::horses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Horses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
