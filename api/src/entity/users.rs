use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub external_id: String,
    pub email: Option<String>,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub last_seen_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
    #[sea_orm(has_many = "super::post_ratings::Entity")]
    PostRatings,
    #[sea_orm(has_many = "super::ai_usages::Entity")]
    AiUsages,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::post_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostRatings.def()
    }
}

impl Related<super::ai_usages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
