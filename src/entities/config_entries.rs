use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "config_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// `[a-z0-9_]+`, at most 50 chars. Immutable identity; writes upsert on it.
    #[sea_orm(unique)]
    pub key: String,

    /// JSON-serialized payload; interpreted through `config_type` on every read
    pub value: String,

    pub config_type: String,

    pub category: String,

    pub description: Option<String>,

    /// World-readable without authentication when true
    pub is_public: bool,

    /// Advisory flag for UIs; the store does not enforce it
    pub is_editable: bool,

    pub updated_by: Option<i32>,

    /// RFC3339; reset to now on every upsert
    pub valid_from: String,

    /// RFC3339; entry is inactive once this lapses
    pub valid_to: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UpdatedBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
