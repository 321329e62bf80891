use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash, never serialized into API responses
    pub password_hash: String,

    /// "admin", "user", "manager", "hr", ...
    pub role: String,

    pub department: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
