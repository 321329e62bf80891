use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Minted from the config store sequence, e.g. "EMP1001"
    pub employee_code: String,

    pub first_name: String,

    pub last_name: String,

    /// Lowercased; unique among non-deleted rows (application-level check,
    /// soft-deleted rows retain the field)
    pub email: String,

    pub phone: Option<String>,

    pub department: String,

    pub position: String,

    pub salary: f64,

    pub employment_type: Option<String>,

    pub date_of_joining: String,

    pub address_street: Option<String>,

    pub address_city: Option<String>,

    pub address_state: Option<String>,

    pub address_zip: Option<String>,

    pub address_country: Option<String>,

    pub status: EmployeeStatus,

    /// Set when status transitions to deleted, cleared on restore
    pub deleted_at: Option<String>,

    pub profile_image: String,

    pub created_by: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EmployeeStatus {
    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    #[serde(rename = "inactive")]
    Inactive,
    #[sea_orm(string_value = "on-leave")]
    #[serde(rename = "on-leave")]
    OnLeave,
    #[sea_orm(string_value = "deleted")]
    #[serde(rename = "deleted")]
    Deleted,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
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
