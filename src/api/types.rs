use serde::Serialize;
use serde_json::Value;

use super::error::FieldError;
use crate::db::{Address, User, raw_value};
use crate::entities::employees::EmployeeStatus;
use crate::entities::{config_entries, employees};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            errors: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            error: None,
            errors: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: None,
            error: Some(message.into()),
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub created_at: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: i32,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub employment_type: Option<String>,
    pub date_of_joining: String,
    pub address: Address,
    pub status: EmployeeStatus,
    pub deleted_at: Option<String>,
    pub profile_image: String,
    pub created_by: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<employees::Model> for EmployeeDto {
    fn from(model: employees::Model) -> Self {
        Self {
            id: model.id,
            employee_id: model.employee_code,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            department: model.department,
            position: model.position,
            salary: model.salary,
            employment_type: model.employment_type,
            date_of_joining: model.date_of_joining,
            address: Address {
                street: model.address_street,
                city: model.address_city,
                state: model.address_state,
                zip_code: model.address_zip,
                country: model.address_country,
            },
            status: model.status,
            deleted_at: model.deleted_at,
            profile_image: model.profile_image,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct EmployeeListData {
    pub employees: Vec<EmployeeDto>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDto {
    pub key: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub config_type: String,
    pub category: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_editable: bool,
    pub updated_by: Option<i32>,
    pub valid_from: String,
    pub valid_to: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<config_entries::Model> for ConfigDto {
    fn from(model: config_entries::Model) -> Self {
        // Entries are listed as stored; coercion is a read-time concern
        let value = raw_value(&model);
        Self {
            key: model.key,
            value,
            config_type: model.config_type,
            category: model.category,
            description: model.description,
            is_public: model.is_public,
            is_editable: model.is_editable,
            updated_by: model.updated_by,
            valid_from: model.valid_from,
            valid_to: model.valid_to,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
