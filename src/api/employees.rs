use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::auth::CurrentUser;
use super::validation::Validator;
use super::{ApiError, ApiResponse, AppState, EmployeeDto, EmployeeListData, Pagination};
use crate::db::{Address, EmployeeChanges, EmployeeFilter, EmployeeStats, NewEmployee};
use crate::entities::employees::EmployeeStatus;

const FALLBACK_PAGE_SIZE: u64 = 10;
const FALLBACK_MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub show_deleted: Option<String>,
}

/// Body shared by create and update; accepted as JSON or as multipart form
/// fields (with an optional `profileImage` file part).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub employment_type: Option<String>,
    pub date_of_joining: Option<String>,
    pub address: Option<Address>,
    pub status: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<EmployeeListData>>, ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            parse_status(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Invalid status filter: {raw}")))?,
        ),
        None => None,
    };

    let filter = EmployeeFilter {
        search: query.search,
        department: query.department,
        position: query.position,
        status,
        show_deleted: query.show_deleted.as_deref() == Some("true"),
    };

    // Page sizing is driven by the config store, not hard-coded
    let default_limit = state
        .store
        .get_config_value("default_page_size")
        .await?
        .and_then(|v| v.as_u64())
        .unwrap_or(FALLBACK_PAGE_SIZE);
    // A misconfigured zero cap must not take down the list endpoint
    let max_limit = state
        .store
        .get_config_value("max_page_size")
        .await?
        .and_then(|v| v.as_u64())
        .unwrap_or(FALLBACK_MAX_PAGE_SIZE)
        .max(1);

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(default_limit).clamp(1, max_limit);

    let descending = query.sort_order.as_deref() != Some("asc");

    let (models, total) = state
        .store
        .list_employees(&filter, page, limit, query.sort_by.as_deref(), descending)
        .await?;

    Ok(Json(ApiResponse::success(EmployeeListData {
        employees: models.into_iter().map(EmployeeDto::from).collect(),
        pagination: Pagination {
            total,
            page,
            pages: total.div_ceil(limit),
            limit,
        },
    })))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let employee = state
        .store
        .get_employee(id)
        .await?
        .ok_or_else(|| ApiError::employee_not_found(id))?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

pub async fn create(
    State(state): State<AppState>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    req: Request,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeDto>>), ApiError> {
    let (payload, uploaded_image) = parse_employee_body(&state, req).await?;

    let mut v = Validator::new();
    let first_name = v.require("firstName", payload.first_name.as_deref());
    if let Some(name) = first_name.as_deref() {
        v.max_len("firstName", name, 50);
    }
    let last_name = v.require("lastName", payload.last_name.as_deref());
    if let Some(name) = last_name.as_deref() {
        v.max_len("lastName", name, 50);
    }
    let email = v.require("email", payload.email.as_deref());
    if let Some(email) = email.as_deref() {
        v.email("email", email);
    }
    if let Some(phone) = payload.phone.as_deref() {
        v.max_len("phone", phone, 20);
    }
    let department = v.require("department", payload.department.as_deref());
    let position = v.require("position", payload.position.as_deref());
    let salary = match payload.salary {
        Some(s) => {
            v.non_negative("salary", s);
            s
        }
        None => {
            v.fail("salary", "salary is required");
            0.0
        }
    };
    v.finish()?;

    let email = email.unwrap_or_default().to_lowercase();
    if state.store.employee_email_in_use(&email, None).await? {
        return Err(ApiError::Conflict(
            "An employee with this email already exists".to_string(),
        ));
    }

    // Employee codes come from the config store: prefix + atomic counter
    let prefix = state
        .store
        .get_config_value("employee_id_prefix")
        .await?
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "EMP".to_string());
    let sequence = state.store.increment_sequence("employee_sequence").await?;

    let employee = state
        .store
        .create_employee(NewEmployee {
            employee_code: format!("{prefix}{sequence}"),
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            email,
            phone: payload.phone,
            department: department.unwrap_or_default(),
            position: position.unwrap_or_default(),
            salary,
            employment_type: payload.employment_type,
            date_of_joining: payload.date_of_joining,
            address: payload.address,
            profile_image: uploaded_image,
            created_by: Some(current.0.id),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EmployeeDto::from(employee))),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    req: Request,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let (payload, uploaded_image) = parse_employee_body(&state, req).await?;

    let mut v = Validator::new();
    if let Some(name) = payload.first_name.as_deref() {
        v.max_len("firstName", name, 50);
    }
    if let Some(name) = payload.last_name.as_deref() {
        v.max_len("lastName", name, 50);
    }
    if let Some(email) = payload.email.as_deref() {
        v.email("email", email);
    }
    if let Some(phone) = payload.phone.as_deref() {
        v.max_len("phone", phone, 20);
    }
    if let Some(salary) = payload.salary {
        v.non_negative("salary", salary);
    }
    let status = match payload.status.as_deref() {
        Some(raw) => match parse_status(raw) {
            Some(status) => Some(status),
            None => {
                v.fail("status", format!("Invalid status: {raw}"));
                None
            }
        },
        None => None,
    };
    v.finish()?;

    // Existence first: a missing id is NotFound even when the email clashes
    if state.store.get_employee(id).await?.is_none() {
        return Err(ApiError::employee_not_found(id));
    }

    if let Some(email) = payload.email.as_deref() {
        if state
            .store
            .employee_email_in_use(email, Some(id))
            .await?
        {
            return Err(ApiError::Conflict(
                "An employee with this email already exists".to_string(),
            ));
        }
    }

    let changes = EmployeeChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        phone: payload.phone,
        department: payload.department,
        position: payload.position,
        salary: payload.salary,
        employment_type: payload.employment_type,
        date_of_joining: payload.date_of_joining,
        address: payload.address,
        status,
        profile_image: uploaded_image,
    };

    let employee = state
        .store
        .update_employee(id, changes)
        .await?
        .ok_or_else(|| ApiError::employee_not_found(id))?;

    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

pub async fn soft_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let employee = state
        .store
        .soft_delete_employee(id)
        .await?
        .ok_or_else(|| ApiError::employee_not_found(id))?;

    Ok(Json(ApiResponse::success_with_message(
        EmployeeDto::from(employee),
        "Employee deleted",
    )))
}

pub async fn restore(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError> {
    let employee = state
        .store
        .restore_employee(id)
        .await?
        .ok_or_else(|| ApiError::employee_not_found(id))?;

    Ok(Json(ApiResponse::success_with_message(
        EmployeeDto::from(employee),
        "Employee restored",
    )))
}

pub async fn permanent_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store.hard_delete_employee(id).await? {
        return Err(ApiError::employee_not_found(id));
    }

    Ok(Json(ApiResponse::message("Employee permanently deleted")))
}

pub async fn positions(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let positions = state.store.employee_positions().await?;
    Ok(Json(ApiResponse::success(positions)))
}

pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EmployeeStats>>, ApiError> {
    let stats = state.store.employee_stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

fn parse_status(raw: &str) -> Option<EmployeeStatus> {
    serde_json::from_value(Value::String(raw.to_string())).ok()
}

/// Accepts either a JSON body or a multipart form. The multipart path stages
/// the `profileImage` file fully before any database write happens.
async fn parse_employee_body(
    state: &AppState,
    req: Request,
) -> Result<(EmployeePayload, Option<String>), ApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?;
        return parse_multipart(state, multipart).await;
    }

    let bytes = axum::body::to_bytes(req.into_body(), 2 * 1024 * 1024)
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {e}")))?;

    let payload: EmployeePayload = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    Ok((payload, None))
}

async fn parse_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(EmployeePayload, Option<String>), ApiError> {
    let mut fields = Map::new();
    let mut uploaded_image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "profileImage" {
            let filename = field.file_name().map(str::to_string);
            let field_content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

            let stored = state
                .uploads
                .store_profile_image(filename.as_deref(), field_content_type.as_deref(), &data)
                .await?;
            uploaded_image = Some(stored);
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field {name}: {e}")))?;

        let value = match name.as_str() {
            // Numeric form fields arrive as text
            "salary" => text
                .trim()
                .parse::<f64>()
                .map_or_else(|_| Value::String(text), Value::from),
            // The address arrives as a JSON-encoded object
            "address" => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            _ => Value::String(text),
        };

        fields.insert(name, value);
    }

    let payload: EmployeePayload = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid form fields: {e}")))?;

    Ok((payload, uploaded_image))
}
