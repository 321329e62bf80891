use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::Value;

use super::auth::CurrentUser;
use super::validation::Validator;
use super::{ApiError, ApiResponse, AppState, ConfigDto};
use crate::db::{ConfigWrite, PublicConfig};
use crate::models::config::ConfigType;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRequest {
    pub key: Option<String>,
    pub value: Option<Value>,
    #[serde(rename = "type")]
    pub config_type: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub is_editable: Option<bool>,
    pub valid_to: Option<String>,
}

pub async fn public_configs(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PublicConfig>>>, ApiError> {
    let configs = state.store.public_configs().await?;
    Ok(Json(ApiResponse::success(configs)))
}

pub async fn all(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ConfigDto>>>, ApiError> {
    let entries = state.store.all_configs().await?;
    Ok(Json(ApiResponse::success(
        entries.into_iter().map(ConfigDto::from).collect(),
    )))
}

pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Map<String, Value>>>, ApiError> {
    let map = state.store.configs_by_category(&category).await?;
    Ok(Json(ApiResponse::success(map)))
}

pub async fn get_one(
    State(state): State<AppState>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<ConfigDto>>, ApiError> {
    let entry = state
        .store
        .get_config(&key)
        .await?
        .ok_or_else(|| ApiError::config_not_found(&key))?;

    // Private entries are admin-only; public ones any authenticated caller
    if !entry.is_public && current.0.role != "admin" {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(Json(ApiResponse::success(ConfigDto::from(entry))))
}

pub async fn upsert(
    State(state): State<AppState>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Json(req): Json<UpsertRequest>,
) -> Result<Json<ApiResponse<ConfigDto>>, ApiError> {
    let mut v = Validator::new();

    let key = v.require("key", req.key.as_deref());
    if let Some(key) = key.as_deref() {
        v.config_key("key", key);
    }

    // Type defaults to string when absent
    let config_type = match req.config_type.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => match raw.parse::<ConfigType>() {
            Ok(t) => t,
            Err(()) => {
                v.fail(
                    "type",
                    "Type must be one of: string, number, boolean, array, object, date",
                );
                ConfigType::String
            }
        },
        None => ConfigType::String,
    };

    if req.value.is_none() {
        v.fail("value", "value is required");
    }

    let category = req
        .category
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "general".to_string());
    v.max_len("category", &category, 50);

    if let Some(description) = req.description.as_deref() {
        v.max_len("description", description, 200);
    }

    // Stored normalized to UTC so the string comparison in the validity
    // window check stays sound
    let valid_to = match req.valid_to.as_deref().filter(|t| !t.is_empty()) {
        Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => Some(dt.with_timezone(&chrono::Utc).to_rfc3339()),
            Err(_) => {
                v.fail("validTo", "validTo must be an RFC3339 timestamp");
                None
            }
        },
        None => None,
    };

    v.finish()?;

    let entry = state
        .store
        .set_config(ConfigWrite {
            key: key.unwrap_or_default(),
            value: req.value.unwrap_or(Value::Null),
            config_type,
            category,
            description: req.description,
            is_public: req.is_public.unwrap_or(false),
            is_editable: req.is_editable.unwrap_or(true),
            valid_to,
            updated_by: Some(current.0.id),
        })
        .await?;

    Ok(Json(ApiResponse::success(ConfigDto::from(entry))))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.store.delete_config(&key).await? {
        return Err(ApiError::config_not_found(&key));
    }

    Ok(Json(ApiResponse::message("Config deleted")))
}

pub async fn initialize(
    State(state): State<AppState>,
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let created = state
        .store
        .initialize_default_configs(Some(current.0.id))
        .await?;

    Ok(Json(ApiResponse::success_with_message(
        serde_json::json!({ "created": created }),
        "Default configuration initialized",
    )))
}
