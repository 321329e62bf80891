use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use super::validation::{Validator, validate_password};
use super::{ApiError, ApiResponse, AppState, AuthResponse, UserDto};
use crate::db::User;
use crate::services::TokenService;

/// Authenticated caller, attached to request extensions by [`authenticate`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    let mut v = Validator::new();
    let name = v.require("name", req.name.as_deref());
    let email = v.require("email", req.email.as_deref());
    if let Some(email) = email.as_deref() {
        v.email("email", email);
    }
    let password = validate_password(&mut v, req.password.as_deref());
    v.finish()?;

    let (name, email, password) = (
        name.unwrap_or_default(),
        email.unwrap_or_default().to_lowercase(),
        password.unwrap_or_default(),
    );

    if state.store.user_email_exists(&email).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let role = req.role.filter(|r| !r.is_empty()).unwrap_or_else(|| "user".to_string());

    let user = state
        .store
        .create_user(
            &name,
            &email,
            &password,
            &role,
            req.department,
            &state.config.security,
        )
        .await?;

    let token = state.tokens.issue(user.id, &user.role)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthResponse {
            token,
            user: UserDto::from(user),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    let mut v = Validator::new();
    let email = v.require("email", req.email.as_deref());
    let password = v.require("password", req.password.as_deref());
    v.finish()?;

    let email = email.unwrap_or_default().to_lowercase();
    let password = password.unwrap_or_default();

    // Unknown email and wrong password are deliberately indistinguishable
    let user = state
        .store
        .verify_credentials(&email, &password)
        .await?
        .ok_or_else(ApiError::invalid_credentials)?;

    let token = state.tokens.issue(user.id, &user.role)?;

    Ok(Json(ApiResponse::success(AuthResponse {
        token,
        user: UserDto::from(user),
    })))
}

pub async fn me(
    axum::Extension(current): axum::Extension<CurrentUser>,
) -> Json<ApiResponse<UserDto>> {
    Json(ApiResponse::success(UserDto::from(current.0)))
}

pub async fn change_password(
    State(state): State<AppState>,
    axum::Extension(current): axum::Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let mut v = Validator::new();
    let current_password = v.require("currentPassword", req.current_password.as_deref());
    let new_password = match req.new_password.as_deref().map(str::trim) {
        Some(p) if p.len() >= 6 => Some(p.to_string()),
        Some(_) => {
            v.fail("newPassword", "Password must be at least 6 characters");
            None
        }
        None => {
            v.fail("newPassword", "newPassword is required");
            None
        }
    };
    v.finish()?;

    let verified = state
        .store
        .verify_credentials(&current.0.email, &current_password.unwrap_or_default())
        .await?;
    if verified.is_none() {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    state
        .store
        .update_user_password(
            current.0.id,
            &new_password.unwrap_or_default(),
            &state.config.security,
        )
        .await?;

    Ok(Json(ApiResponse::message("Password updated")))
}

/// Resolves the bearer token to a stored user and attaches it to the
/// request. Missing, invalid and expired tokens each get their own 401.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication token".to_string()))?;

    let token = TokenService::extract_from_header(header)
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

    let claims = state.tokens.validate(token)?;

    let user = state
        .store
        .get_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Role gate; must run after [`authenticate`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    let current = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication token".to_string()))?;

    if current.0.role != "admin" {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    Ok(next.run(req).await)
}
