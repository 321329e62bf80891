use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::services::{TokenService, UploadService};

pub mod auth;
mod config;
mod employees;
mod error;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    pub tokens: TokenService,
    pub uploads: UploadService,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<Config>, store: Store) -> Self {
        let tokens = TokenService::new(&config.auth);
        let uploads = UploadService::new(&config.uploads);
        Self {
            config,
            store,
            tokens,
            uploads,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/config/public", get(config::public_configs));

    let authenticated = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password", put(auth::change_password))
        .route("/api/employees", get(employees::list))
        .route("/api/employees/positions", get(employees::positions))
        .route("/api/employees/stats", get(employees::stats))
        .route("/api/employees/{id}", get(employees::get))
        .route("/api/config/category/{category}", get(config::by_category))
        .route("/api/config/{key}", get(config::get_one))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    // Admin routes run authenticate first, then the role gate
    let admin = Router::new()
        .route("/api/employees", post(employees::create))
        .route(
            "/api/employees/{id}",
            put(employees::update).delete(employees::soft_delete),
        )
        .route("/api/employees/{id}/restore", patch(employees::restore))
        .route(
            "/api/employees/{id}/permanent",
            delete(employees::permanent_delete),
        )
        .route("/api/config", get(config::all).post(config::upsert))
        .route("/api/config/initialize", post(config::initialize))
        .route("/api/config/{key}", delete(config::delete))
        .layer(middleware::from_fn(auth::require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    Router::new()
        .merge(public)
        .merge(authenticated)
        .merge(admin)
        .nest_service("/uploads", ServeDir::new(state.uploads.root()))
        .layer(build_cors(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.store.ping().await?;
    Ok(Json(ApiResponse::message("ok")))
}

fn build_cors(config: &Config) -> CorsLayer {
    let origins = &config.server.cors_allowed_origins;

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
