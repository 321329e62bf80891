use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            role: model.role,
            department: model.department,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("Failed to count users by email")?;

        Ok(count > 0)
    }

    /// Create a user with a freshly hashed password.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
        department: Option<String>,
        security: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_lowercase()),
            password_hash: Set(password_hash),
            role: Set(role.to_string()),
            department: Set(department),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    /// Verify credentials and return the user on success.
    /// Note: this uses `spawn_blocking` because Argon2 verification is
    /// CPU-intensive and would block the async runtime if run directly.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(user) = user else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then(|| User::from(user)))
    }

    /// Rehash and store a new password for a user.
    pub async fn update_password(
        &self,
        user_id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {user_id}"))?;

        let password = new_password.to_string();
        let security = security.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(now);
        active.update(&self.conn).await?;

        Ok(())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, security: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        security.argon2_memory_cost_kib,
        security.argon2_time_cost,
        security.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
