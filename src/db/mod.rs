use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{config_entries, employees};

pub mod migrator;
pub mod repositories;

pub use repositories::config::{ConfigWrite, PublicConfig, raw_value};
pub use repositories::employee::{
    Address, DEFAULT_PROFILE_IMAGE, EmployeeChanges, EmployeeFilter, EmployeeStats, NewEmployee,
};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn employee_repo(&self) -> repositories::employee::EmployeeRepository {
        repositories::employee::EmployeeRepository::new(self.conn.clone())
    }

    fn config_repo(&self) -> repositories::config::ConfigRepository {
        repositories::config::ConfigRepository::new(self.conn.clone())
    }

    // ---- users ----

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn user_email_exists(&self, email: &str) -> Result<bool> {
        self.user_repo().email_exists(email).await
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
        department: Option<String>,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(name, email, password, role, department, security)
            .await
    }

    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.user_repo().verify_credentials(email, password).await
    }

    pub async fn update_user_password(
        &self,
        user_id: i32,
        new_password: &str,
        security: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(user_id, new_password, security)
            .await
    }

    // ---- employees ----

    pub async fn create_employee(&self, input: NewEmployee) -> Result<employees::Model> {
        self.employee_repo().create(input).await
    }

    pub async fn get_employee(&self, id: i32) -> Result<Option<employees::Model>> {
        self.employee_repo().get(id).await
    }

    pub async fn employee_email_in_use(
        &self,
        email: &str,
        exclude_id: Option<i32>,
    ) -> Result<bool> {
        self.employee_repo().email_in_use(email, exclude_id).await
    }

    pub async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        page: u64,
        limit: u64,
        sort_by: Option<&str>,
        descending: bool,
    ) -> Result<(Vec<employees::Model>, u64)> {
        self.employee_repo()
            .list(filter, page, limit, sort_by, descending)
            .await
    }

    pub async fn update_employee(
        &self,
        id: i32,
        changes: EmployeeChanges,
    ) -> Result<Option<employees::Model>> {
        self.employee_repo().update(id, changes).await
    }

    pub async fn soft_delete_employee(&self, id: i32) -> Result<Option<employees::Model>> {
        self.employee_repo().soft_delete(id).await
    }

    pub async fn restore_employee(&self, id: i32) -> Result<Option<employees::Model>> {
        self.employee_repo().restore(id).await
    }

    pub async fn hard_delete_employee(&self, id: i32) -> Result<bool> {
        self.employee_repo().hard_delete(id).await
    }

    pub async fn employee_positions(&self) -> Result<Vec<String>> {
        self.employee_repo().distinct_positions().await
    }

    pub async fn employee_stats(&self) -> Result<EmployeeStats> {
        self.employee_repo().stats().await
    }

    // ---- config store ----

    pub async fn get_config(&self, key: &str) -> Result<Option<config_entries::Model>> {
        self.config_repo().get(key).await
    }

    pub async fn get_config_value(&self, key: &str) -> Result<Option<Value>> {
        self.config_repo().get_value(key).await
    }

    pub async fn set_config(&self, write: ConfigWrite) -> Result<config_entries::Model> {
        self.config_repo().set(write).await
    }

    pub async fn delete_config(&self, key: &str) -> Result<bool> {
        self.config_repo().delete(key).await
    }

    pub async fn all_configs(&self) -> Result<Vec<config_entries::Model>> {
        self.config_repo().all().await
    }

    pub async fn configs_by_category(
        &self,
        category: &str,
    ) -> Result<serde_json::Map<String, Value>> {
        self.config_repo().by_category(category).await
    }

    pub async fn public_configs(&self) -> Result<Vec<PublicConfig>> {
        self.config_repo().public_entries().await
    }

    pub async fn increment_sequence(&self, name: &str) -> Result<i64> {
        self.config_repo().increment_sequence(name).await
    }

    pub async fn initialize_default_configs(&self, updated_by: Option<i32>) -> Result<usize> {
        self.config_repo().initialize_defaults(updated_by).await
    }
}
