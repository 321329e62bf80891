use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seeded admin account; rotate the password after first login.
const DEFAULT_ADMIN_EMAIL: &str = "admin@company.com";
const DEFAULT_ADMIN_PASSWORD: &str = "changeme";

/// Hash the default admin password using Argon2id
fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_ADMIN_PASSWORD.as_bytes(), &salt)
        .expect("Failed to hash default password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Employees)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ConfigEntries)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_config_entries_category")
                    .table(ConfigEntries)
                    .col(crate::entities::config_entries::Column::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employees_status")
                    .table(Employees)
                    .col(crate::entities::employees::Column::Status)
                    .to_owned(),
            )
            .await?;

        // Seed default admin user with hashed password
        let now = chrono::Utc::now().to_rfc3339();
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(Users)
            .columns([
                crate::entities::users::Column::Name,
                crate::entities::users::Column::Email,
                crate::entities::users::Column::PasswordHash,
                crate::entities::users::Column::Role,
                crate::entities::users::Column::CreatedAt,
                crate::entities::users::Column::UpdatedAt,
            ])
            .values_panic([
                "Administrator".into(),
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                "admin".into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConfigEntries).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Employees).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
