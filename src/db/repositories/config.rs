use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement,
};
use serde::Serialize;
use serde_json::Value;

use crate::entities::config_entries;
use crate::models::config::{ConfigType, coerce};

/// Input for an upsert write. `key` is the conflict target; everything else
/// replaces the stored row, and the validity window restarts at now.
#[derive(Debug, Clone)]
pub struct ConfigWrite {
    pub key: String,
    pub value: Value,
    pub config_type: ConfigType,
    pub category: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub is_editable: bool,
    pub valid_to: Option<String>,
    pub updated_by: Option<i32>,
}

/// Unauthenticated projection of a public entry.
#[derive(Debug, Serialize)]
pub struct PublicConfig {
    pub key: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub config_type: String,
    pub category: String,
    pub description: Option<String>,
}

struct DefaultEntry {
    key: &'static str,
    value: Value,
    config_type: ConfigType,
    category: &'static str,
    description: &'static str,
    is_public: bool,
    is_editable: bool,
}

pub struct ConfigRepository {
    conn: DatabaseConnection,
}

impl ConfigRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Fetch an entry by key, active or not.
    pub async fn get(&self, key: &str) -> Result<Option<config_entries::Model>> {
        let entry = config_entries::Entity::find()
            .filter(config_entries::Column::Key.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to query config entry by key")?;

        Ok(entry)
    }

    /// Read the typed value of an entry. Returns `None` when the key is
    /// missing or its validity window has lapsed.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        let Some(entry) = self.get(key).await? else {
            return Ok(None);
        };

        if !is_active(&entry) {
            return Ok(None);
        }

        Ok(Some(typed_value(&entry)))
    }

    /// Insert or replace an entry by key. The validity window always restarts
    /// from the moment of the write.
    pub async fn set(&self, write: ConfigWrite) -> Result<config_entries::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let value_text =
            serde_json::to_string(&write.value).context("Failed to serialize config value")?;

        let active = config_entries::ActiveModel {
            key: Set(write.key.clone()),
            value: Set(value_text),
            config_type: Set(write.config_type.to_string()),
            category: Set(write.category),
            description: Set(write.description),
            is_public: Set(write.is_public),
            is_editable: Set(write.is_editable),
            updated_by: Set(write.updated_by),
            valid_from: Set(now.clone()),
            valid_to: Set(write.valid_to),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        config_entries::Entity::insert(active)
            .on_conflict(
                OnConflict::column(config_entries::Column::Key)
                    .update_columns([
                        config_entries::Column::Value,
                        config_entries::Column::ConfigType,
                        config_entries::Column::Category,
                        config_entries::Column::Description,
                        config_entries::Column::IsPublic,
                        config_entries::Column::IsEditable,
                        config_entries::Column::UpdatedBy,
                        config_entries::Column::ValidFrom,
                        config_entries::Column::ValidTo,
                        config_entries::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert config entry")?;

        let entry = self
            .get(&write.key)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Config entry vanished after upsert: {}", write.key))?;

        Ok(entry)
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        let result = config_entries::Entity::delete_many()
            .filter(config_entries::Column::Key.eq(key))
            .exec(&self.conn)
            .await
            .context("Failed to delete config entry")?;

        Ok(result.rows_affected > 0)
    }

    /// Every entry, active or not, ordered by category then key.
    pub async fn all(&self) -> Result<Vec<config_entries::Model>> {
        let entries = config_entries::Entity::find()
            .order_by_asc(config_entries::Column::Category)
            .order_by_asc(config_entries::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to list config entries")?;

        Ok(entries)
    }

    /// Active entries of one category as a key -> typed value map.
    pub async fn by_category(&self, category: &str) -> Result<serde_json::Map<String, Value>> {
        let now = chrono::Utc::now().to_rfc3339();

        let entries = config_entries::Entity::find()
            .filter(config_entries::Column::Category.eq(category))
            .filter(active_condition(&now))
            .order_by_asc(config_entries::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to query config entries by category")?;

        let mut map = serde_json::Map::new();
        for entry in entries {
            map.insert(entry.key.clone(), raw_value(&entry));
        }

        Ok(map)
    }

    /// Active public entries, projected for unauthenticated consumption.
    pub async fn public_entries(&self) -> Result<Vec<PublicConfig>> {
        let now = chrono::Utc::now().to_rfc3339();

        let entries = config_entries::Entity::find()
            .filter(config_entries::Column::IsPublic.eq(true))
            .filter(active_condition(&now))
            .order_by_asc(config_entries::Column::Category)
            .order_by_asc(config_entries::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to query public config entries")?;

        Ok(entries
            .iter()
            .map(|entry| PublicConfig {
                key: entry.key.clone(),
                value: raw_value(entry),
                config_type: entry.config_type.clone(),
                category: entry.category.clone(),
                description: entry.description.clone(),
            })
            .collect())
    }

    /// Atomically advance the counter stored under `sequence_<name>` and
    /// return the new value. A single upsert statement, so concurrent callers
    /// never observe the same value.
    pub async fn increment_sequence(&self, name: &str) -> Result<i64> {
        let key = format!("sequence_{name}");
        let now = chrono::Utc::now().to_rfc3339();

        let sql = r"
            INSERT INTO config_entries
                (key, value, config_type, category, description,
                 is_public, is_editable, valid_from, created_at, updated_at)
            VALUES (?, '1', 'number', 'system', ?, FALSE, FALSE, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = CAST(CAST(config_entries.value AS INTEGER) + 1 AS TEXT),
                updated_at = excluded.updated_at
            RETURNING CAST(value AS INTEGER) AS value
        ";

        let stmt = Statement::from_sql_and_values(
            self.conn.get_database_backend(),
            sql,
            [
                key.clone().into(),
                format!("Auto-managed counter: {name}").into(),
                now.clone().into(),
                now.clone().into(),
                now.into(),
            ],
        );

        let row = self
            .conn
            .query_one(stmt)
            .await
            .context("Failed to increment sequence")?
            .ok_or_else(|| anyhow::anyhow!("Sequence increment returned no row: {key}"))?;

        let value: i64 = row
            .try_get("", "value")
            .context("Failed to read incremented sequence value")?;

        Ok(value)
    }

    /// Seed the default catalog. Existing keys are left untouched, customized
    /// or not. Returns the number of entries created.
    pub async fn initialize_defaults(&self, updated_by: Option<i32>) -> Result<usize> {
        let now = chrono::Utc::now().to_rfc3339();
        let mut created = 0;

        for default in default_catalog() {
            let value_text = serde_json::to_string(&default.value)
                .context("Failed to serialize default config value")?;

            let active = config_entries::ActiveModel {
                key: Set(default.key.to_string()),
                value: Set(value_text),
                config_type: Set(default.config_type.to_string()),
                category: Set(default.category.to_string()),
                description: Set(Some(default.description.to_string())),
                is_public: Set(default.is_public),
                is_editable: Set(default.is_editable),
                updated_by: Set(updated_by),
                valid_from: Set(now.clone()),
                valid_to: Set(None),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            };

            let result = config_entries::Entity::insert(active)
                .on_conflict(
                    OnConflict::column(config_entries::Column::Key)
                        .do_nothing()
                        .to_owned(),
                )
                .exec(&self.conn)
                .await;

            match result {
                Ok(_) => created += 1,
                Err(DbErr::RecordNotInserted) => {}
                Err(e) => return Err(e).context("Failed to seed default config entry"),
            }
        }

        Ok(created)
    }
}

/// The stored payload as written, without coercion. Category maps and entry
/// listings expose this; only single-value reads interpret the type.
#[must_use]
pub fn raw_value(entry: &config_entries::Model) -> Value {
    serde_json::from_str(&entry.value).unwrap_or_else(|_| Value::String(entry.value.clone()))
}

/// Re-interpret the stored payload through its declared type.
#[must_use]
pub fn typed_value(entry: &config_entries::Model) -> Value {
    let config_type = entry
        .config_type
        .parse::<ConfigType>()
        .unwrap_or(ConfigType::String);

    coerce(config_type, &raw_value(entry))
}

/// RFC3339 strings compare lexicographically, so the window check stays in SQL.
fn active_condition(now: &str) -> Condition {
    Condition::all()
        .add(config_entries::Column::ValidFrom.lte(now))
        .add(
            Condition::any()
                .add(config_entries::Column::ValidTo.is_null())
                .add(config_entries::Column::ValidTo.gte(now)),
        )
}

fn is_active(entry: &config_entries::Model) -> bool {
    let now = chrono::Utc::now().to_rfc3339();
    entry.valid_from.as_str() <= now.as_str()
        && entry.valid_to.as_deref().is_none_or(|t| t >= now.as_str())
}

fn default_catalog() -> Vec<DefaultEntry> {
    use serde_json::json;

    vec![
        DefaultEntry {
            key: "app_name",
            value: json!("Employee Management System"),
            config_type: ConfigType::String,
            category: "general",
            description: "Application display name",
            is_public: true,
            is_editable: true,
        },
        DefaultEntry {
            key: "company_name",
            value: json!("My Company"),
            config_type: ConfigType::String,
            category: "general",
            description: "Company name shown across the UI",
            is_public: true,
            is_editable: true,
        },
        DefaultEntry {
            key: "employee_id_prefix",
            value: json!("EMP"),
            config_type: ConfigType::String,
            category: "employee",
            description: "Prefix for generated employee codes",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "default_currency",
            value: json!("USD"),
            config_type: ConfigType::String,
            category: "general",
            description: "Currency used for salary display",
            is_public: true,
            is_editable: true,
        },
        DefaultEntry {
            key: "max_file_size_mb",
            value: json!(5),
            config_type: ConfigType::Number,
            category: "system",
            description: "Maximum upload size in megabytes",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "available_roles",
            value: json!(["admin", "user", "manager", "hr"]),
            config_type: ConfigType::Array,
            category: "roles",
            description: "Roles assignable to user accounts",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "role_admin_permissions",
            value: json!(["all"]),
            config_type: ConfigType::Array,
            category: "roles",
            description: "Permissions granted to the admin role",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "role_employee_permissions",
            value: json!(["view_profile", "edit_profile"]),
            config_type: ConfigType::Array,
            category: "roles",
            description: "Permissions granted to the employee role",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "available_designations",
            value: json!([
                "Software Engineer",
                "Senior Software Engineer",
                "Team Lead",
                "Manager",
                "Director"
            ]),
            config_type: ConfigType::Array,
            category: "employee",
            description: "Positions offered when creating employees",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "available_departments",
            value: json!([
                "Engineering",
                "Human Resources",
                "Sales",
                "Marketing",
                "Finance",
                "Operations"
            ]),
            config_type: ConfigType::Array,
            category: "employee",
            description: "Departments offered when creating employees",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "default_page_size",
            value: json!(10),
            config_type: ConfigType::Number,
            category: "system",
            description: "Default page size for list endpoints",
            is_public: true,
            is_editable: true,
        },
        DefaultEntry {
            key: "max_page_size",
            value: json!(100),
            config_type: ConfigType::Number,
            category: "system",
            description: "Upper bound for requested page sizes",
            is_public: false,
            is_editable: true,
        },
        DefaultEntry {
            key: "sequence_employee_sequence",
            value: json!(1000),
            config_type: ConfigType::Number,
            category: "system",
            description: "Auto-managed counter: employee_sequence",
            is_public: false,
            is_editable: false,
        },
    ]
}
