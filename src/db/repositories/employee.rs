use anyhow::{Context, Result};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::employees::{self, EmployeeStatus};

pub const DEFAULT_PROFILE_IMAGE: &str = "default-avatar.png";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl Address {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip_code.is_none()
            && self.country.is_none()
    }
}

/// Input for creating an employee. Status is always forced to active.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub department: String,
    pub position: String,
    pub salary: f64,
    pub employment_type: Option<String>,
    pub date_of_joining: Option<String>,
    pub address: Option<Address>,
    pub profile_image: Option<String>,
    pub created_by: Option<i32>,
}

/// Partial update; absent fields are left untouched. A provided address is
/// merged field-wise into the stored one rather than replacing it.
#[derive(Debug, Clone, Default)]
pub struct EmployeeChanges {
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
    pub status: Option<EmployeeStatus>,
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub show_deleted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total_employees: i64,
    pub total_salary: f64,
    pub avg_salary: f64,
    pub by_department: Vec<DepartmentStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department: String,
    pub count: i64,
    pub avg_salary: f64,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_employees: i64,
    total_salary: Option<f64>,
    avg_salary: Option<f64>,
}

pub struct EmployeeRepository {
    conn: DatabaseConnection,
}

impl EmployeeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: NewEmployee) -> Result<employees::Model> {
        let now = chrono::Utc::now().to_rfc3339();
        let address = input.address.unwrap_or_default();

        let active = employees::ActiveModel {
            employee_code: Set(input.employee_code),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email.to_lowercase()),
            phone: Set(input.phone),
            department: Set(input.department),
            position: Set(input.position),
            salary: Set(input.salary),
            employment_type: Set(input.employment_type),
            date_of_joining: Set(input.date_of_joining.unwrap_or_else(|| now.clone())),
            address_street: Set(address.street),
            address_city: Set(address.city),
            address_state: Set(address.state),
            address_zip: Set(address.zip_code),
            address_country: Set(address.country),
            status: Set(EmployeeStatus::Active),
            deleted_at: Set(None),
            profile_image: Set(input
                .profile_image
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string())),
            created_by: Set(input.created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert employee")?;

        Ok(model)
    }

    pub async fn get(&self, id: i32) -> Result<Option<employees::Model>> {
        let employee = employees::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query employee by ID")?;

        Ok(employee)
    }

    /// True if a non-deleted employee other than `exclude_id` holds the email.
    pub async fn email_in_use(&self, email: &str, exclude_id: Option<i32>) -> Result<bool> {
        let mut query = employees::Entity::find()
            .filter(employees::Column::Email.eq(email.to_lowercase()))
            .filter(employees::Column::Status.ne(EmployeeStatus::Deleted));

        if let Some(id) = exclude_id {
            query = query.filter(employees::Column::Id.ne(id));
        }

        let count = query
            .count(&self.conn)
            .await
            .context("Failed to count employees by email")?;

        Ok(count > 0)
    }

    pub async fn list(
        &self,
        filter: &EmployeeFilter,
        page: u64,
        limit: u64,
        sort_by: Option<&str>,
        descending: bool,
    ) -> Result<(Vec<employees::Model>, u64)> {
        let mut query = employees::Entity::find();

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                sea_orm::Condition::any()
                    .add(employees::Column::FirstName.contains(search))
                    .add(employees::Column::LastName.contains(search))
                    .add(employees::Column::Email.contains(search)),
            );
        }

        if let Some(department) = filter.department.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(employees::Column::Department.eq(department));
        }

        if let Some(position) = filter.position.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(employees::Column::Position.eq(position));
        }

        // Soft-deleted rows are hidden from listings unless asked for
        if let Some(status) = filter.status {
            query = query.filter(employees::Column::Status.eq(status));
        } else if !filter.show_deleted {
            query = query.filter(employees::Column::Status.ne(EmployeeStatus::Deleted));
        }

        let sort_column = sort_by.map_or(employees::Column::CreatedAt, sortable_column);
        query = if descending {
            query.order_by_desc(sort_column)
        } else {
            query.order_by_asc(sort_column)
        };

        let paginator = query.paginate(&self.conn, limit.max(1));
        let total = paginator
            .num_items()
            .await
            .context("Failed to count employees")?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .context("Failed to fetch employee page")?;

        Ok((items, total))
    }

    pub async fn update(
        &self,
        id: i32,
        changes: EmployeeChanges,
    ) -> Result<Option<employees::Model>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: employees::ActiveModel = current.clone().into();

        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.email {
            active.email = Set(v.to_lowercase());
        }
        if let Some(v) = changes.phone {
            active.phone = Set(Some(v));
        }
        if let Some(v) = changes.department {
            active.department = Set(v);
        }
        if let Some(v) = changes.position {
            active.position = Set(v);
        }
        if let Some(v) = changes.salary {
            active.salary = Set(v);
        }
        if let Some(v) = changes.employment_type {
            active.employment_type = Set(Some(v));
        }
        if let Some(v) = changes.date_of_joining {
            active.date_of_joining = Set(v);
        }
        if let Some(v) = changes.status {
            active.status = Set(v);
        }
        if let Some(v) = changes.profile_image {
            active.profile_image = Set(v);
        }

        // Partial address updates merge with what is already stored
        if let Some(patch) = changes.address {
            if let Some(v) = patch.street {
                active.address_street = Set(Some(v));
            }
            if let Some(v) = patch.city {
                active.address_city = Set(Some(v));
            }
            if let Some(v) = patch.state {
                active.address_state = Set(Some(v));
            }
            if let Some(v) = patch.zip_code {
                active.address_zip = Set(Some(v));
            }
            if let Some(v) = patch.country {
                active.address_country = Set(Some(v));
            }
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update employee")?;

        Ok(Some(model))
    }

    pub async fn soft_delete(&self, id: i32) -> Result<Option<employees::Model>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        let now = chrono::Utc::now().to_rfc3339();

        let mut active: employees::ActiveModel = current.into();
        active.status = Set(EmployeeStatus::Deleted);
        active.deleted_at = Set(Some(now.clone()));
        active.updated_at = Set(now);

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to soft-delete employee")?;

        Ok(Some(model))
    }

    /// Restore always lands on active, regardless of the pre-delete status.
    pub async fn restore(&self, id: i32) -> Result<Option<employees::Model>> {
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: employees::ActiveModel = current.into();
        active.status = Set(EmployeeStatus::Active);
        active.deleted_at = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to restore employee")?;

        Ok(Some(model))
    }

    pub async fn hard_delete(&self, id: i32) -> Result<bool> {
        let result = employees::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete employee")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn distinct_positions(&self) -> Result<Vec<String>> {
        let mut positions: Vec<String> = employees::Entity::find()
            .select_only()
            .column(employees::Column::Position)
            .filter(employees::Column::Status.ne(EmployeeStatus::Deleted))
            .distinct()
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to query distinct positions")?;

        positions.retain(|p| !p.is_empty());
        positions.sort();
        Ok(positions)
    }

    /// Headcount and salary aggregates over non-deleted employees,
    /// per-department groups sorted by descending count.
    pub async fn stats(&self) -> Result<EmployeeStats> {
        let totals = employees::Entity::find()
            .select_only()
            .expr_as(
                Func::count(Expr::col(employees::Column::Id)),
                "total_employees",
            )
            .expr_as(Func::sum(Expr::col(employees::Column::Salary)), "total_salary")
            .expr_as(Func::avg(Expr::col(employees::Column::Salary)), "avg_salary")
            .filter(employees::Column::Status.ne(EmployeeStatus::Deleted))
            .into_model::<TotalsRow>()
            .one(&self.conn)
            .await
            .context("Failed to aggregate employee totals")?
            .unwrap_or(TotalsRow {
                total_employees: 0,
                total_salary: None,
                avg_salary: None,
            });

        #[derive(FromQueryResult)]
        struct DeptRow {
            department: String,
            count: i64,
            avg_salary: Option<f64>,
        }

        let dept_rows = employees::Entity::find()
            .select_only()
            .column(employees::Column::Department)
            .expr_as(Func::count(Expr::col(employees::Column::Id)), "count")
            .expr_as(Func::avg(Expr::col(employees::Column::Salary)), "avg_salary")
            .filter(employees::Column::Status.ne(EmployeeStatus::Deleted))
            .group_by(employees::Column::Department)
            .into_model::<DeptRow>()
            .all(&self.conn)
            .await
            .context("Failed to aggregate per-department stats")?;

        let mut by_department: Vec<DepartmentStats> = dept_rows
            .into_iter()
            .map(|row| DepartmentStats {
                department: row.department,
                count: row.count,
                avg_salary: round2(row.avg_salary.unwrap_or(0.0)),
            })
            .collect();
        by_department.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(EmployeeStats {
            total_employees: totals.total_employees,
            total_salary: totals.total_salary.unwrap_or(0.0),
            avg_salary: round2(totals.avg_salary.unwrap_or(0.0)),
            by_department,
        })
    }
}

fn sortable_column(name: &str) -> employees::Column {
    match name {
        "firstName" | "first_name" => employees::Column::FirstName,
        "lastName" | "last_name" => employees::Column::LastName,
        "email" => employees::Column::Email,
        "department" => employees::Column::Department,
        "position" => employees::Column::Position,
        "salary" => employees::Column::Salary,
        "dateOfJoining" | "date_of_joining" => employees::Column::DateOfJoining,
        "status" => employees::Column::Status,
        _ => employees::Column::CreatedAt,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
