pub use super::config_entries::Entity as ConfigEntries;
pub use super::employees::Entity as Employees;
pub use super::users::Entity as Users;
