pub mod prelude;

pub mod config_entries;
pub mod employees;
pub mod users;
