pub mod config;
pub mod employee;
pub mod user;
