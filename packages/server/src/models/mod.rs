pub mod auth;
pub mod dashboard;
pub mod file;
pub mod preferences;
pub mod profile;
pub mod project;
pub mod shared;
pub mod ticket;
