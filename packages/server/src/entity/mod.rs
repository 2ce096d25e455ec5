pub mod auth_token;
pub mod client_profile;
pub mod email_preferences;
pub mod project;
pub mod project_file;
pub mod project_milestone;
pub mod project_update;
pub mod ticket;
pub mod ticket_comment;
pub mod user;
