use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Request body for client registration.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "acme_corp")]
    pub username: String,
    /// Contact email, also unique.
    #[schema(example = "owner@acme.example")]
    pub email: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// Must match `password`.
    #[schema(example = "s3cure_P@ss!")]
    pub password_confirm: String,
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[schema(example = "Lovelace")]
    pub last_name: Option<String>,
    /// Company name stored on the client profile.
    #[schema(example = "Acme Corp")]
    pub company_name: Option<String>,
    pub phone: Option<String>,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    let email = payload.email.trim();
    if email.is_empty() || !email.contains('@') || email.chars().count() > 254 {
        return Err(AppError::Validation(
            "A valid email address is required".into(),
        ));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    if payload.password != payload.password_confirm {
        return Err(AppError::Validation("Passwords do not match".into()));
    }
    Ok(())
}

/// Request body for login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username of the account to log into.
    #[schema(example = "acme_corp")]
    pub username: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Public representation of an account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserPayload {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "acme_corp")]
    pub username: String,
    #[schema(example = "owner@acme.example")]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Staff accounts have full portal visibility.
    pub is_staff: bool,
}

impl From<user::Model> for UserPayload {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

/// Successful register/login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// Opaque bearer token. Revoked by `POST /auth/logout`.
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
    pub user: UserPayload,
}
