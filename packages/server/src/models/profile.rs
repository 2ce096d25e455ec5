use serde::{Deserialize, Serialize};

use crate::entity::{client_profile, user};
use crate::error::AppError;

/// The caller's account and client profile, merged into one payload.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfilePayload {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    #[schema(example = "Acme Corp")]
    pub company_name: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
}

impl ProfilePayload {
    pub fn from_models(u: user::Model, p: client_profile::Model) -> Self {
        Self {
            user_id: u.id,
            username: u.username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            is_staff: u.is_staff,
            company_name: p.company_name,
            phone: p.phone,
            address: p.address,
            is_active: p.is_active,
        }
    }
}

/// Request body for partial profile updates.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub fn validate_update_profile(payload: &UpdateProfileRequest) -> Result<(), AppError> {
    if let Some(email) = &payload.email {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') || email.chars().count() > 254 {
            return Err(AppError::Validation(
                "A valid email address is required".into(),
            ));
        }
    }
    Ok(())
}
