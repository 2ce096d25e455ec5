use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::entity::{auth_token, client_profile, user};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Tokens are opaque database rows, so logout revokes them immediately.
/// Add this as a handler parameter to require authentication; ownership
/// checks happen in the handler body.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
}

impl AuthUser {
    /// Returns `Ok(())` for staff accounts, `Err(PermissionDenied)` otherwise.
    pub fn require_staff(&self) -> Result<(), AppError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let key = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let token = auth_token::Entity::find_by_id(key.to_string())
            .one(&state.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        let user = user::Entity::find_by_id(token.user_id)
            .one(&state.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        // A disabled client profile suspends portal access without
        // deleting the account or its token.
        if !user.is_staff {
            let disabled = client_profile::Entity::find()
                .filter(client_profile::Column::UserId.eq(user.id))
                .filter(client_profile::Column::IsActive.eq(false))
                .one(&state.db)
                .await?
                .is_some();
            if disabled {
                return Err(AppError::TokenInvalid);
            }
        }

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
        })
    }
}
