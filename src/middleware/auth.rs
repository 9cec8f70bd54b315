use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Claims supplied by the external token issuer. The core trusts `sub` and
/// `role` as given, after applying the configured role policy.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Unauthorized(format!(
            "this action requires the {role} role"
        )));
    }
    Ok(())
}

pub fn ensure_student(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "student")
}

pub fn ensure_vendor(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, "vendor")
}

pub fn ensure_vendor_or_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.role == "vendor" || user.role == "admin" {
        return Ok(());
    }
    Err(AppError::Unauthorized(
        "this action requires the vendor or admin role".to_string(),
    ))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        // Operator-configured roles win over whatever the token claims.
        let role = state
            .config
            .role_policy
            .get(&user_id)
            .cloned()
            .unwrap_or(decoded.claims.role);

        Ok(AuthUser { user_id, role })
    }
}
