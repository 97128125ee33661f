//! Admin authentication
//!
//! The admin API is guarded by a single static bearer token from
//! configuration.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::api_key::constant_time_compare;

use super::auth::bearer_token;

/// Extractor that requires the configured admin token
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            return Err(ApiError::not_found("Admin API is disabled"));
        };

        let presented = bearer_token(&parts.headers).map_err(|_| {
            ApiError::unauthorized("Admin token required").with_code("authentication_missing")
        })?;

        if !constant_time_compare(&presented, expected) {
            warn!("Rejected admin request with invalid token");
            return Err(ApiError::unauthorized("Invalid admin token").with_code("invalid_admin_token"));
        }

        Ok(RequireAdmin)
    }
}
