//! API key management admin endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::api_key::{ApiKeyRecord, ApiKeyScope, ApiToken};
use crate::domain::submission::SUBMITTED_AT_FORMAT;

/// Request to issue a new API key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateApiKeyRequest {
    /// Form ids, or `["all"]`; omitted means every form
    #[serde(default)]
    pub forms: Option<Vec<String>>,
}

impl CreateApiKeyRequest {
    fn scope(&self) -> Result<ApiKeyScope, ApiError> {
        let Some(forms) = &self.forms else {
            return Ok(ApiKeyScope::All);
        };

        let scope = ApiKeyScope::from_entries(forms);
        if scope.is_empty() {
            return Err(ApiError::bad_request("forms must list at least one form id or \"all\"")
                .with_param("forms")
                .with_code("invalid_scope"));
        }

        Ok(scope)
    }
}

/// API key as shown to administrators
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub token: String,
    pub forms: Vec<String>,
    pub created: String,
}

impl ApiKeyResponse {
    fn new(token: &ApiToken, record: &ApiKeyRecord) -> Self {
        Self {
            token: token.as_str().to_string(),
            forms: record.scope().entries(),
            created: record.created_at().format(SUBMITTED_AT_FORMAT).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeyResponse>,
}

/// `GET /admin/api-keys`
pub async fn list_api_keys(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    let keys = state.api_key_service.list().await?;

    Ok(Json(ListApiKeysResponse {
        api_keys: keys
            .iter()
            .map(|(token, record)| ApiKeyResponse::new(token, record))
            .collect(),
    }))
}

/// `POST /admin/api-keys`
pub async fn create_api_key(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), ApiError> {
    let scope = request.scope()?;
    let issued = state.api_key_service.issue(scope).await?;

    info!(key = %issued.token.fingerprint(), "API key issued via admin API");

    Ok((
        StatusCode::CREATED,
        Json(ApiKeyResponse::new(&issued.token, &issued.record)),
    ))
}

/// `DELETE /admin/api-keys/{token}`; absent keys are not an error
pub async fn delete_api_key(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api_key_service.revoke(&token).await?;

    Ok(StatusCode::NO_CONTENT)
}
