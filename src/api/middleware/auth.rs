//! API key authentication extractors

use axum::{
    extract::{FromRequestParts, Path},
    http::{header, request::Parts, HeaderMap},
};
use serde::Deserialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::api_key::{AccessError, ApiKeyRecord};
use crate::domain::submission::FormId;

const BEARER_SCHEME: &str = "bearer";

#[derive(Debug, Deserialize)]
struct FormPathParams {
    form_id: String,
}

/// Extractor for routes under `/form/{form_id}`
///
/// The token is authenticated first, then checked against the raw path
/// segment, and only then is the segment parsed as a form id. A request
/// that fails any step never reaches the handler.
#[derive(Debug, Clone)]
pub struct FormAccess {
    pub form_id: FormId,
    pub record: ApiKeyRecord,
}

impl FromRequestParts<AppState> for FormAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        let Ok(Path(params)) = Path::<FormPathParams>::from_request_parts(parts, state).await
        else {
            state.api_key_service.authenticate(&token).await?;
            return Err(form_not_found(""));
        };

        let record = state
            .api_key_service
            .check(&token, &params.form_id)
            .await?;

        let form_id = params
            .form_id
            .parse::<FormId>()
            .map_err(|_| form_not_found(&params.form_id))?;

        debug!(form_id = %form_id, "Form access granted");

        Ok(FormAccess { form_id, record })
    }
}

fn form_not_found(raw: &str) -> ApiError {
    ApiError::not_found(format!("Form '{}' not found", raw))
        .with_param("form_id")
        .with_code("form_not_found")
}

/// Token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively and the token is trimmed. A
/// missing, undecodable, non-bearer or empty header is a missing key.
pub fn bearer_token(headers: &HeaderMap) -> Result<String, AccessError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AccessError::MissingKey)?
        .to_str()
        .map_err(|_| AccessError::MissingKey)?
        .trim();

    let (scheme, token) = value.split_once(' ').ok_or(AccessError::MissingKey)?;

    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AccessError::MissingKey);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AccessError::MissingKey);
    }

    Ok(token.to_string())
}
