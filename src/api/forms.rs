//! Form submission endpoints

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::debug;

use crate::api::middleware::FormAccess;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::export::{DocumentBody, ExportFormat, ExportOutput};
use crate::domain::form::FieldDefinition;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Query parameters of the submissions endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionsQuery {
    pub begin_date: Option<String>,
    pub end_date: Option<String>,
    pub format: Option<String>,
}

/// `GET /form/{form_id}/submissions`, also served at `/form/{form_id}`
pub async fn list_submissions(
    State(state): State<AppState>,
    access: FormAccess,
    Query(query): Query<SubmissionsQuery>,
) -> Result<Response, ApiError> {
    let begin_date = parse_date("begin_date", query.begin_date.as_deref())?;
    let end_date = parse_date("end_date", query.end_date.as_deref())?;
    let format = ExportFormat::from_param(query.format.as_deref());

    debug!(
        form_id = %access.form_id,
        begin = ?begin_date,
        end = ?end_date,
        format = %format,
        "Listing submissions"
    );

    let submissions = state
        .submission_reader
        .list(access.form_id, begin_date, end_date)
        .await?;

    let output = state
        .export_renderer
        .render(access.form_id, submissions, format)
        .await?;

    Ok(export_response(output))
}

/// `GET /form/{form_id}/fields`
pub async fn list_fields(
    State(state): State<AppState>,
    access: FormAccess,
) -> Result<Json<Vec<FieldDefinition>>, ApiError> {
    let fields = state.form_schemas.fields(access.form_id).await?;

    Ok(Json(fields))
}

/// Optional `YYYY-MM-DD` date; empty means omitted
fn parse_date(param: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|_| {
            ApiError::bad_request(format!("Invalid {} '{}': expected YYYY-MM-DD", param, raw))
                .with_param(param)
                .with_code("invalid_date")
        })
}

fn export_response(output: ExportOutput) -> Response {
    match output {
        ExportOutput::Structured(submissions) => Json(submissions).into_response(),
        ExportOutput::Document(body) => document_response(body),
    }
}

fn document_response(body: DocumentBody) -> Response {
    let disposition = format!("inline; filename=\"{}\"", body.file_name);

    let mut response = body.bytes.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(body.content_type),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("begin_date", Some("2024-01-10")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10)
        );
        assert_eq!(parse_date("begin_date", None).unwrap(), None);
        assert_eq!(parse_date("begin_date", Some("")).unwrap(), None);
    }

    #[test]
    fn test_parse_date_rejects_other_formats() {
        for raw in ["10/01/2024", "2024-13-01", "yesterday", "2024-01-10T00:00:00"] {
            let err = parse_date("end_date", Some(raw)).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.code(), Some("invalid_date"));
            assert_eq!(err.response.error.param.as_deref(), Some("end_date"));
        }
    }

    #[test]
    fn test_document_response_headers() {
        let response = document_response(DocumentBody::pdf(b"%PDF-1.4".to_vec()));

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"form-submissions.pdf\""
        );
    }
}
