use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

use super::admin;
use super::forms;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::state::AppState;

/// Routes under `/form/{form_id}`
fn create_form_router() -> Router<AppState> {
    Router::new()
        .route("/{form_id}", get(forms::list_submissions))
        .route("/{form_id}/submissions", get(forms::list_submissions))
        .route("/{form_id}/fields", get(forms::list_fields))
}

/// Create the full router with application state
///
/// The admin API is mounted only when an admin token is configured.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/form", create_form_router());

    if state.admin_enabled() {
        router = router.nest("/admin", admin::create_admin_router());
    }

    let mut router = router
        .with_state(state)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(metrics) = metrics {
        router = router.merge(create_metrics_router(metrics));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::domain::api_key::ApiKeyScope;
    use crate::domain::form::FieldDefinition;
    use crate::domain::storage::StoredOption;
    use crate::domain::submission::{FormId, Submission};
    use crate::infrastructure::api_key::{ApiKeyService, OptionApiKeyStore};
    use crate::infrastructure::export::{
        ExportRenderer, FieldLabelResolver, ReqwestImageFetcher, ScratchSpace,
    };
    use crate::infrastructure::form::InMemoryFormSchemaProvider;
    use crate::infrastructure::services::SubmissionReader;
    use crate::infrastructure::storage::InMemoryStorage;
    use crate::infrastructure::submission::InMemorySubmissionSource;

    const ADMIN_TOKEN: &str = "admin-secret";

    fn form(id: u64) -> FormId {
        FormId::new(id).unwrap()
    }

    fn submission(id: u64, form_id: u64, day: u32) -> Submission {
        let at = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        Submission::new(id, form(form_id), at)
    }

    fn test_state(admin_token: Option<&str>) -> AppState {
        let storage = Arc::new(InMemoryStorage::<StoredOption>::new());
        let api_key_service = Arc::new(ApiKeyService::new(Arc::new(OptionApiKeyStore::new(
            storage,
        ))));

        let submissions = InMemorySubmissionSource::with_submissions(vec![
            submission(1, 5, 12).with_field("email", "late@example.com"),
            submission(2, 5, 10).with_field("email", "early@example.com"),
            submission(3, 6, 10).with_field("email", "other@example.com"),
        ]);

        let schemas = Arc::new(InMemoryFormSchemaProvider::new());
        schemas
            .set_fields(
                form(5),
                vec![FieldDefinition::new("email", "Email Address", "email")],
            )
            .unwrap();

        let renderer = ExportRenderer::new(
            FieldLabelResolver::new(schemas.clone()),
            Arc::new(ReqwestImageFetcher::new(None).unwrap()),
            ScratchSpace::default(),
        );

        AppState::new(
            api_key_service,
            Arc::new(SubmissionReader::new(Arc::new(submissions))),
            schemas,
            Arc::new(renderer),
        )
        .with_admin_token(admin_token)
    }

    async fn issue(state: &AppState, scope: ApiKeyScope) -> String {
        state
            .api_key_service
            .issue(scope)
            .await
            .unwrap()
            .token
            .as_str()
            .to_string()
    }

    async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>) -> Response {
        send_body(app, method, uri, token, None).await
    }

    async fn send_body(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        app.clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn error_code(response: Response) -> String {
        json_body(response).await["error"]["code"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn test_scope_then_revoke_end_to_end() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::forms(["5"])).await;
        let app = create_router(state.clone(), None);

        let response = send(&app, "GET", "/form/5/submissions", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let emails: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["fields"]["email"].as_str().unwrap())
            .collect();
        assert_eq!(emails, vec!["early@example.com", "late@example.com"]);

        let response = send(&app, "GET", "/form/6/submissions", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_code(response).await, "form_access_denied");

        state.api_key_service.revoke(&token).await.unwrap();

        let response = send(&app, "GET", "/form/5/submissions", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_api_key");
    }

    #[tokio::test]
    async fn test_missing_or_malformed_authorization() {
        let app = create_router(test_state(None), None);

        let response = send(&app, "GET", "/form/5/submissions", None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "authentication_missing");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/form/5/fields")
                    .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "authentication_missing");
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let app = create_router(test_state(None), None);

        let response = send(&app, "GET", "/form/5/submissions", Some("deadbeef")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(response).await, "invalid_api_key");
    }

    #[tokio::test]
    async fn test_legacy_route_alias() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::All).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/5?begin_date=2024-01-12", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], 1);
    }

    #[tokio::test]
    async fn test_non_numeric_form_id() {
        let state = test_state(None);
        let all = issue(&state, ApiKeyScope::All).await;
        let scoped = issue(&state, ApiKeyScope::forms(["5"])).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/abc/submissions", Some(&all)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_code(response).await, "form_not_found");

        let response = send(&app, "GET", "/form/abc/submissions", Some(&scoped)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_invalid_date_is_bad_request() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::All).await;
        let app = create_router(state, None);

        let response = send(
            &app,
            "GET",
            "/form/5/submissions?end_date=01-10-2024",
            Some(&token),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_date");
    }

    #[tokio::test]
    async fn test_tabular_format_is_not_implemented() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::All).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/5/submissions?format=xlsx", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(error_code(response).await, "format_not_implemented");
    }

    #[tokio::test]
    async fn test_document_format_returns_pdf() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::All).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/5/submissions?format=pdf", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"form-submissions.pdf\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_unknown_format_falls_back_to_json() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::All).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/5/submissions?format=docx", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await.is_array());
    }

    #[tokio::test]
    async fn test_fields_endpoint() {
        let state = test_state(None);
        let token = issue(&state, ApiKeyScope::forms(["5"])).await;
        let app = create_router(state, None);

        let response = send(&app, "GET", "/form/5/fields", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!([{"key": "email", "label": "Email Address", "type": "email"}])
        );
    }

    #[tokio::test]
    async fn test_health_endpoints_need_no_auth() {
        let app = create_router(test_state(None), None);

        assert_eq!(send(&app, "GET", "/health", None).await.status(), StatusCode::OK);
        assert_eq!(send(&app, "GET", "/live", None).await.status(), StatusCode::OK);

        let response = send(&app, "GET", "/ready", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["checks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_admin_api_disabled_without_token() {
        let app = create_router(test_state(None), None);

        let response = send(&app, "GET", "/admin/api-keys", Some(ADMIN_TOKEN)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_api_key_lifecycle() {
        let app = create_router(test_state(Some(ADMIN_TOKEN)), None);

        let response = send(&app, "GET", "/admin/api-keys", Some("wrong")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send_body(
            &app,
            "POST",
            "/admin/api-keys",
            Some(ADMIN_TOKEN),
            Some(r#"{"forms": ["5", "007"]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["forms"], serde_json::json!(["5", "7"]));
        let token = created["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 32);

        let response = send(&app, "GET", "/form/5/fields", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/admin/api-keys", Some(ADMIN_TOKEN)).await;
        let listed = json_body(response).await;
        assert_eq!(listed["api_keys"].as_array().unwrap().len(), 1);

        let uri = format!("/admin/api-keys/{}", token);
        let response = send(&app, "DELETE", &uri, Some(ADMIN_TOKEN)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = send(&app, "DELETE", &uri, Some(ADMIN_TOKEN)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", "/form/5/fields", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send_body(
            &app,
            "POST",
            "/admin/api-keys",
            Some(ADMIN_TOKEN),
            Some(r#"{"forms": ["", "  "]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(response).await, "invalid_scope");
    }

    #[tokio::test]
    async fn test_security_and_request_id_headers() {
        let app = create_router(test_state(None), None);

        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert!(response.headers().contains_key("x-request-id"));
    }
}
