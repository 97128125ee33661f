//! Application state for shared services

use std::sync::Arc;

use crate::domain::form::FormSchemaProvider;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::export::ExportRenderer;
use crate::infrastructure::services::SubmissionReader;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub api_key_service: Arc<ApiKeyService>,
    pub submission_reader: Arc<SubmissionReader>,
    pub form_schemas: Arc<dyn FormSchemaProvider>,
    pub export_renderer: Arc<ExportRenderer>,
    /// Bearer token of the admin API; `None` disables it
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(
        api_key_service: Arc<ApiKeyService>,
        submission_reader: Arc<SubmissionReader>,
        form_schemas: Arc<dyn FormSchemaProvider>,
        export_renderer: Arc<ExportRenderer>,
    ) -> Self {
        Self {
            api_key_service,
            submission_reader,
            form_schemas,
            export_renderer,
            admin_token: None,
        }
    }

    pub fn with_admin_token(mut self, token: Option<&str>) -> Self {
        self.admin_token = token.map(Arc::from);
        self
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_token.is_some()
    }
}
