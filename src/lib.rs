//! Form Submissions API
//!
//! Read access to stored form submissions behind scoped API keys:
//! - API keys restricted to a set of forms, or to every form
//! - Submission listing with inclusive date windows
//! - Field labels merged from the form schema and the submissions
//! - PDF export with embedded images

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::{info, warn};

use api::state::AppState;
use domain::form::FormSchemaProvider;
use domain::storage::StoredOption;
use domain::submission::SubmissionSource;
use infrastructure::{
    api_key::{ApiKeyService, OptionApiKeyStore},
    export::{ExportRenderer, FieldLabelResolver, ReqwestImageFetcher, ScratchSpace},
    fixtures::FixtureSet,
    form::{InMemoryFormSchemaProvider, PostgresFormSchemaProvider},
    services::SubmissionReader,
    storage::{StorageBackend, StorageFactory, OPTIONS_TABLE},
    submission::{InMemorySubmissionSource, PostgresSubmissionSource},
};

/// Connect the configured storage backend
pub async fn connect_storage(config: &AppConfig) -> anyhow::Result<StorageBackend> {
    let storage_config = config.storage.to_storage_config()?;
    let backend = StorageFactory::connect(&storage_config).await?;

    info!(storage = ?storage_config.storage_type(), "Storage backend connected");

    Ok(backend)
}

/// Authorization gate over the option-backed key store
pub async fn create_api_key_service(backend: &StorageBackend) -> anyhow::Result<ApiKeyService> {
    let options = StorageFactory::create::<StoredOption>(backend, OPTIONS_TABLE).await?;

    Ok(ApiKeyService::new(Arc::new(OptionApiKeyStore::new(options))))
}

/// Submission source and schema provider for the backend
///
/// The in-memory backend is seeded from the fixture file when one is
/// configured.
pub async fn create_sources(
    config: &AppConfig,
    backend: &StorageBackend,
) -> anyhow::Result<(Arc<dyn SubmissionSource>, Arc<dyn FormSchemaProvider>)> {
    match backend {
        StorageBackend::Postgres(pool) => {
            if config.fixtures.path.is_some() {
                warn!("Fixtures are ignored with PostgreSQL storage");
            }

            Ok((
                Arc::new(PostgresSubmissionSource::new(pool.clone())),
                Arc::new(PostgresFormSchemaProvider::new(pool.clone())),
            ))
        }
        StorageBackend::InMemory => {
            let Some(path) = &config.fixtures.path else {
                return Ok((
                    Arc::new(InMemorySubmissionSource::new()),
                    Arc::new(InMemoryFormSchemaProvider::new()),
                ));
            };

            let (submissions, schemas) = FixtureSet::load(path).await?.into_sources()?;

            Ok((Arc::new(submissions), Arc::new(schemas)))
        }
    }
}

/// Create the application state with all services initialized
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let backend = connect_storage(config).await?;
    let api_key_service = create_api_key_service(&backend).await?;
    let (submissions, schemas) = create_sources(config, &backend).await?;

    let fetcher = ReqwestImageFetcher::new(config.export.image_fetch_timeout())?;
    let renderer = ExportRenderer::new(
        FieldLabelResolver::new(schemas.clone()),
        Arc::new(fetcher),
        ScratchSpace::new(config.export.scratch_dir.clone()),
    );

    let state = AppState::new(
        Arc::new(api_key_service),
        Arc::new(SubmissionReader::new(submissions)),
        schemas,
        Arc::new(renderer),
    )
    .with_admin_token(config.admin.token());

    if state.admin_enabled() {
        info!("Admin API enabled");
    }

    Ok(state)
}
