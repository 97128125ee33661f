//! Keys command - API key management from the command line

use clap::{Args, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::domain::api_key::ApiKeyScope;
use crate::domain::submission::SUBMITTED_AT_FORMAT;
use crate::infrastructure::api_key::ApiKeyService;
use crate::infrastructure::logging;
use crate::infrastructure::storage::StorageBackend;

#[derive(Subcommand)]
pub enum KeysCommand {
    /// Issue a new API key
    Issue(IssueArgs),

    /// Revoke an API key; unknown keys are ignored
    Revoke { token: String },

    /// List issued API keys
    List,
}

#[derive(Args)]
pub struct IssueArgs {
    /// Comma separated form ids, or `all`
    #[arg(long, value_delimiter = ',', default_value = "all")]
    pub forms: Vec<String>,
}

/// Run a keys subcommand against the configured storage
pub async fn run(command: KeysCommand) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_cli_logging();

    let config = AppConfig::load()?;
    let backend = crate::connect_storage(&config).await?;

    if matches!(backend, StorageBackend::InMemory) {
        warn!("In-memory storage is not persisted; keys are lost when this command exits");
    }

    let service = crate::create_api_key_service(&backend).await?;

    for line in execute(&service, command).await? {
        println!("{}", line);
    }

    Ok(())
}

/// Output lines of a keys subcommand
async fn execute(service: &ApiKeyService, command: KeysCommand) -> anyhow::Result<Vec<String>> {
    match command {
        KeysCommand::Issue(args) => {
            let scope = ApiKeyScope::from_entries(&args.forms);
            if scope.is_empty() {
                anyhow::bail!("--forms must list at least one form id or `all`");
            }

            let issued = service.issue(scope).await?;

            Ok(vec![
                issued.token.as_str().to_string(),
                format!("forms: {}", issued.record.scope().entries().join(",")),
            ])
        }
        KeysCommand::Revoke { token } => {
            let line = if service.revoke(&token).await? {
                "revoked"
            } else {
                "not found"
            };
            Ok(vec![line.to_string()])
        }
        KeysCommand::List => {
            let keys = service.list().await?;

            if keys.is_empty() {
                return Ok(vec!["no API keys".to_string()]);
            }

            Ok(keys
                .iter()
                .map(|(token, record)| {
                    format!(
                        "{}  {}  {}",
                        token.as_str(),
                        record.created_at().format(SUBMITTED_AT_FORMAT),
                        record.scope().entries().join(",")
                    )
                })
                .collect())
        }
    }
}
