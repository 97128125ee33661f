//! Migrate command - PostgreSQL schema management

use clap::Args;

use crate::config::AppConfig;
use crate::infrastructure::logging;
use crate::infrastructure::storage::{
    revert_last_storage_migration, run_storage_migrations, PostgresMigrator, StorageConfig,
};

#[derive(Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration
    #[arg(long, conflicts_with = "status")]
    pub revert: bool,

    /// Show applied migration versions without changing anything
    #[arg(long)]
    pub status: bool,
}

/// Run migrations against the configured PostgreSQL database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_cli_logging();

    let config = AppConfig::load()?;
    let StorageConfig::Postgres(pg_config) = config.storage.to_storage_config()? else {
        anyhow::bail!("migrate requires storage.type = postgres");
    };

    let pool = pg_config.connect().await?;

    if args.status {
        let applied = PostgresMigrator::new(pool).applied_versions().await?;
        println!("applied: {:?}", applied);
        return Ok(());
    }

    let version = if args.revert {
        revert_last_storage_migration(&pool).await?
    } else {
        run_storage_migrations(&pool).await?
    };

    match version {
        Some(version) => println!("schema version: {}", version),
        None => println!("schema version: none"),
    }

    Ok(())
}
