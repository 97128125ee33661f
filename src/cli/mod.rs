//! CLI module for the Form Submissions API
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `keys`: issue, revoke and list API keys
//! - `migrate`: apply or revert PostgreSQL migrations

pub mod keys;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Form Submissions API - scoped access and document export for form submissions
#[derive(Parser)]
#[command(name = "form-submissions-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Manage API keys
    #[command(subcommand)]
    Keys(keys::KeysCommand),

    /// Apply pending database migrations
    Migrate(migrate::MigrateArgs),
}
