use clap::Parser;
use form_submissions_api::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::serve::run().await,
        Command::Keys(command) => cli::keys::run(command).await,
        Command::Migrate(args) => cli::migrate::run(args).await,
    }
}
