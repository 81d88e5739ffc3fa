use clap::Parser;
use notebook_ingest::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Ingest(args) => cli::ingest::run(args).await,
        Command::Detect(args) => cli::detect::run(args).await,
        Command::Chunks(command) => cli::chunks::run(command).await,
        Command::Migrate(args) => cli::migrate::run(args).await,
    }
}
