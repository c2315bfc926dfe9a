//! Testforge CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use testforge::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => testforge::cli::commands::run::execute(args, cli.json).await,
        Commands::Locate(args) => testforge::cli::commands::locate::execute(args, cli.json).await,
    };

    if let Err(err) = result {
        testforge::cli::handle_error(err, cli.json);
    }
}
