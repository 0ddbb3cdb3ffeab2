// Turnstile - Entry point
// Principle: Configuration errors are fatal, rejections are reported

use clap::Parser;
use quantum_turnstile::cli::runner::{
    check_config, classify_script, ensure_accepted, export_params, validate_tx,
};
use quantum_turnstile::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_filter = if cli.verbose {
        "debug"
    } else {
        &cli.log_level
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .init();

    // Execute command
    let outcome = match cli.command {
        Commands::CheckConfig(cmd) => check_config(&cmd),
        Commands::ExportParams(cmd) => export_params(&cmd),
        Commands::ValidateTx(cmd) => match validate_tx(cmd).await {
            Ok(result) => ensure_accepted(&result),
            Err(e) => Err(e),
        },
        Commands::Classify(cmd) => classify_script(&cmd).map(|_| ()),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        return Err(anyhow::anyhow!(e));
    }
    Ok(())
}
