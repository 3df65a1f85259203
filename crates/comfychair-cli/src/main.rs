//! CLI entry point.
//!
//! Loads `.env`, parses arguments, installs logging and dispatches to
//! handlers. Errors are printed once here and mapped to exit codes.

use clap::{CommandFactory, Parser};
use comfychair_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};
use comfychair_core::LaunchMode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command.as_ref() else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_cli(&cli)?;

    // Diagnostics must work even when the config file is missing
    if matches!(command, Commands::Paths) {
        return handlers::paths::execute(&config);
    }

    let ctx = bootstrap(config)?;

    match command {
        Commands::Start => handlers::start::execute(&ctx, LaunchMode::Foreground).await,
        Commands::Background => handlers::start::execute(&ctx, LaunchMode::Background).await,
        Commands::Stop => handlers::stop::execute(&ctx).await,
        Commands::Restart => handlers::restart::execute(&ctx).await,
        Commands::Status { json } => handlers::status::execute(&ctx, *json).await,
        Commands::Envs { json } => handlers::envs::execute(&ctx.environments, *json),
        Commands::Paths => handlers::paths::execute(&ctx.config),
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables (WORKING_COMFY_ENV may come from .env)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
}
