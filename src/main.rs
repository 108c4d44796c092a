//! guactoken - remote-desktop gateway token issuer
//!
#![doc = "guactoken - remote-desktop gateway token issuer"]
#![doc = "Main entry point for the guactoken command-line tool."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use guactoken::cli::{Cli, Commands};
use guactoken::commands;
use guactoken::config::{Config, DEFAULT_CONFIG_PATH};

fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Key generation needs no configuration
    if let Commands::Keygen { bytes } = cli.command {
        tracing::info!("Generating {}-byte shared secret", bytes);
        return commands::keygen::run_keygen(bytes);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;
    tracing::debug!(scheme = %config.token.scheme, "Configuration loaded");

    // Execute command
    match cli.command {
        Commands::Issue {
            name,
            hostname,
            port,
            protocol,
            params,
            json,
        } => {
            tracing::info!("Issuing token for session: {}", name);
            let args = commands::issue::IssueArgs {
                name,
                hostname,
                port,
                protocol,
                params,
                json,
            };
            commands::issue::run_issue(&config, args)
        }
        Commands::Verify { token } => {
            tracing::info!("Verifying token");
            commands::verify::run_verify(&config, &token)
        }
        Commands::Keygen { bytes } => commands::keygen::run_keygen(bytes),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays machine readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "guactoken=debug"
    } else {
        "guactoken=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
