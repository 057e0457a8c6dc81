//! Quai agent - send and receive native QUAI from an agent wallet
//!
//! # WARNING
//! - `send` moves real funds. Double-check the recipient before confirming.
//! - The wallet file holds an unencrypted private key. Keep it private and backed up.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

// Use the library crate
use quai_agent::cli::commands;
use quai_agent::config::Config;

/// Quai agent wallet plugin
#[derive(Parser)]
#[command(name = "quai-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "quai-agent.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load or create the agent wallet and show its address
    Wallet,

    /// Show the address to send QUAI to (RECEIVE_QUAI)
    Receive,

    /// Send QUAI as described in a chat message (SEND_QUAI)
    Send {
        /// Message, e.g. "Send 0.5 QUAI to 0x00..."
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// List registered actions
    Actions,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quai_agent=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Perform startup checks
    if let Err(e) = startup_checks(&config) {
        error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    // Execute command
    let result = match cli.command {
        Commands::Wallet => commands::wallet(&config).await,
        Commands::Receive => commands::receive(&config).await,
        Commands::Send { message } => commands::send(&config, &message.join(" ")).await,
        Commands::Actions => commands::list_actions(&config),
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Perform startup safety checks
fn startup_checks(config: &Config) -> Result<()> {
    info!("Performing startup checks...");

    let wallet_path = std::path::Path::new(&config.wallet.path);

    // Check wallet file permissions (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = std::fs::metadata(wallet_path) {
            let mode = metadata.permissions().mode();

            // Check if file is readable by group or others (not 600)
            if mode & 0o077 != 0 {
                warn!(
                    "Wallet file {} has insecure permissions {:o}. \
                     Run 'chmod 600 {}' to fix.",
                    wallet_path.display(),
                    mode & 0o777,
                    wallet_path.display()
                );
            } else {
                info!("Wallet permissions OK");
            }
        }
    }

    if !wallet_path.exists() {
        warn!(
            "No wallet at {} - one will be generated on first use",
            wallet_path.display()
        );
    }

    info!("Startup checks passed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_readable_wallet_file_only_warns() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quai_wallet.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut config = Config::default();
        config.wallet.path = path.to_string_lossy().into_owned();

        assert!(startup_checks(&config).is_ok());
    }

    #[test]
    fn test_missing_wallet_file_passes() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.wallet.path = dir.path().join("absent.json").to_string_lossy().into_owned();

        assert!(startup_checks(&config).is_ok());
    }
}
