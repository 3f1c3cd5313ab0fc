//! deskpilot - natural-language desktop automation planner
//!
//! Main entry point for the deskpilot CLI and native-messaging host.

mod cli;
mod cmd_host;
mod cmd_provider;
mod register;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use deskpilot_config::{Config, ConfigLoader, ConfigValidator, StorageConfig};

use crate::cli::{Cli, Commands};

/// Get the .deskpilot directory path.
fn deskpilot_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".deskpilot"))
        .unwrap_or_else(|| PathBuf::from(".deskpilot"))
}

fn init_tracing(storage: &StorageConfig, host_mode: bool) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&storage.log_dir)?;

    // Host and CLI run at the same time, so each gets its own files.
    let prefix = if host_mode { "deskpilot-host" } else { "deskpilot" };
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .max_log_files(storage.max_log_files)
        .build(&storage.log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Stdout belongs to native-messaging frames in host mode, and the host's
    // stderr is shared with the CLI that spawned it.
    let console = if host_mode {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(false)
            .with_filter(LevelFilter::WARN)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_ansi(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn validate_config(config: &Config, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("Config warning: {}", warning);
    }
    for err in &result.errors {
        error!("Config error: {}", err);
    }
    if !result.is_valid() {
        return Err(format!("Invalid configuration in {}", path.display()).into());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| deskpilot_dir().join("config.toml"));
    let host_mode = matches!(cli.command, Some(Commands::Host));

    let config = ConfigLoader::load_or_default(&config_path)?;
    init_tracing(&config.storage, host_mode)?;
    validate_config(&config, &config_path)?;

    if host_mode {
        return cmd_host::run_host(&config).await;
    }

    let registry = register::build_registry(&config, &config_path).await;

    match cli.command {
        None => cmd_provider::providers_list(&registry, "table").await,
        Some(Commands::Host) => Ok(()),
        Some(Commands::Providers { format }) => {
            cmd_provider::providers_list(&registry, &format).await
        }
        Some(Commands::Use { provider_id }) => {
            cmd_provider::use_provider(&registry, &provider_id).await
        }
        Some(Commands::Key { action }) => cmd_provider::handle_key_command(&registry, action).await,
        Some(Commands::Plan {
            request,
            screenshot,
            ui_tree,
            json,
        }) => {
            let context = cmd_provider::planning_context(
                &request,
                screenshot.as_deref(),
                ui_tree.as_deref(),
            )?;
            cmd_provider::plan(&registry, context, json).await
        }
    }
}
