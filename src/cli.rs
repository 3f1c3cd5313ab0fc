//! CLI definitions for deskpilot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// deskpilot CLI.
#[derive(Parser)]
#[command(name = "deskpilot")]
#[command(about = "Plan desktop UI actions from natural-language requests")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.deskpilot/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the native-messaging host on stdio
    Host,

    /// List providers with their status (default)
    Providers {
        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Make a provider the active one
    Use {
        /// Provider ID
        provider_id: String,
    },

    /// Provider API key management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Plan actions for a request with the active provider
    Plan {
        /// What to do, in plain language
        request: String,

        /// PNG screenshot to send along
        #[arg(long)]
        screenshot: Option<PathBuf>,

        /// JSON file holding the UI tree of the foreground window
        #[arg(long)]
        ui_tree: Option<PathBuf>,

        /// Print the actions as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum KeyAction {
    /// Store an API key. Reads it from stdin when not given.
    Set {
        /// Provider ID
        provider_id: String,

        /// API key
        #[arg(long, env = "DESKPILOT_API_KEY", hide_env_values = true)]
        key: Option<String>,
    },

    /// Delete a stored API key
    Delete {
        /// Provider ID
        provider_id: String,
    },
}
