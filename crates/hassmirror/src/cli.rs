//! Clap derive structures for the `hassmirror` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hassmirror -- mirror a remote Home Assistant hub's sensors
#[derive(Debug, Parser)]
#[command(
    name = "hassmirror",
    version,
    about = "Mirror a remote Home Assistant hub's sensors",
    long_about = "Polls a remote Home Assistant instance over its REST API and\n\
        presents its sensor entities locally, one profile per hub.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Hub profile to use
    #[arg(long, short = 'p', env = "HASSMIRROR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Hub host without scheme, e.g. homeassistant.local:8123 (overrides profile)
    #[arg(long, short = 'u', env = "HASSMIRROR_URL", global = true)]
    pub url: Option<String>,

    /// Long-lived access token
    #[arg(long, env = "HASSMIRROR_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Use https (true) or plain http (false)
    #[arg(long, env = "HASSMIRROR_SSL", global = true)]
    pub ssl: Option<bool>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HASSMIRROR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HASSMIRROR_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HASSMIRROR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a hub profile: validate the token, then save
    Setup(SetupArgs),

    /// List every remote entity record
    #[command(alias = "ls")]
    States(StatesArgs),

    /// Show one remote entity record
    State(StateArgs),

    /// List mirrored sensors with their current readings
    #[command(alias = "s")]
    Sensors,

    /// Show the device record and connection summary
    Info,

    /// Keep polling and print sensor readings as they change
    Watch(WatchArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Print the roff man page for hassmirror or one of its subcommands
    Man(ManArgs),
}

// ── Setup ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Profile name to save under
    #[arg(long)]
    pub name: Option<String>,

    /// Display title for the connection (defaults to the host)
    #[arg(long)]
    pub title: Option<String>,

    /// Store the token in the config file instead of the system keyring
    #[arg(long)]
    pub plaintext: bool,

    /// Never prompt; fail if a required value is missing
    #[arg(long)]
    pub non_interactive: bool,
}

// ── Reads ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatesArgs {
    /// Only show entities in this domain (e.g. sensor, light)
    #[arg(long, short = 'd')]
    pub domain: Option<String>,
}

#[derive(Debug, Args)]
pub struct StateArgs {
    /// Entity id, e.g. sensor.outdoor_temperature
    pub entity_id: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval (e.g. "30s", "5m"); overrides the profile
    #[arg(long, short = 'i')]
    pub interval: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration (tokens redacted)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Delete a profile and its stored token
    Remove {
        /// Profile name to remove
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Args)]
pub struct ManArgs {
    /// Subcommand to document (e.g. `watch`); omit for the top-level page
    pub command: Option<String>,
}
