//! Clap derive structures for the `wifiguard` CLI.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifiguard -- keep a Freebox's WiFi on and its planning off
#[derive(Debug, Parser)]
#[command(
    name = "wifiguard",
    version,
    about = "Keep a Freebox router's WiFi on and its WiFi planning off",
    long_about = "Polls the Freebox OS local API on a fixed clock cadence, turns the\n\
        WiFi back on if it went down, and disables the WiFi planning schedule.\n\
        Also exposes an HTTP trigger and one-shot commands for manual use.",
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
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "WIFIGUARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Router API base URL (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub url: Option<String>,

    /// Accept the router's certificate without verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the poll loop and the HTTP trigger until interrupted
    Run(RunArgs),

    /// Run one corrective poll now and print the report
    Check,

    /// Show WiFi state, planning state and access points
    #[command(alias = "st")]
    Status,

    /// Switch the WiFi radio
    #[command(alias = "w")]
    Wifi(WifiArgs),

    /// Show or switch the WiFi planning schedule
    Planning(PlanningArgs),

    /// Register this app with the router (one-time)
    Register(RegisterArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Do not start the HTTP trigger
    #[arg(long)]
    pub no_server: bool,

    /// HTTP trigger address (overrides config)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Poll once at startup before waiting for the first slot
    #[arg(long)]
    pub now: bool,
}

// ── WiFi ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiArgs {
    #[command(subcommand)]
    pub command: WifiCommand,
}

#[derive(Debug, Subcommand)]
pub enum WifiCommand {
    /// Turn the WiFi radio on
    On,
    /// Turn the WiFi radio off
    Off,
}

// ── Planning ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PlanningArgs {
    #[command(subcommand)]
    pub command: PlanningCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlanningCommand {
    /// Show whether the planning schedule is in force
    Show,
    /// Put the planning schedule in force
    Enable,
    /// Disable the planning schedule
    Disable,
}

// ── Register ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Seconds to wait for confirmation on the router
    #[arg(long, default_value = "120")]
    pub wait: u64,

    /// Where to keep the granted app token
    #[arg(long, default_value = "ask")]
    pub store: TokenStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenStore {
    /// Prompt for a choice
    Ask,
    /// System keyring
    Keyring,
    /// Config file (plaintext)
    Config,
    /// Only print it
    Print,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Display the effective configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
