//! Clap derive structures for the `flarestat` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// flarestat -- Cloudflare zone analytics from the command line
#[derive(Debug, Parser)]
#[command(
    name = "flarestat",
    version,
    about = "Cloudflare zone analytics from the command line",
    long_about = "Fetches request, bandwidth, visitor, country, and web-performance\n\
        analytics for a Cloudflare zone with one batched GraphQL query, and\n\
        prints them as named metrics.",
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
    /// Zone profile to use
    #[arg(long, short = 'p', env = "FLARESTAT_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Zone ID (overrides profile)
    #[arg(long, short = 'z', env = "FLARESTAT_ZONE", global = true)]
    pub zone: Option<String>,

    /// Cloudflare API token with Analytics:Read
    #[arg(long, env = "FLARESTAT_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Bandwidth unit: B, KB, MB, GB
    #[arg(long, short = 'u', env = "FLARESTAT_UNIT", global = true)]
    pub unit: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLARESTAT_OUTPUT",
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

    /// Request timeout in seconds
    #[arg(long, env = "FLARESTAT_TIMEOUT", global = true)]
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
    /// Plain `key=value` lines (scripting)
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

/// Query variant, mirrored from `flarestat_core::QueryKind` for clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum QueryArg {
    /// Today / 7-day / 30-day totals, countries, web performance
    Rolling,
    /// Today's cache, SSL, threat, status-code, and top-N figures
    Dashboard,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch once and print every metric
    #[command(alias = "m")]
    Metrics(MetricsArgs),

    /// Re-print metrics on every scheduled refresh until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Fetch once and print the raw snapshot
    Snapshot(SnapshotArgs),

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Metrics ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Query variant (overrides profile)
    #[arg(long)]
    pub query: Option<QueryArg>,

    /// Only show these metric keys (repeatable)
    #[arg(long = "key", short = 'k')]
    pub keys: Vec<String>,

    /// Hide metrics that have no value
    #[arg(long)]
    pub hide_empty: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub metrics: MetricsArgs,

    /// Seconds between refreshes (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Query variant (overrides profile)
    #[arg(long)]
    pub query: Option<QueryArg>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Show the current configuration (tokens redacted)
    Show,

    /// Store a profile's API token in the system keyring
    SetToken {
        /// Token value (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,
    },

    /// Set a field on the active profile
    Set {
        /// Field name, e.g. zone_id, bandwidth_unit, query, refresh_interval
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles (* marks the default)
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
