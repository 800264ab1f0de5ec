//! catalog - maintenance tool for the JSON comic catalog
//!
//! Ingests scraped issues, renumbers reading orders, fills edition labels
//! and checks cross-references. Every command is safe to re-run.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Ingestion and normalization for the comic catalog")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Catalog root (overrides data_dir from the config)
    #[arg(long, global = true, env = "CATALOG_ROOT")]
    root: Option<PathBuf>,

    /// Config file (default: ./catalog.toml, then the user config dir)
    #[arg(long, global = true, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug); RUST_LOG wins when set
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a scraped issue to a period and its creators to the registries
    Ingest {
        /// Draft JSON file; reads stdin when omitted or "-"
        draft: Option<PathBuf>,

        /// Target period
        #[arg(short, long)]
        period: String,

        /// Store the issue outside the period's reading order
        #[arg(long)]
        unordered: bool,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Renumber issues, tidy and label editions, check references
    Normalize {
        #[command(flatten)]
        scope: PassArgs,

        /// Skip label inference
        #[arg(long)]
        no_labels: bool,
    },

    /// Renumber period issues into a contiguous reading order
    Reorder {
        #[command(flatten)]
        scope: PassArgs,
    },

    /// Fill edition labels from issue titles or ids
    Labels {
        #[command(flatten)]
        scope: PassArgs,
    },

    /// Report event and edition references to unknown issues
    Check {
        /// Limit to these periods
        #[arg(short, long = "period")]
        periods: Vec<String>,

        /// Where event references must resolve (period, catalog)
        #[arg(long)]
        scope: Option<String>,

        /// Exit with an error when anything is reported
        #[arg(long)]
        strict: bool,
    },

    /// Format issue ids as display titles
    FormatTitle {
        /// Issue ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List periods with their record counts
    Periods,

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(clap::Args)]
struct PassArgs {
    /// Limit to these periods
    #[arg(short, long = "period")]
    periods: Vec<String>,

    /// Show what would change without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a commented default config file
    Init {
        /// Destination
        #[arg(default_value = "catalog.toml")]
        path: PathBuf,
    },
    /// Print which config file is in use
    Path,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = commands::Context::new(cli.config, cli.root, cli.json)?;

    match cli.command {
        Commands::Ingest {
            draft,
            period,
            unordered,
            dry_run,
        } => commands::ingest(&ctx, draft, &period, unordered, dry_run),
        Commands::Normalize { scope, no_labels } => commands::normalize(
            &ctx,
            commands::Pass::All { labels: !no_labels },
            scope.periods,
            scope.dry_run,
        ),
        Commands::Reorder { scope } => {
            commands::normalize(&ctx, commands::Pass::Reorder, scope.periods, scope.dry_run)
        }
        Commands::Labels { scope } => {
            commands::normalize(&ctx, commands::Pass::Labels, scope.periods, scope.dry_run)
        }
        Commands::Check {
            periods,
            scope,
            strict,
        } => commands::check(&ctx, periods, scope, strict),
        Commands::FormatTitle { ids } => commands::format_title(&ctx, &ids),
        Commands::Periods => commands::periods(&ctx),
        Commands::Config { command } => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
            Some(ConfigCommands::Init { path }) => commands::config_init(&path),
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
        },
    }
}
