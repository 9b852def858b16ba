use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::context::AppContext;

#[derive(Parser)]
#[command(name = "esnotes")]
#[command(version, about = "Exploratory-testing session notes", long_about = None)]
struct Cli {
    /// Directory holding sessions.json (overrides config and ESNOTES_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to config.toml (overrides ESNOTES_CONFIG_DIR)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List stored sessions
    List,
    /// Show a session and its notes
    Show {
        /// Session id
        id: String,
    },
    /// Delete a session
    Delete {
        /// Session id
        id: String,
    },
    /// Merge sessions from a JSON export file
    Import {
        /// File to import
        file: PathBuf,
    },
    /// Export all sessions as JSON
    Export {
        /// Output directory (defaults to the current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Print a paginated text report of a session
    Report {
        /// Session id
        id: String,
        /// Lines per page (defaults to [report].lines_per_page)
        #[arg(long)]
        lines_per_page: Option<usize>,
    },
    /// Record a session interactively
    Record {
        /// Initial session name
        #[arg(long)]
        name: Option<String>,
        /// Resume a stored session instead of starting a new one
        #[arg(long, conflicts_with = "name")]
        open: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::build(cli.config, cli.data_dir)?;

    match cli.command {
        Commands::List => commands::sessions::list(&ctx),
        Commands::Show { id } => commands::sessions::show(&ctx, &id),
        Commands::Delete { id } => commands::sessions::delete(&ctx, &id),
        Commands::Report { id, lines_per_page } => {
            commands::sessions::report(&ctx, &id, lines_per_page)
        }
        Commands::Import { file } => commands::transfer::import(&ctx, &file).await,
        Commands::Export { dir } => commands::transfer::export(&ctx, dir).await,
        Commands::Record { name, open } => commands::record::run(&ctx, name, open).await,
    }
}
