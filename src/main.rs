// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "transmutation")]
#[command(about = "Department of Transmutation: classify hand-drawn documents as entities")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Configuration file (default: ~/.config/transmutation/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a document image for transmutation
    Submit {
        /// Image file to submit
        file: PathBuf,

        /// Entity name (default: Entity-<n>)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Capture a document from a camera and submit it
    Capture {
        /// Image file served as the camera surface
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Entity name (default: Entity-<n>)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// List classified entities, newest first
    List,

    /// Show a record by case number
    Show {
        /// Case number (e.g. DT-2025-0001)
        case: String,
    },

    /// Print the share payload of a record
    Share {
        /// Case number (e.g. DT-2025-0001)
        case: String,
    },

    /// Download the transmuted entity image of a record
    Download {
        /// Case number (e.g. DT-2025-0001)
        case: String,

        /// Output directory (default: ~/Pictures/transmutation)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=transmutation=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = cli::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Submit { file, label } => cli::submit_document(&config, file, label)?,
        Commands::Capture { source, label } => cli::capture_document(&config, source, label)?,
        Commands::List => cli::list_records(&config)?,
        Commands::Show { case } => cli::show_record(&config, &case)?,
        Commands::Share { case } => cli::share_record(&config, &case)?,
        Commands::Download { case, output } => cli::download_record(&config, &case, output)?,
    }

    Ok(())
}
