//! tango CLI — interactive Japanese vocabulary drill.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "tango", version, about = "Adaptive Japanese vocabulary drill")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive drill session
    Drill {
        /// JLPT level (1-5, "N5" also accepted)
        #[arg(long)]
        level: Option<String>,

        /// What to drill: words, kanji, both
        #[arg(long)]
        mode: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Load the vocabulary feeds and report item counts per level
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show burn progress and success counts for a level
    Stats {
        /// JLPT level (1-5)
        #[arg(long)]
        level: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter tango.toml
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tango=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Drill {
            level,
            mode,
            config,
        } => commands::drill::execute(level, mode, config),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Stats { level, config } => commands::stats::execute(level, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
