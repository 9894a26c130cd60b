//! CLI frontend for the Talewright interactive fiction engine.

mod commands;
mod render;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "tw",
    about = "Talewright: play and check interactive fiction worlds",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a world interactively on stdin/stdout
    Play {
        /// World document (JSON)
        file: PathBuf,

        /// Engine configuration override (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Where the `save` command writes the game
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Continue the game stored at --save instead of starting anew
        #[arg(short, long, requires = "save")]
        resume: bool,
    },

    /// Parse every condition and set statement in a world and report problems
    Check {
        /// World document (JSON)
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tw_fiction=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            file,
            config,
            save,
            resume,
        } => commands::play::run(&file, config.as_deref(), save.as_deref(), resume),
        Commands::Check { file } => commands::check::run(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
