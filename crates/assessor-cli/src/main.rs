//! assessor CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use assessor_core::error::EngineError;

mod commands;

#[derive(Parser)]
#[command(name = "assessor", version, about = "Assessment scoring and reporting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample submission
    Init,

    /// Validate the phase table and store settings
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a submission and store the result
    Score {
        /// Submission JSON file
        #[arg(long)]
        submission: PathBuf,

        /// Score without storing
        #[arg(long)]
        dry_run: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a stored result
    Show {
        /// Candidate id
        #[arg(long)]
        candidate: String,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build a learning roadmap from a stored result
    Roadmap {
        /// Candidate id
        #[arg(long)]
        candidate: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List stored versions of a result and what changed between them
    History {
        /// Candidate id
        #[arg(long)]
        candidate: String,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("assessor=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Score {
            submission,
            dry_run,
            format,
            config,
        } => commands::score::execute(submission, dry_run, format, config).await,
        Commands::Show {
            candidate,
            format,
            output,
            config,
        } => commands::show::execute(candidate, format, output, config).await,
        Commands::Roadmap {
            candidate,
            format,
            config,
        } => commands::roadmap::execute(candidate, format, config).await,
        Commands::History {
            candidate,
            format,
            config,
        } => commands::history::execute(candidate, format, config).await,
    };

    if let Err(e) = result {
        match e.downcast_ref::<EngineError>() {
            Some(engine_error) => eprintln!("Error [{}]: {e:#}", engine_error.code()),
            None => eprintln!("Error: {e:#}"),
        }
        process::exit(1);
    }
}
