//! mathdistract CLI: prepare, preview, and simulate arithmetic distractor
//! sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mathdistract", version, about = "Arithmetic distractor task runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter mathdistract.toml
    Init,

    /// Check a configuration for errors and likely mistakes
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the problem batteries a session would use
    Generate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Only print this set (0-based)
        #[arg(long)]
        set: Option<usize>,

        /// Print batteries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a headless session against a simulated participant
    Simulate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for logs and the report
        #[arg(long, default_value = "./mathdistract-results")]
        output: PathBuf,

        /// Wait in real time instead of on a virtual clock
        #[arg(long)]
        realtime: bool,

        /// Fraction of problems the participant lets time out
        #[arg(long, default_value = "0.1")]
        miss_rate: f64,

        /// Seed for generation, jitter, and the participant
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the summary of a saved session report
    Summarize {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(
                    "mathdistract=info"
                        .parse()
                        .unwrap_or_else(|_| tracing::Level::INFO.into()),
                ),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Generate { config, set, json } => commands::generate::execute(config, set, json),
        Commands::Simulate {
            config,
            output,
            realtime,
            miss_rate,
            seed,
        } => commands::simulate::execute(config, output, realtime, miss_rate, seed).await,
        Commands::Summarize { report } => commands::summarize::execute(report),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
