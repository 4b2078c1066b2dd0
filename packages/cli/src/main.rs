use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod analyze;
mod history;
mod output;

#[derive(Debug, Parser)]
#[command(
    name = "dermascan",
    version,
    about = "Analyze skin lesion images and browse past analyses",
    long_about = "dermascan submits lesion images for analysis and shows the results.\n\n\
        Commands:\n  \
        analyze  Validate and analyze local image files\n  \
        history  List analyses stored by a dermascan server"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate and analyze local image files
    Analyze(AnalyzeArgs),
    /// List analyses stored by a dermascan server
    History(HistoryArgs),
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Image files to analyze
    #[arg(required = true)]
    pub files: Vec<std::path::PathBuf>,

    /// Send images to a dermascan server instead of the built-in mock classifier
    #[arg(long, env = "DERMASCAN_SERVER")]
    pub remote: Option<String>,

    /// Maximum accepted file size in bytes
    #[arg(long, default_value_t = 5 * 1024 * 1024)]
    pub max_bytes: u64,

    /// Also accept image/webp
    #[arg(long)]
    pub webp: bool,

    /// Seed the mock classifier for reproducible output
    #[arg(long, conflicts_with = "remote")]
    pub seed: Option<u64>,

    /// Disable the mock classifier's simulated latency
    #[arg(long, conflicts_with = "remote")]
    pub no_delay: bool,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Base URL of the dermascan server
    #[arg(long, env = "DERMASCAN_SERVER", default_value = "http://127.0.0.1:3000")]
    pub server: String,

    /// Result category: all, benign or malignant
    #[arg(long, default_value = "all")]
    pub filter: common::dashboard::CategoryFilter,

    /// Case-insensitive substring of the analysis ID
    #[arg(long, default_value = "")]
    pub search: String,

    /// Print matching records as JSON
    #[arg(long)]
    pub json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => analyze::run(args).await,
        Command::History(args) => history::run(args).await,
    }
}
