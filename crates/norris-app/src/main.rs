// Norris ranking entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing to stderr
// 4. Build the pipeline and fit the model
// 5. Print the ranking to stdout

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use norris_core::config;
use norris_core::pipeline::Pipeline;
use norris_core::predictor::{Predictor, Ranking};

#[derive(Parser)]
#[command(name = "norris")]
#[command(about = "Rank NHL defensemen by predicted Norris Trophy vote share", long_about = None)]
struct Cli {
    /// Directory holding config/, defaults/ and the data root
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Override the number of players ranked
    #[arg(long)]
    top: Option<usize>,

    /// Print the ranking as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config(&cli.base_dir).with_context(|| {
        format!("failed to load configuration from {}", cli.base_dir.display())
    })?;
    if let Some(top) = cli.top {
        anyhow::ensure!(top > 0, "--top must be at least 1");
        config.model.top_n = top;
    }

    init_tracing(&config.logging.filter)?;
    info!("Norris ranking starting up (base dir {})", cli.base_dir.display());

    let predictor = Predictor::new(Pipeline::from_config(config, &cli.base_dir));
    predictor
        .refresh()
        .context("failed to build the feature tables and fit the model")?;
    let ranking = predictor.predict().context("failed to rank the current season")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&ranking).context("failed to serialize ranking")?;
        println!("{json}");
    } else {
        print_table(&ranking, &cli.base_dir);
    }
    Ok(())
}

fn print_table(ranking: &Ranking, base_dir: &Path) {
    match ranking.season {
        Some(season) => println!("Norris Trophy projection, {season}"),
        None => println!("Norris Trophy projection ({})", base_dir.display()),
    }
    for entry in &ranking.entries {
        println!(
            "{:>3}. {:<28} {:>7.4}",
            entry.rank, entry.name, entry.predicted_share
        );
    }
}

/// Initialize tracing on stderr so stdout carries only the ranking.
///
/// `RUST_LOG` wins over the configured filter when set.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
