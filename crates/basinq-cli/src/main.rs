mod analyze;
mod catalog;
mod enrich;
mod output;

use std::path::PathBuf;

use basinq_core::{config::build_app_config, AppConfig};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "basinq")]
#[command(about = "Price drain basins from site plan structure tables")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract structures from a plan image and price them.
    Analyze {
        /// Plan sheet image (PNG, JPEG, GIF or WebP).
        image: PathBuf,
        /// Use the canned sample take-off instead of calling the vision API.
        #[arg(long)]
        mock: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Price structure rows from a JSON file.
    Enrich {
        /// JSON array of structures, or an object with a `structures` array.
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show the active price catalog.
    Catalog {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

impl Commands {
    /// Only live image analysis needs vision API credentials.
    fn needs_live_extraction(&self) -> bool {
        matches!(self, Commands::Analyze { mock: false, .. })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(!cli.command.needs_live_extraction())?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let catalog = basinq_core::load_catalog(config.catalog_path.as_deref())?;

    match cli.command {
        Commands::Analyze { image, format, .. } => {
            analyze::run_analyze(&config, &catalog, &image, format).await?;
        }
        Commands::Enrich { file, format } => {
            enrich::run_enrich(&config, &catalog, &file, format)?;
        }
        Commands::Catalog { format } => catalog::run_catalog(&catalog, format)?,
    }

    Ok(())
}

/// Reads configuration from the environment. `force_mock` overrides the
/// extraction mode so commands that never call the vision API run without
/// credentials.
fn load_config(force_mock: bool) -> anyhow::Result<AppConfig> {
    let config = build_app_config(|key| {
        if force_mock && key == "BASINQ_EXTRACTION_MODE" {
            return Ok("mock".to_string());
        }
        std::env::var(key)
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests;
