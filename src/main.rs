use anyhow::Context;
use clap::{Parser, Subcommand};
use spec_scraper::apis::{spider_for, Fetcher};
use spec_scraper::config::Config;
use spec_scraper::families::Family;
use spec_scraper::logging;
use spec_scraper::pipeline::{Pipeline, PipelineResult};
use spec_scraper::storage::{CsvStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[derive(Parser)]
#[command(name = "spec_scraper")]
#[command(about = "Harvests SPEC benchmark results and cleans them into CSV datasets")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl result pages into raw datasets
    Harvest {
        /// Families to harvest (comma-separated). Available: cpu2017, cpu2006, jbb2015, jvm2008, ssj2008
        #[arg(long)]
        families: Option<String>,
    },
    /// Normalize raw datasets into clean datasets
    Clean {
        /// Families to clean (comma-separated)
        #[arg(long)]
        families: Option<String>,
    },
    /// Harvest then clean
    Run {
        /// Families to run (comma-separated)
        #[arg(long)]
        families: Option<String>,
    },
}

async fn harvest_families(families: &[Family], config: &Config, pipeline: &Pipeline) -> anyhow::Result<()> {
    let fetcher = Arc::new(Fetcher::new(&config.http).context("building HTTP client")?);

    for family in families {
        let spider = spider_for(*family, fetcher.clone());
        let span = tracing::info_span!("harvest", family = %family);
        match pipeline.harvest(spider.as_ref()).instrument(span).await {
            Ok(result) => {
                println!("\n📊 Harvest results for {}:", family);
                for (stem, count) in &result.sources {
                    println!("   {}: {} records", stem, count);
                }
            }
            Err(e) => {
                error!("Harvest failed for {}: {}", family, e);
                println!("❌ Harvest failed for {}: {}", family, e);
            }
        }
    }
    Ok(())
}

fn clean_families(families: &[Family], pipeline: &Pipeline) -> anyhow::Result<()> {
    let mut results: Vec<PipelineResult> = Vec::new();

    for family in families {
        let span = tracing::info_span!("clean", family = %family);
        let _enter = span.enter();

        match pipeline.clean(*family) {
            Ok(result) => {
                println!("\n📊 Clean results for {}:", family);
                println!("   Read: {}", result.read);
                println!("   Dropped: {}", result.dropped);
                println!("   Written: {}", result.written);
                results.push(result);
            }
            Err(e) => {
                error!("Clean failed for {}: {}", family, e);
                println!("❌ Clean failed for {}: {}", family, e);
            }
        }
    }

    pipeline
        .write_summary(&results)
        .context("writing run summary")?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let storage: Arc<dyn Storage> = Arc::new(CsvStorage::new(&config.paths));
    let pipeline = Pipeline::new(storage, config.normalize.unknown_storage);

    match cli.command {
        Commands::Harvest { families } => {
            println!("🔄 Running harvester...");
            let families = Family::parse_list(families.as_deref())?;
            harvest_families(&families, &config, &pipeline).await?;
        }
        Commands::Clean { families } => {
            println!("🔨 Running cleaner...");
            let families = Family::parse_list(families.as_deref())?;
            clean_families(&families, &pipeline)?;
        }
        Commands::Run { families } => {
            println!("🚀 Running full pipeline (harvest + clean)...");
            let families = Family::parse_list(families.as_deref())?;

            println!("\n📥 Step 1: Harvesting...");
            harvest_families(&families, &config, &pipeline).await?;

            println!("\n🔨 Step 2: Cleaning...");
            clean_families(&families, &pipeline)?;
        }
    }

    info!("Done");
    Ok(())
}
