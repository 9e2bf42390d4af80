use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use asn_scrape::config::AppConfig;
use asn_scrape::export::{ExportFormat, export_to_file};
use asn_scrape::pipeline::Pipeline;
use asn_scrape::utils::{Timer, fmt_count};
use asn_scrape::{normalize_registration, parse_listing_page};

#[derive(Parser)]
#[command(name = "asn-scrape", about = "Aviation Safety Network category scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl the configured category and export every listing row
    Crawl {
        /// Stop after this many pages (default: crawl.max_pages from config)
        #[arg(short, long)]
        max_pages: Option<u32>,

        /// Output file
        #[arg(short, long, default_value = "asn_rows.csv")]
        out: PathBuf,

        /// Output format (default: from the file extension)
        #[arg(short, long, value_enum)]
        format: Option<ExportFormat>,
    },

    /// Normalize registrations given as arguments, or one per stdin line
    Normalize {
        registrations: Vec<String>,
    },

    /// Parse a saved listing page and print its rows as JSON
    Parse {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "asn_scrape=info,warn",
        1 => "asn_scrape=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    match cli.command {
        Command::Crawl {
            max_pages,
            out,
            format,
        } => {
            let config = AppConfig::load()?;
            let _t = Timer::start("Category crawl");

            let max_pages = max_pages.unwrap_or(config.crawl.max_pages);
            let format = format.unwrap_or_else(|| ExportFormat::from_path(&out));

            let (rows, stats) = Pipeline::new(config).run(max_pages).await?;
            export_to_file(&out, &rows, format)?;

            info!(
                "Done: {} pages | {} rows | {} with registration | stopped: {:?}",
                stats.pages,
                fmt_count(stats.rows),
                fmt_count(stats.with_registration),
                stats.stop
            );
        }

        Command::Normalize { registrations } => {
            let inputs = if registrations.is_empty() {
                std::io::stdin()
                    .lock()
                    .lines()
                    .collect::<std::io::Result<Vec<_>>>()
                    .context("Failed to read stdin")?
            } else {
                registrations
            };

            for raw in &inputs {
                let canonical = normalize_registration(Some(raw.as_str())).unwrap_or_default();
                println!("{}\t{}", raw, canonical);
            }
        }

        Command::Parse { file } => {
            let bytes = std::fs::read(&file).with_context(|| format!("Could not read {:?}", file))?;
            let rows = parse_listing_page(&String::from_utf8_lossy(&bytes));
            info!("{}: {} rows", file.display(), rows.len());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
