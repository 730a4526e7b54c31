#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the GLOBE observation map renderer.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use globe_map_map::cities::{all_catalogs, catalog_for};
use globe_map_map::compose::protocol_colors;
use globe_map_map::render::{FigureRenderer as _, PlotlyHtmlRenderer};
use globe_map_observation_models::Protocol;
use globe_map_pipeline::{MapPipeline, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "globe_map",
    about = "Render GLOBE citizen-science observations on an interactive country map"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch observations and the country boundary, then write the map as HTML
    Render(RenderArgs),
    /// List the observation protocols and their map styling
    Protocols,
    /// List the reference cities drawn on the map
    Cities {
        /// Only list this country's cities
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Args, Default)]
struct RenderArgs {
    /// TOML configuration file. Defaults apply for anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output HTML file
    #[arg(long, default_value = "globe_map.html")]
    output: PathBuf,
    /// Country name as it appears in the boundary source (e.g. "India")
    #[arg(long)]
    country: Option<String>,
    /// ISO 3166-1 alpha-3 country code for the observation API (e.g. "IND")
    #[arg(long)]
    country_code: Option<String>,
    /// First day of the date range (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of the date range (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Protocol to fetch; repeat to fetch several (default: all)
    #[arg(long = "protocol")]
    protocols: Vec<Protocol>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        None => {
            render(RenderArgs {
                output: PathBuf::from("globe_map.html"),
                ..RenderArgs::default()
            })
            .await?;
        }
        Some(Commands::Render(args)) => render(args).await?,
        Some(Commands::Protocols) => {
            println!("{:<26} {:<22} {:<15} COLOUR", "ID", "NAME", "LEGEND GROUP");
            println!("{}", "-".repeat(80));
            for &protocol in Protocol::ALL {
                let (color, outline) = protocol_colors(protocol);
                println!(
                    "{:<26} {:<22} {:<15} {color} / {outline}",
                    protocol.id(),
                    protocol.display_name(),
                    protocol.legend_group()
                );
            }
        }
        Some(Commands::Cities { country }) => {
            let catalogs = match country {
                Some(country) => {
                    let cities =
                        catalog_for(&country).ok_or_else(|| format!("No city catalog for {country}"))?;
                    vec![(country, cities)]
                }
                None => all_catalogs()
                    .into_iter()
                    .map(|catalog| (catalog.country, catalog.cities))
                    .collect(),
            };
            for (country, cities) in catalogs {
                println!("{country}");
                println!("{:<14} {:>10} {:>10}  ANCHOR", "CITY", "LON", "LAT");
                println!("{}", "-".repeat(50));
                for city in &cities {
                    println!(
                        "{:<14} {:>10.4} {:>10.4}  {}",
                        city.name,
                        city.longitude(),
                        city.latitude(),
                        city.label_anchor
                    );
                }
                println!();
            }
        }
    }

    Ok(())
}

async fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let config = resolve_config(&args)?;
    let pipeline = MapPipeline::new(config)?;

    let layers = pipeline.run().await?;
    let figure = PlotlyHtmlRenderer::default().render(&layers, &pipeline.layout())?;
    figure.write_to(&args.output)?;

    log::info!(
        "Rendered {} layers to {} in {:.1}s",
        layers.len(),
        args.output.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Loads the config file (or defaults) and applies command-line overrides.
/// Validation happens once, when the pipeline is built.
fn resolve_config(args: &RenderArgs) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(country) = &args.country {
        config.country.clone_from(country);
    }
    if let Some(code) = &args.country_code {
        config.country_code.clone_from(code);
    }
    if let Some(start) = args.start {
        config.start_date = start;
    }
    if let Some(end) = args.end {
        config.end_date = end;
    }
    if !args.protocols.is_empty() {
        config.protocols.clone_from(&args.protocols);
    }

    Ok(config)
}

fn load_config(path: &Path) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    PipelineConfig::load(path).map_err(|e| format!("Failed to load {}: {e}", path.display()).into())
}
