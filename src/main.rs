use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use unlogeo::batch::{run_batch, BatchOptions};
use unlogeo::config::GeocoderConfig;
use unlogeo::coords::{format_position, parse_unlocode_coordinates};
use unlogeo::geocode::{parse_candidate_list, pick_candidate, Geocoder, GooglePlaces, LookupOptions};
use unlogeo::logging;

/// unlogeo — geocode UNLOCODE port names and settle multi-match results
///
/// Examples:
///   unlogeo lookup Rotterdam
///   unlogeo pick Santos --candidates candidates.json
///   unlogeo coords "5155N 00430E"
///   unlogeo batch --input data/ports.csv --output output/improved_coordinates.csv
///   unlogeo batch --input data/ports.csv --output output/run2.csv --resume output/improved_coordinates.csv
#[derive(Parser)]
#[command(name = "unlogeo", version, about, long_about = None)]
struct Cli {
    /// Places API key.
    #[arg(long, env = "GCPAPIKEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Config file (defaults to <config_dir>/unlogeo/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Maps API base URL override.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Search for the name as given, without appending " port".
    #[arg(long, global = true)]
    no_port_suffix: bool,

    /// Debug-level logging for this crate.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Geocode a single place name and print the resolution as JSON.
    Lookup {
        name: String,
        /// Also print every candidate the provider returned.
        #[arg(long)]
        show_candidates: bool,
    },
    /// Run the disambiguator offline on a saved candidate list.
    Pick {
        name: String,
        /// JSON file with a Places response or a bare candidate array ("-" for stdin).
        #[arg(long)]
        candidates: PathBuf,
    },
    /// Convert UNLOCODE coordinate notation to decimal degrees.
    Coords { text: String },
    /// Geocode every row of a port list CSV.
    Batch {
        #[arg(long, short = 'i')]
        input: PathBuf,
        #[arg(long, short = 'o')]
        output: PathBuf,
        /// Earlier output; rows already resolved there are carried over.
        #[arg(long)]
        resume: Option<PathBuf>,
        /// Pause between requests, in milliseconds.
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Coords { text } => {
            let pos = parse_unlocode_coordinates(text)
                .with_context(|| format!("'{}' is not in DDMMH DDDMMH notation", text))?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "lat": pos.lat,
                    "lng": pos.lng,
                    "text": format_position(pos),
                }))?
            );
        }
        Command::Pick { name, candidates } => {
            let raw = read_input_arg(candidates)?;
            let list = parse_candidate_list(&raw)?;
            match pick_candidate(name, &list) {
                Some(chosen) => println!("{}", serde_json::to_string_pretty(chosen)?),
                None => bail!("no confident choice among {} candidates for '{}'", list.len(), name),
            }
        }
        Command::Lookup { name, show_candidates } => {
            let config = load_config(&cli)?;
            let geocoder = build_geocoder(&config)?;
            let fetched = geocoder.candidates(name);
            if *show_candidates {
                if let Ok(candidates) = &fetched {
                    eprintln!("  Candidates for '{}':", geocoder.search_text(name));
                    for (i, c) in candidates.iter().enumerate() {
                        eprintln!("    {}. {} ({})", i + 1, c.name, format_position(c.position));
                    }
                }
            }
            let resolution = geocoder.resolve_from(name, fetched);
            eprintln!("  {}: {}", name, resolution);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Command::Batch { input, output, resume, delay_ms } => {
            let config = load_config(&cli)?;
            let geocoder = build_geocoder(&config)?;
            let opts = BatchOptions {
                request_delay: Duration::from_millis(delay_ms.unwrap_or(config.request_delay_ms)),
            };
            let summary = run_batch(&geocoder, input, output, resume.as_deref(), &opts)?;
            eprintln!("  {}", summary);
            eprintln!("  Wrote {}", output.display());
        }
    }
    Ok(())
}

/// File config, then command-line overrides.
fn load_config(cli: &Cli) -> Result<GeocoderConfig> {
    let mut config = match &cli.config {
        Some(path) => GeocoderConfig::load_from(path)?,
        None => GeocoderConfig::load()?,
    };
    if let Some(key) = &cli.api_key {
        config.api_key = key.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if cli.no_port_suffix {
        config.append_port_suffix = false;
    }
    Ok(config)
}

fn build_geocoder(config: &GeocoderConfig) -> Result<Geocoder<GooglePlaces>> {
    let client = GooglePlaces::new(config)?;
    Ok(Geocoder::new(
        client,
        LookupOptions { append_port_suffix: config.append_port_suffix },
    ))
}

fn read_input_arg(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}
