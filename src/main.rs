use clap::Parser;
use std::sync::Arc;

use shadeside::config::Config;
use shadeside::engine::{RawEndpoint, ShadeEngine, ShadeRequest};
use shadeside::providers::ephemeris::NoaaEphemeris;
use shadeside::providers::ors::OrsRouter;
use shadeside::providers::weather::OwmWeather;
use shadeside::server;

/// Shadeside — which side of the bus stays out of the sun?
///
/// Estimates the sunny and shaded sides of a vehicle for a trip between two
/// coordinates. Uses real route geometry when an OpenRouteService key is
/// configured and a straight line otherwise.
///
/// Examples:
///   shadeside --from "51.5074,-0.1278" --to "51.7,-0.1278" --at 2027-06-21T09:00
///   shadeside --from "59.33,18.07" --to "59.86,17.64"
///   shadeside --serve --port 4000
#[derive(Parser)]
#[command(name = "shadeside", version, about, long_about = None)]
struct Cli {
    /// Origin as "lat,lon". Example: --from "51.5074,-0.1278"
    #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
    from: Option<(f64, f64)>,

    /// Destination as "lat,lon".
    #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
    to: Option<(f64, f64)>,

    /// Departure time, RFC3339 or YYYY-MM-DDTHH:MM (treated as UTC).
    /// Defaults to now.
    #[arg(long)]
    at: Option<String>,

    /// Run the HTTP server instead of a one-shot estimate.
    #[arg(long)]
    serve: bool,

    /// Server bind address.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Server port. Falls back to $PORT, then 4000.
    #[arg(long)]
    port: Option<u16>,
}

fn parse_coord(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got '{}'", s))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude '{}'", lat))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("bad longitude '{}'", lon))?;
    Ok((lat, lon))
}

fn init_logging() {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .format_module_path(false)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env();

    let engine = ShadeEngine::new(
        Arc::new(OrsRouter::new(config.ors_api_key.clone(), config.provider_timeout)),
        Arc::new(OwmWeather::new(config.weather_api_key.clone(), config.provider_timeout)),
        Arc::new(NoaaEphemeris),
    );

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let port = cli.port.unwrap_or(config.port);
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        runtime.block_on(server::start(&cli.host, port, engine));
        return;
    }

    // ── One-shot estimate ───────────────────────────────────────

    let (from, to) = match (cli.from, cli.to) {
        (Some(f), Some(t)) => (f, t),
        _ => {
            eprintln!("Error: No trip specified.");
            eprintln!();
            eprintln!("Usage:");
            eprintln!("  shadeside --from \"51.5074,-0.1278\" --to \"51.7,-0.1278\" --at 2027-06-21T09:00");
            eprintln!("  shadeside --serve --port 4000");
            std::process::exit(1);
        }
    };

    let request = ShadeRequest {
        origin: Some(RawEndpoint { lat: Some(from.0), lon: Some(from.1) }),
        destination: Some(RawEndpoint { lat: Some(to.0), lon: Some(to.1) }),
        datetime: cli.at.clone(),
    };

    match engine.estimate(&request) {
        Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome).unwrap()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
