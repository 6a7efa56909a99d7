// CLI entry point for replaying pipe-network edit scenarios.
//
// Reads a JSON array of `EditCommand`s, applies them to a fresh registry
// with the demo `SegmentCache` class, and prints a JSON summary of the
// networks left at the end. Handy for reproducing a reported topology
// outside the game.
//
// Usage:
//   replay <SCENARIO.json> [OPTIONS]
//     --config <FILE>     NetworkConfig JSON (default: built-in defaults)
//     --ticks <N>         Extra global ticks after the scenario (default: 0)
//
// Logging goes through `tracing`; `RUST_LOG` overrides the config's
// `log_filter`.

use std::path::PathBuf;

use conduit_net::command::{EditCommand, parse_commands};
use conduit_net::config::NetworkConfig;
use conduit_net::replay::{Replay, ReplayError};
use tracing_subscriber::EnvFilter;

struct Args {
    scenario: PathBuf,
    config: Option<PathBuf>,
    extra_ticks: u32,
}

fn main() {
    let args = parse_args();

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(&args, config) {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("Replay failed: {e}");
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<NetworkConfig, ReplayError> {
    match path {
        Some(path) => Ok(NetworkConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(NetworkConfig::default()),
    }
}

fn run(args: &Args, config: NetworkConfig) -> Result<String, ReplayError> {
    let commands = parse_commands(&std::fs::read_to_string(&args.scenario)?)?;
    let mut replay = Replay::new(config)?;
    replay.run(&commands)?;
    if args.extra_ticks > 0 {
        replay.apply(&EditCommand::Tick {
            count: args.extra_ticks,
        })?;
    }
    let summary = replay.summary()?;
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Parse command-line arguments. Plain `std::env::args()` matching.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut scenario = None;
    let mut config = None;
    let mut extra_ticks = 0;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                }));
            }
            "--ticks" => {
                i += 1;
                extra_ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--ticks requires a valid number");
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
            path => {
                if scenario.is_some() {
                    eprintln!("Only one scenario file may be given");
                    std::process::exit(1);
                }
                scenario = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    let Some(scenario) = scenario else {
        print_usage();
        std::process::exit(1);
    };

    Args {
        scenario,
        config,
        extra_ticks,
    }
}

fn print_usage() {
    println!("Usage: replay <SCENARIO.json> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <FILE>     NetworkConfig JSON (default: built-in defaults)");
    println!("  --ticks <N>         Extra global ticks after the scenario (default: 0)");
    println!("  --help, -h          Show this help");
}
