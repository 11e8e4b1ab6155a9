//! Delegate/Event Demonstration CLI
//!
//! Command-line driver for the delegate-event library. It runs named demo
//! scenarios that exercise every public core operation:
//! - Free-function, method, and const-method delegates
//! - Event registration, dispatch, and unregistration
//! - Unregistration from inside a running dispatch
//! - Reset/clear semantics
//!
//! Outcomes are printed as text or JSON.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod config;
mod report;
mod scenarios;

use report::ReportFormat;

/// Delegate/Event Demo - exercise the callback and multicast list API
#[derive(Parser, Debug)]
#[command(name = "delegate-event-cli")]
#[command(about = "Run delegate/event demonstration scenarios", long_about = None)]
#[command(version)]
struct Args {
    /// Scenario to run (default: all; see --list)
    #[arg(short, long, value_name = "NAME")]
    scenario: Option<String>,

    /// List available scenarios and exit
    #[arg(long)]
    list: bool,

    /// Number of dispatch rounds for counting scenarios
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    rounds: usize,

    /// Path to a TOML configuration file (overrides --scenario/--rounds)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Delegate/Event demo v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using core library v{}", delegate_event::VERSION);

    if args.list {
        println!("Available scenarios:");
        for scenario in scenarios::SCENARIOS {
            println!("  {:<12} {}", scenario.name, scenario.summary);
        }
        return Ok(());
    }

    let plan = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::DemoConfig {
            scenarios: args.scenario.iter().cloned().collect(),
            rounds: args.rounds,
        },
    };

    let outcomes = scenarios::run(&plan)?;
    report::print(&outcomes, args.format)?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
