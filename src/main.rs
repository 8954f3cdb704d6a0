//! Sortable Grid CLI
//!
//! Usage:
//!   sortable-grid [OPTIONS] <SCENARIO>
//!
//! Options:
//!   -j, --json     Print the final layout as JSON
//!   -v, --verbose  Log drag decisions to stderr
//!   -h, --help     Print help

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sortable_grid::run_scenario_file;

#[derive(Parser)]
#[command(name = "sortable-grid")]
#[command(about = "Replay drag-to-reorder scenarios against a packed grid")]
struct Cli {
    /// Scenario file (TOML format)
    scenario: PathBuf,

    /// Print the final layout as JSON
    #[arg(short, long)]
    json: bool,

    /// Log drag decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("sortable_grid=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let report = match run_scenario_file(&cli.scenario) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error running scenario '{}': {}", cli.scenario.display(), e);
            std::process::exit(1);
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding report: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("order: {}", report.order.join(" "));
    println!("{}", report.ascii);
}
