use log::{error, info};

use std::error::Error;
use std::path::Path;

use batchgraph::{logger, report, VERSION};

const DEFAULT_RESULTS: &str = "linux.results";

fn main() {
    logger::init();

    let results = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_RESULTS.to_string());

    info!("batchgraph {} initializing...", VERSION);
    info!("results directory: {}", results);

    if let Err(e) = run(Path::new(&results)) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(results: &Path) -> Result<(), Box<dyn Error>> {
    report::results_side_by_side(results)?;
    report::speedups_for_payloads(results)?;
    report::speedups_for_p4(results)?;
    report::speedups_for_p4_with_deviations(results)?;
    info!("done");
    Ok(())
}
