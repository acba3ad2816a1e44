use std::error::Error;
use std::fs::File;
use std::io;

use corridor_transit_design::report;
use corridor_transit_design::{Model, ProgressSink};
use env_logger;


const USAGE: &str = "usage: corridor_transit_design <scenario.yaml> [summary.csv]";

struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, count: usize, total: usize) {
        log::info!("{} of {} scenarios done", count, total);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        return Err(USAGE.into());
    }

    let mut model = Model::from_cfg(&args[1])?;
    let results = model.calculate(&LogProgress, None).clone();
    for status in &results.outcomes {
        if status.success {
            log::info!("{}: objective {} ({})", status.name, status.objective, status.message);
        } else {
            log::warn!("{}: search failed ({}), objective {}", status.name, status.message,
                       status.objective);
        }
    }

    let mut corridors = vec![model.reference().clone()];
    corridors.extend(results.simulation_results.iter().cloned());
    corridors.extend(results.optimization_results.iter().cloned());
    let rows = report::summary_rows(&model.params, model.reference(), &corridors);
    match args.get(2) {
        Some(path) => report::write_summary_csv(File::create(path)?, &rows)?,
        None => report::write_summary_csv(io::stdout(), &rows)?,
    }
    return Ok(());
}
