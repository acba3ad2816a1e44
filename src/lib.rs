mod error;
pub use error::CorridorError;

pub mod config_utils;

mod parameters;
pub use parameters::{Mode, Parameters, NUM_MODES};

mod geometry;
pub use geometry::{Typology, ZoneGeometry};

mod od;
pub use od::Od;

mod line;
pub use line::{DesignVariable, FreeVariable, Line, DEFAULT_FREQUENCY_BOUNDS,
               DEFAULT_SPACING_BOUNDS};

mod corridor;
pub use corridor::Corridor;

mod optimizer;
pub use optimizer::{capacity_malus, optimize, DesignProblem, DesignSlot, OptimizationOutcome};

mod model;
pub use model::{BatchResults, CancelToken, Model, ModelObserver, NoProgress, OptimizationScenario,
                ProgressSink, ScenarioStatus, SimulationScenario};

pub mod report;
pub use report::{LineSupply, ScenarioSummary};

#[cfg(test)]
mod test_utils;
