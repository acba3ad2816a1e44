use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::config_utils;
use super::geometry::Typology;
use super::line::Line;
use super::optimizer::{self, DesignProblem, OptimizationOutcome};
use super::parameters::{Parameters, NUM_MODES};
use super::report::{self, LineSupply};
use super::Corridor;
use super::CorridorError;


const DEFAULT_LENGTH: f64 = 15.;
const REFERENCE_NAME: &str = "Reference";


/// Receives `(count, total)` after each scenario of a batch completes.  Counts
/// are unique, but reports from parallel scenarios may arrive out of order.
pub trait ProgressSink: Sync {
    fn report(&self, count: usize, total: usize);
}

impl<F> ProgressSink for F
    where F: Fn(usize, usize) + Sync
{
    fn report(&self, count: usize, total: usize) {
        self(count, total);
    }
}

/// Ignores progress.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _count: usize, _total: usize) {}
}

/// Stops a running batch before its next scenario.  Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        return CancelToken::default();
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        return self.flag.load(Ordering::SeqCst);
    }
}

/// Told when the scenarios and results it may be showing have been discarded.
pub trait ModelObserver: Send + Sync {
    fn scenarios_reset(&self);
}


#[derive(Clone, Debug)]
pub struct SimulationScenario {
    pub corridor: Corridor,
    pub elasticity: bool,
}

/// The corridor holds the lines that stay fixed; `optimized_lines` are the lines
/// whose free variables are searched.
#[derive(Clone, Debug)]
pub struct OptimizationScenario {
    pub corridor: Corridor,
    pub optimized_lines: Vec<Line>,
    pub elasticity: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioStatus {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub objective: f64,
    pub iterations: u64,
}

#[derive(Clone, Debug, Default)]
pub struct BatchResults {
    pub simulation_results: Vec<Corridor>,
    pub optimization_results: Vec<Corridor>,
    pub outcomes: Vec<ScenarioStatus>,
    // some scenarios were skipped
    pub cancelled: bool,
}


/// A reference corridor and the scenarios compared against it.
///
/// Scenario corridors always share the reference's zoning: demand and length
/// edits are applied to all of them, and a typology change discards them.
pub struct Model {
    pub params: Parameters,
    reference: Corridor,
    simulations: Vec<SimulationScenario>,
    optimizations: Vec<OptimizationScenario>,
    results: BatchResults,
    observers: Vec<Box<dyn ModelObserver>>,
}

impl Model {
    pub fn new(params: Parameters, reference: Corridor) -> Model {
        return Model {
            params,
            reference,
            simulations: vec![],
            optimizations: vec![],
            results: BatchResults::default(),
            observers: vec![],
        };
    }

    /// Reads a scenario file: the parameters, the reference corridor with its
    /// demand and lines, and the simulation and optimization scenarios.
    pub fn from_cfg<P: AsRef<Path>>(cfg_path: P) -> Result<Model, CorridorError> {
        let cfg_path = cfg_path.as_ref();
        let yaml_cfg = config_utils::load_yaml(cfg_path)?;
        let cfg_dir = cfg_path.parent().unwrap_or_else(|| Path::new("."));

        // parameters are given inline, or as the path to a file of their own
        let params_cfg = &yaml_cfg["parameters"];
        let params = match params_cfg.as_str() {
            Some(params_path) => {
                let params_path = config_utils::str_to_absolute_path(params_path, cfg_dir);
                Parameters::from_yaml(&config_utils::load_yaml(&params_path)?)?
            },
            None => Parameters::from_yaml(params_cfg)?,
        };

        let corridor_cfg = &yaml_cfg["corridor"];
        let name = config_utils::get_opt_str(corridor_cfg, "name")?.unwrap_or(REFERENCE_NAME);
        let length = config_utils::get_opt_f64(corridor_cfg, "length")?.unwrap_or(DEFAULT_LENGTH);
        let typology = match config_utils::get_opt_str(corridor_cfg, "typology")? {
            Some(typo_name) => Typology::from_name(typo_name).ok_or_else(||
                CorridorError::Config(format!("unknown typology {:?}", typo_name)))?,
            None => Typology::Homogeneous,
        };
        let mut reference = Corridor::new(name, length, typology)?;
        for (origin, dest, demand) in config_utils::demand_from_yaml(corridor_cfg, "demand")? {
            reference.set_od(origin, dest, demand)?;
        }
        for line in config_utils::lines_from_yaml(corridor_cfg, "lines", &params,
                                                  reference.geometry())? {
            reference.add_line(line)?;
        }

        let mut model = Model::new(params, reference);
        for sim_cfg in config_utils::get_list(&yaml_cfg, "simulations")? {
            let corridor = model.scenario_corridor(sim_cfg, "lines")?;
            let elasticity = config_utils::get_opt_bool(sim_cfg, "elasticity")?.unwrap_or(false);
            model.add_simulation(corridor, elasticity)?;
        }
        for opt_cfg in config_utils::get_list(&yaml_cfg, "optimizations")? {
            let corridor = model.scenario_corridor(opt_cfg, "fixed_lines")?;
            let optimized_lines = config_utils::lines_from_yaml(
                opt_cfg, "optimized_lines", &model.params, model.reference.geometry())?;
            let elasticity = config_utils::get_opt_bool(opt_cfg, "elasticity")?.unwrap_or(false);
            model.add_optimization(corridor, optimized_lines, elasticity)?;
        }

        log::info!("loaded {} simulations and {} optimizations from {}",
                   model.simulations.len(), model.optimizations.len(), cfg_path.display());
        return Ok(model);
    }

    // a copy of the reference demand carrying the lines listed under `lines_key`
    fn scenario_corridor(&self, yaml_cfg: &yaml_rust::Yaml, lines_key: &str)
                         -> Result<Corridor, CorridorError> {
        let name = config_utils::get_opt_str(yaml_cfg, "name")?.ok_or_else(||
            CorridorError::Config(String::from("a scenario needs a name")))?;
        let mut corridor = self.reference.duplicate(name);
        for line in config_utils::lines_from_yaml(yaml_cfg, lines_key, &self.params,
                                                  self.reference.geometry())? {
            corridor.add_line(line)?;
        }
        return Ok(corridor);
    }

    pub fn reference(&self) -> &Corridor {
        return &self.reference;
    }

    pub fn add_reference_line(&mut self, line: Line) -> Result<(), CorridorError> {
        return self.reference.add_line(line);
    }

    pub fn simulations(&self) -> &[SimulationScenario] {
        return &self.simulations;
    }

    pub fn optimizations(&self) -> &[OptimizationScenario] {
        return &self.optimizations;
    }

    fn check_zoning(&self, corridor: &Corridor) -> Result<(), CorridorError> {
        if corridor.geometry() != self.reference.geometry() {
            return Err(CorridorError::geometry_mismatch(self.reference.geometry(),
                                                        corridor.geometry()));
        }
        return Ok(());
    }

    pub fn add_simulation(&mut self, corridor: Corridor, elasticity: bool)
                          -> Result<(), CorridorError> {
        self.check_zoning(&corridor)?;
        self.simulations.push(SimulationScenario{corridor, elasticity});
        return Ok(());
    }

    pub fn add_optimization(&mut self, corridor: Corridor, optimized_lines: Vec<Line>,
                            elasticity: bool) -> Result<(), CorridorError> {
        self.check_zoning(&corridor)?;
        for line in &optimized_lines {
            line.check_zones(corridor.geometry())?;
        }
        self.optimizations.push(OptimizationScenario{corridor, optimized_lines, elasticity});
        return Ok(());
    }

    pub fn remove_simulation(&mut self, index: usize) -> Option<SimulationScenario> {
        if index < self.simulations.len() {
            return Some(self.simulations.remove(index));
        }
        return None;
    }

    pub fn remove_optimization(&mut self, index: usize) -> Option<OptimizationScenario> {
        if index < self.optimizations.len() {
            return Some(self.optimizations.remove(index));
        }
        return None;
    }

    pub fn add_observer(&mut self, observer: Box<dyn ModelObserver>) {
        self.observers.push(observer);
    }

    pub fn results(&self) -> &BatchResults {
        return &self.results;
    }

    fn corridors_mut(&mut self) -> impl Iterator<Item = &mut Corridor> {
        return std::iter::once(&mut self.reference)
            .chain(self.simulations.iter_mut().map(|sim| &mut sim.corridor))
            .chain(self.optimizations.iter_mut().map(|opt| &mut opt.corridor));
    }

    /// Changes the length of the reference and of every scenario corridor.
    pub fn set_length(&mut self, length: f64) -> Result<(), CorridorError> {
        for corridor in self.corridors_mut() {
            corridor.set_length(length)?;
        }
        return Ok(());
    }

    /// Changes one OD's demand in the reference and in every scenario corridor.
    pub fn set_od(&mut self, origin: usize, dest: usize, demand: f64)
                  -> Result<(), CorridorError> {
        for corridor in self.corridors_mut() {
            corridor.set_od(origin, dest, demand)?;
        }
        return Ok(());
    }

    /// Rezones the reference.  This discards its demand and lines, every
    /// scenario and every result, and tells the observers.
    pub fn set_typology(&mut self, typology: Typology) -> Result<(), CorridorError> {
        if self.reference.reset_typology(typology)? {
            log::warn!("typology set to {}: demand and lines were reset", typology.name());
        }
        self.simulations.clear();
        self.optimizations.clear();
        self.results = BatchResults::default();
        for observer in &self.observers {
            observer.scenarios_reset();
        }
        return Ok(());
    }

    /// Supply rows of the reference, under a copy of the parameters with other
    /// mode constants.  The model's own parameters are left alone.
    pub fn logit_preview(&self, alpha: [f64; NUM_MODES]) -> Vec<LineSupply> {
        let params = self.params.with_alphas(alpha);
        return report::line_supply_rows(&params, &self.reference);
    }

    /// Evaluates all simulation scenarios, then all optimization scenarios, each
    /// stage in parallel.  Results come back in registry order.
    pub fn calculate(&mut self, progress: &dyn ProgressSink, cancel: Option<&CancelToken>)
                     -> &BatchResults {
        let total = self.simulations.len() + self.optimizations.len();
        log::info!("calculating {} simulations and {} optimizations",
                   self.simulations.len(), self.optimizations.len());
        let counter = AtomicUsize::new(0);
        let is_cancelled = || cancel.map_or(false, |token| token.is_cancelled());
        let report_done = || {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            progress.report(count, total);
        };

        let params = &self.params;
        let reference = &self.reference;

        let simulated: Vec<Option<Corridor>> = self.simulations.par_iter()
            .map(|sim| {
                if is_cancelled() {
                    return None;
                }
                let corridor = simulate(params, reference, sim);
                log::info!("simulated {}", corridor.name);
                report_done();
                return Some(corridor);
            })
            .collect();

        let optimized: Vec<Option<OptimizationOutcome>> = self.optimizations.par_iter()
            .map(|opt| {
                if is_cancelled() {
                    return None;
                }
                let outcome = run_optimization(params, reference, opt);
                log::info!("optimized {}: success {}, objective {}", outcome.name,
                           outcome.success, outcome.objective);
                report_done();
                return Some(outcome);
            })
            .collect();

        let mut results = BatchResults::default();
        results.cancelled = simulated.iter().any(Option::is_none)
            || optimized.iter().any(Option::is_none);
        results.simulation_results = simulated.into_iter().flatten().collect();
        for outcome in optimized.into_iter().flatten() {
            results.outcomes.push(ScenarioStatus {
                name: outcome.name,
                success: outcome.success,
                message: outcome.message,
                objective: outcome.objective,
                iterations: outcome.iterations,
            });
            results.optimization_results.push(outcome.corridor);
        }

        if results.cancelled {
            log::warn!("batch cancelled after {} of {} scenarios",
                       counter.load(Ordering::SeqCst), total);
        } else {
            log::info!("batch done");
        }
        self.results = results;
        return &self.results;
    }
}

impl Default for Model {
    fn default() -> Model {
        // the default length and typology always make a valid corridor
        let reference = match Corridor::new(REFERENCE_NAME, DEFAULT_LENGTH, Typology::Homogeneous) {
            Ok(corridor) => corridor,
            Err(err) => panic!("default corridor is invalid: {}", err),
        };
        return Model::new(Parameters::default(), reference);
    }
}


/// The scenario's corridor, with its demand responding to the change of lines
/// from the reference when elasticity is on.
pub fn simulate(params: &Parameters, reference: &Corridor, sim: &SimulationScenario)
                -> Corridor {
    let mut corridor = sim.corridor.clone();
    if sim.elasticity {
        corridor.replace_demand(reference.elastic_demand(params, sim.corridor.lines()));
    }
    return corridor;
}

pub fn run_optimization(params: &Parameters, reference: &Corridor, opt: &OptimizationScenario)
                        -> OptimizationOutcome {
    let name = &opt.corridor.name;
    let problem = DesignProblem::new(name, params, reference, &opt.corridor,
                                     &opt.optimized_lines, opt.elasticity);
    match problem {
        Ok(problem) => optimizer::optimize(&problem),
        Err(err) => {
            log::warn!("{}: cannot optimize: {}", name, err);
            OptimizationOutcome {
                name: name.clone(),
                success: false,
                message: err.to_string(),
                objective: f64::NAN,
                iterations: 0,
                design: vec![],
                corridor: opt.corridor.clone(),
            }
        },
    }
}
