use argmin::core::{CostFunction, Error as ArgminError, Executor, Gradient, State,
                   TerminationReason, TerminationStatus};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use finitediff::FiniteDiff;

use super::line::{FreeVariable, Line};
use super::parameters::Parameters;
use super::Corridor;
use super::CorridorError;


const LBFGS_MEMORY: usize = 10;
const GRAD_TOLERANCE: f64 = 1e-5;
const COST_TOLERANCE: f64 = 2.2e-9;
const MAX_ITERS: u64 = 500;
// weight of the squared distance between the solver's iterate and its projection
const BOUND_PENALTY: f64 = 1e6;


/// One entry of the design vector: a free variable of one of the optimized lines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignSlot {
    pub line: usize,
    pub free_var: FreeVariable,
}

/// Squared excess of each line's share of the peak load over its hourly capacity,
/// summed over the lines.  A line's share of the peak is its share of the total
/// demand.
pub fn capacity_malus(params: &Parameters, corridor: &Corridor) -> f64 {
    let total_demand = corridor.total_demand();
    if total_demand == 0. {
        return 0.;
    }
    let peak_load = corridor.max_load();
    return corridor.lines().iter()
        .zip(corridor.line_demands(params))
        .map(|(line, demand)| {
            let excess = (demand / total_demand * peak_load - line.hourly_capacity()).max(0.);
            excess * excess
        })
        .sum();
}


/// The search for the free variables of some lines, run on top of a baseline
/// corridor whose own lines stay fixed.
///
/// Evaluating the objective never touches the corridors it was built from: each
/// evaluation works on a fresh candidate corridor.
pub struct DesignProblem<'a> {
    name: String,
    params: &'a Parameters,
    reference: &'a Corridor,
    baseline: &'a Corridor,
    optimized: &'a [Line],
    elasticity: bool,
    slots: Vec<DesignSlot>,
}

impl<'a> DesignProblem<'a> {
    /// `reference` is the system the elastic demand and the surplus are measured
    /// against.  It must share the baseline's geometry, and the optimized lines
    /// must fit it.
    pub fn new(name: &str, params: &'a Parameters, reference: &'a Corridor,
               baseline: &'a Corridor, optimized: &'a [Line], elasticity: bool)
               -> Result<DesignProblem<'a>, CorridorError> {
        if reference.geometry() != baseline.geometry() {
            return Err(CorridorError::geometry_mismatch(reference.geometry(),
                                                        baseline.geometry()));
        }
        for line in optimized {
            line.check_zones(baseline.geometry())?;
        }

        // lines in order, and each line's free variables are kept sorted with
        // the frequency first and the spacings by zone
        let slots = optimized.iter().enumerate()
            .flat_map(|(li, line)| line.free_variables().iter()
                      .map(move |fv| DesignSlot{line: li, free_var: *fv}))
            .collect();

        return Ok(DesignProblem {
            name: String::from(name),
            params,
            reference,
            baseline,
            optimized,
            elasticity,
            slots,
        });
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }

    pub fn dimension(&self) -> usize {
        return self.slots.len();
    }

    pub fn slots(&self) -> &[DesignSlot] {
        return &self.slots;
    }

    pub fn bounds(&self) -> Vec<(f64, f64)> {
        return self.slots.iter().map(|slot| (slot.free_var.min, slot.free_var.max)).collect();
    }

    /// The lines' current values, moved into their bounds.
    pub fn initial_design(&self) -> Vec<f64> {
        return self.slots.iter()
            .map(|slot| {
                let value = self.optimized[slot.line].get(slot.free_var.variable);
                slot.free_var.clamp(value)
            })
            .collect();
    }

    /// The corridor obtained by giving the free variables the values in `design`:
    /// the optimized lines first, then the baseline's own lines.  With elasticity
    /// on, the demand is the reference demand's response to the new lines.
    pub fn build_candidate(&self, design: &[f64]) -> Corridor {
        let mut lines = self.optimized.to_vec();
        for (slot, value) in self.slots.iter().zip(design) {
            lines[slot.line].set(slot.free_var.variable, *value);
        }
        lines.extend(self.baseline.lines().iter().cloned());

        let mut candidate = self.baseline.duplicate(&self.baseline.name);
        if self.elasticity {
            candidate.replace_demand(self.reference.elastic_demand(self.params, &lines));
        }
        for line in lines {
            candidate.push_line(line);
        }
        return candidate;
    }

    /// The value to minimise: minus the total surplus over the reference with
    /// elasticity on, the total cost without, plus the capacity malus.
    pub fn objective(&self, design: &[f64]) -> f64 {
        let candidate = self.build_candidate(design);
        return self.candidate_objective(&candidate);
    }

    fn candidate_objective(&self, candidate: &Corridor) -> f64 {
        let malus = capacity_malus(self.params, candidate);
        if self.elasticity {
            return -self.reference.total_surplus(self.params, candidate) + malus;
        } else {
            return candidate.total_cost(self.params) + malus;
        }
    }

    fn project(&self, unbounded: &[f64]) -> Vec<f64> {
        return self.slots.iter().zip(unbounded)
            .map(|(slot, value)| slot.free_var.clamp(*value))
            .collect();
    }
}


/// What the search produced for one scenario.  The corridor is the best design
/// found, even when the solver did not converge.
#[derive(Clone, Debug)]
pub struct OptimizationOutcome {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub objective: f64,
    pub iterations: u64,
    pub design: Vec<f64>,
    pub corridor: Corridor,
}


// The solver searches over an unbounded vector; the objective is read at its
// projection into the bounds, plus a penalty pulling the iterate back inside.
struct ProjectedObjective<'p, 'a> {
    problem: &'p DesignProblem<'a>,
}

impl<'p, 'a> ProjectedObjective<'p, 'a> {
    fn penalized(&self, unbounded: &Vec<f64>) -> f64 {
        let design = self.problem.project(unbounded);
        let outside: f64 = unbounded.iter().zip(&design).map(|(yy, xx)| (yy - xx).powi(2)).sum();
        return self.problem.objective(&design) + BOUND_PENALTY * outside;
    }
}

impl<'p, 'a> CostFunction for ProjectedObjective<'p, 'a> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, ArgminError> {
        return Ok(self.penalized(param));
    }
}

impl<'p, 'a> Gradient for ProjectedObjective<'p, 'a> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, ArgminError> {
        return Ok(param.central_diff(&|yy: &Vec<f64>| self.penalized(yy)));
    }
}

struct SolverReport {
    design: Vec<f64>,
    iterations: u64,
    success: bool,
    message: String,
}

fn run_lbfgs(problem: &DesignProblem, x0: Vec<f64>) -> Result<SolverReport, ArgminError> {
    let linesearch: MoreThuenteLineSearch<Vec<f64>, Vec<f64>, f64> = MoreThuenteLineSearch::new();
    let solver = LBFGS::new(linesearch, LBFGS_MEMORY)
        .with_tolerance_grad(GRAD_TOLERANCE)?
        .with_tolerance_cost(COST_TOLERANCE)?;
    let result = Executor::new(ProjectedObjective{problem}, solver)
        .configure(|state| state.param(x0.clone()).max_iters(MAX_ITERS))
        .run()?;

    let state = result.state();
    let best = match state.get_best_param() {
        Some(param) => param.clone(),
        None => x0,
    };
    let (success, message) = match state.get_termination_status() {
        TerminationStatus::Terminated(reason) => {
            let success = match reason {
                TerminationReason::SolverConverged | TerminationReason::TargetCostReached => true,
                _ => false,
            };
            (success, String::from(reason.text()))
        },
        TerminationStatus::NotTerminated => (false, String::from("solver did not terminate")),
    };
    return Ok(SolverReport {
        design: problem.project(&best),
        iterations: state.get_iter(),
        success,
        message,
    });
}

/// Searches the free variables for the design with the lowest objective, within
/// their bounds.  Solver failures are reported in the outcome, along with the
/// best design reached.
pub fn optimize(problem: &DesignProblem) -> OptimizationOutcome {
    let x0 = problem.initial_design();
    let initial_objective = problem.objective(&x0);

    let report = if problem.dimension() == 0 {
        log::debug!("{}: no free variable, evaluating the design as is", problem.name());
        SolverReport {
            design: x0,
            iterations: 0,
            success: true,
            message: String::from("no free variable"),
        }
    } else if !initial_objective.is_finite() {
        log::warn!("{}: objective is {} at the initial design", problem.name(),
                   initial_objective);
        SolverReport {
            design: x0,
            iterations: 0,
            success: false,
            message: format!("objective is {} at the initial design", initial_objective),
        }
    } else {
        log::debug!("{}: searching {} variables within {:?}", problem.name(),
                    problem.dimension(), problem.bounds());
        match run_lbfgs(problem, x0.clone()) {
            Ok(report) => report,
            Err(err) => SolverReport {
                design: x0,
                iterations: 0,
                success: false,
                message: err.to_string(),
            },
        }
    };

    let corridor = problem.build_candidate(&report.design);
    let objective = problem.candidate_objective(&corridor);
    if report.success {
        log::debug!("{}: objective {} -> {} after {} iterations", problem.name(),
                    initial_objective, objective, report.iterations);
    } else {
        log::warn!("{}: search failed: {}", problem.name(), report.message);
    }

    return OptimizationOutcome {
        name: String::from(problem.name()),
        success: report.success,
        message: report.message,
        objective,
        iterations: report.iterations,
        design: report.design,
        corridor,
    };
}
