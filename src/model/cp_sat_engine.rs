use std::time::Duration;

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};
use tracing::info;

use super::model_context::{TimetableModel, VarIndex};
use crate::config::SchedulerConfig;

/// What an engine reports back for a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineOutcome {
    /// One value per model variable.
    Solved(Vec<bool>),
    Infeasible,
    /// Budget exhausted without a solution or a proof.
    Timeout,
    ModelInvalid,
}

/// A boolean feasibility engine the timetable model can be handed to.
pub trait FeasibilityEngine {
    /// Searches for a solution within `time_limit`.
    fn solve(&self, model: &TimetableModel, time_limit: Duration) -> EngineOutcome;
}

/// Google OR-Tools CP-SAT through the `cp_sat` bindings.
///
/// A fresh `CpModelBuilder` is created per call; nothing is shared between runs.
/// Workers, seed and stopping rule come from the config; the time budget is
/// given per call.
#[derive(Debug, Clone)]
pub struct CpSatEngine {
    params: SatParameters,
}

impl CpSatEngine {
    pub fn new(config: &SchedulerConfig) -> Self {
        let mut params = SatParameters::default();
        params.num_search_workers = Some(config.num_search_workers);
        params.stop_after_first_solution = Some(config.stop_after_first_solution);
        params.log_search_progress = Some(false);
        if let Some(seed) = config.random_seed {
            params.random_seed = Some(seed);
        }
        Self { params }
    }
}

impl FeasibilityEngine for CpSatEngine {
    fn solve(&self, model: &TimetableModel, time_limit: Duration) -> EngineOutcome {
        let mut params = self.params.clone();
        params.max_time_in_seconds = Some(time_limit.as_secs_f64());

        let mut builder = CpModelBuilder::default();
        let vars: Vec<BoolVar> = (0..model.num_vars()).map(|_| builder.new_bool_var()).collect();

        for group in &model.exactly_one {
            builder.add_eq(sum_of(&vars, group), LinearExpr::from(1));
        }
        for cap in &model.at_most_one {
            builder.add_le(sum_of(&vars, &cap.vars), LinearExpr::from(1));
        }

        let response = builder.solve_with_parameters(&params);
        let status = response.status();
        info!(event = "solve_end", status = ?status);

        match status {
            CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
                EngineOutcome::Solved(vars.iter().map(|v| v.solution_value(&response)).collect())
            }
            CpSolverStatus::Infeasible => EngineOutcome::Infeasible,
            CpSolverStatus::ModelInvalid => EngineOutcome::ModelInvalid,
            _ => EngineOutcome::Timeout,
        }
    }
}

fn sum_of(vars: &[BoolVar], indices: &[VarIndex]) -> LinearExpr {
    let mut expr = LinearExpr::from(0);
    for &i in indices {
        expr = expr + LinearExpr::from(vars[i].clone());
    }
    expr
}
