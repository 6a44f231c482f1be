use std::time::Duration;

use tracing::{info, warn};

use super::cp_sat_engine::{EngineOutcome, FeasibilityEngine};
use super::model_context::build_model;
use super::model_extract::{Assignment, extract_assignments, verify_assignments};
use crate::catalog::Catalog;
use crate::error::{InvariantViolation, ScheduleError, ScheduleResult};
use crate::sessions::Session;

/// Places every session, or says why it cannot.
///
/// The pre-check runs first, so a missing instructor or room surfaces as a
/// configuration error and the engine is never called. `time_limit` is the
/// engine's budget and the limit a timeout reports.
pub fn solve_sessions<E: FeasibilityEngine + ?Sized>(
    sessions: &[Session],
    catalog: &Catalog,
    engine: &E,
    time_limit: Duration,
) -> ScheduleResult<Vec<Assignment>> {
    let model = build_model(sessions, catalog)?;
    info!(
        event = "model_built",
        sessions = sessions.len(),
        variables = model.num_vars(),
        constraints = model.num_constraints(),
    );

    match engine.solve(&model, time_limit) {
        EngineOutcome::Solved(values) => {
            let assignments = extract_assignments(&model, sessions, &values)?;
            verify_assignments(&assignments, sessions)?;
            info!(event = "solution_extracted", assignments = assignments.len());
            Ok(assignments)
        }
        EngineOutcome::Infeasible => {
            warn!(event = "infeasible", sessions = sessions.len());
            Err(ScheduleError::Infeasible)
        }
        EngineOutcome::Timeout => {
            warn!(event = "timeout", limit_secs = time_limit.as_secs_f64());
            Err(ScheduleError::Timeout { limit: time_limit })
        }
        EngineOutcome::ModelInvalid => Err(InvariantViolation::ModelInvalid.into()),
    }
}
