//! One scheduling run, end to end.
//!
//! partition → build sessions → build and solve the model → assemble.
//! [`plan`] is shared with the reporting functions so a preview and the run
//! that follows it see identical divisions and batches.

use tracing::info;

use crate::catalog::{Catalog, ChoiceMap, StudentId};
use crate::config::SchedulerConfig;
use crate::error::{ConfigurationError, ScheduleResult};
use crate::model::{Assignment, FeasibilityEngine, solve_sessions};
use crate::partition::{Division, PartitionParams, partition};
use crate::sessions::{Session, build_sessions};
use crate::timetable::{Timetable, assemble};

/// Divisions and batches plus the inputs that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub choices: ChoiceMap,
    pub enrolled: Vec<StudentId>,
    pub params: PartitionParams,
    pub divisions: Vec<Division>,
}

impl PartitionPlan {
    pub fn batch_count(&self) -> usize {
        self.divisions.iter().map(|d| d.batches.len()).sum()
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct ScheduleRun {
    pub plan: PartitionPlan,
    pub sessions: Vec<Session>,
    pub assignments: Vec<Assignment>,
    pub timetable: Timetable,
}

/// Derives capacities, the complete-choice roster and the partition.
///
/// An empty roster is not an error here; it yields no divisions.
pub fn plan(catalog: &Catalog, config: &SchedulerConfig) -> ScheduleResult<PartitionPlan> {
    let params = PartitionParams::from_rooms(&catalog.rooms, config.min_batch_size)?;
    let choices = catalog.choice_map();
    let enrolled = catalog.enrolled_students(&choices);
    let divisions = partition(&enrolled, &choices, &params)?;

    Ok(PartitionPlan {
        choices,
        enrolled,
        params,
        divisions,
    })
}

/// Runs the whole pipeline against `engine`.
///
/// Nothing is written anywhere; the caller persists [`ScheduleRun::timetable`]
/// only after this returns `Ok`.
pub fn generate_timetable<E: FeasibilityEngine + ?Sized>(
    catalog: &Catalog,
    config: &SchedulerConfig,
    engine: &E,
) -> ScheduleResult<ScheduleRun> {
    config
        .validate()
        .map_err(|e| ConfigurationError::InvalidSettings(e.to_string()))?;
    let plan = plan(catalog, config)?;
    if plan.enrolled.is_empty() {
        return Err(ConfigurationError::NoEnrolledStudents.into());
    }
    info!(
        event = "partition",
        students = plan.enrolled.len(),
        divisions = plan.divisions.len(),
        batches = plan.batch_count(),
        max_lecture_capacity = plan.params.max_lecture_capacity,
        max_lab_capacity = plan.params.max_lab_capacity,
        target_batch_size = plan.params.target_batch_size(),
    );

    let sessions = build_sessions(&plan.divisions, catalog)?;
    info!(event = "sessions", sessions = sessions.len());

    let assignments = solve_sessions(&sessions, catalog, engine, config.time_limit())?;
    let timetable = assemble(&assignments, &sessions)?;
    info!(event = "timetable", entries = timetable.len());

    Ok(ScheduleRun {
        plan,
        sessions,
        assignments,
        timetable,
    })
}
