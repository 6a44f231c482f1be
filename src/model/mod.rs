//! Constraint model building and solving for the timetable.

mod cp_sat_engine;
mod model_context;
mod model_extract;
mod model_resources;
mod model_sessions;
mod schedule_solve;

pub use cp_sat_engine::{CpSatEngine, EngineOutcome, FeasibilityEngine};
pub use model_context::{
    AtMostOne, Candidates, DecisionVar, ModelBuilderContext, Resource, TimetableModel, VarIndex,
    build_model, build_model_pipeline,
};
pub use model_extract::{Assignment, extract_assignments, verify_assignments};
use model_resources::*;
use model_sessions::*;
pub use schedule_solve::*;
