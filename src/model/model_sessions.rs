//! Every class must be placed exactly once.
use super::model_context::{ModelBuilderContext, no_candidates};
use crate::error::ScheduleResult;

/// Adds one exactly-one group per session over its registered variables.
///
/// An empty list cannot happen after the pre-check; if it does, the model is
/// not handed to a solver.
pub fn add_session_constraints(ctx: &mut ModelBuilderContext<'_>) -> ScheduleResult<()> {
    if let Some(pos) = ctx.session_vars.iter().position(|vars| vars.is_empty()) {
        return Err(no_candidates(ctx, pos).into());
    }
    let groups = std::mem::take(&mut ctx.session_vars);
    ctx.model.exactly_one.extend(groups);
    Ok(())
}
