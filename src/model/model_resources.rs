//! Functions for adding the no-double-booking constraints.
use std::collections::BTreeMap;

use super::model_context::{AtMostOne, ModelBuilderContext, Resource, VarIndex};
use crate::catalog::SlotId;

/// Caps students, instructors and rooms at one class per slot.
///
/// Pairs reachable by a single variable are skipped since they can never
/// exceed one.
pub fn add_resource_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let student = collect(&ctx.student_schedule, Resource::Student);
    let instructor = collect(&ctx.instructor_schedule, Resource::Instructor);
    let room = collect(&ctx.room_schedule, Resource::Room);

    ctx.model.at_most_one.extend(student);
    ctx.model.at_most_one.extend(instructor);
    ctx.model.at_most_one.extend(room);
}

fn collect<K: Copy>(
    schedule: &BTreeMap<(K, SlotId), Vec<VarIndex>>,
    resource: impl Fn(K) -> Resource,
) -> Vec<AtMostOne> {
    schedule
        .iter()
        .filter(|(_, vars)| vars.len() > 1)
        .map(|(&(key, slot), vars)| AtMostOne {
            resource: resource(key),
            slot,
            vars: vars.clone(),
        })
        .collect()
}
