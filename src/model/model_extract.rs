//! Reading assignments back out of solver values.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::model_context::TimetableModel;
use crate::catalog::{InstructorId, RoomId, SlotId};
use crate::error::{InvariantViolation, ScheduleResult};
use crate::sessions::{Session, SessionId};

/// A session bound to a concrete slot, room and instructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub session: SessionId,
    pub slot: SlotId,
    pub room: RoomId,
    pub instructor: InstructorId,
}

/// Emits one assignment per session from the true variables.
///
/// A session with zero or several true variables means the solver result is
/// corrupt; nothing is returned in that case.
pub fn extract_assignments(
    model: &TimetableModel,
    sessions: &[Session],
    values: &[bool],
) -> ScheduleResult<Vec<Assignment>> {
    if values.len() != model.vars.len() {
        return Err(InvariantViolation::ValueCountMismatch {
            expected: model.vars.len(),
            got: values.len(),
        }
        .into());
    }

    let mut assignments = Vec::with_capacity(model.exactly_one.len());
    for (pos, vars) in model.exactly_one.iter().enumerate() {
        let chosen: Vec<usize> = vars.iter().copied().filter(|&v| values[v]).collect();
        if chosen.len() != 1 {
            let session = sessions.get(pos);
            return Err(InvariantViolation::SessionAssignmentCount {
                session: session.map(|s| s.id).unwrap_or(pos),
                group: session.map(|s| s.group.clone()).unwrap_or_default(),
                count: chosen.len(),
            }
            .into());
        }
        let var = model.vars[chosen[0]];
        assignments.push(Assignment {
            session: var.session,
            slot: var.slot,
            room: var.room,
            instructor: var.instructor,
        });
    }
    Ok(assignments)
}

/// Re-checks a finished assignment list before it may be persisted.
///
/// Every session appears exactly once, and no room, instructor or student is
/// in two classes in the same slot.
pub fn verify_assignments(assignments: &[Assignment], sessions: &[Session]) -> ScheduleResult<()> {
    let by_id: HashMap<SessionId, &Session> = sessions.iter().map(|s| (s.id, s)).collect();

    let mut seen_sessions = HashSet::new();
    let mut rooms: HashSet<(RoomId, SlotId)> = HashSet::new();
    let mut instructors: HashSet<(InstructorId, SlotId)> = HashSet::new();
    let mut students = HashSet::new();

    for a in assignments {
        let Some(session) = by_id.get(&a.session) else {
            return Err(InvariantViolation::SessionAssignmentCount {
                session: a.session,
                group: String::new(),
                count: 1,
            }
            .into());
        };
        if !seen_sessions.insert(a.session) {
            let count = assignments.iter().filter(|b| b.session == a.session).count();
            return Err(InvariantViolation::SessionAssignmentCount {
                session: a.session,
                group: session.group.clone(),
                count,
            }
            .into());
        }
        if !rooms.insert((a.room, a.slot)) {
            return Err(double_booked(format!("room {}", a.room), a.slot));
        }
        if !instructors.insert((a.instructor, a.slot)) {
            return Err(double_booked(format!("instructor {}", a.instructor), a.slot));
        }
        for &student in &session.students {
            if !students.insert((student, a.slot)) {
                return Err(double_booked(format!("student {student}"), a.slot));
            }
        }
    }

    if let Some(missing) = sessions.iter().find(|s| !seen_sessions.contains(&s.id)) {
        return Err(InvariantViolation::SessionAssignmentCount {
            session: missing.id,
            group: missing.group.clone(),
            count: 0,
        }
        .into());
    }
    Ok(())
}

fn double_booked(resource: String, slot: SlotId) -> crate::error::ScheduleError {
    InvariantViolation::DoubleBooking { resource, slot }.into()
}
