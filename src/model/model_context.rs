//! Model builder context: eligibility pre-check and variable registration.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::{Catalog, InstructorId, RoomId, SlotId, StudentId};
use crate::error::{ConfigurationError, InvariantViolation, ScheduleResult};
use crate::sessions::{Session, SessionId};

pub type VarIndex = usize;

/// One boolean decision: `session` runs in `slot`, in `room`, taught by `instructor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecisionVar {
    pub session: SessionId,
    pub slot: SlotId,
    pub room: RoomId,
    pub instructor: InstructorId,
}

/// Anything that can only be in one place per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Student(StudentId),
    Instructor(InstructorId),
    Room(RoomId),
}

/// Variables whose sum is capped at one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtMostOne {
    pub resource: Resource,
    pub slot: SlotId,
    pub vars: Vec<VarIndex>,
}

/// Engine-neutral boolean model.
///
/// `exactly_one[i]` lists the variables of the i-th session; every entry in
/// `at_most_one` is a resource/slot pair reachable by more than one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimetableModel {
    pub vars: Vec<DecisionVar>,
    pub exactly_one: Vec<Vec<VarIndex>>,
    pub at_most_one: Vec<AtMostOne>,
}

impl TimetableModel {
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.exactly_one.len() + self.at_most_one.len()
    }
}

/// Eligible rooms and instructors for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    pub rooms: Vec<RoomId>,
    pub instructors: Vec<InstructorId>,
}

pub struct ModelBuilderContext<'a> {
    pub sessions: &'a [Session],
    pub catalog: &'a Catalog,
    pub candidates: Vec<Candidates>,
    /// Variables registered for each session, by position.
    pub session_vars: Vec<Vec<VarIndex>>,
    pub model: TimetableModel,
    pub student_schedule: BTreeMap<(StudentId, SlotId), Vec<VarIndex>>,
    pub instructor_schedule: BTreeMap<(InstructorId, SlotId), Vec<VarIndex>>,
    pub room_schedule: BTreeMap<(RoomId, SlotId), Vec<VarIndex>>,
}

impl<'a> ModelBuilderContext<'a> {
    /// Runs the pre-check; a session with no qualified instructor or no
    /// fitting room stops the run here, before any variable exists.
    pub fn new(sessions: &'a [Session], catalog: &'a Catalog) -> ScheduleResult<Self> {
        if catalog.slots.is_empty() && !sessions.is_empty() {
            return Err(ConfigurationError::NoTimeSlots.into());
        }
        let candidates = sessions
            .iter()
            .map(|session| eligible(session, catalog))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            sessions,
            catalog,
            candidates,
            session_vars: Vec::new(),
            model: TimetableModel::default(),
            student_schedule: BTreeMap::new(),
            instructor_schedule: BTreeMap::new(),
            room_schedule: BTreeMap::new(),
        })
    }

    /// Registers one variable per (slot, eligible room, eligible instructor)
    /// for every session and indexes it under each resource it occupies.
    pub fn register_variables(&mut self) {
        for (pos, session) in self.sessions.iter().enumerate() {
            let mut own = Vec::new();
            for slot in &self.catalog.slots {
                for &room in &self.candidates[pos].rooms {
                    for &instructor in &self.candidates[pos].instructors {
                        let idx = self.model.vars.len();
                        self.model.vars.push(DecisionVar {
                            session: session.id,
                            slot: slot.id,
                            room,
                            instructor,
                        });
                        own.push(idx);

                        self.instructor_schedule
                            .entry((instructor, slot.id))
                            .or_default()
                            .push(idx);
                        self.room_schedule.entry((room, slot.id)).or_default().push(idx);
                        for &student in &session.students {
                            self.student_schedule
                                .entry((student, slot.id))
                                .or_default()
                                .push(idx);
                        }
                    }
                }
            }
            self.session_vars.push(own);
        }
    }

    pub fn group_of(&self, pos: usize) -> String {
        self.sessions
            .get(pos)
            .map(|s| s.group.clone())
            .unwrap_or_default()
    }

    pub fn into_model(self) -> TimetableModel {
        self.model
    }
}

fn eligible(session: &Session, catalog: &Catalog) -> Result<Candidates, ConfigurationError> {
    let instructors: Vec<InstructorId> = catalog
        .instructors
        .iter()
        .filter(|i| i.can_teach(session.subject))
        .map(|i| i.id)
        .collect();
    if instructors.is_empty() {
        let subject = catalog
            .subject(session.subject)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| session.subject.to_string());
        return Err(ConfigurationError::NoEligibleInstructor {
            subject,
            group: session.group.clone(),
        });
    }

    let rooms: Vec<RoomId> = catalog
        .rooms
        .iter()
        .filter(|r| r.fits(session.room_category, session.group_size()))
        .map(|r| r.id)
        .collect();
    if rooms.is_empty() {
        return Err(ConfigurationError::NoEligibleRoom {
            category: session.room_category,
            group_size: session.group_size(),
            group: session.group.clone(),
        });
    }

    debug!(
        group = %session.group,
        size = session.group_size(),
        instructors = instructors.len(),
        rooms = rooms.len(),
        "class ok"
    );
    Ok(Candidates { rooms, instructors })
}

/// Variables, then session and resource constraints. The eligibility
/// pre-check has already run in [`ModelBuilderContext::new`].
pub fn build_model_pipeline(ctx: &mut ModelBuilderContext<'_>) -> ScheduleResult<()> {
    ctx.register_variables();
    super::add_session_constraints(ctx)?;
    super::add_resource_constraints(ctx);
    Ok(())
}

/// Builds the model for `sessions` against the catalog's slots, rooms and instructors.
pub fn build_model(sessions: &[Session], catalog: &Catalog) -> ScheduleResult<TimetableModel> {
    let mut ctx = ModelBuilderContext::new(sessions, catalog)?;
    build_model_pipeline(&mut ctx)?;
    Ok(ctx.into_model())
}

pub(crate) fn no_candidates(ctx: &ModelBuilderContext<'_>, pos: usize) -> InvariantViolation {
    InvariantViolation::SessionWithoutCandidates {
        session: ctx.sessions.get(pos).map(|s| s.id).unwrap_or(pos),
        group: ctx.group_of(pos),
    }
}
