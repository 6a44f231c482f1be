//! Error taxonomy for a scheduling run.
//!
//! Every failure aborts the whole run. Errors stay structured (kind plus
//! context) so that callers can render targeted guidance and tests can assert
//! on the kind rather than on message text.

use std::time::Duration;

use thiserror::Error;

use crate::catalog::{RoomCategory, StudentId, SubjectId, SubjectType};
use crate::sessions::SessionId;

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Top-level failure of a scheduling run.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no timetable satisfies all constraints; add rooms, slots or instructors")]
    Infeasible,

    #[error("solver found no timetable within {limit:?}; retry with a larger time limit")]
    Timeout { limit: Duration },

    #[error("internal invariant violated: {0}")]
    InternalInvariant(#[from] InvariantViolation),
}

/// Flat tag for [`ScheduleError`], handy for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Infeasible,
    Timeout,
    InternalInvariant,
}

impl ScheduleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleError::Configuration(_) => ErrorKind::Configuration,
            ScheduleError::Infeasible => ErrorKind::Infeasible,
            ScheduleError::Timeout { .. } => ErrorKind::Timeout,
            ScheduleError::InternalInvariant(_) => ErrorKind::InternalInvariant,
        }
    }

    /// A timeout may succeed on a re-run with a larger budget; nothing else will.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ScheduleError::Timeout { .. })
    }
}

/// Problems with the input data, always detected before the solver runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no '{0}' subjects are defined; add at least one to the catalog")]
    MissingSubjectType(SubjectType),

    #[error("no '{0}' rooms are defined; add at least one to the catalog")]
    MissingRoomCategory(RoomCategory),

    #[error("'{category}' room capacities must be greater than 0")]
    NonPositiveCapacity { category: RoomCategory },

    #[error("no time slots are defined; add at least one to the catalog")]
    NoTimeSlots,

    #[error("{0}")]
    InvalidSettings(String),

    #[error("no students have complete elective choices (both PE and OE)")]
    NoEnrolledStudents,

    #[error("no instructor is assigned to teach subject '{subject}' (needed by group '{group}')")]
    NoEligibleInstructor { subject: String, group: String },

    #[error("no '{category}' room holds {group_size} students (needed by group '{group}'); check room capacities")]
    NoEligibleRoom {
        category: RoomCategory,
        group_size: usize,
        group: String,
    },

    #[error("subject {subject} is referenced but missing from the catalog")]
    UnknownSubject { subject: SubjectId },
}

/// Defects. Seeing one of these means a bug, never bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("class '{group}' has no (slot, room, instructor) candidates")]
    SessionWithoutCandidates { session: SessionId, group: String },

    #[error("class '{group}' received {count} assignments instead of exactly one")]
    SessionAssignmentCount {
        session: SessionId,
        group: String,
        count: usize,
    },

    #[error("student {student} has no elective pair but was handed to the partitioner")]
    MissingChoice { student: StudentId },

    #[error("solver returned {got} values for a model with {expected} variables")]
    ValueCountMismatch { expected: usize, got: usize },

    #[error("partition placed {placed} of {expected} students")]
    PartitionCoverage { expected: usize, placed: usize },

    #[error("{resource} double-booked in slot {slot}")]
    DoubleBooking { resource: String, slot: u32 },

    #[error("solver rejected the model as invalid")]
    ModelInvalid,
}
