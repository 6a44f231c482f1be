//! Expands the curriculum into the flat list of classes to place.
//!
//! Each [`Session`] needs exactly one (slot, room, instructor) triple. Rules,
//! in id order:
//!
//! 1. one lecture per division for every core subject without a lab;
//! 2. one lecture per division for every professional elective and every open
//!    elective chosen in it, attended by all batches taking that elective;
//! 3. per batch, a lab for its professional elective and open elective when
//!    they need one, plus a lab for every core subject that needs one.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, RoomCategory, StudentId, Subject, SubjectId, SubjectType};
use crate::error::{ConfigurationError, ScheduleResult};
use crate::partition::{Batch, Division};

pub type SessionId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub subject: SubjectId,
    pub group: String,
    pub students: Vec<StudentId>,
    pub room_category: RoomCategory,
}

impl Session {
    pub fn group_size(&self) -> usize {
        self.students.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Track {
    Professional,
    Open,
}

impl Track {
    fn subject_of(self, batch: &Batch) -> SubjectId {
        match self {
            Track::Professional => batch.electives.professional,
            Track::Open => batch.electives.open,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Track::Professional => "PE",
            Track::Open => "OE",
        }
    }
}

struct SessionList {
    sessions: Vec<Session>,
}

impl SessionList {
    fn push(&mut self, subject: SubjectId, group: String, students: Vec<StudentId>, room_category: RoomCategory) {
        let id = self.sessions.len();
        self.sessions.push(Session {
            id,
            subject,
            group,
            students,
            room_category,
        });
    }
}

/// Builds every session for the given divisions.
///
/// Fails before building anything if any of the three subject types is
/// missing from the catalog, or if a batch points at an unknown subject.
pub fn build_sessions(divisions: &[Division], catalog: &Catalog) -> ScheduleResult<Vec<Session>> {
    for subject_type in [
        SubjectType::Core,
        SubjectType::ProfessionalElective,
        SubjectType::OpenElective,
    ] {
        if catalog.subjects_of_type(subject_type).is_empty() {
            return Err(ConfigurationError::MissingSubjectType(subject_type).into());
        }
    }

    let subjects = catalog.subject_map();
    let lookup = |id: SubjectId| {
        subjects
            .get(&id)
            .copied()
            .ok_or(ConfigurationError::UnknownSubject { subject: id })
    };
    let core = catalog.subjects_of_type(SubjectType::Core);
    let (core_labs, core_lectures): (Vec<&Subject>, Vec<&Subject>) =
        core.into_iter().partition(|s| s.requires_lab);

    let mut list = SessionList { sessions: Vec::new() };

    for division in divisions {
        for subject in &core_lectures {
            list.push(
                subject.id,
                format!("Div-{} ({} Lec)", division.name, subject.name),
                division.students.clone(),
                RoomCategory::LectureHall,
            );
        }
    }

    for division in divisions {
        for track in [Track::Professional, Track::Open] {
            for (subject_id, students) in group_by_elective(&division.batches, track) {
                let subject = lookup(subject_id)?;
                list.push(
                    subject_id,
                    format!("Div-{} ({} {} Lec)", division.name, subject.name, track.tag()),
                    students,
                    RoomCategory::LectureHall,
                );
            }
        }
    }

    for division in divisions {
        for batch in &division.batches {
            for track in [Track::Professional, Track::Open] {
                let subject = lookup(track.subject_of(batch))?;
                if subject.requires_lab {
                    list.push(
                        subject.id,
                        format!("Batch {} ({} {} Lab)", batch.name, subject.name, track.tag()),
                        batch.students.clone(),
                        RoomCategory::Lab,
                    );
                }
            }
            for subject in &core_labs {
                list.push(
                    subject.id,
                    format!("Batch {} ({} Lab)", batch.name, subject.name),
                    batch.students.clone(),
                    RoomCategory::Lab,
                );
            }
        }
    }

    Ok(list.sessions)
}

/// Groups batches by the elective they take on `track`, first-seen order,
/// with the distinct union of their students.
fn group_by_elective(batches: &[Batch], track: Track) -> Vec<(SubjectId, Vec<StudentId>)> {
    let mut groups: Vec<(SubjectId, Vec<StudentId>)> = Vec::new();
    let mut index: HashMap<SubjectId, usize> = HashMap::new();
    let mut seen: HashSet<(SubjectId, StudentId)> = HashSet::new();

    for batch in batches {
        let subject = track.subject_of(batch);
        let slot = *index.entry(subject).or_insert_with(|| {
            groups.push((subject, Vec::new()));
            groups.len() - 1
        });
        for &student in &batch.students {
            if seen.insert((subject, student)) {
                groups[slot].1.push(student);
            }
        }
    }
    groups
}
