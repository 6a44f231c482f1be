//! Read-only catalog snapshots handed to the scheduler.
//!
//! The storage layer owns these records; a run only borrows them. Besides the
//! plain record types this module derives the per-student elective pair and
//! the deterministic enrolment order both the preview and generate paths
//! depend on.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Weekday};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

pub type StudentId = u32;
pub type SubjectId = u32;
pub type RoomId = u32;
pub type InstructorId = u32;
pub type SlotId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub enrollment_no: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectType {
    Core,
    ProfessionalElective,
    OpenElective,
}

impl SubjectType {
    pub fn label(self) -> &'static str {
        match self {
            SubjectType::Core => "Core",
            SubjectType::ProfessionalElective => "Professional Elective",
            SubjectType::OpenElective => "Open Elective",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

lazy_static! {
    static ref SUBJECT_TYPE_LABELS: HashMap<&'static str, SubjectType> = {
        let mut m = HashMap::new();
        m.insert("core", SubjectType::Core);
        m.insert("professional elective", SubjectType::ProfessionalElective);
        m.insert("pe", SubjectType::ProfessionalElective);
        m.insert("open elective", SubjectType::OpenElective);
        m.insert("oe", SubjectType::OpenElective);
        m
    };
    static ref ROOM_CATEGORY_LABELS: HashMap<&'static str, RoomCategory> = {
        let mut m = HashMap::new();
        m.insert("lecture hall", RoomCategory::LectureHall);
        m.insert("lab", RoomCategory::Lab);
        m
    };
}

impl FromStr for SubjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUBJECT_TYPE_LABELS
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("unknown subject type '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub subject_type: SubjectType,
    pub requires_lab: bool,
}

/// Room category a class can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomCategory {
    LectureHall,
    Lab,
}

impl fmt::Display for RoomCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoomCategory::LectureHall => "Lecture Hall",
            RoomCategory::Lab => "Lab",
        })
    }
}

/// Room type as stored. Only lecture halls and labs can host classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Schedulable(RoomCategory),
    Other(String),
}

impl RoomType {
    pub fn parse(label: &str) -> Self {
        match ROOM_CATEGORY_LABELS.get(label.trim().to_lowercase().as_str()) {
            Some(category) => RoomType::Schedulable(*category),
            None => RoomType::Other(label.trim().to_string()),
        }
    }

    pub fn category(&self) -> Option<RoomCategory> {
        match self {
            RoomType::Schedulable(category) => Some(*category),
            RoomType::Other(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub number: String,
    pub room_type: RoomType,
    pub capacity: u32,
}

impl Room {
    /// Whether this room can host a class of `size` students needing `category`.
    pub fn fits(&self, category: RoomCategory, size: usize) -> bool {
        self.room_type.category() == Some(category) && self.capacity as usize >= size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: InstructorId,
    pub name: String,
    pub subjects: BTreeSet<SubjectId>,
}

impl Instructor {
    pub fn can_teach(&self, subject: SubjectId) -> bool {
        self.subjects.contains(&subject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub day: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn day_name(&self) -> &'static str {
        match self.day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }

    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }
}

/// One chosen elective. A student normally has two rows, one per track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElectiveChoice {
    pub student: StudentId,
    pub subject: SubjectId,
}

/// A student's (professional elective, open elective) combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElectivePair {
    pub professional: SubjectId,
    pub open: SubjectId,
}

impl ElectivePair {
    pub fn new(professional: SubjectId, open: SubjectId) -> Self {
        Self { professional, open }
    }
}

pub type ChoiceMap = BTreeMap<StudentId, ElectivePair>;

/// Everything a run reads, as one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
    pub instructors: Vec<Instructor>,
    pub slots: Vec<TimeSlot>,
    pub choices: Vec<ElectiveChoice>,
}

impl Catalog {
    pub fn subject(&self, id: SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn instructor(&self, id: InstructorId) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == id)
    }

    pub fn slot(&self, id: SlotId) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn subject_map(&self) -> HashMap<SubjectId, &Subject> {
        self.subjects.iter().map(|s| (s.id, s)).collect()
    }

    pub fn subjects_of_type(&self, subject_type: SubjectType) -> Vec<&Subject> {
        self.subjects
            .iter()
            .filter(|s| s.subject_type == subject_type)
            .collect()
    }

    /// Builds the complete-choice map.
    ///
    /// For each student the first professional-elective row and the first
    /// open-elective row (in row order) win. Students missing either track are
    /// left out, as are rows pointing at subjects the catalog does not know or
    /// at core subjects.
    pub fn choice_map(&self) -> ChoiceMap {
        let subjects = self.subject_map();
        let mut partial: BTreeMap<StudentId, (Option<SubjectId>, Option<SubjectId>)> =
            BTreeMap::new();

        for choice in &self.choices {
            let Some(subject) = subjects.get(&choice.subject) else {
                continue;
            };
            let entry = partial.entry(choice.student).or_default();
            match subject.subject_type {
                SubjectType::ProfessionalElective if entry.0.is_none() => entry.0 = Some(subject.id),
                SubjectType::OpenElective if entry.1.is_none() => entry.1 = Some(subject.id),
                _ => {}
            }
        }

        partial
            .into_iter()
            .filter_map(|(student, pair)| match pair {
                (Some(pe), Some(oe)) => Some((student, ElectivePair::new(pe, oe))),
                _ => None,
            })
            .collect()
    }

    /// Complete-choice students present in the roster, sorted by identifier.
    pub fn enrolled_students(&self, choices: &ChoiceMap) -> Vec<StudentId> {
        let mut ids: Vec<StudentId> = self
            .students
            .iter()
            .map(|s| s.id)
            .filter(|id| choices.contains_key(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
