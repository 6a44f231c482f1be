//! Turns solver assignments into timetable rows.
//!
//! Rows carry only foreign keys plus the group label, ready to persist. The
//! flattened [`TimetableEntryView`] resolves those keys into names for display.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use savefile::load_file;
use savefile_derive::Savefile;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::catalog::{Catalog, InstructorId, RoomId, SlotId, SubjectId};
use crate::error::{InvariantViolation, ScheduleResult};
use crate::model::Assignment;
use crate::sessions::Session;

/// Snapshot format version for [`Timetable::save`].
pub const TIMETABLE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Savefile)]
pub struct TimetableEntry {
    pub class_id: u32,
    pub subject: SubjectId,
    pub instructor: InstructorId,
    pub room: RoomId,
    pub slot: SlotId,
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Savefile)]
pub struct Timetable {
    pub entries: Vec<TimetableEntry>,
}

/// A timetable row with names resolved, as a browser client renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntryView {
    pub class_id: u32,
    pub group_name: String,
    pub subject_name: String,
    pub instructor_name: String,
    pub room_number: String,
    pub day_of_week: String,
    pub start_time: String,
}

/// Maps each assignment to a row, numbering classes from 1.
pub fn assemble(assignments: &[Assignment], sessions: &[Session]) -> ScheduleResult<Timetable> {
    let mut entries = Vec::with_capacity(assignments.len());
    for (i, a) in assignments.iter().enumerate() {
        let session = sessions.iter().find(|s| s.id == a.session).ok_or_else(|| {
            InvariantViolation::SessionAssignmentCount {
                session: a.session,
                group: String::new(),
                count: 1,
            }
        })?;
        entries.push(TimetableEntry {
            class_id: i as u32 + 1,
            subject: session.subject,
            instructor: a.instructor,
            room: a.room,
            slot: a.slot,
            group: session.group.clone(),
        });
    }
    Ok(Timetable { entries })
}

impl Timetable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for_group<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a TimetableEntry> {
        self.entries.iter().filter(move |e| e.group == label)
    }

    /// Resolves every row against the catalog. Unknown keys render as "N/A".
    pub fn flatten(&self, catalog: &Catalog) -> Vec<TimetableEntryView> {
        const NA: &str = "N/A";
        self.entries
            .iter()
            .map(|e| {
                let slot = catalog.slot(e.slot);
                TimetableEntryView {
                    class_id: e.class_id,
                    group_name: e.group.clone(),
                    subject_name: catalog
                        .subject(e.subject)
                        .map_or_else(|| NA.to_string(), |s| s.name.clone()),
                    instructor_name: catalog
                        .instructor(e.instructor)
                        .map_or_else(|| NA.to_string(), |i| i.name.clone()),
                    room_number: catalog
                        .room(e.room)
                        .map_or_else(|| NA.to_string(), |r| r.number.clone()),
                    day_of_week: slot.map_or_else(|| NA.to_string(), |s| s.day_name().to_string()),
                    start_time: slot.map_or_else(|| NA.to_string(), |s| s.start_label()),
                }
            })
            .collect()
    }

    /// Writes a versioned binary snapshot, replacing any previous one only
    /// once the new one is complete.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_atomically(path, |file| {
            savefile::save(file, TIMETABLE_VERSION, self)
                .map_err(|e| anyhow!("failed to save timetable to {}: {e:?}", path.display()))
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        load_file(path, TIMETABLE_VERSION)
            .map_err(|e| anyhow!("failed to load timetable from {}: {e:?}", path.display()))
    }
}

/// Writes into a temp file next to `path`, then renames it over `path`.
/// A failed write removes the temp file and leaves `path` untouched.
fn write_atomically(path: &Path, write: impl FnOnce(&mut NamedTempFile) -> Result<()>) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    write(&mut file)?;
    file.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Instructor, Room, RoomCategory, RoomType, Subject, SubjectType, TimeSlot};
    use chrono::{NaiveTime, Weekday};

    fn sessions() -> Vec<Session> {
        vec![
            Session {
                id: 0,
                subject: 7,
                group: "Div-A (Maths Lec)".into(),
                students: vec![1, 2],
                room_category: RoomCategory::LectureHall,
            },
            Session {
                id: 1,
                subject: 8,
                group: "Batch A1 (Physics Lab)".into(),
                students: vec![1],
                room_category: RoomCategory::Lab,
            },
        ]
    }

    fn assignments() -> Vec<Assignment> {
        vec![
            Assignment {
                session: 0,
                slot: 1,
                room: 10,
                instructor: 100,
            },
            Assignment {
                session: 1,
                slot: 2,
                room: 11,
                instructor: 100,
            },
        ]
    }

    #[test]
    fn assemble_carries_keys_and_labels() {
        let timetable = assemble(&assignments(), &sessions()).unwrap();
        assert_eq!(timetable.len(), 2);
        assert_eq!(
            timetable.entries[1],
            TimetableEntry {
                class_id: 2,
                subject: 8,
                instructor: 100,
                room: 11,
                slot: 2,
                group: "Batch A1 (Physics Lab)".into(),
            }
        );
        assert_eq!(timetable.entries_for_group("Div-A (Maths Lec)").count(), 1);
    }

    #[test]
    fn assemble_rejects_unknown_session() {
        let mut assignments = assignments();
        assignments[0].session = 42;
        assert!(assemble(&assignments, &sessions()).is_err());
    }

    #[test]
    fn flatten_resolves_names() {
        let catalog = Catalog {
            subjects: vec![Subject {
                id: 7,
                name: "Maths".into(),
                subject_type: SubjectType::Core,
                requires_lab: false,
            }],
            instructors: vec![Instructor {
                id: 100,
                name: "Dr. Rao".into(),
                subjects: [7].into_iter().collect(),
            }],
            rooms: vec![Room {
                id: 10,
                number: "LH-1".into(),
                room_type: RoomType::Schedulable(RoomCategory::LectureHall),
                capacity: 60,
            }],
            slots: vec![TimeSlot {
                id: 1,
                day: Weekday::Tue,
                start: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
                end: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            }],
            ..Default::default()
        };
        let views = assemble(&assignments(), &sessions()).unwrap().flatten(&catalog);

        assert_eq!(views[0].subject_name, "Maths");
        assert_eq!(views[0].instructor_name, "Dr. Rao");
        assert_eq!(views[0].room_number, "LH-1");
        assert_eq!(views[0].day_of_week, "Tuesday");
        assert_eq!(views[0].start_time, "08:30");
        // subject 8, room 11 and slot 2 are not in the catalog
        assert_eq!(views[1].subject_name, "N/A");
        assert_eq!(views[1].start_time, "N/A");
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timetable.bin");
        let timetable = assemble(&assignments(), &sessions()).unwrap();

        timetable.save(&path).unwrap();
        assert_eq!(Timetable::load(&path).unwrap(), timetable);
        assert!(Timetable::load(dir.path().join("missing.bin")).is_err());
    }

    #[test]
    fn interrupted_write_leaves_old_snapshot_loadable() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timetable.bin");
        let timetable = assemble(&assignments(), &sessions()).unwrap();
        timetable.save(&path).unwrap();

        let result = write_atomically(&path, |file| {
            file.write_all(b"half a snapshot")?;
            anyhow::bail!("disk full")
        });

        assert!(result.is_err());
        assert_eq!(Timetable::load(&path).unwrap(), timetable);
        // the temp file is cleaned up
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_replaces_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timetable.bin");
        assemble(&assignments(), &sessions()).unwrap().save(&path).unwrap();

        Timetable::default().save(&path).unwrap();
        assert!(Timetable::load(&path).unwrap().is_empty());
    }
}
