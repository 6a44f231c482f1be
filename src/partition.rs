//! Splits the enrolled roster into divisions and elective-aware batches.
//!
//! This is the only place the partitioning algorithm lives. The reporting
//! functions and the generation pipeline both call [`partition`], so a preview
//! always matches the run that follows it. The function is pure: the same
//! roster, choices and params always give the same names and membership order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{ChoiceMap, ElectivePair, Room, RoomCategory, StudentId};
use crate::error::{ConfigurationError, InvariantViolation, ScheduleResult};

/// Largest cohort sharing lectures; bounded by lecture-hall capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub name: String,
    pub students: Vec<StudentId>,
    pub batches: Vec<Batch>,
}

/// Sub-cohort of a division sharing one elective pair; bounded by lab capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub name: String,
    pub students: Vec<StudentId>,
    pub electives: ElectivePair,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionParams {
    pub max_lecture_capacity: usize,
    pub max_lab_capacity: usize,
    pub min_batch_size: usize,
}

impl PartitionParams {
    pub fn new(max_lecture_capacity: usize, max_lab_capacity: usize, min_batch_size: usize) -> Self {
        Self {
            max_lecture_capacity,
            max_lab_capacity,
            min_batch_size,
        }
    }

    /// Derives capacities from the largest lecture hall and the largest lab.
    pub fn from_rooms(rooms: &[Room], min_batch_size: usize) -> Result<Self, ConfigurationError> {
        let max_of = |category: RoomCategory| -> Result<usize, ConfigurationError> {
            rooms
                .iter()
                .filter(|r| r.room_type.category() == Some(category))
                .map(|r| r.capacity as usize)
                .max()
                .ok_or(ConfigurationError::MissingRoomCategory(category))
        };
        let params = Self::new(
            max_of(RoomCategory::LectureHall)?,
            max_of(RoomCategory::Lab)?,
            min_batch_size,
        );
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_lecture_capacity == 0 {
            return Err(ConfigurationError::NonPositiveCapacity {
                category: RoomCategory::LectureHall,
            });
        }
        if self.max_lab_capacity == 0 {
            return Err(ConfigurationError::NonPositiveCapacity {
                category: RoomCategory::Lab,
            });
        }
        Ok(())
    }

    /// Half a lab, so two batches can share one lab session, but never below the floor.
    pub fn target_batch_size(&self) -> usize {
        (self.max_lab_capacity / 2).max(self.min_batch_size).max(1)
    }
}

/// Partitions `students` (already sorted by a stable key) into divisions and batches.
pub fn partition(
    students: &[StudentId],
    choices: &ChoiceMap,
    params: &PartitionParams,
) -> ScheduleResult<Vec<Division>> {
    params.validate()?;

    let mut divisions = create_divisions(students, params.max_lecture_capacity);
    let target = params.target_batch_size();
    for division in &mut divisions {
        division.batches = create_batches(division, choices, target, params.max_lab_capacity)?;
        debug!(
            division = %division.name,
            students = division.students.len(),
            batches = division.batches.len(),
            "division batched"
        );
    }

    check_coverage(students.len(), &divisions)?;
    Ok(divisions)
}

/// Cuts the roster into `ceil(n / capacity)` contiguous, near-equal slices.
///
/// The first `n mod k` divisions take one extra student.
pub fn create_divisions(students: &[StudentId], max_lecture_capacity: usize) -> Vec<Division> {
    let total = students.len();
    if total == 0 || max_lecture_capacity == 0 {
        return Vec::new();
    }

    let count = total.div_ceil(max_lecture_capacity);
    let base = total / count;
    let extra = total % count;

    let mut divisions = Vec::with_capacity(count);
    let mut start = 0;
    for i in 0..count {
        let size = if i < extra { base + 1 } else { base };
        divisions.push(Division {
            name: division_name(i),
            students: students[start..start + size].to_vec(),
            batches: Vec::new(),
        });
        start += size;
    }
    divisions
}

/// Batches one division.
///
/// Students are grouped by elective pair; larger groups are carved first, ties
/// keep first-seen order. The batch counter runs across the whole division and
/// starts at 1 for every division.
pub fn create_batches(
    division: &Division,
    choices: &ChoiceMap,
    target_batch_size: usize,
    max_lab_capacity: usize,
) -> ScheduleResult<Vec<Batch>> {
    let mut groups: Vec<(ElectivePair, Vec<StudentId>)> = Vec::new();
    let mut index: HashMap<ElectivePair, usize> = HashMap::new();
    for &student in &division.students {
        let pair = *choices
            .get(&student)
            .ok_or(InvariantViolation::MissingChoice { student })?;
        let slot = *index.entry(pair).or_insert_with(|| {
            groups.push((pair, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(student);
    }
    // stable: equal sizes keep first-seen order
    groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let target = target_batch_size.max(1);
    let mut batches = Vec::new();
    let mut counter = 1;
    for (pair, members) in groups {
        let mut taken = 0;
        while taken < members.len() {
            let size = carve_size(members.len() - taken, target, max_lab_capacity);
            batches.push(Batch {
                name: format!("{}{}", division.name, counter),
                students: members[taken..taken + size].to_vec(),
                electives: pair,
            });
            counter += 1;
            taken += size;
        }
    }
    Ok(batches)
}

/// Size of the next batch cut from `remaining` students of one group.
///
/// A leftover smaller than half the target is folded into this batch; the
/// lab clamp is applied last and wins over the fold.
fn carve_size(remaining: usize, target: usize, max_lab_capacity: usize) -> usize {
    let mut size = target.min(remaining);
    let leftover = remaining - size;
    if leftover > 0 && leftover < target / 2 {
        size = remaining;
    }
    size.min(max_lab_capacity).max(1)
}

/// "A".."Z", then "AA", "AB", ... so large rosters still get unique names.
fn division_name(index: usize) -> String {
    let mut n = index;
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn check_coverage(expected: usize, divisions: &[Division]) -> ScheduleResult<()> {
    let in_divisions: usize = divisions.iter().map(|d| d.students.len()).sum();
    let in_batches: usize = divisions
        .iter()
        .flat_map(|d| &d.batches)
        .map(|b| b.students.len())
        .sum();
    if in_divisions != expected || in_batches != expected {
        return Err(InvariantViolation::PartitionCoverage {
            expected,
            placed: in_divisions.min(in_batches),
        }
        .into());
    }
    Ok(())
}
