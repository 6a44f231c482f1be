//! Read-only views of the division/batch structure.
//!
//! All three reports go through [`pipeline::plan`](crate::pipeline::plan), the
//! same call the generation run makes.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, SubjectId};
use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::pipeline::plan;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("student '{0}' not found")]
    StudentNotFound(String),

    #[error("student '{0}' has incomplete elective choices")]
    IncompleteChoices(String),

    #[error("no batch contains student '{0}'")]
    BatchNotFound(String),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDetails {
    pub division_name: String,
    pub batch_name: String,
    pub student_count: usize,
    pub professional_elective: String,
    pub open_elective: String,
    /// Enrollment codes, sorted.
    pub students: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentBatchInfo {
    pub enrollment_no: String,
    pub student_name: String,
    pub division_name: String,
    pub batch_name: String,
    pub professional_elective: String,
    pub open_elective: String,
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCount {
    pub batch_name: String,
    pub student_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionStatistics {
    pub division_name: String,
    pub student_count: usize,
    pub batch_count: usize,
    pub batches: Vec<BatchCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_students: usize,
    pub total_divisions: usize,
    pub total_batches: usize,
    pub max_lecture_capacity: usize,
    pub max_lab_capacity: usize,
    pub target_batch_size: usize,
    pub divisions: Vec<DivisionStatistics>,
}

fn subject_name(catalog: &Catalog, id: SubjectId) -> String {
    catalog
        .subject(id)
        .map_or_else(|| "N/A".to_string(), |s| s.name.clone())
}

/// Orders "A2" before "A10": by letters, then by the numeric counter.
fn compare_batch_names(a: &str, b: &str) -> Ordering {
    let split = |name: &str| {
        let at = name.find(|c: char| c.is_ascii_digit()).unwrap_or(name.len());
        let (prefix, digits) = name.split_at(at);
        (prefix.to_string(), digits.parse::<u64>().unwrap_or(0))
    };
    split(a).cmp(&split(b))
}

/// One entry per batch, ordered by division then batch.
pub fn batch_list(catalog: &Catalog, config: &SchedulerConfig) -> Result<Vec<BatchDetails>, ReportError> {
    let plan = plan(catalog, config)?;

    let mut list = Vec::new();
    for division in &plan.divisions {
        for batch in &division.batches {
            let mut students: Vec<String> = batch
                .students
                .iter()
                .filter_map(|&id| catalog.student(id))
                .map(|s| s.enrollment_no.clone())
                .collect();
            students.sort();

            list.push(BatchDetails {
                division_name: format!("Division {}", division.name),
                batch_name: batch.name.clone(),
                student_count: batch.students.len(),
                professional_elective: subject_name(catalog, batch.electives.professional),
                open_elective: subject_name(catalog, batch.electives.open),
                students,
            });
        }
    }
    list.sort_by(|a, b| {
        a.division_name
            .len()
            .cmp(&b.division_name.len())
            .then_with(|| a.division_name.cmp(&b.division_name))
            .then_with(|| compare_batch_names(&a.batch_name, &b.batch_name))
    });
    Ok(list)
}

/// Locates one student's division and batch.
pub fn student_batch(
    catalog: &Catalog,
    config: &SchedulerConfig,
    enrollment_no: &str,
) -> Result<StudentBatchInfo, ReportError> {
    let student = catalog
        .students
        .iter()
        .find(|s| s.enrollment_no == enrollment_no)
        .ok_or_else(|| ReportError::StudentNotFound(enrollment_no.to_string()))?;

    let plan = plan(catalog, config)?;
    if !plan.choices.contains_key(&student.id) {
        return Err(ReportError::IncompleteChoices(enrollment_no.to_string()));
    }

    for division in &plan.divisions {
        if let Some(batch) = division.batches.iter().find(|b| b.students.contains(&student.id)) {
            return Ok(StudentBatchInfo {
                enrollment_no: student.enrollment_no.clone(),
                student_name: student.name.clone(),
                division_name: format!("Division {}", division.name),
                batch_name: batch.name.clone(),
                professional_elective: subject_name(catalog, batch.electives.professional),
                open_elective: subject_name(catalog, batch.electives.open),
                batch_size: batch.students.len(),
            });
        }
    }
    Err(ReportError::BatchNotFound(enrollment_no.to_string()))
}

/// Totals and per-division counts.
pub fn batch_statistics(catalog: &Catalog, config: &SchedulerConfig) -> Result<BatchStatistics, ReportError> {
    let plan = plan(catalog, config)?;

    Ok(BatchStatistics {
        total_students: plan.enrolled.len(),
        total_divisions: plan.divisions.len(),
        total_batches: plan.batch_count(),
        max_lecture_capacity: plan.params.max_lecture_capacity,
        max_lab_capacity: plan.params.max_lab_capacity,
        target_batch_size: plan.params.target_batch_size(),
        divisions: plan
            .divisions
            .iter()
            .map(|d| DivisionStatistics {
                division_name: d.name.clone(),
                student_count: d.students.len(),
                batch_count: d.batches.len(),
                batches: d
                    .batches
                    .iter()
                    .map(|b| BatchCount {
                        batch_name: b.name.clone(),
                        student_count: b.students.len(),
                    })
                    .collect(),
            })
            .collect(),
    })
}
