//! Roll-call and elective-choice import from `.xlsx` workbooks.
//!
//! Only the first worksheet is read and row 1 must hold the headers.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};
use umya_spreadsheet::Worksheet;

use crate::catalog::{ElectiveChoice, Student, StudentId, Subject};

pub const ENROLLMENT_HEADER: &str = "Enrollment No";
pub const NAME_HEADER: &str = "Name";
pub const CHOICE_ENROLLMENT_HEADER: &str = "Enrollment No.";
pub const PROFESSIONAL_ELECTIVE_HEADER: &str = "PE-II";
pub const OPEN_ELECTIVE_HEADER: &str = "OE-I";

/// First worksheet plus its header positions.
struct Sheet {
    book: umya_spreadsheet::Spreadsheet,
    headers: HashMap<String, u32>,
}

impl Sheet {
    fn open(path: &Path) -> Result<Self> {
        let book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| anyhow!("failed to read workbook {}: {e:?}", path.display()))?;
        let mut sheet = Sheet {
            book,
            headers: HashMap::new(),
        };
        let worksheet = sheet.worksheet()?;
        let headers = (1..=worksheet.get_highest_column())
            .map(|col| (worksheet.get_value((col, 1)).trim().to_string(), col))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        sheet.headers = headers;
        Ok(sheet)
    }

    fn worksheet(&self) -> Result<&Worksheet> {
        self.book
            .get_sheet(&0)
            .ok_or_else(|| anyhow!("workbook has no worksheets"))
    }

    fn column(&self, header: &str) -> Result<u32> {
        match self.headers.get(header) {
            Some(&col) => Ok(col),
            None => bail!("missing '{header}' column"),
        }
    }

    /// Data rows (everything after the header), trimmed.
    fn rows(&self, columns: &[u32]) -> Result<Vec<Vec<String>>> {
        let worksheet = self.worksheet()?;
        Ok((2..=worksheet.get_highest_row())
            .map(|row| {
                columns
                    .iter()
                    .map(|&col| worksheet.get_value((col, row)).trim().to_string())
                    .collect()
            })
            .collect())
    }
}

/// Reads new students from a roll-call sheet.
///
/// Codes already in `existing`, blank codes and repeats within the sheet are
/// skipped. New students get identifiers following the largest existing one.
pub fn read_roll_call(path: impl AsRef<Path>, existing: &[Student]) -> Result<Vec<Student>> {
    let path = path.as_ref();
    let sheet = Sheet::open(path)?;
    let enrollment = sheet.column(ENROLLMENT_HEADER)?;
    let name = sheet.column(NAME_HEADER).ok();

    let mut columns = vec![enrollment];
    columns.extend(name);

    let mut seen: HashSet<String> = existing.iter().map(|s| s.enrollment_no.clone()).collect();
    let mut next_id: StudentId = existing.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    let mut students = Vec::new();
    for row in sheet.rows(&columns)? {
        let code = &row[0];
        if code.is_empty() || !seen.insert(code.clone()) {
            continue;
        }
        students.push(Student {
            id: next_id,
            enrollment_no: code.clone(),
            name: row.get(1).cloned().unwrap_or_default(),
        });
        next_id += 1;
    }

    info!(event = "import_roll_call", path = %path.display(), added = students.len());
    Ok(students)
}

/// Reads elective choices, one row per student with a PE-II and an OE-I column.
///
/// Students are matched by enrollment code, subjects by name ignoring case.
/// Rows naming unknown students or subjects contribute nothing.
pub fn read_elective_choices(
    path: impl AsRef<Path>,
    students: &[Student],
    subjects: &[Subject],
) -> Result<Vec<ElectiveChoice>> {
    let path = path.as_ref();
    let sheet = Sheet::open(path).with_context(|| format!("importing electives from {}", path.display()))?;
    let columns = [
        sheet.column(CHOICE_ENROLLMENT_HEADER)?,
        sheet.column(PROFESSIONAL_ELECTIVE_HEADER)?,
        sheet.column(OPEN_ELECTIVE_HEADER)?,
    ];

    let by_code: HashMap<&str, StudentId> = students
        .iter()
        .map(|s| (s.enrollment_no.as_str(), s.id))
        .collect();
    let by_name: HashMap<String, u32> = subjects
        .iter()
        .map(|s| (s.name.trim().to_lowercase(), s.id))
        .collect();

    let mut seen = HashSet::new();
    let mut choices = Vec::new();
    let mut skipped = 0usize;
    for row in sheet.rows(&columns)? {
        let Some(&student) = by_code.get(row[0].as_str()) else {
            if !row[0].is_empty() {
                skipped += 1;
            }
            continue;
        };
        for name in &row[1..] {
            let Some(&subject) = by_name.get(&name.to_lowercase()) else {
                continue;
            };
            if seen.insert((student, subject)) {
                choices.push(ElectiveChoice { student, subject });
            }
        }
    }

    if skipped > 0 {
        warn!(event = "import_electives", skipped, "rows with unknown enrollment codes skipped");
    }
    info!(event = "import_electives", path = %path.display(), added = choices.len());
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubjectType;
    use rust_xlsxwriter::Workbook;

    fn write_sheet(path: &Path, rows: &[&[&str]]) {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    fn student(id: StudentId, code: &str) -> Student {
        Student {
            id,
            enrollment_no: code.into(),
            name: String::new(),
        }
    }

    #[test]
    fn roll_call_skips_blanks_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roll.xlsx");
        write_sheet(
            &path,
            &[
                &["Enrollment No", "Name"],
                &[" E001 ", "Asha"],
                &["E002", "Ravi"],
                &["", "Nobody"],
                &["E002", "Ravi again"],
                &["E003", "Meera"],
            ],
        );

        let existing = vec![student(7, "E001")];
        let added = read_roll_call(&path, &existing).unwrap();

        assert_eq!(added.len(), 2);
        assert_eq!(added[0].enrollment_no, "E002");
        assert_eq!(added[0].id, 8);
        assert_eq!(added[0].name, "Ravi");
        assert_eq!(added[1].enrollment_no, "E003");
        assert_eq!(added[1].id, 9);
    }

    #[test]
    fn roll_call_requires_enrollment_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roll.xlsx");
        write_sheet(&path, &[&["Code"], &["E001"]]);
        assert!(read_roll_call(&path, &[]).is_err());
    }

    #[test]
    fn elective_choices_match_names_ignoring_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("electives.xlsx");
        write_sheet(
            &path,
            &[
                &["Enrollment No.", "PE-II", "OE-I"],
                &["E001", "machine learning", "ECONOMICS"],
                &["E001", "Machine Learning", "Economics"],
                &["E002", "Quantum Basket Weaving", "Economics"],
                &["E999", "Machine Learning", "Economics"],
            ],
        );
        let subjects = vec![
            Subject {
                id: 10,
                name: "Machine Learning".into(),
                subject_type: SubjectType::ProfessionalElective,
                requires_lab: true,
            },
            Subject {
                id: 20,
                name: "Economics".into(),
                subject_type: SubjectType::OpenElective,
                requires_lab: false,
            },
        ];
        let students = vec![student(1, "E001"), student(2, "E002")];

        let choices = read_elective_choices(&path, &students, &subjects).unwrap();
        assert_eq!(
            choices,
            vec![
                ElectiveChoice { student: 1, subject: 10 },
                ElectiveChoice { student: 1, subject: 20 },
                ElectiveChoice { student: 2, subject: 20 },
            ]
        );
    }
}
