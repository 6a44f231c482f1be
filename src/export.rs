//! Writes a flattened timetable to an `.xlsx` workbook.

use std::path::Path;

use anyhow::{Result, anyhow};
use rust_xlsxwriter::{Format, Workbook};

use crate::timetable::TimetableEntryView;

const HEADERS: [&str; 7] = [
    "Class",
    "Group",
    "Subject",
    "Instructor",
    "Room",
    "Day",
    "Start",
];

pub fn write_timetable_xlsx(views: &[TimetableEntryView], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let xlsx = |e: rust_xlsxwriter::XlsxError| anyhow!("failed to write {}: {e}", path.display());

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Timetable").map_err(xlsx)?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold).map_err(xlsx)?;
    }
    for (i, view) in views.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, view.class_id).map_err(xlsx)?;
        let cells = [
            &view.group_name,
            &view.subject_name,
            &view.instructor_name,
            &view.room_number,
            &view.day_of_week,
            &view.start_time,
        ];
        for (col, value) in cells.into_iter().enumerate() {
            sheet.write_string(row, col as u16 + 1, value).map_err(xlsx)?;
        }
    }

    workbook.save(path).map_err(xlsx)?;
    Ok(())
}
