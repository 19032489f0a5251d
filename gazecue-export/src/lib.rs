//! Results export: one row per completed main trial, written as a
//! timestamped CSV plus the matching XLSX workbook.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use gazecue_core::TrialRecord;
use rust_xlsxwriter::Workbook;
use thiserror::Error;
use tracing::info;

/// Export column order, shared by both formats
pub const COLUMNS: [&str; 9] = [
    "trial_number",
    "block_number",
    "prior_face",
    "gaze_face",
    "target_location",
    "congruency",
    "response",
    "correct",
    "response_time",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write results file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write results workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub xlsx: PathBuf,
}

/// Write accumulated results into `dir` under a run-timestamped stem.
///
/// Returns `None` without touching the filesystem when no results were
/// collected (an aborted run can end with nothing to save).
pub fn write_results(
    records: &[TrialRecord],
    dir: &Path,
) -> Result<Option<ExportPaths>, ExportError> {
    if records.is_empty() {
        info!("no results collected, nothing to write");
        return Ok(None);
    }
    let stem = format!("results_{}", Local::now().format("%Y%m%d_%H%M%S"));
    write_results_as(records, dir, &stem).map(Some)
}

/// Write under an explicit file stem.
pub fn write_results_as(
    records: &[TrialRecord],
    dir: &Path,
    stem: &str,
) -> Result<ExportPaths, ExportError> {
    let csv = dir.join(format!("{stem}.csv"));
    let xlsx = dir.join(format!("{stem}.xlsx"));
    write_csv(records, &csv)?;
    write_xlsx(records, &xlsx)?;
    info!(
        rows = records.len(),
        csv = %csv.display(),
        xlsx = %xlsx.display(),
        "results written"
    );
    Ok(ExportPaths { csv, xlsx })
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_csv(records: &[TrialRecord], path: &Path) -> Result<(), ExportError> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", COLUMNS.join(","))?;
    for r in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            r.trial_number,
            r.block_number,
            r.prior_face.code(),
            r.gaze_face.code(),
            r.target_location.code(),
            r.congruency.code(),
            cell(r.response.map(|s| s.code())),
            cell(r.correct.map(u8::from)),
            cell(r.response_time_ms),
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_xlsx(records: &[TrialRecord], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (i, r) in records.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_number(row, 0, r.trial_number as f64)?;
        sheet.write_number(row, 1, r.block_number as f64)?;
        sheet.write_number(row, 2, r.prior_face.code() as f64)?;
        sheet.write_number(row, 3, r.gaze_face.code() as f64)?;
        sheet.write_number(row, 4, r.target_location.code() as f64)?;
        sheet.write_number(row, 5, r.congruency.code() as f64)?;
        // Timed-out trials leave these cells blank.
        if let Some(side) = r.response {
            sheet.write_number(row, 6, side.code() as f64)?;
        }
        if let Some(correct) = r.correct {
            sheet.write_number(row, 7, u8::from(correct) as f64)?;
        }
        if let Some(rt) = r.response_time_ms {
            sheet.write_number(row, 8, rt as f64)?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gazecue_core::{Condition, FaceIdentity, Side};

    fn record(trial_number: u32, response: Option<(Side, u64)>) -> TrialRecord {
        let condition = Condition {
            prior: FaceIdentity::Two,
            gaze: Side::Left,
            target: Side::Right,
        };
        TrialRecord {
            trial_number,
            block_number: 1,
            prior_face: condition.prior,
            gaze_face: condition.gaze,
            target_location: condition.target,
            congruency: condition.congruency(),
            response: response.map(|(s, _)| s),
            correct: response.map(|(s, _)| s == condition.target),
            response_time_ms: response.map(|(_, rt)| rt),
        }
    }

    #[test]
    fn empty_results_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_results(&[], dir.path()).unwrap();
        assert!(paths.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn csv_has_header_and_blank_cells_for_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            record(1, Some((Side::Right, 412))),
            record(2, None),
            record(3, Some((Side::Left, 388))),
        ];
        let paths = write_results_as(&records, dir.path(), "results_test").unwrap();

        let csv = std::fs::read_to_string(&paths.csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(lines[1], "1,1,2,1,2,2,2,1,412");
        assert_eq!(lines[2], "2,1,2,1,2,2,,,");
        assert_eq!(lines[3], "3,1,2,1,2,2,1,0,388");
    }

    #[test]
    fn xlsx_workbook_is_written_alongside_the_csv() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record(1, None)];
        let paths = write_results_as(&records, dir.path(), "results_test").unwrap();
        let meta = std::fs::metadata(&paths.xlsx).unwrap();
        assert!(meta.len() > 0);
    }

    #[test]
    fn timestamped_stem_matches_the_expected_shape() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![record(1, None)];
        let paths = write_results(&records, dir.path()).unwrap().unwrap();

        let name = paths.csv.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("results_"));
        assert!(name.ends_with(".csv"));
        // results_YYYYMMDD_HHMMSS.csv
        assert_eq!(name.len(), "results_00000000_000000.csv".len());
        assert!(paths.xlsx.exists());
    }
}
