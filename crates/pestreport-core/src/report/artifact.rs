use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx};

use crate::error::PestReportError;
use crate::model::{PestSighting, RECORD_HEADERS};
use crate::report::stats::AggregateStats;
use crate::report::workbook::PRIMARY_SHEET;

/// A report workbook persisted on disk.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub record_count: usize,
    /// Statistics of the analysis sheet, once one has been written.
    pub analysis: Option<AggregateStats>,
}

/// Write `bytes` to `path` atomically.
///
/// The bytes go to a temporary file in the destination directory which then
/// replaces `path`, so readers never observe a half-written workbook. Missing
/// parent directories are created.
pub fn persist_atomic(path: &Path, bytes: &[u8]) -> Result<(), PestReportError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| PestReportError::persistence(path, e))?;

    let mut tmp =
        tempfile::NamedTempFile::new_in(&dir).map_err(|e| PestReportError::persistence(path, e))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| PestReportError::persistence(path, e))?;
    tmp.persist(path)
        .map_err(|e| PestReportError::persistence(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "workbook persisted");
    Ok(())
}

fn open_workbook(path: &Path) -> Result<Xlsx<Cursor<Vec<u8>>>, PestReportError> {
    let unreadable = |reason: String| PestReportError::ArtifactUnreadable {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    calamine::open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| unreadable(format!("failed to open xlsx: {e}")))
}

/// Sheet names of a persisted workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, PestReportError> {
    Ok(open_workbook(path)?.sheet_names().to_vec())
}

/// Read the records back from the primary sheet of a persisted workbook.
///
/// Reading stops at the first row whose building cell is empty.
pub fn read_primary_table(path: &Path) -> Result<Vec<PestSighting>, PestReportError> {
    let unreadable = |reason: String| PestReportError::ArtifactUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let mut workbook = open_workbook(path)?;
    let sheet = workbook
        .worksheet_range(PRIMARY_SHEET)
        .map_err(|e| unreadable(format!("sheet '{PRIMARY_SHEET}' not found: {e}")))?;

    let mut rows = sheet.rows();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().filter_map(cell_as_string).collect())
        .unwrap_or_default();
    if header != RECORD_HEADERS {
        return Err(unreadable(format!(
            "unexpected header row in '{PRIMARY_SHEET}': {}",
            header.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        let text = |col: usize| row.get(col).and_then(cell_as_string);
        let Some(building) = text(0) else {
            break; // Empty row = end of data
        };
        let missing = |what: &str| unreadable(format!("row {}: missing {what}", i + 2));

        let count = cell_as_f64(row.get(5))
            .filter(|c| *c >= 0.0 && *c <= f64::from(u32::MAX) && c.fract() == 0.0)
            .ok_or_else(|| missing("count"))?;

        records.push(PestSighting {
            building,
            floor: text(1).ok_or_else(|| missing("floor"))?,
            department: text(2).ok_or_else(|| missing("department"))?,
            monitoring_point: text(3).ok_or_else(|| missing("monitoring point"))?,
            pest_type: text(4).ok_or_else(|| missing("pest type"))?,
            count: count as u32,
        });
    }

    Ok(records)
}

fn cell_as_string(cell: &calamine::Data) -> Option<String> {
    match cell {
        calamine::Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        calamine::Data::Float(f) => Some(f.to_string()),
        calamine::Data::Int(i) => Some(i.to_string()),
        calamine::Data::Empty => None,
        _ => Some(format!("{cell}")),
    }
}

fn cell_as_f64(cell: Option<&calamine::Data>) -> Option<f64> {
    match cell? {
        calamine::Data::Float(f) => Some(*f),
        calamine::Data::Int(i) => Some(*i as f64),
        calamine::Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::workbook;

    fn sample() -> Vec<PestSighting> {
        vec![
            PestSighting {
                building: "A栋".into(),
                floor: "1F".into(),
                department: "厨房".into(),
                monitoring_point: "角落".into(),
                pest_type: "蟑螂".into(),
                count: 3,
            },
            PestSighting {
                building: "2".into(),
                floor: "B1".into(),
                department: "仓库".into(),
                monitoring_point: "门口, 左侧".into(),
                pest_type: "老鼠".into(),
                count: 0,
            },
        ]
    }

    #[test]
    fn test_primary_table_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.xlsx");
        let bytes = workbook::render(&sample(), None).unwrap();
        persist_atomic(&path, &bytes).unwrap();

        assert_eq!(sheet_names(&path).unwrap(), vec![PRIMARY_SHEET]);
        assert_eq!(read_primary_table(&path).unwrap(), sample());
    }

    #[test]
    fn test_persist_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        std::fs::write(&path, b"stale").unwrap();
        persist_atomic(&path, b"fresh").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"fresh");
        // Only the target remains, no stray temp files.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_persist_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let err = persist_atomic(&blocker.join("report.xlsx"), b"data").unwrap_err();
        assert!(matches!(err, PestReportError::PersistenceFailure { .. }));
    }

    #[test]
    fn test_unreadable_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        let err = read_primary_table(&path).unwrap_err();
        assert!(matches!(err, PestReportError::ArtifactUnreadable { .. }));
    }
}
