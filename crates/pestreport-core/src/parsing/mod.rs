pub mod records;
pub mod section;

use crate::error::PestReportError;
use crate::model::{ParsedSightings, PestSighting};
use records::pair_records;
use section::{isolate_section, normalize_lines};

/// Parse the pest activity section out of a full document text.
///
/// Returns the paired records in document order together with the detection
/// lines that had to be dropped. An isolated section that yields no records
/// is an error, distinct from a missing section.
pub fn parse_pest_section(full_text: &str) -> Result<ParsedSightings, PestReportError> {
    let section = isolate_section(full_text)?;
    let lines = normalize_lines(section);
    tracing::debug!(lines = lines.len(), "isolated pest section");

    let parsed = pair_records(&lines);

    if parsed.records.is_empty() {
        return Err(PestReportError::NoRecordsFound);
    }

    tracing::info!(
        records = parsed.records.len(),
        skipped = parsed.skipped_lines.len(),
        "成功提取 {} 条记录",
        parsed.records.len()
    );
    Ok(parsed)
}

/// Extract pest sightings from a full document text, discarding diagnostics.
pub fn extract(full_text: &str) -> Result<Vec<PestSighting>, PestReportError> {
    parse_pest_section(full_text).map(|parsed| parsed.records)
}
