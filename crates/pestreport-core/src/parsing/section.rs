use crate::error::PestReportError;

/// Heading that opens the pest activity section.
pub const START_MARKER: &str = "虫害情况";
/// Heading that opens the service summary, closing the pest section.
pub const END_MARKER: &str = "服务总结";

/// Control character some PDF text layouts emit in place of a space.
const PLACEHOLDER: char = '\u{1}';

/// Isolate the pest activity section of a full document text.
///
/// The section starts at the first start marker (inclusive) and ends at the
/// first end marker that follows it (exclusive). An end marker that only
/// appears before the start marker does not count.
pub fn isolate_section(text: &str) -> Result<&str, PestReportError> {
    let not_found = || PestReportError::SectionNotFound {
        start: START_MARKER,
        end: END_MARKER,
    };

    let start = text.find(START_MARKER).ok_or_else(not_found)?;
    let body_from = start + START_MARKER.len();
    let end = text[body_from..]
        .find(END_MARKER)
        .map(|offset| body_from + offset)
        .ok_or_else(not_found)?;

    Ok(&text[start..end])
}

/// Replace layout placeholders with spaces and split into lines.
pub fn normalize_lines(section: &str) -> Vec<String> {
    section
        .replace(PLACEHOLDER, " ")
        .lines()
        .map(|l| l.to_string())
        .collect()
}
