pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod pipeline;
pub mod report;

use error::PestReportError;
use extraction::{full_text, PdfTextSource};
use model::ParsedSightings;

/// Main extraction entry point: pull pest records out of a PDF report.
///
/// The text source is called exactly once; its failure is returned as is.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfTextSource,
) -> Result<ParsedSightings, PestReportError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "extracted PDF text"
    );

    let text = full_text(&pages);
    parsing::parse_pest_section(&text)
}
