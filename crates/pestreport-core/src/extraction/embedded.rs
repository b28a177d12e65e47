use crate::error::PestReportError;
use crate::extraction::{PageContent, PdfTextSource};

/// Pure-Rust extraction backend built on the `pdf-extract` crate.
///
/// Used when poppler is not installed. It does not report page breaks, so the
/// whole document comes back as a single page.
pub struct EmbeddedExtractor;

impl EmbeddedExtractor {
    pub fn new() -> Self {
        EmbeddedExtractor
    }
}

impl Default for EmbeddedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextSource for EmbeddedExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PestReportError> {
        // pdf-extract panics on some malformed font tables.
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(pdf_bytes))
            .map_err(|_| {
                PestReportError::SourceUnreadable("pdf-extract panicked while decoding".into())
            })?
            .map_err(|e| PestReportError::SourceUnreadable(e.to_string()))?;
        Ok(vec![PageContent::from_text(1, &text)])
    }

    fn backend_name(&self) -> &str {
        "pdf-extract"
    }
}
