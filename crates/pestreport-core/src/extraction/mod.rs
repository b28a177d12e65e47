pub mod embedded;
pub mod pdftotext;

use crate::error::PestReportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

impl PageContent {
    pub fn from_text(page_number: usize, text: &str) -> Self {
        PageContent {
            page_number,
            lines: text.lines().map(|l| l.to_string()).collect(),
        }
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfTextSource: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page
    /// in document order.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PestReportError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Concatenate page texts in document order, each page followed by a newline.
///
/// No blank line is inserted between pages, so a detection line at the foot
/// of one page still pairs with a detail line at the head of the next.
pub fn full_text(pages: &[PageContent]) -> String {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page.lines.join("\n"));
        text.push('\n');
    }
    text
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// Prefer pdftotext, fall back to the embedded extractor.
    #[default]
    Auto,
    Pdftotext,
    Embedded,
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendChoice::Auto => write!(f, "auto"),
            BackendChoice::Pdftotext => write!(f, "pdftotext"),
            BackendChoice::Embedded => write!(f, "embedded"),
        }
    }
}

impl FromStr for BackendChoice {
    type Err = PestReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(BackendChoice::Auto),
            "pdftotext" | "poppler" => Ok(BackendChoice::Pdftotext),
            "embedded" | "pdf-extract" => Ok(BackendChoice::Embedded),
            other => Err(PestReportError::ConfigInvalid(format!(
                "unknown text backend '{other}'. Available: auto, pdftotext, embedded"
            ))),
        }
    }
}

/// Result of probing which text backends can run on this machine.
///
/// Probing spawns a process, so it is done once at startup and the result is
/// handed to whatever needs to pick a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAvailability {
    pub pdftotext: bool,
    pub embedded: bool,
}

impl BackendAvailability {
    /// Resolve a requested backend against what is actually available.
    pub fn resolve(&self, choice: BackendChoice) -> Result<BackendChoice, PestReportError> {
        match choice {
            BackendChoice::Pdftotext if !self.pdftotext => Err(PestReportError::PdftotextNotFound),
            BackendChoice::Auto if self.pdftotext => Ok(BackendChoice::Pdftotext),
            BackendChoice::Auto => {
                tracing::warn!("pdftotext unavailable, falling back to embedded extractor");
                Ok(BackendChoice::Embedded)
            }
            other => Ok(other),
        }
    }
}

pub fn probe_backends() -> BackendAvailability {
    let availability = BackendAvailability {
        pdftotext: pdftotext::PdftotextExtractor::is_available(),
        // Compiled in, always usable.
        embedded: true,
    };
    tracing::debug!(?availability, "probed text backends");
    availability
}

/// Build the text source for a resolved backend choice.
///
/// `layout` turns on pdftotext's `-layout` mode; the embedded backend has no
/// equivalent and ignores it.
pub fn make_text_source(
    choice: BackendChoice,
    layout: bool,
    availability: &BackendAvailability,
) -> Result<Box<dyn PdfTextSource>, PestReportError> {
    match availability.resolve(choice)? {
        BackendChoice::Embedded => Ok(Box::new(embedded::EmbeddedExtractor::new())),
        _ => Ok(Box::new(pdftotext::PdftotextExtractor::with_layout(layout))),
    }
}
