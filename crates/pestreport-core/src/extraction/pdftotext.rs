use crate::error::PestReportError;
use crate::extraction::{PageContent, PdfTextSource};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Runs in reading-order mode by default. `-layout` keeps column alignment
/// but can interleave the two halves of a detection line with neighbouring
/// text, so it is opt-in.
pub struct PdftotextExtractor {
    layout: bool,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor { layout: false }
    }

    pub fn with_layout(layout: bool) -> Self {
        PdftotextExtractor { layout }
    }

    /// Arguments for converting `pdf_path`, text written to stdout.
    fn command_args(&self, pdf_path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-enc".into(), "UTF-8".into()];
        if self.layout {
            args.push("-layout".into());
        }
        args.push(pdf_path.into());
        args.push("-".into());
        args
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfTextSource for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PestReportError> {
        // Write PDF bytes to a temp file
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| PestReportError::SourceUnreadable(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| PestReportError::SourceUnreadable(e.to_string()))?;

        tracing::debug!(layout = self.layout, "running pdftotext");
        let output = Command::new("pdftotext")
            .args(self.command_args(tmpfile.path()))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PestReportError::PdftotextNotFound
                } else {
                    PestReportError::SourceUnreadable(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(PestReportError::PdftotextFailed { code, stderr });
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let pages = split_pages(&text);
        tracing::debug!(pages = pages.len(), "pdftotext produced text");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages (form feed \x0c separates pages).
///
/// pdftotext terminates the last page with a form feed too, so trailing empty
/// pages are dropped.
pub(crate) fn split_pages(text: &str) -> Vec<PageContent> {
    let mut pages: Vec<PageContent> = text
        .split('\x0c')
        .enumerate()
        .map(|(i, page_text)| PageContent::from_text(i + 1, page_text))
        .collect();

    while pages.len() > 1 && pages.last().is_some_and(|p| p.lines.is_empty()) {
        pages.pop();
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_on_form_feed() {
        let text = "封面\n\x0c虫害情况\n蟑螂 发现虫害活动 - 3\n\x0c服务总结\n\x0c";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].lines, vec!["虫害情况", "蟑螂 发现虫害活动 - 3"]);
        assert_eq!(pages[2].lines, vec!["服务总结"]);
    }

    #[test]
    fn test_split_pages_empty_document() {
        let pages = split_pages("");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(PdftotextExtractor::new().backend_name(), "pdftotext");
    }

    #[test]
    fn test_layout_flag_only_when_enabled() {
        let pdf = Path::new("/tmp/report.pdf");
        let plain = PdftotextExtractor::new().command_args(pdf);
        assert_eq!(plain, vec!["-enc", "UTF-8", "/tmp/report.pdf", "-"]);

        let layout = PdftotextExtractor::with_layout(true).command_args(pdf);
        assert_eq!(layout, vec!["-enc", "UTF-8", "-layout", "/tmp/report.pdf", "-"]);
    }
}
