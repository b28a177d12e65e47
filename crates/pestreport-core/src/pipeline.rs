use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::ReportConfig;
use crate::error::PestReportError;
use crate::extraction::{make_text_source, BackendAvailability, PdfTextSource};
use crate::model::{ParsedSightings, SkippedLine};
use crate::report::stats::AggregateStats;
use crate::report::ReportBuilder;

/// What a caller gets back from a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub record_count: usize,
    pub skipped_lines: Vec<SkippedLine>,
    pub output_path: PathBuf,
    pub stats: AggregateStats,
    /// Human-readable status line for the front end.
    pub message: String,
}

/// PDF in, report workbook out. Front ends (CLI, HTTP handler, desktop
/// command) drive this and only translate inputs and the summary.
pub trait ReportPipeline {
    fn run(&self, pdf_path: &Path) -> Result<RunSummary, PestReportError>;
}

pub struct PestReportPipeline {
    source: Box<dyn PdfTextSource>,
    builder: ReportBuilder,
    config: ReportConfig,
}

impl PestReportPipeline {
    pub fn new(source: Box<dyn PdfTextSource>, config: ReportConfig) -> Self {
        PestReportPipeline {
            source,
            builder: ReportBuilder::new(config.top_n),
            config,
        }
    }

    /// Build a pipeline whose text backend is chosen from the config and the
    /// startup capability probe.
    pub fn from_config(
        config: ReportConfig,
        availability: &BackendAvailability,
    ) -> Result<Self, PestReportError> {
        config.validate()?;
        let source = make_text_source(config.backend, config.pdftotext_layout, availability)?;
        Ok(Self::new(source, config))
    }

    pub fn backend_name(&self) -> &str {
        self.source.backend_name()
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Extract records from a PDF file without writing a report.
    pub fn extract_file(&self, pdf_path: &Path) -> Result<ParsedSightings, PestReportError> {
        let pdf_bytes = std::fs::read(pdf_path).map_err(|e| {
            PestReportError::SourceUnreadable(format!("{}: {e}", pdf_path.display()))
        })?;
        guarded(|| crate::extract_pdf(&pdf_bytes, self.source.as_ref()))
    }

    /// Run the full pipeline, writing the report to an explicit path.
    pub fn run_to(&self, pdf_path: &Path, output_path: &Path) -> Result<RunSummary, PestReportError> {
        let parsed = self.extract_file(pdf_path)?;
        let record_count = parsed.records.len();

        let artifact = guarded(|| {
            let artifact = self.builder.build_primary_table(&parsed.records, output_path)?;
            self.builder.append_analysis(artifact, &parsed.records)
        })?;

        let stats = artifact.analysis.ok_or_else(|| {
            PestReportError::Internal("analysis missing after report generation".into())
        })?;

        Ok(RunSummary {
            record_count,
            message: format!(
                "成功提取 {record_count} 条记录, 文件已保存: {}",
                artifact.path.display()
            ),
            skipped_lines: parsed.skipped_lines,
            output_path: artifact.path,
            stats,
        })
    }
}

impl ReportPipeline for PestReportPipeline {
    fn run(&self, pdf_path: &Path) -> Result<RunSummary, PestReportError> {
        let output_path = self.config.output_path();
        tracing::info!(
            pdf = %pdf_path.display(),
            backend = self.backend_name(),
            output = %output_path.display(),
            "starting report run"
        );
        self.run_to(pdf_path, &output_path)
    }
}

/// Run `f`, turning a panic into [`PestReportError::Internal`].
fn guarded<T>(f: impl FnOnce() -> Result<T, PestReportError>) -> Result<T, PestReportError> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());
        tracing::error!(%detail, "unexpected fault in report pipeline");
        Err(PestReportError::Internal(detail))
    })
}
