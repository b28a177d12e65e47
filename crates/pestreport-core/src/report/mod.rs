pub mod artifact;
pub mod layout;
pub mod stats;
pub mod workbook;

use std::path::Path;

use crate::error::PestReportError;
use crate::model::PestSighting;
use artifact::{persist_atomic, read_primary_table, ReportArtifact};
use stats::{AggregateStats, DEFAULT_TOP_N};

/// Writes pest records to a report workbook and derives its analysis sheet.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    top_n: usize,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl ReportBuilder {
    pub fn new(top_n: usize) -> Self {
        ReportBuilder { top_n }
    }

    /// Write the primary data sheet to `path`, replacing any existing file.
    pub fn build_primary_table(
        &self,
        records: &[PestSighting],
        path: &Path,
    ) -> Result<ReportArtifact, PestReportError> {
        if records.is_empty() {
            return Err(PestReportError::EmptyInput);
        }

        let bytes =
            workbook::render(records, None).map_err(|e| PestReportError::persistence(path, e))?;
        persist_atomic(path, &bytes)?;

        tracing::info!(path = %path.display(), records = records.len(), "文件已保存");
        Ok(ReportArtifact {
            path: path.to_path_buf(),
            record_count: records.len(),
            analysis: None,
        })
    }

    /// Compute statistics over the artifact's primary sheet and write them
    /// as the first sheet of the workbook.
    ///
    /// Statistics are always derived from the rows as persisted, so the
    /// analysis sheet describes exactly the primary sheet it sits beside.
    /// `records` is what the caller believes was written; a mismatch is
    /// logged. Any previous analysis sheet is replaced, so repeated calls
    /// leave exactly one analysis sheet behind.
    pub fn append_analysis(
        &self,
        artifact: ReportArtifact,
        records: &[PestSighting],
    ) -> Result<ReportArtifact, PestReportError> {
        if records.is_empty() {
            return Err(PestReportError::EmptyInput);
        }

        let persisted = read_primary_table(&artifact.path)?;
        if persisted.is_empty() {
            return Err(PestReportError::EmptyInput);
        }
        if persisted != records {
            tracing::warn!(
                path = %artifact.path.display(),
                persisted = persisted.len(),
                supplied = records.len(),
                "primary sheet differs from supplied records; analysing the persisted sheet"
            );
        }

        let stats = AggregateStats::compute(&persisted, self.top_n);
        self.write_with_analysis(&artifact.path, &persisted, &stats)?;

        Ok(ReportArtifact {
            record_count: persisted.len(),
            analysis: Some(stats),
            ..artifact
        })
    }

    /// Rebuild the analysis sheet of an existing workbook from its own
    /// primary sheet.
    pub fn regenerate_analysis(&self, path: &Path) -> Result<ReportArtifact, PestReportError> {
        let records = read_primary_table(path)?;
        let artifact = ReportArtifact {
            path: path.to_path_buf(),
            record_count: records.len(),
            analysis: None,
        };
        self.append_analysis(artifact, &records)
    }

    /// Primary table followed by analysis, the full report in one call.
    pub fn write_report(
        &self,
        records: &[PestSighting],
        path: &Path,
    ) -> Result<ReportArtifact, PestReportError> {
        let artifact = self.build_primary_table(records, path)?;
        self.append_analysis(artifact, records)
    }

    fn write_with_analysis(
        &self,
        path: &Path,
        records: &[PestSighting],
        stats: &AggregateStats,
    ) -> Result<(), PestReportError> {
        let bytes = workbook::render(records, Some(stats))
            .map_err(|e| PestReportError::persistence(path, e))?;
        persist_atomic(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            pest_types = stats.by_pest_type.len(),
            buildings = stats.by_building.len(),
            "分析报告已生成"
        );
        Ok(())
    }
}
