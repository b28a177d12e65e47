use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::PestReportError;
use crate::extraction::BackendChoice;
use crate::report::stats::DEFAULT_TOP_N;

const REPORT_FOLDER: &str = "虫害报告";
const DEFAULT_REPORT_NAME: &str = "虫害情况报告";

/// Settings for a report run.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the timestamped workbook is written to.
    pub output_dir: PathBuf,
    /// File name stem; a `_YYYYMMDD_HHMMSS.xlsx` suffix is appended.
    pub report_name: String,
    /// Size of the high-risk ranking.
    pub top_n: usize,
    pub backend: BackendChoice,
    /// Run pdftotext with `-layout` instead of reading order.
    pub pdftotext_layout: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: default_output_dir(),
            report_name: DEFAULT_REPORT_NAME.into(),
            top_n: DEFAULT_TOP_N,
            backend: BackendChoice::Auto,
            pdftotext_layout: false,
        }
    }
}

/// `<home>/Documents/虫害报告`, or relative to the working directory when no
/// home directory is known.
pub fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join(REPORT_FOLDER)
}

impl ReportConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self, PestReportError> {
        let content = std::fs::read_to_string(path).map_err(|e| PestReportError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: ReportConfig =
            serde_json::from_str(&content).map_err(|e| PestReportError::ConfigLoad {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PestReportError> {
        if self.top_n == 0 {
            return Err(PestReportError::ConfigInvalid(
                "top_n must be at least 1".into(),
            ));
        }
        if self.report_name.trim().is_empty() {
            return Err(PestReportError::ConfigInvalid(
                "report_name must not be empty".into(),
            ));
        }
        if self.report_name.contains(['/', '\\']) {
            return Err(PestReportError::ConfigInvalid(format!(
                "report_name '{}' must not contain path separators",
                self.report_name
            )));
        }
        Ok(())
    }

    /// Output path for a report generated at `at`.
    pub fn output_path_at(&self, at: NaiveDateTime) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.xlsx",
            self.report_name,
            at.format("%Y%m%d_%H%M%S")
        ))
    }

    /// Output path for a report generated now (local time).
    pub fn output_path(&self) -> PathBuf {
        self.output_path_at(chrono::Local::now().naive_local())
    }
}
