use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PestReportError {
    #[error("未找到虫害情况数据: section between '{start}' and '{end}' not found")]
    SectionNotFound {
        start: &'static str,
        end: &'static str,
    },

    #[error("no pest records found in the pest activity section")]
    NoRecordsFound,

    #[error("PDF读取失败: {0}")]
    SourceUnreadable(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("没有数据可以导出: no records supplied to the report builder")]
    EmptyInput,

    #[error("failed to write report to {path}: {reason}")]
    PersistenceFailure { path: PathBuf, reason: String },

    #[error("failed to read report workbook {path}: {reason}")]
    ArtifactUnreadable { path: PathBuf, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification of a [`PestReportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SectionNotFound,
    NoRecordsFound,
    SourceUnreadable,
    EmptyInput,
    PersistenceFailure,
    InvalidConfig,
    Internal,
}

impl PestReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PestReportError::SectionNotFound { .. } => ErrorKind::SectionNotFound,
            PestReportError::NoRecordsFound => ErrorKind::NoRecordsFound,
            PestReportError::SourceUnreadable(_)
            | PestReportError::PdftotextNotFound
            | PestReportError::PdftotextFailed { .. } => ErrorKind::SourceUnreadable,
            PestReportError::EmptyInput => ErrorKind::EmptyInput,
            PestReportError::PersistenceFailure { .. }
            | PestReportError::ArtifactUnreadable { .. } => ErrorKind::PersistenceFailure,
            PestReportError::ConfigLoad { .. } | PestReportError::ConfigInvalid(_) => {
                ErrorKind::InvalidConfig
            }
            PestReportError::Internal(_) => ErrorKind::Internal,
            // Plain IO and JSON errors only surface from caller-side file handling.
            PestReportError::Io(_) | PestReportError::Json(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PestReportError::PersistenceFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
