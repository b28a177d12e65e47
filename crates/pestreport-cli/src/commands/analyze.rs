use pestreport_core::error::PestReportError;
use pestreport_core::report::stats::DEFAULT_TOP_N;
use pestreport_core::report::ReportBuilder;
use std::path::Path;

use crate::output;

pub fn run(xlsx_file: &Path, top: Option<usize>) -> Result<(), PestReportError> {
    let top_n = top.unwrap_or(DEFAULT_TOP_N);
    if top_n == 0 {
        return Err(PestReportError::ConfigInvalid(
            "--top must be at least 1".into(),
        ));
    }

    let artifact = ReportBuilder::new(top_n).regenerate_analysis(xlsx_file)?;
    if let Some(stats) = &artifact.analysis {
        output::table::print_stats(stats);
    }
    println!("分析报告已生成: {}", artifact.path.display());
    Ok(())
}
