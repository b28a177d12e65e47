use pestreport_core::config::ReportConfig;
use pestreport_core::error::PestReportError;
use pestreport_core::extraction::probe_backends;
use pestreport_core::pipeline::{PestReportPipeline, ReportPipeline};
use std::path::PathBuf;

use crate::output;

pub struct ReportArgs {
    pub pdf_file: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub backend: Option<String>,
    pub layout: bool,
    pub config: Option<PathBuf>,
}

pub fn run(args: ReportArgs) -> Result<(), PestReportError> {
    // Flags override the config file, which overrides the defaults.
    let mut config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::default(),
    };
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(name) = args.name {
        config.report_name = name;
    }
    if let Some(backend) = args.backend.as_deref() {
        config.backend = backend.parse()?;
    }
    if args.layout {
        config.pdftotext_layout = true;
    }

    let pipeline = PestReportPipeline::from_config(config, &probe_backends())?;
    tracing::debug!(backend = pipeline.backend_name(), "selected text backend");
    let summary = pipeline.run(&args.pdf_file)?;

    output::table::print_summary(&summary);
    Ok(())
}
