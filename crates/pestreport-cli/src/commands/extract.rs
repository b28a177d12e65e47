use pestreport_core::config::ReportConfig;
use pestreport_core::error::PestReportError;
use pestreport_core::extraction::probe_backends;
use pestreport_core::pipeline::PestReportPipeline;
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    backend: Option<&str>,
    layout: bool,
) -> Result<(), PestReportError> {
    let mut config = ReportConfig::default();
    if let Some(name) = backend {
        config.backend = name.parse()?;
    }
    config.pdftotext_layout = layout;
    let pipeline = PestReportPipeline::from_config(config, &probe_backends())?;
    let parsed = pipeline.extract_file(&pdf_file)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Extracted {} record(s), written to {}",
                parsed.records.len(),
                path.display()
            );
            if !parsed.skipped_lines.is_empty() {
                eprintln!(
                    "  {} detection line(s) skipped during parsing",
                    parsed.skipped_lines.len()
                );
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => output::table::print_records(&parsed),
        },
    }

    Ok(())
}
