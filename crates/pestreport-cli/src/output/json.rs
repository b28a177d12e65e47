use pestreport_core::error::PestReportError;
use pestreport_core::model::ParsedSightings;

pub fn print(parsed: &ParsedSightings) -> Result<(), PestReportError> {
    let json = serde_json::to_string_pretty(parsed)?;
    println!("{json}");
    Ok(())
}
