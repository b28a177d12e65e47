use pestreport_core::error::PestReportError;
use pestreport_core::extraction::{probe_backends, BackendChoice};

use crate::output;

pub fn run() -> Result<(), PestReportError> {
    let availability = probe_backends();
    let auto = availability.resolve(BackendChoice::Auto)?;
    output::table::print_backends(&availability, auto);
    Ok(())
}
