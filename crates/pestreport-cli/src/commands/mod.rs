pub mod analyze;
pub mod backends;
pub mod extract;
pub mod report;
