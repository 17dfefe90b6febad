//! Logging setup and per-tick scan summaries.

mod logging;
mod report;

pub use logging::setup_logging;
pub use report::TickReport;
