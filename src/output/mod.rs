//! Report types and formatters

pub mod formatter;
pub mod report;

pub use formatter::{ConsoleFormatter, JsonFormatter, OutputFormatter};
pub use report::{AtsRequest, AtsResponse, ScoreReport};
