pub mod csv;
pub mod json;

pub use csv::{write_trajectory, write_trajectory_file, CsvSink};
pub use json::{write_summary, write_summary_file, FlightSummary};
