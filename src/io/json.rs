use std::io::{self, Write};

use serde::Serialize;

use crate::sim::sink::Sample;

/// Summary statistics computed from a recorded run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    pub duration: f64,
    pub ticks: usize,
    pub final_position: [f64; 3],
    pub max_altitude: f64,    // m, -z
    pub max_speed: f64,       // m/s
    pub max_tilt_deg: f64,
    pub saturated_ticks: usize,
}

impl FlightSummary {
    /// Compute summary from recorded samples. `None` if there are none.
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let last = samples.last()?;

        let max_altitude = samples
            .iter()
            .map(|s| s.state.altitude())
            .fold(f64::NEG_INFINITY, f64::max);

        let max_speed = samples
            .iter()
            .map(|s| s.state.velocity.norm())
            .fold(0.0_f64, f64::max);

        let max_tilt = samples
            .iter()
            .map(|s| s.state.tilt())
            .fold(0.0_f64, f64::max);

        let p = last.state.position;
        Some(FlightSummary {
            duration: last.time,
            ticks: last.tick,
            final_position: [p.x, p.y, p.z],
            max_altitude,
            max_speed,
            max_tilt_deg: max_tilt.to_degrees(),
            saturated_ticks: samples.iter().filter(|s| s.clamped).count(),
        })
    }
}

/// Write flight summary as pretty JSON to a writer.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(path: &str, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
