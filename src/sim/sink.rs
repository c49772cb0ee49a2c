use serde::{Deserialize, Serialize};
use nalgebra::Vector4;

use crate::dynamics::state::{ControlInput, RigidBodyState};
use crate::error::Result;

/// Everything known about one simulation tick, recorded after the step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub tick: usize,
    pub time: f64,                  // s, at the end of the tick
    pub state: RigidBodyState,
    pub command: ControlInput,      // as requested by the command source
    pub achieved: ControlInput,     // as delivered by the rotors
    pub rotor_speeds: Vector4<f64>, // rad/s
    pub clamped: bool,
}

impl Sample {
    /// Tick 0: initial state, nothing commanded yet.
    pub fn initial(state: RigidBodyState) -> Self {
        Self {
            tick: 0,
            time: 0.0,
            state,
            command: ControlInput::default(),
            achieved: ControlInput::default(),
            rotor_speeds: Vector4::zeros(),
            clamped: false,
        }
    }
}

/// Receives the state once per tick (logging, plotting, recording).
pub trait StateSink {
    fn record(&mut self, sample: &Sample) -> Result<()>;

    /// Called once after the last tick.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl StateSink for Vec<Sample> {
    fn record(&mut self, sample: &Sample) -> Result<()> {
        self.push(*sample);
        Ok(())
    }
}

/// Discards everything.
pub struct NullSink;

impl StateSink for NullSink {
    fn record(&mut self, _sample: &Sample) -> Result<()> {
        Ok(())
    }
}
