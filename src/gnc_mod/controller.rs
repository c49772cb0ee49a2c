use crate::dynamics::state::{ControlInput, RigidBodyState};
use crate::vehicle::AirframeParameters;

/// Source of generalized commands (U1..U4), one per tick.
///
/// Implement this to plug a trajectory tracker or MPC into the simulation
/// loop. The plant does not clamp what comes out of here unless the flight
/// envelope is set to enforce.
pub trait CommandSource {
    /// Command for the tick starting at `time` with the given state.
    fn command(&mut self, state: &RigidBodyState, time: f64, dt: f64) -> ControlInput;

    /// Reset internal state (e.g., PID integrators).
    fn reset(&mut self) {}

    /// Human-readable name for logging/display.
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Same command every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantCommand(pub ControlInput);

impl CommandSource for ConstantCommand {
    fn command(&mut self, _state: &RigidBodyState, _time: f64, _dt: f64) -> ControlInput {
        self.0
    }

    fn name(&self) -> &str {
        "ConstantCommand"
    }
}

/// Open-loop hover: thrust equal to weight, zero torques.
#[derive(Debug, Clone, Copy)]
pub struct HoverCommand {
    thrust: f64,
}

impl HoverCommand {
    pub fn new(airframe: &AirframeParameters) -> Self {
        Self { thrust: airframe.weight() }
    }
}

impl CommandSource for HoverCommand {
    fn command(&mut self, _state: &RigidBodyState, _time: f64, _dt: f64) -> ControlInput {
        ControlInput::new(self.thrust, 0.0, 0.0, 0.0)
    }

    fn name(&self) -> &str {
        "HoverCommand"
    }
}

/// Closures work as command sources too.
impl<F> CommandSource for F
where
    F: FnMut(&RigidBodyState, f64, f64) -> ControlInput,
{
    fn command(&mut self, state: &RigidBodyState, time: f64, dt: f64) -> ControlInput {
        self(state, time, dt)
    }

    fn name(&self) -> &str {
        "closure"
    }
}
