use crate::dynamics;
use crate::dynamics::state::{check_timestep, ControlInput, RigidBodyState};
use crate::error::Result;
use crate::vehicle::AirframeParameters;

// ---------------------------------------------------------------------------
// Semi-implicit Euler integrator
// ---------------------------------------------------------------------------

/// Advances a `RigidBodyState` by one fixed timestep.
///
/// Velocities are updated first, then positions and angles are advanced with
/// the *updated* velocities. Keep this order: regression trajectories depend on it.
/// No envelope clamping happens here.
#[derive(Debug, Clone)]
pub struct RigidBodyIntegrator {
    airframe: AirframeParameters,
}

impl RigidBodyIntegrator {
    pub fn new(airframe: AirframeParameters) -> Result<Self> {
        airframe.validate()?;
        Ok(Self { airframe })
    }

    pub fn airframe(&self) -> &AirframeParameters {
        &self.airframe
    }

    /// Mutates `state` in place and returns a copy of the new state.
    pub fn step(&self, state: &mut RigidBodyState, u: &ControlInput, dt: f64) -> Result<RigidBodyState> {
        check_timestep(dt)?;
        euler_step(state, &self.airframe, u, dt);
        Ok(*state)
    }
}

/// Single semi-implicit Euler step. Caller guarantees `dt > 0`.
pub fn euler_step(state: &mut RigidBodyState, airframe: &AirframeParameters, u: &ControlInput, dt: f64) {
    let d = dynamics::derivatives(state, airframe, u);

    state.velocity += d.accel * dt;
    state.position += state.velocity * dt;

    state.angular_velocity += d.angular_accel * dt;
    state.orientation += state.angular_velocity * dt;
}
