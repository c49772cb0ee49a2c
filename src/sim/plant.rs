use log::debug;
use nalgebra::Vector4;

use crate::actuation::{ControlAllocationModel, MixerConfig, MixerOutput};
use crate::dynamics::state::{check_timestep, ControlInput, RigidBodyState};
use crate::error::Result;
use crate::vehicle::{AirframeParameters, FlightEnvelope};
use super::integrator::RigidBodyIntegrator;

// ---------------------------------------------------------------------------
// Quadrotor plant: allocation + dynamics + owned state
// ---------------------------------------------------------------------------

/// Result of one plant tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub state: RigidBodyState,
    /// Command after optional envelope clamping, i.e. what was sent to the mixer.
    pub commanded: ControlInput,
    pub mixer: MixerOutput,
    /// Saturation-corrected input that actually drove the dynamics.
    pub achieved: ControlInput,
}

/// One simulated vehicle. Each instance owns its state; run several in
/// parallel by giving each its own plant.
#[derive(Debug, Clone)]
pub struct QuadrotorPlant {
    mixer: ControlAllocationModel,
    integrator: RigidBodyIntegrator,
    envelope: FlightEnvelope,
    state: RigidBodyState,
}

impl QuadrotorPlant {
    pub fn new(
        airframe: AirframeParameters,
        mixer: &MixerConfig,
        envelope: FlightEnvelope,
    ) -> Result<Self> {
        envelope.validate()?;
        let integrator = RigidBodyIntegrator::new(airframe)?;
        let mixer = ControlAllocationModel::new(&airframe, mixer)?;
        Ok(Self {
            mixer,
            integrator,
            envelope,
            state: RigidBodyState::default(),
        })
    }

    /// Reference airframe, default rotor limit, advisory envelope.
    pub fn reference() -> Result<Self> {
        Self::new(AirframeParameters::default(), &MixerConfig::default(), FlightEnvelope::default())
    }

    pub fn with_state(mut self, state: RigidBodyState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &RigidBodyState {
        &self.state
    }

    pub fn reset(&mut self, state: RigidBodyState) {
        self.state = state;
    }

    pub fn airframe(&self) -> &AirframeParameters {
        self.integrator.airframe()
    }

    pub fn mixer(&self) -> &ControlAllocationModel {
        &self.mixer
    }

    pub fn envelope(&self) -> &FlightEnvelope {
        &self.envelope
    }

    /// Command → (envelope clamp) → inverse mixing → forward → step.
    pub fn apply(&mut self, command: &ControlInput, dt: f64) -> Result<TickOutcome> {
        check_timestep(dt)?;

        let commanded = if self.envelope.enforce {
            let c = self.envelope.clamp_command(command);
            if c != *command {
                debug!("command {:?} clamped to envelope as {:?}", command, c);
            }
            c
        } else {
            *command
        };

        let mix = self.mixer.mix(&commanded);
        let state = self.integrator.step(&mut self.state, &mix.achieved, dt)?;

        Ok(TickOutcome { state, commanded, mixer: mix.output, achieved: mix.achieved })
    }

    /// Drives the plant straight from rotor speeds (rad/s, nonnegative).
    pub fn apply_rotor_speeds(&mut self, rotor_speeds: &Vector4<f64>, dt: f64) -> Result<RigidBodyState> {
        let u = self.mixer.forward(rotor_speeds);
        self.integrator.step(&mut self.state, &u, dt)
    }
}
