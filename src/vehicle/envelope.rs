use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::dynamics::state::{ControlInput, RigidBodyState};
use crate::error::{PlantError, Result};

// ---------------------------------------------------------------------------
// Flight envelope
// ---------------------------------------------------------------------------

/// Physical operating bounds of the vehicle.
///
/// These are advisory: the integrator never looks at them. A caller can opt
/// in to clamping commands at the controller boundary by setting `enforce`,
/// or query violations for logging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightEnvelope {
    pub max_z: f64,          // m, z is down so 0 = ground plane
    pub max_tilt: f64,       // rad, applies to roll and pitch
    pub max_velocity: f64,   // m/s, per axis
    pub max_body_rate: f64,  // rad/s, per axis
    pub min_thrust: f64,     // N
    pub max_thrust: f64,     // N
    pub max_torque: f64,     // N·m, per axis
    pub enforce: bool,
}

impl Default for FlightEnvelope {
    fn default() -> Self {
        Self {
            max_z: 0.0,
            max_tilt: 1.0,
            max_velocity: 15.0,
            max_body_rate: FRAC_PI_2,
            min_thrust: 0.0,
            max_thrust: 15.0,
            max_torque: 10.0,
            enforce: false,
        }
    }
}

/// One bound that a state or command is outside of.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeViolation {
    BelowGround { z: f64 },
    Tilt { axis: &'static str, angle: f64 },
    Velocity { axis: &'static str, value: f64 },
    BodyRate { axis: &'static str, value: f64 },
    Thrust { value: f64 },
    Torque { axis: &'static str, value: f64 },
}

const AXES: [&str; 3] = ["x", "y", "z"];
const TORQUE_AXES: [&str; 3] = ["roll", "pitch", "yaw"];

impl FlightEnvelope {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_tilt", self.max_tilt),
            ("max_velocity", self.max_velocity),
            ("max_body_rate", self.max_body_rate),
            ("max_thrust", self.max_thrust),
            ("max_torque", self.max_torque),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(PlantError::InvalidParameter(format!(
                    "envelope {} must be > 0, got {}",
                    name, value
                )));
            }
        }
        if !(self.min_thrust >= 0.0 && self.min_thrust < self.max_thrust) {
            return Err(PlantError::InvalidParameter(format!(
                "envelope thrust range [{}, {}] is empty or negative",
                self.min_thrust, self.max_thrust
            )));
        }
        Ok(())
    }

    /// Commands outside the thrust/torque bounds.
    pub fn command_violations(&self, u: &ControlInput) -> Vec<EnvelopeViolation> {
        let mut out = Vec::new();
        if u.thrust < self.min_thrust || u.thrust > self.max_thrust {
            out.push(EnvelopeViolation::Thrust { value: u.thrust });
        }
        for (axis, value) in TORQUE_AXES.into_iter().zip(u.torque().iter()) {
            if value.abs() > self.max_torque {
                out.push(EnvelopeViolation::Torque { axis, value: *value });
            }
        }
        out
    }

    /// Strict check: fails on the first out-of-bounds component.
    pub fn check_command(&self, u: &ControlInput) -> Result<()> {
        match self.command_violations(u).first() {
            None => Ok(()),
            Some(v) => Err(PlantError::CommandOutOfEnvelope(format!("{:?}", v))),
        }
    }

    /// Saturates a command into the thrust/torque bounds.
    pub fn clamp_command(&self, u: &ControlInput) -> ControlInput {
        let t = self.max_torque;
        ControlInput {
            thrust: u.thrust.clamp(self.min_thrust, self.max_thrust),
            tau_roll: u.tau_roll.clamp(-t, t),
            tau_pitch: u.tau_pitch.clamp(-t, t),
            tau_yaw: u.tau_yaw.clamp(-t, t),
        }
    }

    /// State components outside the envelope. Yaw is unbounded.
    pub fn state_violations(&self, s: &RigidBodyState) -> Vec<EnvelopeViolation> {
        let mut out = Vec::new();
        if s.position.z > self.max_z {
            out.push(EnvelopeViolation::BelowGround { z: s.position.z });
        }
        if s.roll().abs() > self.max_tilt {
            out.push(EnvelopeViolation::Tilt { axis: "roll", angle: s.roll() });
        }
        if s.pitch().abs() > self.max_tilt {
            out.push(EnvelopeViolation::Tilt { axis: "pitch", angle: s.pitch() });
        }
        for (axis, value) in AXES.into_iter().zip(s.velocity.iter()) {
            if value.abs() > self.max_velocity {
                out.push(EnvelopeViolation::Velocity { axis, value: *value });
            }
        }
        for (axis, value) in AXES.into_iter().zip(s.angular_velocity.iter()) {
            if value.abs() > self.max_body_rate {
                out.push(EnvelopeViolation::BodyRate { axis, value: *value });
            }
        }
        out
    }
}
