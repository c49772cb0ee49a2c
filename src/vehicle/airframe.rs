use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::state::GRAVITY;
use crate::error::{PlantError, Result};

// ---------------------------------------------------------------------------
// Airframe definition ("+" quadrotor)
// ---------------------------------------------------------------------------

/// Immutable physical constants of the vehicle.
///
/// `Default` reproduces the reference airframe exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirframeParameters {
    pub mass: f64,              // kg
    pub gravity: f64,           // m/s^2
    pub inertia: Vector3<f64>,  // [Ixx, Iyy, Izz] principal moments, kg·m^2
    pub motor_constant: f64,    // thrust per squared rotor speed, N/(rad/s)^2
    pub moment_constant: f64,   // rotor drag torque / thrust, m
    pub arm_length: f64,        // rotor hub to CG, m
}

impl Default for AirframeParameters {
    fn default() -> Self {
        Self {
            mass: 0.302,
            gravity: GRAVITY,
            inertia: Vector3::new(3.9195e-4, 4.0515e-4, 6.3890e-3),
            motor_constant: 2.9265e-7,
            moment_constant: 0.0162,
            arm_length: 0.0775,
        }
    }
}

impl AirframeParameters {
    /// k_f: thrust coefficient of a single rotor.
    pub fn thrust_coefficient(&self) -> f64 {
        self.motor_constant
    }

    /// k_m: yaw drag torque coefficient of a single rotor.
    pub fn torque_coefficient(&self) -> f64 {
        self.motor_constant * self.moment_constant
    }

    pub fn weight(&self) -> f64 {
        self.mass * self.gravity
    }

    /// Per-rotor speed that balances gravity with all four rotors equal, rad/s.
    pub fn hover_rotor_speed(&self) -> f64 {
        (self.weight() / (4.0 * self.motor_constant)).sqrt()
    }

    /// Checks that every constant is finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("mass", self.mass),
            ("gravity", self.gravity),
            ("inertia.xx", self.inertia.x),
            ("inertia.yy", self.inertia.y),
            ("inertia.zz", self.inertia.z),
            ("motor_constant", self.motor_constant),
            ("moment_constant", self.moment_constant),
            ("arm_length", self.arm_length),
        ];
        for (name, value) in fields {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlantError::InvalidParameter(format!(
                    "airframe {} must be finite and > 0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Airframe builder
// ---------------------------------------------------------------------------

pub struct AirframeBuilder {
    params: AirframeParameters,
}

impl AirframeBuilder {
    /// Starts from the reference airframe.
    pub fn new() -> Self {
        Self { params: AirframeParameters::default() }
    }

    pub fn mass(mut self, v: f64) -> Self { self.params.mass = v; self }
    pub fn gravity(mut self, v: f64) -> Self { self.params.gravity = v; self }
    pub fn inertia(mut self, v: Vector3<f64>) -> Self { self.params.inertia = v; self }
    pub fn motor_constant(mut self, v: f64) -> Self { self.params.motor_constant = v; self }
    pub fn moment_constant(mut self, v: f64) -> Self { self.params.moment_constant = v; self }
    pub fn arm_length(mut self, v: f64) -> Self { self.params.arm_length = v; self }

    pub fn build(self) -> Result<AirframeParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl Default for AirframeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Preset airframes
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// 0.302 kg micro quadrotor used for every regression fixture.
    pub fn reference() -> AirframeParameters {
        AirframeParameters::default()
    }

    /// Roughly a 250-class racer: heavier, longer arms, stronger rotors.
    pub fn racer_250() -> AirframeParameters {
        AirframeParameters {
            mass: 0.65,
            gravity: GRAVITY,
            inertia: Vector3::new(2.6e-3, 2.6e-3, 4.8e-3),
            motor_constant: 1.2e-6,
            moment_constant: 0.016,
            arm_length: 0.125,
        }
    }
}
