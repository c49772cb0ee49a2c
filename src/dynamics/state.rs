use nalgebra::{Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::error::{PlantError, Result};

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

/// Gravity used by the reference airframe, m/s^2.
pub const GRAVITY: f64 = 9.81;

// ---------------------------------------------------------------------------
// Rigid-body state
// ---------------------------------------------------------------------------

/// Vehicle state at a single tick.
/// Frame: inertial, z axis pointing down (altitude above ground is `-z`).
/// Euler angles are not wrapped to a canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    pub position: Vector3<f64>,         // m   [x, y, z]
    pub velocity: Vector3<f64>,         // m/s
    pub orientation: Vector3<f64>,      // rad [roll, pitch, yaw]
    pub angular_velocity: Vector3<f64>, // rad/s [p, q, r]
}

impl Default for RigidBodyState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            orientation: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }
}

impl RigidBodyState {
    pub fn roll(&self) -> f64 {
        self.orientation.x
    }

    pub fn pitch(&self) -> f64 {
        self.orientation.y
    }

    pub fn yaw(&self) -> f64 {
        self.orientation.z
    }

    /// Height above the z = 0 plane.
    pub fn altitude(&self) -> f64 {
        -self.position.z
    }

    /// Angle between body z and inertial z, rad.
    pub fn tilt(&self) -> f64 {
        (self.roll().cos() * self.pitch().cos()).clamp(-1.0, 1.0).acos()
    }
}

// ---------------------------------------------------------------------------
// Generalized control vector (U1..U4)
// ---------------------------------------------------------------------------

/// Total thrust and body-frame torques requested from (or delivered by) the rotors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlInput {
    pub thrust: f64,    // U1, N
    pub tau_roll: f64,  // U2, N·m
    pub tau_pitch: f64, // U3, N·m
    pub tau_yaw: f64,   // U4, N·m
}

impl ControlInput {
    pub fn new(thrust: f64, tau_roll: f64, tau_pitch: f64, tau_yaw: f64) -> Self {
        Self { thrust, tau_roll, tau_pitch, tau_yaw }
    }

    pub fn to_vector(&self) -> Vector4<f64> {
        Vector4::new(self.thrust, self.tau_roll, self.tau_pitch, self.tau_yaw)
    }

    pub fn from_vector(u: &Vector4<f64>) -> Self {
        Self::new(u[0], u[1], u[2], u[3])
    }

    pub fn torque(&self) -> Vector3<f64> {
        Vector3::new(self.tau_roll, self.tau_pitch, self.tau_yaw)
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Deriv {
    pub accel: Vector3<f64>,         // inertial, m/s^2
    pub angular_accel: Vector3<f64>, // rad/s^2 [ddphi, ddtheta, ddpsi]
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,       // 50 Hz reference control loop
            max_time: 10.0,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<()> {
        check_timestep(self.dt)?;
        if !(self.max_time.is_finite() && self.max_time >= 0.0) {
            return Err(PlantError::InvalidParameter(format!(
                "max_time must be finite and >= 0, got {}",
                self.max_time
            )));
        }
        Ok(())
    }

    /// Number of ticks needed to cover `max_time`. A trailing partial step
    /// counts as a full tick, so the last sample may land past `max_time`.
    pub fn ticks(&self) -> usize {
        // Epsilon so 10.0 / 0.02 = 500.0000000001 does not round up to 501.
        ((self.max_time / self.dt) - 1e-9).ceil().max(0.0) as usize
    }
}

pub(crate) fn check_timestep(dt: f64) -> Result<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(PlantError::InvalidTimestep(dt))
    }
}
