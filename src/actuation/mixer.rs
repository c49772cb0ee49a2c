//! Control allocation for a "+" quadrotor.
//!
//! ```text
//!        front
//!         M1
//!         |
//!  M2 ----+---- M4
//!         |
//!         M3
//! ```
//!
//! The allocation matrix `A` maps squared rotor speeds to the generalized
//! control vector `[U1, U2, U3, U4]`:
//!
//! ```text
//! | kf     kf     kf     kf   |
//! | 0     -l·kf   0      l·kf |
//! | l·kf   0     -l·kf   0    |
//! | km    -km     km    -km   |
//! ```
//!
//! M1/M3 and M2/M4 spin in opposite directions, which is what makes the yaw row
//! alternate in sign.

use log::{debug, warn};
use nalgebra::{Matrix4, Vector4};
use serde::{Deserialize, Serialize};

use crate::dynamics::state::ControlInput;
use crate::error::{PlantError, Result};
use crate::vehicle::AirframeParameters;

/// Normalized-determinant threshold below which the matrix counts as singular.
pub const SINGULARITY_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Mixer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub max_rotor_speed: f64, // rad/s
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self { max_rotor_speed: 3000.0 }
    }
}

impl MixerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_rotor_speed.is_finite() && self.max_rotor_speed > 0.0 {
            Ok(())
        } else {
            Err(PlantError::InvalidParameter(format!(
                "max_rotor_speed must be finite and > 0, got {}",
                self.max_rotor_speed
            )))
        }
    }
}

// ---------------------------------------------------------------------------
// Mixer outputs
// ---------------------------------------------------------------------------

/// Rotor speeds produced by inverse mixing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixerOutput {
    pub rotor_speeds: Vector4<f64>, // rad/s, each in [0, max_rotor_speed]
    /// Any saturation happened (negative squared speed or over-speed).
    pub clamped: bool,
    /// At least one squared speed came out negative and was replaced by zero.
    pub negative_clamped: bool,
    /// At least one speed was clipped at `max_rotor_speed`.
    pub speed_clipped: bool,
}

/// Inverse mixing plus the generalized input the rotors actually deliver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixResult {
    pub output: MixerOutput,
    pub achieved: ControlInput,
}

// ---------------------------------------------------------------------------
// Control allocation model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ControlAllocationModel {
    allocation: Matrix4<f64>,
    inverse: Matrix4<f64>,
    max_rotor_speed: f64,
}

impl ControlAllocationModel {
    /// Builds the "+" allocation matrix and caches its inverse.
    ///
    /// Negative or non-finite rotor constants are `InvalidParameter`. An exact
    /// zero leaves the matrix degenerate and yields `SingularAllocationMatrix`.
    /// Mass, gravity and inertia are validated by `AirframeParameters::validate`.
    pub fn new(airframe: &AirframeParameters, mixer: &MixerConfig) -> Result<Self> {
        mixer.validate()?;
        check_rotor_constants(airframe)?;

        let kf = airframe.thrust_coefficient();
        let km = airframe.torque_coefficient();
        let l = airframe.arm_length;

        #[rustfmt::skip]
        let allocation = Matrix4::new(
            kf,     kf,      kf,     kf,
            0.0,   -l * kf,  0.0,    l * kf,
            l * kf, 0.0,    -l * kf, 0.0,
            km,    -km,      km,    -km,
        );

        let inverse = checked_inverse(&allocation)?;
        Ok(Self { allocation, inverse, max_rotor_speed: mixer.max_rotor_speed })
    }

    /// Reference airframe with the default 3000 rad/s rotor limit.
    pub fn reference() -> Result<Self> {
        Self::new(&AirframeParameters::default(), &MixerConfig::default())
    }

    pub fn allocation_matrix(&self) -> &Matrix4<f64> {
        &self.allocation
    }

    pub fn inverse_matrix(&self) -> &Matrix4<f64> {
        &self.inverse
    }

    pub fn max_rotor_speed(&self) -> f64 {
        self.max_rotor_speed
    }

    /// Generalized input produced by the given rotor speeds: `A · ω²`.
    ///
    /// Speeds must be nonnegative; sign is lost when squaring.
    pub fn forward(&self, rotor_speeds: &Vector4<f64>) -> ControlInput {
        let squared = rotor_speeds.component_mul(rotor_speeds);
        ControlInput::from_vector(&(self.allocation * squared))
    }

    /// Motor mixing: rotor speeds that best realize `desired`.
    ///
    /// Negative squared speeds become zero, then every speed is clipped to
    /// `[0, max_rotor_speed]`. Either saturation sets `clamped`.
    pub fn inverse(&self, desired: &ControlInput) -> MixerOutput {
        let mut squared = self.inverse * desired.to_vector();

        let mut negative_clamped = false;
        for (i, w2) in squared.iter_mut().enumerate() {
            if *w2 < 0.0 {
                warn!(
                    "negative squared speed {:.3e} on rotor {}, replacing with zero",
                    *w2,
                    i + 1
                );
                *w2 = 0.0;
                negative_clamped = true;
            }
        }

        let mut speed_clipped = false;
        let rotor_speeds = squared.map(|w2| {
            let w = w2.sqrt();
            if w > self.max_rotor_speed {
                speed_clipped = true;
            }
            w.clamp(0.0, self.max_rotor_speed)
        });
        if speed_clipped {
            debug!("rotor speed clipped at {} rad/s: {:?}", self.max_rotor_speed, squared.map(f64::sqrt));
        }

        MixerOutput {
            rotor_speeds,
            clamped: negative_clamped || speed_clipped,
            negative_clamped,
            speed_clipped,
        }
    }

    /// Inverse mixing followed by `forward`, exposing what the rotors really produce.
    pub fn mix(&self, desired: &ControlInput) -> MixResult {
        let output = self.inverse(desired);
        let achieved = self.forward(&output.rotor_speeds);
        MixResult { output, achieved }
    }
}

/// Hadamard-normalized determinant, `|det A| / Π‖row_i‖`, in `[0, 1]`.
/// Returns 0 when any row is zero.
pub fn normalized_determinant(a: &Matrix4<f64>) -> f64 {
    let row_norms: f64 = a.row_iter().map(|r| r.norm()).product();
    if row_norms == 0.0 || !row_norms.is_finite() {
        return 0.0;
    }
    a.determinant().abs() / row_norms
}

fn check_rotor_constants(airframe: &AirframeParameters) -> Result<()> {
    let fields = [
        ("motor_constant", airframe.motor_constant),
        ("moment_constant", airframe.moment_constant),
        ("arm_length", airframe.arm_length),
    ];
    for (name, value) in fields {
        if !(value.is_finite() && value >= 0.0) {
            return Err(PlantError::InvalidParameter(format!(
                "airframe {} must be finite and >= 0, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

fn checked_inverse(a: &Matrix4<f64>) -> Result<Matrix4<f64>> {
    let determinant = a.determinant();
    let normalized = normalized_determinant(a);
    if !(normalized > SINGULARITY_TOLERANCE) {
        return Err(PlantError::SingularAllocationMatrix { determinant, normalized });
    }
    a.try_inverse()
        .ok_or(PlantError::SingularAllocationMatrix { determinant, normalized })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::AirframeBuilder;
    use approx::assert_relative_eq;

    fn model() -> ControlAllocationModel {
        ControlAllocationModel::reference().unwrap()
    }

    #[test]
    fn zero_speeds_give_zero_input() {
        let u = model().forward(&Vector4::zeros());
        assert_eq!(u, ControlInput::default());
    }

    #[test]
    fn equal_speeds_give_pure_thrust() {
        let u = model().forward(&Vector4::repeat(400.0));
        assert_relative_eq!(u.thrust, 4.0 * 2.9265e-7 * 400.0 * 400.0, max_relative = 1e-12);
        assert!((u.thrust - 0.1873).abs() < 1e-4);
        assert!(u.tau_roll.abs() < 1e-15);
        assert!(u.tau_pitch.abs() < 1e-15);
        assert!(u.tau_yaw.abs() < 1e-15);
    }

    #[test]
    fn cached_inverse_is_inverse() {
        let m = model();
        let id = m.allocation_matrix() * m.inverse_matrix();
        assert_relative_eq!(id, Matrix4::identity(), epsilon = 1e-9);
    }

    #[test]
    fn reference_layout_is_perfectly_conditioned() {
        let m = model();
        assert!(m.allocation_matrix().determinant().abs() < 1e-20);
        assert_relative_eq!(normalized_determinant(m.allocation_matrix()), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn hover_thrust_mixes_to_equal_speeds() {
        let a = AirframeParameters::default();
        let out = model().inverse(&ControlInput::new(a.weight(), 0.0, 0.0, 0.0));
        assert!(!out.clamped);
        for w in out.rotor_speeds.iter() {
            assert_relative_eq!(*w, a.hover_rotor_speed(), max_relative = 1e-9);
        }
    }

    #[test]
    fn feasible_command_round_trips() {
        let m = model();
        let u = ControlInput::new(2.5, 1.0e-3, -5.0e-4, 2.0e-5);
        let r = m.mix(&u);
        assert!(!r.output.clamped);
        assert_relative_eq!(r.achieved.thrust, u.thrust, max_relative = 1e-9);
        assert_relative_eq!(r.achieved.tau_roll, u.tau_roll, max_relative = 1e-9);
        assert_relative_eq!(r.achieved.tau_pitch, u.tau_pitch, max_relative = 1e-9);
        assert_relative_eq!(r.achieved.tau_yaw, u.tau_yaw, max_relative = 1e-9);
    }

    #[test]
    fn roll_torque_drives_m4_over_m2() {
        let out = model().inverse(&ControlInput::new(2.0, 1.0e-3, 0.0, 0.0));
        assert!(out.rotor_speeds[3] > out.rotor_speeds[1]);
        assert_relative_eq!(out.rotor_speeds[0], out.rotor_speeds[2], max_relative = 1e-9);
    }

    #[test]
    fn negative_squared_speed_is_clamped() {
        let m = model();
        // Pure roll torque with no thrust: M2 would need a negative squared speed.
        let u = ControlInput::new(0.0, 1.0e-3, 0.0, 0.0);
        let r = m.mix(&u);
        assert!(r.output.clamped);
        assert!(r.output.negative_clamped);
        assert!(!r.output.speed_clipped);
        assert_eq!(r.output.rotor_speeds[1], 0.0);
        assert!(r.output.rotor_speeds.iter().all(|w| *w >= 0.0));
        // Achieved thrust is positive even though none was asked for.
        assert!(r.achieved.thrust > 0.0);
    }

    #[test]
    fn over_speed_is_clipped() {
        let m = model();
        let u = ControlInput::new(20.0, 0.0, 0.0, 0.0);
        let r = m.mix(&u);
        assert!(r.output.clamped);
        assert!(r.output.speed_clipped);
        assert!(!r.output.negative_clamped);
        for w in r.output.rotor_speeds.iter() {
            assert_eq!(*w, 3000.0);
        }
        let envelope = 4.0 * 2.9265e-7 * 3000.0 * 3000.0;
        assert_relative_eq!(r.achieved.thrust, envelope, max_relative = 1e-12);
        assert!(r.achieved.thrust < u.thrust);
    }

    #[test]
    fn saturated_output_stays_in_envelope() {
        let m = model();
        let max_thrust = 4.0 * 2.9265e-7 * 3000.0_f64.powi(2);
        let commands = [
            ControlInput::new(-1.0, 0.0, 0.0, 0.0),
            ControlInput::new(50.0, 5.0, -5.0, 1.0),
            ControlInput::new(1.0, 0.0, 0.0, -1.0),
        ];
        for u in commands {
            let r = m.mix(&u);
            assert!(r.output.clamped, "{:?} should saturate", u);
            assert!(r.output.rotor_speeds.iter().all(|w| (0.0..=3000.0).contains(w)));
            assert!(r.achieved.thrust >= 0.0 && r.achieved.thrust <= max_thrust * (1.0 + 1e-12));
        }
    }

    #[test]
    fn zero_motor_constant_is_singular() {
        let a = AirframeParameters { motor_constant: 0.0, ..Default::default() };
        let err = ControlAllocationModel::new(&a, &MixerConfig::default());
        assert!(matches!(err, Err(PlantError::SingularAllocationMatrix { .. })));
    }

    #[test]
    fn negative_rotor_constants_are_rejected() {
        let cases = [
            AirframeParameters { motor_constant: -2.9265e-7, ..Default::default() },
            AirframeParameters { moment_constant: -0.0162, ..Default::default() },
            AirframeParameters { arm_length: -0.0775, ..Default::default() },
            AirframeParameters { motor_constant: f64::NAN, ..Default::default() },
            AirframeParameters { arm_length: f64::INFINITY, ..Default::default() },
        ];
        for a in cases {
            let err = ControlAllocationModel::new(&a, &MixerConfig::default());
            assert!(matches!(err, Err(PlantError::InvalidParameter(_))), "{:?} accepted", a);
        }
    }

    #[test]
    fn zero_arm_or_moment_is_singular() {
        let a = AirframeParameters { arm_length: 0.0, ..Default::default() };
        assert!(ControlAllocationModel::new(&a, &MixerConfig::default()).is_err());
        let a = AirframeParameters { moment_constant: 0.0, ..Default::default() };
        assert!(ControlAllocationModel::new(&a, &MixerConfig::default()).is_err());
    }

    #[test]
    fn tiny_but_regular_airframe_is_accepted() {
        // Raw determinant underflows any absolute tolerance; the model must still build.
        let a = AirframeBuilder::new().motor_constant(1e-9).build().unwrap();
        assert!(ControlAllocationModel::new(&a, &MixerConfig::default()).is_ok());
    }

    #[test]
    fn rejects_bad_speed_limit() {
        let mixer = MixerConfig { max_rotor_speed: 0.0 };
        let err = ControlAllocationModel::new(&AirframeParameters::default(), &mixer);
        assert!(matches!(err, Err(PlantError::InvalidParameter(_))));
    }

    #[test]
    fn yaw_command_splits_opposite_pairs() {
        // 2 N thrust with a small yaw torque: M1/M3 speed up, M2/M4 slow down.
        let m = model();
        let u = ControlInput::new(2.0, 0.0, 0.0, 1.0e-4);
        let out = m.inverse(&u);
        let kf: f64 = 2.9265e-7;
        let km = kf * 0.0162;
        let w13 = ((2.0 / kf + 1.0e-4 / km) / 4.0).sqrt();
        let w24 = ((2.0 / kf - 1.0e-4 / km) / 4.0).sqrt();
        assert_relative_eq!(out.rotor_speeds[0], w13, max_relative = 1e-9);
        assert_relative_eq!(out.rotor_speeds[2], w13, max_relative = 1e-9);
        assert_relative_eq!(out.rotor_speeds[1], w24, max_relative = 1e-9);
        assert_relative_eq!(out.rotor_speeds[3], w24, max_relative = 1e-9);
    }
}
