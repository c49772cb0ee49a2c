use nalgebra::Vector3;

use crate::dynamics::state::{ControlInput, Deriv, RigidBodyState};
use crate::vehicle::AirframeParameters;

// ---------------------------------------------------------------------------
// Quadrotor equations of motion
// ---------------------------------------------------------------------------

/// Translational and rotational accelerations at the current state.
///
/// Forces & moments:
///   1. Gravity along +z (z is down)
///   2. Total thrust U1 along body -z, rotated by the current roll/pitch/yaw
///   3. Body torques U2..U4 through Euler's equations, diagonal inertia
pub fn derivatives(state: &RigidBodyState, airframe: &AirframeParameters, u: &ControlInput) -> Deriv {
    Deriv {
        accel: linear_acceleration(state, airframe, u.thrust),
        angular_accel: angular_acceleration(state, airframe, &u.torque()),
    }
}

pub fn linear_acceleration(
    state: &RigidBodyState,
    airframe: &AirframeParameters,
    thrust: f64,
) -> Vector3<f64> {
    let (s_phi, c_phi) = state.roll().sin_cos();
    let (s_the, c_the) = state.pitch().sin_cos();
    let (s_psi, c_psi) = state.yaw().sin_cos();
    let a = thrust / airframe.mass;

    Vector3::new(
        a * (c_phi * s_the * c_psi + s_phi * s_psi),
        a * (c_phi * s_the * s_psi - s_phi * c_psi),
        airframe.gravity - a * c_phi * c_the,
    )
}

/// Euler's equations with no products of inertia.
pub fn angular_acceleration(
    state: &RigidBodyState,
    airframe: &AirframeParameters,
    torque: &Vector3<f64>,
) -> Vector3<f64> {
    let i = &airframe.inertia;
    let (p, q, r) = (
        state.angular_velocity.x,
        state.angular_velocity.y,
        state.angular_velocity.z,
    );

    Vector3::new(
        (q * r * (i.y - i.z) + torque.x) / i.x,
        (r * p * (i.z - i.x) + torque.y) / i.y,
        (p * q * (i.x - i.y) + torque.z) / i.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn level() -> RigidBodyState {
        RigidBodyState::default()
    }

    #[test]
    fn free_fall_accelerates_down() {
        let a = AirframeParameters::default();
        let d = derivatives(&level(), &a, &ControlInput::default());
        assert_eq!(d.accel, Vector3::new(0.0, 0.0, 9.81));
        assert_eq!(d.angular_accel, Vector3::zeros());
    }

    #[test]
    fn hover_thrust_cancels_gravity() {
        let a = AirframeParameters::default();
        let u = ControlInput::new(a.weight(), 0.0, 0.0, 0.0);
        let d = derivatives(&level(), &a, &u);
        assert_relative_eq!(d.accel, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn positive_pitch_accelerates_forward() {
        let a = AirframeParameters::default();
        let s = RigidBodyState {
            orientation: Vector3::new(0.0, 0.2, 0.0),
            ..Default::default()
        };
        let acc = linear_acceleration(&s, &a, a.weight());
        assert!(acc.x > 0.0);
        assert_relative_eq!(acc.y, 0.0, epsilon = 1e-12);
        // Tilted thrust no longer fully supports the weight.
        assert!(acc.z > 0.0);
    }

    #[test]
    fn positive_roll_accelerates_toward_negative_y() {
        let a = AirframeParameters::default();
        let s = RigidBodyState {
            orientation: Vector3::new(0.2, 0.0, 0.0),
            ..Default::default()
        };
        let acc = linear_acceleration(&s, &a, a.weight());
        assert!(acc.y < 0.0);
        assert_relative_eq!(acc.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn torque_divided_by_principal_inertia() {
        let a = AirframeParameters::default();
        let alpha = angular_acceleration(&level(), &a, &Vector3::new(1e-3, 2e-3, 3e-3));
        assert_relative_eq!(alpha.x, 1e-3 / 3.9195e-4, max_relative = 1e-12);
        assert_relative_eq!(alpha.y, 2e-3 / 4.0515e-4, max_relative = 1e-12);
        assert_relative_eq!(alpha.z, 3e-3 / 6.3890e-3, max_relative = 1e-12);
    }

    #[test]
    fn gyroscopic_coupling() {
        let a = AirframeParameters::default();
        let s = RigidBodyState {
            angular_velocity: Vector3::new(0.0, 1.0, 2.0),
            ..Default::default()
        };
        let alpha = angular_acceleration(&s, &a, &Vector3::zeros());
        let i = a.inertia;
        assert_relative_eq!(alpha.x, 2.0 * (i.y - i.z) / i.x, max_relative = 1e-12);
        assert_eq!(alpha.y, 0.0);
        assert_eq!(alpha.z, 0.0);
    }
}
