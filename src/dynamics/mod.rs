pub mod quadrotor;
pub mod state;

pub use quadrotor::derivatives;
pub use state::{ControlInput, Deriv, RigidBodyState, SimConfig, GRAVITY};
