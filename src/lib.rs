//! Quadrotor plant model: 6-DOF rigid-body dynamics and "+" control allocation.
//!
//! Per tick, a `CommandSource` produces `(U1, U2, U3, U4)`, the
//! `ControlAllocationModel` turns it into realizable rotor speeds and back
//! into the achieved input, and the `RigidBodyIntegrator` advances the state.

pub mod error;
pub mod config;
pub mod dynamics;
pub mod vehicle;
pub mod actuation;
mod gnc_mod;
pub mod sim;
pub mod io;

// The gnc module: expose gnc_mod as `gnc` publicly
pub mod gnc {
    pub use crate::gnc_mod::*;
}

pub use actuation::{ControlAllocationModel, MixerConfig, MixerOutput};
pub use config::PlantConfig;
pub use dynamics::state::{ControlInput, RigidBodyState, SimConfig};
pub use error::{PlantError, Result};
pub use sim::{QuadrotorPlant, RigidBodyIntegrator};
pub use vehicle::{AirframeParameters, FlightEnvelope};
