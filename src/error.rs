//! Error types for the quadrotor plant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlantError {
    /// The allocation matrix cannot be inverted, so a torque command has no
    /// unique rotor-speed decomposition.
    #[error(
        "control allocation matrix is singular (det = {determinant:e}, normalized = {normalized:e})"
    )]
    SingularAllocationMatrix { determinant: f64, normalized: f64 },

    #[error("invalid timestep: dt must be finite and > 0, got {0}")]
    InvalidTimestep(f64),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("command outside flight envelope: {0}")]
    CommandOutOfEnvelope(String),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlantError>;
