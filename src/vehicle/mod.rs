pub mod airframe;
pub mod envelope;

pub use airframe::{presets, AirframeBuilder, AirframeParameters};
pub use envelope::{EnvelopeViolation, FlightEnvelope};
