//! Construction-time configuration for a whole plant.
//!
//! Every section is optional in JSON and falls back to the reference values:
//!
//! ```json
//! {
//!   "airframe": { "mass": 0.302, "inertia": [3.9195e-4, 4.0515e-4, 6.389e-3] },
//!   "mixer": { "max_rotor_speed": 3000.0 },
//!   "envelope": { "enforce": false },
//!   "sim": { "dt": 0.02, "max_time": 10.0 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::actuation::MixerConfig;
use crate::dynamics::state::SimConfig;
use crate::error::Result;
use crate::vehicle::{AirframeParameters, FlightEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    pub airframe: AirframeParameters,
    pub mixer: MixerConfig,
    pub envelope: FlightEnvelope,
    pub sim: SimConfig,
}

impl PlantConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: PlantConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.airframe.validate()?;
        self.mixer.validate()?;
        self.envelope.validate()?;
        self.sim.validate()
    }
}
