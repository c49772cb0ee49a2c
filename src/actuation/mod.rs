pub mod mixer;

pub use mixer::{ControlAllocationModel, MixResult, MixerConfig, MixerOutput};
