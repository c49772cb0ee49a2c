pub mod altitude;
pub mod controller;
pub mod pid;

pub use altitude::AltitudeHold;
pub use controller::{CommandSource, ConstantCommand, HoverCommand};
pub use pid::Pid;
