pub mod integrator;
pub mod plant;
pub mod runner;
pub mod sink;

pub use integrator::RigidBodyIntegrator;
pub use plant::{QuadrotorPlant, TickOutcome};
pub use runner::{simulate, simulate_with, RunReport};
pub use sink::{NullSink, Sample, StateSink};
