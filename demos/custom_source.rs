use quadrotor_plant::dynamics::state::{ControlInput, RigidBodyState, SimConfig};
use quadrotor_plant::gnc::CommandSource;
use quadrotor_plant::io::CsvSink;
use quadrotor_plant::sim;
use quadrotor_plant::QuadrotorPlant;

/// Climbs with extra thrust, then kicks a short roll pulse and cuts back to hover.
struct ClimbAndRoll {
    weight: f64,
    climb_until: f64,
    roll_start: f64,
    roll_end: f64,
}

impl CommandSource for ClimbAndRoll {
    fn command(&mut self, _state: &RigidBodyState, time: f64, _dt: f64) -> ControlInput {
        let thrust = if time < self.climb_until { 1.3 * self.weight } else { self.weight };
        let tau_roll = if time > self.roll_start && time < self.roll_end { 2.0e-5 } else { 0.0 };
        ControlInput::new(thrust, tau_roll, 0.0, 0.0)
    }

    fn name(&self) -> &str {
        "ClimbAndRoll"
    }
}

fn main() -> quadrotor_plant::Result<()> {
    let mut plant = QuadrotorPlant::reference()?;
    let mut source = ClimbAndRoll {
        weight: plant.airframe().weight(),
        climb_until: 1.0,
        roll_start: 2.0,
        roll_end: 2.2,
    };
    let config = SimConfig { dt: 0.01, max_time: 4.0 };

    println!("Simulating with {} source...", source.name());
    let mut sink = CsvSink::create("custom_source.csv")?;
    let report = sim::simulate_with(&mut plant, &config, &mut source, &mut sink)?;

    let s = report.final_state;
    println!("Final position: [{:.3}, {:.3}, {:.3}] m", s.position.x, s.position.y, s.position.z);
    println!("Final roll: {:.2} deg", s.roll().to_degrees());
    println!("Saturated ticks: {}", report.saturated_ticks);
    Ok(())
}
