use quadrotor_plant::gnc::AltitudeHold;
use quadrotor_plant::io::{write_trajectory_file, FlightSummary};
use quadrotor_plant::sim::{self, Sample};
use quadrotor_plant::PlantConfig;

fn main() -> quadrotor_plant::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => PlantConfig::from_json_file(path)?,
        None => PlantConfig::default(),
    };

    let mut controller = AltitudeHold::new(&config.airframe, -2.0);
    let mut samples: Vec<Sample> = Vec::new();
    let report = sim::simulate(&config, &mut controller, &mut samples)?;

    println!();
    println!("  Altitude hold, z_ref = -2.0 m");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Ticks: {}   dt: {} s   saturated: {}",
        report.ticks, config.sim.dt, report.saturated_ticks
    );

    let interval = (samples.len() / 20).max(1);
    println!("  {:>7}  {:>9}  {:>9}  {:>9}", "t (s)", "z (m)", "vz (m/s)", "w1 (rad/s)");
    for s in samples.iter().step_by(interval) {
        println!(
            "  {:>7.2}  {:>9.4}  {:>9.4}  {:>9.1}",
            s.time, s.state.position.z, s.state.velocity.z, s.rotor_speeds[0]
        );
    }

    if let Some(summary) = FlightSummary::from_samples(&samples) {
        println!(
            "  Peak altitude {:.3} m, peak speed {:.3} m/s",
            summary.max_altitude, summary.max_speed
        );
    }

    write_trajectory_file("altitude_hold.csv", &samples)?;
    println!("  Trajectory written to altitude_hold.csv");
    Ok(())
}
