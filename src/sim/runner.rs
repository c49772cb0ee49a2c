use log::{info, trace};

use crate::config::PlantConfig;
use crate::dynamics::state::{RigidBodyState, SimConfig};
use crate::error::Result;
use crate::gnc::CommandSource;
use super::plant::QuadrotorPlant;
use super::sink::{Sample, StateSink};

/// What a finished run looked like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub ticks: usize,
    pub final_time: f64,
    pub final_state: RigidBodyState,
    /// Ticks where the mixer had to clamp or clip.
    pub saturated_ticks: usize,
}

// ---------------------------------------------------------------------------
// Closed-loop simulation
// ---------------------------------------------------------------------------

/// Run `config.ticks()` ticks of source → plant → sink, starting from the
/// plant's current state. The initial state is recorded as tick 0.
pub fn simulate_with(
    plant: &mut QuadrotorPlant,
    config: &SimConfig,
    source: &mut dyn CommandSource,
    sink: &mut dyn StateSink,
) -> Result<RunReport> {
    config.validate()?;

    let ticks = config.ticks();
    info!(
        "simulating {} ticks at dt={} s with {}",
        ticks,
        config.dt,
        source.name()
    );

    sink.record(&Sample::initial(*plant.state()))?;

    let mut saturated_ticks = 0;
    let mut time = 0.0;

    for tick in 1..=ticks {
        let command = source.command(plant.state(), time, config.dt);
        let out = plant.apply(&command, config.dt)?;
        time = tick as f64 * config.dt;

        if out.mixer.clamped {
            saturated_ticks += 1;
        }
        trace!("t={:.3} state={:?} achieved={:?}", time, out.state, out.achieved);

        sink.record(&Sample {
            tick,
            time,
            state: out.state,
            command,
            achieved: out.achieved,
            rotor_speeds: out.mixer.rotor_speeds,
            clamped: out.mixer.clamped,
        })?;
    }

    sink.finish()?;

    info!(
        "finished {} ticks, {} saturated, final position {:?}",
        ticks,
        saturated_ticks,
        plant.state().position
    );

    Ok(RunReport {
        ticks,
        final_time: time,
        final_state: *plant.state(),
        saturated_ticks,
    })
}

/// Build a plant from a full config and run it from the all-zero state.
pub fn simulate(
    config: &PlantConfig,
    source: &mut dyn CommandSource,
    sink: &mut dyn StateSink,
) -> Result<RunReport> {
    config.validate()?;
    let mut plant = QuadrotorPlant::new(config.airframe, &config.mixer, config.envelope)?;
    simulate_with(&mut plant, &config.sim, source, sink)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::ControlInput;
    use crate::error::PlantError;
    use crate::gnc::{AltitudeHold, ConstantCommand, HoverCommand};
    use crate::sim::sink::NullSink;
    use crate::vehicle::AirframeParameters;

    #[test]
    fn records_initial_plus_every_tick() {
        let config = PlantConfig::default();
        let mut source = HoverCommand::new(&config.airframe);
        let mut samples: Vec<Sample> = Vec::new();
        let report = simulate(&config, &mut source, &mut samples).unwrap();
        assert_eq!(report.ticks, 500);
        assert_eq!(samples.len(), 501);
        assert_eq!(samples[0].tick, 0);
        assert!((samples[500].time - 10.0).abs() < 1e-9);
        assert_eq!(report.saturated_ticks, 0);
    }

    #[test]
    fn altitude_hold_reaches_setpoint() {
        let config = PlantConfig {
            sim: SimConfig { dt: 0.01, max_time: 10.0 },
            ..Default::default()
        };
        let mut source = AltitudeHold::new(&config.airframe, -2.0);
        let report = simulate(&config, &mut source, &mut NullSink).unwrap();
        let s = report.final_state;
        assert!((s.position.z + 2.0).abs() < 1e-2, "z = {}", s.position.z);
        assert!(s.velocity.z.abs() < 1e-2, "vz = {}", s.velocity.z);
        assert_eq!(report.saturated_ticks, 0);
    }

    #[test]
    fn counts_saturated_ticks() {
        let config = PlantConfig {
            sim: SimConfig { dt: 0.02, max_time: 1.0 },
            ..Default::default()
        };
        let mut source = ConstantCommand(ControlInput::new(0.0, 1e-3, 0.0, 0.0));
        let report = simulate(&config, &mut source, &mut NullSink).unwrap();
        assert_eq!(report.saturated_ticks, report.ticks);
    }

    #[test]
    fn identical_runs_are_bit_identical() {
        let run = || {
            let config = PlantConfig::default();
            let mut source = AltitudeHold::new(&config.airframe, -2.0).with_yaw(0.3);
            let mut samples: Vec<Sample> = Vec::new();
            simulate(&config, &mut source, &mut samples).unwrap();
            samples
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn partial_last_step_runs_past_max_time() {
        let config = PlantConfig {
            sim: SimConfig { dt: 0.3, max_time: 1.0 },
            ..Default::default()
        };
        let mut source = HoverCommand::new(&config.airframe);
        let mut samples: Vec<Sample> = Vec::new();
        let report = simulate(&config, &mut source, &mut samples).unwrap();
        assert_eq!(report.ticks, 4);
        assert_eq!(samples.len(), 5);
        assert!((report.final_time - 1.2).abs() < 1e-12);
    }

    #[test]
    fn rejects_zero_dt() {
        let config = PlantConfig {
            sim: SimConfig { dt: 0.0, max_time: 1.0 },
            ..Default::default()
        };
        let mut source = HoverCommand::new(&AirframeParameters::default());
        let err = simulate(&config, &mut source, &mut NullSink);
        assert!(matches!(err, Err(PlantError::InvalidTimestep(_))));
    }

    #[test]
    fn closure_as_command_source() {
        let mut plant = QuadrotorPlant::reference().unwrap();
        let weight = plant.airframe().weight();
        let mut source = |_s: &RigidBodyState, _t: f64, _dt: f64| ControlInput::new(weight, 0.0, 0.0, 0.0);
        let config = SimConfig { dt: 0.02, max_time: 1.0 };
        let report = simulate_with(&mut plant, &config, &mut source, &mut NullSink).unwrap();
        assert!(report.final_state.position.norm() < 1e-9);
    }
}
