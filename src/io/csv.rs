use std::io::{self, Write};

use crate::error::Result;
use crate::sim::sink::{Sample, StateSink};

const HEADER: &str = "time,x,y,z,vx,vy,vz,roll,pitch,yaw,p,q,r,\
                      u1_cmd,u2_cmd,u3_cmd,u4_cmd,u1,u2,u3,u4,\
                      w1,w2,w3,w4,clamped";

/// Write trajectory data to CSV format.
///
/// Columns: time, position, velocity, Euler angles, body rates,
///          commanded U1..U4, achieved U1..U4, rotor speeds, clamped
pub fn write_trajectory<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for s in samples {
        write_row(writer, s)?;
    }
    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: &str, samples: &[Sample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, samples)
}

fn write_row<W: Write>(writer: &mut W, s: &Sample) -> io::Result<()> {
    let st = &s.state;
    let (c, a, w) = (&s.command, &s.achieved, &s.rotor_speeds);
    writeln!(
        writer,
        "{:.4},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
         {:.6},{:.6},{:.6},{:.6},{:.6},{:.6},\
         {:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},{:.6e},\
         {:.2},{:.2},{:.2},{:.2},{}",
        s.time,
        st.position.x, st.position.y, st.position.z,
        st.velocity.x, st.velocity.y, st.velocity.z,
        st.orientation.x, st.orientation.y, st.orientation.z,
        st.angular_velocity.x, st.angular_velocity.y, st.angular_velocity.z,
        c.thrust, c.tau_roll, c.tau_pitch, c.tau_yaw,
        a.thrust, a.tau_roll, a.tau_pitch, a.tau_yaw,
        w[0], w[1], w[2], w[3],
        u8::from(s.clamped),
    )
}

/// Streams samples as CSV rows while the simulation runs.
pub struct CsvSink<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, header_written: false }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl CsvSink<io::BufWriter<std::fs::File>> {
    pub fn create(path: &str) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(io::BufWriter::new(file)))
    }
}

impl<W: Write> StateSink for CsvSink<W> {
    fn record(&mut self, sample: &Sample) -> Result<()> {
        if !self.header_written {
            writeln!(self.writer, "{}", HEADER)?;
            self.header_written = true;
        }
        write_row(&mut self.writer, sample)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
