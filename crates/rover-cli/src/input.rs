use anyhow::{Context, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tracing::warn;

/// Sensor updates arriving from the transport side, one per line:
/// `battery_voltage <v>` | `solar_power <w>` | `cmd_vel <lx> <az>`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorEvent {
    BatteryVoltage(f32),
    SolarPower(f32),
    CmdVel { linear_x: f32, angular_z: f32 },
}

pub enum EventSource {
    /// Replay file; rewinds on EOF so a short trace can drive a long run.
    File { reader: BufReader<File>, path: String },
    Stdin(BufReader<Stdin>),
}

impl EventSource {
    pub fn file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path).with_context(|| format!("open replay file {}", path))?;
        Ok(Self::File {
            reader: BufReader::new(File::from_std(f)),
            path: path.to_string(),
        })
    }

    pub fn stdin() -> Self {
        Self::Stdin(BufReader::new(tokio::io::stdin()))
    }

    pub async fn next_event(&mut self) -> Result<SensorEvent> {
        let mut line = String::new();
        loop {
            line.clear();
            match self {
                EventSource::File { reader, path } => {
                    let n = reader.read_line(&mut line).await?;
                    if n == 0 {
                        // EOF: rewind and replay
                        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                        let f = std::fs::File::open(path.as_str())
                            .with_context(|| format!("reopen replay file {}", path))?;
                        *reader = BufReader::new(File::from_std(f));
                        continue;
                    }
                }
                EventSource::Stdin(reader) => {
                    let n = reader.read_line(&mut line).await?;
                    if n == 0 {
                        // stdin closed; nothing more will arrive
                        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                        continue;
                    }
                }
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match parse_line(trimmed) {
                Some(ev) => return Ok(ev),
                None => warn!("input: skipping unparseable line: {}", trimmed),
            }
        }
    }
}

pub fn parse_line(s: &str) -> Option<SensorEvent> {
    let mut parts = s.split_whitespace();
    let ev = match parts.next()? {
        "battery_voltage" => SensorEvent::BatteryVoltage(parts.next()?.parse().ok()?),
        "solar_power" => SensorEvent::SolarPower(parts.next()?.parse().ok()?),
        "cmd_vel" => SensorEvent::CmdVel {
            linear_x: parts.next()?.parse().ok()?,
            angular_z: parts.next()?.parse().ok()?,
        },
        _ => return None,
    };
    // Trailing junk means the line isn't what we think it is.
    if parts.next().is_some() {
        return None;
    }
    Some(ev)
}
