//! Simulated microMONET firmware.
//!
//! [`SimulatedMount`] is a [`Transport`] that answers commands the way the
//! mount's firmware does: it prints a startup banner, tracks pointing,
//! moves toward a commanded target a little on every position query, and
//! reports canned sensor readings. It backs the CLI's `--simulate` mode and
//! end-to-end tests that need more than a fixed script.
//!
//! Internal state is shared with a [`SimulatedMountHandle`] so tests can
//! inspect the mount after the transport has been moved into a client.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use monet_core::error::{Error, Result};
use monet_core::transport::Transport;
use monet_core::types::{MAX_SPEED_RPM, MIN_SPEED_RPM, Position, READY_PHRASE};

/// Degrees moved per position query, per RPM of motor speed.
const DEG_PER_POLL_PER_RPM: f64 = 1.0;

#[derive(Debug)]
struct State {
    position: Position,
    target: Option<Position>,
    /// Set by `ABORT`; the next `GET_POS` reports the abort and clears it.
    aborted: bool,
    speed_rpm: u8,
    led: bool,
    ccd: bool,
    temperature_c: f64,
    humidity_pct: f64,
    /// Every complete command line received, without its terminator.
    commands: Vec<String>,
}

impl State {
    fn new() -> Self {
        State {
            position: Position::new(0.0, 0.0),
            target: None,
            aborted: false,
            speed_rpm: 5,
            led: false,
            ccd: false,
            temperature_c: 18.5,
            humidity_pct: 42.0,
            commands: Vec::new(),
        }
    }

    fn step_toward_target(&mut self) {
        let Some(target) = self.target else {
            return;
        };
        let step = f64::from(self.speed_rpm) * DEG_PER_POLL_PER_RPM;
        self.position.altitude = approach(self.position.altitude, target.altitude, step);
        self.position.azimuth = approach(self.position.azimuth, target.azimuth, step);
        if self.position == target {
            self.target = None;
        }
    }

    fn respond(&mut self, line: &str) -> String {
        self.commands.push(line.to_string());

        match line {
            "GET_POS" => {
                if self.aborted {
                    self.aborted = false;
                    return format!(
                        "Aborted at ALT: {:.2} AZ: {:.2}",
                        self.position.altitude, self.position.azimuth
                    );
                }
                self.step_toward_target();
                format!(
                    "ALT: {:.2} AZ: {:.2}",
                    self.position.altitude, self.position.azimuth
                )
            }
            "LED_ON" => {
                self.led = true;
                "LED ON".into()
            }
            "LED_OFF" => {
                self.led = false;
                "LED OFF".into()
            }
            "CCD_ON" => {
                self.ccd = true;
                "CCD LED ON".into()
            }
            "CCD_OFF" => {
                self.ccd = false;
                "CCD LED OFF".into()
            }
            "GET_TEMP" => format!("Temperature: {:.2} °C", self.temperature_c),
            "GET_HUMI" => format!("Humidity: {:.2} %", self.humidity_pct),
            "ABORT" => {
                if self.target.take().is_some() {
                    self.aborted = true;
                    "Slew aborted".into()
                } else {
                    "No slew in progress".into()
                }
            }
            other => {
                if let Some(rpm) = other.strip_prefix("SET_SPEED ") {
                    return match rpm.parse::<u8>() {
                        Ok(rpm) if (MIN_SPEED_RPM..=MAX_SPEED_RPM).contains(&rpm) => {
                            self.speed_rpm = rpm;
                            format!("Speed set to {rpm} RPM")
                        }
                        _ => "Invalid speed".into(),
                    };
                }
                if let Some(target) = parse_slew_command(other) {
                    self.target = Some(target);
                    self.aborted = false;
                    return format!(
                        "Slewing to ALT: {} AZ: {}",
                        target.altitude, target.azimuth
                    );
                }
                "Unknown command".into()
            }
        }
    }
}

fn approach(current: f64, target: f64, step: f64) -> f64 {
    if (target - current).abs() <= step {
        target
    } else if target > current {
        current + step
    } else {
        current - step
    }
}

/// Parse `ALT:<f> AZ:<f>` as sent by the host.
fn parse_slew_command(line: &str) -> Option<Position> {
    let rest = line.strip_prefix("ALT:")?;
    let (alt, az) = rest.split_once(" AZ:")?;
    Some(Position::new(
        alt.trim().parse().ok()?,
        az.trim().parse().ok()?,
    ))
}

/// Inspection handle onto a [`SimulatedMount`]'s state.
#[derive(Debug, Clone)]
pub struct SimulatedMountHandle {
    state: Arc<Mutex<State>>,
}

impl SimulatedMountHandle {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current pointing.
    pub fn position(&self) -> Position {
        self.lock().position
    }

    /// Whether a slew is still in progress.
    pub fn is_slewing(&self) -> bool {
        self.lock().target.is_some()
    }

    pub fn speed_rpm(&self) -> u8 {
        self.lock().speed_rpm
    }

    pub fn led_on(&self) -> bool {
        self.lock().led
    }

    pub fn ccd_on(&self) -> bool {
        self.lock().ccd
    }

    /// Every command line received so far.
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }
}

/// A [`Transport`] that emulates the microMONET firmware.
#[derive(Debug)]
pub struct SimulatedMount {
    state: Arc<Mutex<State>>,
    /// Bytes received from the host that do not yet form a complete line.
    rx_partial: Vec<u8>,
    /// Bytes waiting to be read by the host.
    outbound: VecDeque<u8>,
    connected: bool,
}

impl SimulatedMount {
    /// Create a simulated mount that has just been reset: its boot messages
    /// and the readiness banner are already waiting to be read.
    pub fn new() -> Self {
        let mut mount = Self::without_banner();
        mount.queue_line("Initializing microMONET...");
        mount.queue_line(READY_PHRASE);
        mount
    }

    /// Create a simulated mount that has already booted.
    pub fn without_banner() -> Self {
        SimulatedMount {
            state: Arc::new(Mutex::new(State::new())),
            rx_partial: Vec::new(),
            outbound: VecDeque::new(),
            connected: true,
        }
    }

    /// Start the mount at a given pointing.
    pub fn with_position(self, position: Position) -> Self {
        self.lock().position = position;
        self
    }

    /// Set the readings returned by `GET_TEMP` and `GET_HUMI`.
    pub fn with_environment(self, temperature_c: f64, humidity_pct: f64) -> Self {
        {
            let mut state = self.lock();
            state.temperature_c = temperature_c;
            state.humidity_pct = humidity_pct;
        }
        self
    }

    /// Get an inspection handle sharing this mount's state.
    pub fn handle(&self) -> SimulatedMountHandle {
        SimulatedMountHandle {
            state: Arc::clone(&self.state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arduino `Serial.println` terminates lines with CRLF.
    fn queue_line(&mut self, line: &str) {
        self.outbound.extend(line.as_bytes());
        self.outbound.extend(b"\r\n");
    }
}

impl Default for SimulatedMount {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for SimulatedMount {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.rx_partial.extend_from_slice(data);

        while let Some(pos) = self.rx_partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.rx_partial.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            let command = text.trim();
            if command.is_empty() {
                continue;
            }
            let reply = self.lock().respond(command);
            tracing::trace!(command, reply = %reply, "simulated mount reply");
            self.queue_line(&reply);
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.outbound.is_empty() {
            // Behave like an idle serial line rather than spinning the caller.
            tokio::time::sleep(timeout.min(Duration::from_millis(10))).await;
            return Err(Error::Timeout);
        }
        let n = self.outbound.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.outbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
