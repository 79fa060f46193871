//! MicroMonet -- protocol client for the microMONET mount.
//!
//! This module ties the line framing ([`protocol`]) and the command
//! vocabulary ([`commands`]) to a [`Transport`]. Every exchange is one
//! command line out, one response line back, with no request identifiers.
//! The transport and its receive buffer therefore sit behind a single async
//! mutex that is held for the whole exchange: callers sharing a client are
//! serialized instead of reading each other's responses.

use std::time::Duration;

use bytes::{Buf, BytesMut};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use monet_core::error::{Error, Result};
use monet_core::transport::Transport;
use monet_core::types::{LinkState, Position};

use crate::commands;
use crate::protocol::{self, DecodeResult};

/// Per-call receive timeout used while waiting without a deadline.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Size of the scratch buffer handed to [`Transport::receive`].
const RECV_CHUNK: usize = 256;

/// The open transport plus any bytes received past the last full line.
struct Link {
    transport: Box<dyn Transport>,
    rx_buf: BytesMut,
    /// Set after a buffer overflow: drop bytes up to the next terminator.
    discarding: bool,
    /// Commands sent whose response line has not been read yet. Non-zero
    /// between exchanges only after a timeout or a cancelled call; those
    /// late responses are skipped before the next command's own.
    owed: usize,
}

impl Link {
    fn new(transport: Box<dyn Transport>) -> Self {
        Link {
            transport,
            rx_buf: BytesMut::with_capacity(RECV_CHUNK),
            discarding: false,
            owed: 0,
        }
    }

    /// Send one framed command and read the response that belongs to it.
    async fn exchange(&mut self, frame: &[u8], deadline: Instant) -> Result<String> {
        self.owed += 1;
        if let Err(e) = self.transport.send(frame).await {
            self.owed -= 1;
            return Err(e);
        }

        loop {
            let line = self.read_line(Some(deadline)).await?;
            self.owed -= 1;
            if self.owed == 0 {
                return Ok(line);
            }
            debug!(line = %line, owed = self.owed, "discarding late response");
        }
    }

    /// Pop the next complete line out of the receive buffer, if there is one.
    fn next_buffered_line(&mut self) -> Option<String> {
        if self.discarding {
            match self.rx_buf.iter().position(|&b| b == protocol::TERMINATOR) {
                Some(pos) => {
                    self.rx_buf.advance(pos + 1);
                    self.discarding = false;
                }
                None => {
                    self.rx_buf.clear();
                    return None;
                }
            }
        }

        match protocol::decode_line(&self.rx_buf) {
            DecodeResult::Line { text, consumed } => {
                self.rx_buf.advance(consumed);
                Some(text)
            }
            DecodeResult::Incomplete => {
                if self.rx_buf.len() > protocol::MAX_LINE_LEN {
                    warn!(
                        len = self.rx_buf.len(),
                        "receive buffer overflow, discarding partial line"
                    );
                    self.rx_buf.clear();
                    self.discarding = true;
                }
                None
            }
        }
    }

    /// Read the next line, stripped of surrounding whitespace.
    ///
    /// With a `deadline`, fails with [`Error::Timeout`] once it passes.
    /// Without one, waits for as long as it takes. Bytes following the line
    /// stay buffered for the next call.
    async fn read_line(&mut self, deadline: Option<Instant>) -> Result<String> {
        let mut chunk = [0u8; RECV_CHUNK];

        loop {
            if let Some(line) = self.next_buffered_line() {
                return Ok(line);
            }

            let wait = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::Timeout);
                    }
                    remaining
                }
                None => IDLE_POLL,
            };

            match self.transport.receive(&mut chunk, wait).await {
                Ok(0) => return Err(Error::ConnectionLost),
                Ok(n) => {
                    trace!(bytes = n, "received chunk");
                    self.rx_buf.extend_from_slice(&chunk[..n]);
                }
                Err(Error::Timeout) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// A connected microMONET mount.
///
/// Constructed via [`MicroMonetBuilder`](crate::builder::MicroMonetBuilder).
/// All methods take `&self`; share the client across tasks with `Arc`.
pub struct MicroMonet {
    link: Mutex<Option<Link>>,
    command_timeout: Duration,
    ready_timeout: Option<Duration>,
}

impl MicroMonet {
    /// Called by [`MicroMonetBuilder`](crate::builder::MicroMonetBuilder);
    /// callers should use the builder instead.
    pub(crate) fn new(
        transport: Box<dyn Transport>,
        command_timeout: Duration,
        ready_timeout: Option<Duration>,
    ) -> Self {
        MicroMonet {
            link: Mutex::new(Some(Link::new(transport))),
            command_timeout,
            ready_timeout,
        }
    }

    /// Whether the client is still open.
    pub async fn state(&self) -> LinkState {
        if self.link.lock().await.is_some() {
            LinkState::Open
        } else {
            LinkState::Closed
        }
    }

    /// Send one command line and return the mount's response line.
    ///
    /// The terminator is appended here; `command` must not contain one.
    /// The response is returned with surrounding whitespace stripped and is
    /// not otherwise interpreted. Responses still owed to earlier calls that
    /// timed out or were cancelled are read and discarded first.
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let frame = protocol::encode_command(command)?;

        let mut guard = self.link.lock().await;
        let link = guard.as_mut().ok_or(Error::Closed)?;

        debug!(command, "sending command");
        let deadline = Instant::now() + self.command_timeout;
        let response = link.exchange(&frame, deadline).await?;
        debug!(command, response = %response, "received response");
        Ok(response)
    }

    /// Block until the mount announces that it has finished booting.
    ///
    /// Reads lines without sending anything and discards them until one
    /// contains [`READY_PHRASE`](protocol::READY_PHRASE). Waits indefinitely
    /// unless a ready timeout was configured on the builder.
    pub async fn wait_for_ready(&self) -> Result<()> {
        let mut guard = self.link.lock().await;
        let link = guard.as_mut().ok_or(Error::Closed)?;

        let deadline = self.ready_timeout.map(|t| Instant::now() + t);
        loop {
            let line = link.read_line(deadline).await?;
            if protocol::is_ready_line(&line) {
                info!("mount reports ready");
                return Ok(());
            }
            debug!(line = %line, "waiting for readiness banner");
        }
    }

    /// Read the mount's pointing.
    ///
    /// After an aborted slew the firmware reports the position where the
    /// mount stopped; both report forms are accepted.
    pub async fn get_position(&self) -> Result<Position> {
        let response = self.send_command(commands::GET_POSITION).await?;
        commands::parse_position_response(&response)
    }

    /// Command a slew to the given altitude and azimuth, in degrees.
    ///
    /// Returns once the mount has acknowledged the command, not when the
    /// slew finishes; poll [`get_position`](Self::get_position) for that.
    pub async fn set_position(&self, altitude: f64, azimuth: f64) -> Result<()> {
        let command = commands::cmd_set_position(altitude, azimuth)?;
        self.send_command(&command).await?;
        Ok(())
    }

    /// Set the slew motor speed in RPM (`1..=15`).
    ///
    /// Out-of-range values fail with [`Error::InvalidParameter`] without
    /// writing anything to the transport.
    pub async fn set_speed(&self, rpm: u8) -> Result<()> {
        let command = commands::cmd_set_speed(rpm)?;
        self.send_command(&command).await?;
        Ok(())
    }

    pub async fn led_on(&self) -> Result<()> {
        self.send_command(commands::LED_ON).await.map(drop)
    }

    pub async fn led_off(&self) -> Result<()> {
        self.send_command(commands::LED_OFF).await.map(drop)
    }

    /// Turn the imaging-sensor illumination on.
    pub async fn ccd_on(&self) -> Result<()> {
        self.send_command(commands::CCD_ON).await.map(drop)
    }

    /// Turn the imaging-sensor illumination off.
    pub async fn ccd_off(&self) -> Result<()> {
        self.send_command(commands::CCD_OFF).await.map(drop)
    }

    /// Read the temperature in degrees Celsius.
    pub async fn get_temperature(&self) -> Result<f64> {
        let response = self.send_command(commands::GET_TEMPERATURE).await?;
        commands::parse_temperature_response(&response)
    }

    /// Read the relative humidity in percent.
    pub async fn get_humidity(&self) -> Result<f64> {
        let response = self.send_command(commands::GET_HUMIDITY).await?;
        commands::parse_humidity_response(&response)
    }

    /// Stop an in-progress slew.
    pub async fn abort_slew(&self) -> Result<()> {
        self.send_command(commands::ABORT).await.map(drop)
    }

    /// Release the transport.
    ///
    /// Idempotent. Once closed, every other method fails with
    /// [`Error::Closed`] without touching the transport.
    pub async fn close(&self) -> Result<()> {
        let link = self.link.lock().await.take();
        if let Some(mut link) = link {
            link.transport.close().await?;
            info!("mount connection closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MicroMonetBuilder;
    use monet_test_harness::{MockTransport, SimulatedMount, WhenDrained};
    use std::sync::Arc;

    const READY: &[u8] = b"microMONET is ready for some stargazing!\r\n";

    async fn client(mock: MockTransport) -> MicroMonet {
        MicroMonetBuilder::new()
            .command_timeout(Duration::from_millis(200))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // send_command
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn send_command_writes_line_and_returns_stripped_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"LED_ON\n", b"  LED ON \r\n");
        let mount = client(mock).await;

        assert_eq!(mount.send_command("LED_ON").await.unwrap(), "LED ON");
    }

    #[tokio::test]
    async fn send_command_reassembles_partial_reads() {
        let mut mock = MockTransport::new();
        mock.set_chunk_size(3);
        mock.expect(b"GET_POS\n", b"ALT: 45.0 AZ: 90.0\r\n");
        let mount = client(mock).await;

        assert_eq!(
            mount.send_command("GET_POS").await.unwrap(),
            "ALT: 45.0 AZ: 90.0"
        );
    }

    #[tokio::test]
    async fn send_command_rejects_embedded_newline() {
        let mount = client(MockTransport::new()).await;
        let err = mount.send_command("LED_ON\nLED_OFF").await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn send_command_times_out_without_response() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_TEMP\n", b"");
        let mount = MicroMonetBuilder::new()
            .command_timeout(Duration::from_millis(30))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        let err = mount.send_command("GET_TEMP").await.unwrap_err();
        assert!(matches!(err, Error::Timeout));
    }

    #[tokio::test]
    async fn send_command_propagates_transport_error() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let mount = client(mock).await;

        let err = mount.send_command("GET_POS").await.unwrap_err();
        assert!(matches!(err, Error::NotConnected));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn responses_stay_in_step_with_commands() {
        let mut mock = MockTransport::new();
        mock.expect(b"LED_ON\n", b"LED ON\n");
        mock.expect(b"GET_POS\n", b"ALT: 1.0 AZ: 2.0\n");
        let mount = client(mock).await;

        mount.led_on().await.unwrap();
        assert_eq!(
            mount.get_position().await.unwrap(),
            Position::new(1.0, 2.0)
        );
    }

    #[tokio::test]
    async fn overflow_discards_through_next_terminator() {
        let mut mock = MockTransport::new();
        let mut noise = vec![b'x'; protocol::MAX_LINE_LEN + 600];
        noise.extend_from_slice(b"\nLED ON\n");
        mock.expect(b"LED_ON\n", &noise);
        let mount = client(mock).await;

        assert_eq!(mount.send_command("LED_ON").await.unwrap(), "LED ON");
    }

    #[tokio::test]
    async fn late_response_after_timeout_is_discarded() {
        let mut mock = MockTransport::new();
        mock.expect_delayed(
            b"GET_POS\n",
            b"ALT: 1.0 AZ: 2.0\r\n",
            Duration::from_millis(150),
        );
        mock.expect(b"LED_ON\n", b"LED ON\r\n");
        mock.expect(b"GET_TEMP\n", b"Temperature: 21.5 \xc2\xb0C\r\n");
        let mount = MicroMonetBuilder::new()
            .command_timeout(Duration::from_millis(100))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert!(matches!(
            mount.get_position().await.unwrap_err(),
            Error::Timeout
        ));
        assert_eq!(mount.send_command("LED_ON").await.unwrap(), "LED ON");
        assert_eq!(mount.get_temperature().await.unwrap(), 21.5);
    }

    #[tokio::test]
    async fn cancelled_exchange_does_not_shift_responses() {
        let mut mock = MockTransport::new();
        mock.expect_delayed(
            b"GET_POS\n",
            b"ALT: 1.0 AZ: 2.0\r\n",
            Duration::from_millis(50),
        );
        mock.expect(b"LED_ON\n", b"LED ON\r\n");
        mock.expect(b"GET_POS\n", b"ALT: 3.0 AZ: 4.0\r\n");
        let mount = client(mock).await;

        let cancelled =
            tokio::time::timeout(Duration::from_millis(10), mount.get_position()).await;
        assert!(cancelled.is_err());

        assert_eq!(mount.send_command("LED_ON").await.unwrap(), "LED ON");
        assert_eq!(
            mount.get_position().await.unwrap(),
            Position::new(3.0, 4.0)
        );
    }

    #[tokio::test]
    async fn end_of_stream_mid_response_is_connection_lost() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_POS\n", b"ALT: 1.0");
        mock.set_when_drained(WhenDrained::EndOfStream);
        let mount = client(mock).await;

        let err = mount.send_command("GET_POS").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn lost_device_during_read_surfaces_error() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_TEMP\n", b"");
        mock.set_when_drained(WhenDrained::ConnectionLost);
        let mount = client(mock).await;

        let err = mount.get_temperature().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
    }

    // -----------------------------------------------------------------------
    // wait_for_ready
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wait_for_ready_skips_boot_noise() {
        let mut mock = MockTransport::new();
        mock.push_inbound(b"Initializing...\r\nstepper ok\r\n\r\n");
        mock.push_inbound(READY);
        let mount = client(mock).await;

        mount.wait_for_ready().await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_ready_sends_nothing() {
        let mut mock = MockTransport::new();
        mock.push_inbound(READY);
        mock.expect(b"GET_POS\n", b"ALT: 0.0 AZ: 0.0\n");
        let mount = client(mock).await;

        mount.wait_for_ready().await.unwrap();
        // The only expectation is still intact, so the next exchange works.
        assert_eq!(
            mount.get_position().await.unwrap(),
            Position::new(0.0, 0.0)
        );
    }

    #[tokio::test]
    async fn wait_for_ready_leaves_later_lines_buffered() {
        let mut mock = MockTransport::new();
        mock.push_inbound(b"boot\n");
        mock.push_inbound(READY);
        mock.push_inbound(b"late banner line\n");
        mock.expect(b"LED_ON\n", b"LED ON\n");
        mock.expect(b"LED_OFF\n", b"LED OFF\n");
        let mount = client(mock).await;

        mount.wait_for_ready().await.unwrap();
        assert_eq!(mount.send_command("LED_ON").await.unwrap(), "late banner line");
        assert_eq!(mount.send_command("LED_OFF").await.unwrap(), "LED ON");
    }

    #[tokio::test]
    async fn wait_for_ready_across_chunk_boundaries() {
        let mut mock = MockTransport::new();
        mock.set_chunk_size(5);
        mock.push_inbound(b"noise\r\n");
        mock.push_inbound(READY);
        let mount = client(mock).await;

        mount.wait_for_ready().await.unwrap();
    }

    #[tokio::test]
    async fn wait_for_ready_honours_ready_timeout() {
        let mut mock = MockTransport::new();
        mock.push_inbound(b"still booting\n");
        let mount = MicroMonetBuilder::new()
            .ready_timeout(Some(Duration::from_millis(30)))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert!(matches!(
            mount.wait_for_ready().await.unwrap_err(),
            Error::Timeout
        ));
    }

    #[tokio::test]
    async fn wait_for_ready_end_of_stream_does_not_hang() {
        let mut mock = MockTransport::new();
        mock.push_inbound(b"Initializing...\r\n");
        mock.set_when_drained(WhenDrained::EndOfStream);
        let mount = client(mock).await;

        let err = mount.wait_for_ready().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
    }

    #[tokio::test]
    async fn wait_for_ready_lost_device_does_not_hang() {
        let mut mock = MockTransport::new();
        mock.set_when_drained(WhenDrained::ConnectionLost);
        let mount = client(mock).await;

        let err = mount.wait_for_ready().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionLost));
        assert!(err.is_transport());
    }

    // -----------------------------------------------------------------------
    // Position
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_position_normal() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_POS\n", b"ALT: 45.0 AZ: 90.0\r\n");
        let mount = client(mock).await;

        assert_eq!(
            mount.get_position().await.unwrap(),
            Position::new(45.0, 90.0)
        );
    }

    #[tokio::test]
    async fn get_position_after_abort() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_POS\n", b"Aborted at ALT: 39.90 AZ: 246.45\r\n");
        let mount = client(mock).await;

        assert_eq!(
            mount.get_position().await.unwrap(),
            Position::new(39.90, 246.45)
        );
    }

    #[tokio::test]
    async fn get_position_garbage() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_POS\n", b"garbage\n");
        let mount = client(mock).await;

        let err = mount.get_position().await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("garbage"));
    }

    #[tokio::test]
    async fn set_position_sends_slew_command() {
        let mut mock = MockTransport::new();
        mock.expect(b"ALT:45.0 AZ:90.0\n", b"Slewing\n");
        let mount = client(mock).await;

        mount.set_position(45.0, 90.0).await.unwrap();
    }

    #[tokio::test]
    async fn set_position_rejects_nan_without_io() {
        let mount = client(MockTransport::new()).await;
        let err = mount.set_position(f64::NAN, 1.0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    // -----------------------------------------------------------------------
    // Speed
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn set_speed_out_of_range_performs_no_io() {
        // An unexpected send would fail the mock, and so would a read.
        let mount = client(MockTransport::new()).await;

        for rpm in [0, 16, 255] {
            let err = mount.set_speed(rpm).await.unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "rpm {rpm}");
        }
    }

    #[tokio::test]
    async fn set_speed_bounds_are_inclusive() {
        let mut mock = MockTransport::new();
        mock.expect(b"SET_SPEED 1\n", b"Speed set to 1 RPM\n");
        mock.expect(b"SET_SPEED 15\n", b"Speed set to 15 RPM\n");
        let mount = client(mock).await;

        mount.set_speed(1).await.unwrap();
        mount.set_speed(15).await.unwrap();
    }

    // -----------------------------------------------------------------------
    // Fire-and-acknowledge commands
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn switch_commands_ignore_acknowledgment_text() {
        let mut mock = MockTransport::new();
        mock.expect(b"LED_ON\n", b"whatever\n");
        mock.expect(b"LED_OFF\n", b"\n");
        mock.expect(b"CCD_ON\n", b"CCD LED ON\n");
        mock.expect(b"CCD_OFF\n", b"?\n");
        mock.expect(b"ABORT\n", b"No slew in progress\n");
        let mount = client(mock).await;

        mount.led_on().await.unwrap();
        mount.led_off().await.unwrap();
        mount.ccd_on().await.unwrap();
        mount.ccd_off().await.unwrap();
        mount.abort_slew().await.unwrap();
    }

    // -----------------------------------------------------------------------
    // Environment
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn get_temperature() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_TEMP\n", "Temperature: 25.0 °C\r\n".as_bytes());
        let mount = client(mock).await;

        assert_eq!(mount.get_temperature().await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn get_temperature_unrecognised() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_TEMP\n", b"Temp: 25\n");
        let mount = client(mock).await;

        let err = mount.get_temperature().await.unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[tokio::test]
    async fn get_humidity() {
        let mut mock = MockTransport::new();
        mock.expect(b"GET_HUMI\n", b"Humidity: 50.0 %\r\n");
        let mount = client(mock).await;

        assert_eq!(mount.get_humidity().await.unwrap(), 50.0);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn close_is_idempotent() {
        let mount = client(MockTransport::new()).await;
        assert_eq!(mount.state().await, LinkState::Open);

        mount.close().await.unwrap();
        mount.close().await.unwrap();
        assert_eq!(mount.state().await, LinkState::Closed);
    }

    #[tokio::test]
    async fn operations_after_close_fail_closed() {
        let mount = client(MockTransport::new()).await;
        mount.close().await.unwrap();

        assert!(matches!(mount.get_position().await, Err(Error::Closed)));
        assert!(matches!(mount.wait_for_ready().await, Err(Error::Closed)));
        assert!(matches!(mount.led_on().await, Err(Error::Closed)));
        assert!(matches!(mount.send_command("ABORT").await, Err(Error::Closed)));
    }

    // -----------------------------------------------------------------------
    // Against the simulated firmware
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn concurrent_callers_are_serialized() {
        let sim = SimulatedMount::without_banner()
            .with_position(Position::new(30.0, 120.0))
            .with_environment(21.5, 60.0);
        let mount = Arc::new(
            MicroMonetBuilder::new()
                .build_with_transport(Box::new(sim))
                .await
                .unwrap(),
        );

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let m = Arc::clone(&mount);
            tasks.push(tokio::spawn(async move {
                let (pos, temp, humi) =
                    tokio::join!(m.get_position(), m.get_temperature(), m.get_humidity());
                (pos.unwrap(), temp.unwrap(), humi.unwrap())
            }));
        }
        for task in tasks {
            let (pos, temp, humi) = task.await.unwrap();
            assert_eq!(pos, Position::new(30.0, 120.0));
            assert_eq!(temp, 21.5);
            assert_eq!(humi, 60.0);
        }
    }

    #[tokio::test]
    async fn slew_then_abort_against_simulator() {
        let sim = SimulatedMount::new();
        let handle = sim.handle();
        let mount = MicroMonetBuilder::new()
            .build_with_transport(Box::new(sim))
            .await
            .unwrap();

        mount.wait_for_ready().await.unwrap();
        mount.set_speed(10).await.unwrap();
        mount.set_position(40.0, 200.0).await.unwrap();

        let first = mount.get_position().await.unwrap();
        assert_eq!(first, Position::new(10.0, 10.0));

        mount.abort_slew().await.unwrap();
        assert!(!handle.is_slewing());
        assert_eq!(mount.get_position().await.unwrap(), first);

        mount.close().await.unwrap();
        assert_eq!(
            handle.commands(),
            vec!["SET_SPEED 10", "ALT:40.0 AZ:200.0", "GET_POS", "ABORT", "GET_POS"]
        );
    }
}
