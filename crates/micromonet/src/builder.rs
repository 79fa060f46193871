//! MicroMonetBuilder -- fluent builder for constructing [`MicroMonet`]
//! instances.
//!
//! Separates configuration from construction so that callers can set the
//! serial port and timeout policy before the transport is opened.
//!
//! # Example
//!
//! ```no_run
//! use micromonet::MicroMonetBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> monet_core::Result<()> {
//! let mount = MicroMonetBuilder::new()
//!     .serial_port("/dev/ttyACM0")
//!     .baud_rate(9600)
//!     .command_timeout(Duration::from_secs(2))
//!     .build()
//!     .await?;
//! mount.wait_for_ready().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use monet_core::error::{Error, Result};
use monet_core::transport::Transport;
use monet_transport::{DEFAULT_BAUD_RATE, SerialTransport};

use crate::mount::MicroMonet;

/// Default deadline for one command/response exchange.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Fluent builder for [`MicroMonet`].
pub struct MicroMonetBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    command_timeout: Duration,
    ready_timeout: Option<Duration>,
}

impl MicroMonetBuilder {
    /// Create a builder with the firmware's defaults: 9600 baud, a 5 s
    /// command timeout, and no limit on the wait for the ready banner.
    pub fn new() -> Self {
        MicroMonetBuilder {
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            ready_timeout: None,
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyACM0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default baud rate (9600).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the deadline for one command/response exchange (default: 5 s).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Bound the wait for the ready banner. `None` (the default) waits for
    /// as long as the mount takes to boot.
    pub fn ready_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Build a [`MicroMonet`] over a caller-provided transport.
    ///
    /// This is the entry point for tests (pass a `MockTransport` or
    /// `SimulatedMount` from `monet-test-harness`) and for callers that
    /// manage the transport themselves.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<MicroMonet> {
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidParameter(
                "command_timeout must be greater than zero".into(),
            ));
        }
        Ok(MicroMonet::new(
            transport,
            self.command_timeout,
            self.ready_timeout,
        ))
    }

    /// Open the serial port and build a [`MicroMonet`] over it.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<MicroMonet> {
        let port = self
            .serial_port
            .as_deref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;
        if self.baud_rate == 0 {
            return Err(Error::InvalidParameter("baud_rate must be non-zero".into()));
        }

        let transport = SerialTransport::open(port, self.baud_rate).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

impl Default for MicroMonetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
