//! monet-test-harness: Test utilities and stand-in transports for the
//! microMONET controller.
//!
//! - [`MockTransport`] replays scripted request/response pairs for
//!   deterministic unit tests of the protocol client.
//! - [`SimulatedMount`] behaves like the mount's firmware, for demos and
//!   end-to-end tests of the operator CLI.

pub mod mock_serial;
pub mod simulated;

pub use mock_serial::{MockTransport, WhenDrained};
pub use simulated::{SimulatedMount, SimulatedMountHandle};
