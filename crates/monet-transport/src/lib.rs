//! Transport implementations for the microMONET controller.
//!
//! [`SerialTransport`] implements the [`Transport`](monet_core::Transport)
//! trait from `monet-core` for the USB virtual COM port exposed by the
//! mount's microcontroller.

pub mod serial;

pub use serial::{
    DEFAULT_BAUD_RATE, DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits,
};
