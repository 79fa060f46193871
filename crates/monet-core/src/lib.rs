//! monet-core: Core traits, types, and error definitions for the microMONET
//! telescope mount controller.
//!
//! The protocol client, the serial transport, and the test harness all
//! depend on these types, so applications can hold a `Box<dyn Transport>`
//! without pulling in a specific device implementation.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Position`] -- altitude/azimuth pair reported by the mount
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use transport::Transport;
pub use types::*;
