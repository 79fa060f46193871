//! Protocol client for the microMONET telescope mount.
//!
//! The mount's microcontroller speaks a line-oriented ASCII protocol over a
//! serial link: the host writes one command line, the firmware answers with
//! one response line. This crate provides:
//!
//! - **Line framing** ([`protocol`]) -- encode commands, split the inbound
//!   byte stream into stripped lines, recognise the readiness banner.
//! - **Command vocabulary** ([`commands`]) -- command builders with argument
//!   validation and one small grammar per response shape.
//! - **Client** ([`mount`]) -- [`MicroMonet`], which owns the transport and
//!   turns exchanges into typed results.
//! - **Builder** ([`builder`]) -- [`MicroMonetBuilder`] for serial port and
//!   timeout configuration.
//!
//! # Example
//!
//! ```no_run
//! use micromonet::MicroMonetBuilder;
//!
//! # async fn example() -> monet_core::Result<()> {
//! let mount = MicroMonetBuilder::new()
//!     .serial_port("/dev/cu.usbmodem142101")
//!     .build()
//!     .await?;
//!
//! mount.wait_for_ready().await?;
//! mount.set_speed(7).await?;
//! mount.set_position(45.0, 90.0).await?;
//! let here = mount.get_position().await?;
//! println!("{here}");
//! mount.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod commands;
pub mod mount;
pub mod protocol;

pub use builder::MicroMonetBuilder;
pub use mount::MicroMonet;
