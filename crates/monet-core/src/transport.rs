//! Transport trait for mount communication.
//!
//! The [`Transport`] trait abstracts over the physical link to the mount's
//! microcontroller. The serial implementation lives in `monet-transport`;
//! `monet-test-harness` provides a scripted mock and a simulated mount.
//!
//! The trait moves raw bytes only. Line framing and command semantics belong
//! to the protocol client in the `micromonet` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to the mount.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the mount.
    ///
    /// Implementations should not return until every byte has been handed
    /// to the underlying device.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the mount into the provided buffer.
    ///
    /// Returns the number of bytes read, which may end in the middle of a
    /// line. Waits up to `timeout` for data; returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing arrives.
    /// A return of `Ok(0)` means the peer closed the stream.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Close the transport connection.
    ///
    /// Closing twice is a no-op. After `close()`, `send()` and `receive()`
    /// return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}
