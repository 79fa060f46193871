//! Mock transport for deterministic testing of the protocol client.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs plus a queue of unsolicited inbound bytes, which
//! is how the mount's startup banner arrives.
//!
//! # Example
//!
//! ```
//! use monet_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! mock.push_inbound(b"microMONET is ready for some stargazing!\n");
//! mock.expect(b"GET_POS\n", b"ALT: 45.0 AZ: 90.0\n");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

use monet_core::error::{Error, Result};
use monet_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    request: Vec<u8>,
    response: Vec<u8>,
    delay: Duration,
}

/// What `receive()` reports once every queued byte has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenDrained {
    /// `Err(Error::Timeout)`, like an idle but healthy line.
    Timeout,
    /// `Ok(0)`: the peer closed the stream.
    EndOfStream,
    /// `Err(Error::ConnectionLost)`: the device went away mid-read.
    ConnectionLost,
}

/// A mock [`Transport`] for testing without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation; on a match,
/// the expectation's response is appended to the inbound stream. Bytes
/// queued with [`push_inbound`](Self::push_inbound) are readable without
/// any preceding send.
///
/// When the inbound stream is empty, `receive()` returns [`Error::Timeout`]
/// immediately unless a delayed response is on its way (see
/// [`expect_delayed`](Self::expect_delayed)) or
/// [`set_when_drained`](Self::set_when_drained) says otherwise.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// Bytes waiting to be handed out by `receive()`.
    inbound: VecDeque<u8>,
    /// Responses that become readable at the given instant, in send order.
    delayed: VecDeque<(Instant, Vec<u8>)>,
    when_drained: WhenDrained,
    /// Upper bound on bytes returned per `receive()` call.
    chunk_size: Option<usize>,
    connected: bool,
    /// Log of all bytes sent through this transport, one entry per `send()`.
    sent_log: Vec<Vec<u8>>,
    close_count: usize,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            inbound: VecDeque::new(),
            delayed: VecDeque::new(),
            when_drained: WhenDrained::Timeout,
            chunk_size: None,
            connected: true,
            sent_log: Vec::new(),
            close_count: 0,
        }
    }

    /// Add an expected request/response pair.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expect_delayed(request, response, Duration::ZERO);
    }

    /// Add a request/response pair whose response only becomes readable
    /// `delay` after the request is sent.
    ///
    /// Responses keep their send order: a later response is never readable
    /// before an earlier delayed one.
    pub fn expect_delayed(&mut self, request: &[u8], response: &[u8], delay: Duration) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
            delay,
        });
    }

    /// Choose what `receive()` reports once the inbound stream is empty.
    pub fn set_when_drained(&mut self, when_drained: WhenDrained) {
        self.when_drained = when_drained;
    }

    /// Queue bytes that arrive without being asked for.
    pub fn push_inbound(&mut self, data: &[u8]) {
        self.inbound.extend(data);
    }

    /// Limit how many bytes a single `receive()` call hands out, to exercise
    /// line reassembly across partial reads.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = Some(chunk_size.max(1));
    }

    /// Return all data that has been sent through this transport.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Return the number of inbound bytes not yet read.
    pub fn unread_inbound(&self) -> usize {
        self.inbound.len()
    }

    /// How many times `close()` has been called.
    pub fn close_count(&self) -> usize {
        self.close_count
    }

    /// Move every delayed response whose time has come into the inbound stream.
    fn release_due(&mut self) {
        let now = Instant::now();
        while let Some((ready_at, _)) = self.delayed.front() {
            if *ready_at > now {
                break;
            }
            if let Some((_, response)) = self.delayed.pop_front() {
                self.inbound.extend(response);
            }
        }
    }

    /// Set the connected state of the mock transport.
    ///
    /// When `false`, `send()` and `receive()` return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());

        let Some(expectation) = self.expectations.pop_front() else {
            return Err(Error::Transport(format!(
                "no more expectations in mock transport (sent {:?})",
                String::from_utf8_lossy(data)
            )));
        };
        if data != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected send data: expected {:?}, got {:?}",
                String::from_utf8_lossy(&expectation.request),
                String::from_utf8_lossy(data)
            )));
        }
        let ready_at = Instant::now() + expectation.delay;
        let last_ready = self.delayed.back().map(|(at, _)| *at);
        match last_ready {
            None if expectation.delay.is_zero() => self.inbound.extend(expectation.response),
            Some(last) => self
                .delayed
                .push_back((ready_at.max(last), expectation.response)),
            None => self.delayed.push_back((ready_at, expectation.response)),
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.inbound.is_empty() {
            let next_ready = self.delayed.front().map(|(at, _)| *at);
            if let Some(ready_at) = next_ready {
                tokio::time::sleep_until(ready_at.min(Instant::now() + timeout)).await;
            }
            self.release_due();
        }
        if self.inbound.is_empty() {
            return match self.when_drained {
                _ if !self.delayed.is_empty() => Err(Error::Timeout),
                WhenDrained::Timeout => Err(Error::Timeout),
                WhenDrained::EndOfStream => Ok(0),
                WhenDrained::ConnectionLost => Err(Error::ConnectionLost),
            };
        }

        let limit = self.chunk_size.unwrap_or(usize::MAX);
        let n = self.inbound.len().min(buf.len()).min(limit);
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.close_count += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
