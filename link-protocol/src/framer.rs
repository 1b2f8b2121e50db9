//! Frame I/O: byte-stream reassembly and CRC verification.
//!
//! The framer owns a small reassembly buffer that the main loop tops up with
//! whatever bytes the serial port has available. On every poll it looks at
//! the front of the buffer: once 20 bytes have accumulated it either yields
//! a verified frame, or — on CRC mismatch — drops the entire buffer and
//! tells the caller to emit a `NAK(rx_expected)`, on the assumption that a
//! single corrupted byte has put the stream out of alignment.

use crate::config::{FRAME_LEN, FRAMER_CAPACITY_FRAMES};
use crate::frame::Frame;

const CAPACITY: usize = FRAME_LEN * FRAMER_CAPACITY_FRAMES;

/// Outcome of one [`Framer::poll`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramerEvent {
    /// A frame was reassembled and its CRC-8 verified.
    Frame(Frame),
    /// The candidate frame's CRC-8 did not match; the buffer was flushed.
    CrcReject,
}

/// Reassembles a byte stream into [`Frame`]s.
pub struct Framer {
    buf: heapless::Vec<u8, CAPACITY>,
}

impl Framer {
    pub const fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
        }
    }

    /// Feeds newly-received bytes into the reassembly buffer. Bytes that
    /// would overflow the buffer are dropped — this only happens if the
    /// caller fails to poll for multiple frame periods, which the
    /// one-frame-per-iteration loop ordering is designed to avoid.
    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.buf.push(byte).is_err() {
                break;
            }
        }
    }

    /// Extracts and verifies at most one frame from the front of the buffer.
    /// Returns `None` if fewer than [`FRAME_LEN`] bytes are buffered yet.
    pub fn poll(&mut self) -> Option<FramerEvent> {
        if self.buf.len() < FRAME_LEN {
            return None;
        }

        let mut candidate = [0u8; FRAME_LEN];
        candidate.copy_from_slice(&self.buf[..FRAME_LEN]);

        match Frame::decode(&candidate) {
            Ok(frame) => {
                self.consume_front(FRAME_LEN);
                Some(FramerEvent::Frame(frame))
            }
            Err(_) => {
                self.buf.clear();
                Some(FramerEvent::CrcReject)
            }
        }
    }

    fn consume_front(&mut self, count: usize) {
        let remaining = self.buf.len() - count;
        self.buf.rotate_left(count);
        self.buf.truncate(remaining);
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}
