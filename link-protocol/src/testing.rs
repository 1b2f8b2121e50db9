//! Hand-written mock capability ports, favoring plain fakes
//! over a mocking framework. Enabled for this crate's unit tests and
//! re-exported under the `testing` feature so the firmware crates can reuse
//! them in their own host-side tests.

use heapless::Deque;

use crate::config::MAX_QUEUED_IR_CODES;
use crate::ports::{Clock, Imu, IrRx, IrTx, LedStrip, Trigger};

/// A trigger whose pressed state is set directly by the test.
#[derive(Default)]
pub struct MockTrigger {
    pressed: bool,
}

impl MockTrigger {
    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }
}

impl Trigger for MockTrigger {
    fn is_pressed(&mut self) -> bool {
        self.pressed
    }
}

/// An IMU that always returns a fixed sample, settable by the test.
pub struct MockImu {
    sample: [f32; 6],
}

impl MockImu {
    pub fn new(sample: [f32; 6]) -> Self {
        Self { sample }
    }

    pub fn set_sample(&mut self, sample: [f32; 6]) {
        self.sample = sample;
    }
}

impl Default for MockImu {
    fn default() -> Self {
        Self::new([0.0; 6])
    }
}

impl Imu for MockImu {
    fn read(&mut self) -> [f32; 6] {
        self.sample
    }
}

/// An IR receiver whose incoming codes are queued by the test.
#[derive(Default)]
pub struct MockIrRx {
    queue: Deque<u32, MAX_QUEUED_IR_CODES>,
}

impl MockIrRx {
    pub fn push(&mut self, code: u32) {
        let _ = self.queue.push_back(code);
    }
}

impl IrRx for MockIrRx {
    fn decode(&mut self) -> Option<u32> {
        self.queue.pop_front()
    }
}

/// An IR transmitter that records every code it was asked to send.
#[derive(Default)]
pub struct MockIrTx {
    sent: Deque<(u32, u32), MAX_QUEUED_IR_CODES>,
}

impl MockIrTx {
    pub fn last_sent(&self) -> Option<(u32, u32)> {
        self.sent.iter().last().copied()
    }
}

impl IrTx for MockIrTx {
    fn send_nec(&mut self, code: u32, bits: u32) {
        let _ = self.sent.push_back((code, bits));
    }
}

/// An LED strip that records the last colour written to each pixel.
pub struct MockLedStrip<const N: usize> {
    pixels: [smart_leds::RGB8; N],
    shown: [smart_leds::RGB8; N],
}

impl<const N: usize> MockLedStrip<N> {
    pub fn new() -> Self {
        let black = smart_leds::RGB8::new(0, 0, 0);
        Self {
            pixels: [black; N],
            shown: [black; N],
        }
    }

    /// What the strip looked like after the last `show()`.
    pub fn shown(&self) -> &[smart_leds::RGB8; N] {
        &self.shown
    }
}

impl<const N: usize> Default for MockLedStrip<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LedStrip for MockLedStrip<N> {
    fn len(&self) -> usize {
        N
    }

    fn set(&mut self, index: usize, color: smart_leds::RGB8) {
        self.pixels[index] = color;
    }

    fn show(&mut self) {
        self.shown = self.pixels;
    }
}

/// A clock whose value the test advances explicitly.
#[derive(Default)]
pub struct MockClock {
    now_ms: u32,
}

impl MockClock {
    pub fn advance(&mut self, delta_ms: u32) {
        self.now_ms = self.now_ms.wrapping_add(delta_ms);
    }

    pub fn set(&mut self, now_ms: u32) {
        self.now_ms = now_ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&mut self) -> u32 {
        self.now_ms
    }
}
