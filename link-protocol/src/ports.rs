//! Capability ports: the hardware boundaries this link layer is built
//! against — trigger, inertial sensor, IR transmit/receive, LED strip —
//! plus the millisecond clock every protocol timeout is measured against.
//! Concrete drivers are out of scope here — these traits are the entire
//! contract.

/// Active-high trigger switch (gun only).
pub trait Trigger {
    /// Instantaneous raw read; debouncing is the caller's job (a rising
    /// edge must hold stable for at least 50 ms before it counts).
    fn is_pressed(&mut self) -> bool;
}

/// Inertial sensor, shared by gun and hand.
pub trait Imu {
    /// Blocking-free read of six axes: (ax, ay, az, gx, gy, gz).
    fn read(&mut self) -> [f32; 6];
}

/// NEC infrared receiver (vest only).
pub trait IrRx {
    /// Non-blocking poll; yields a decoded NEC command byte when a full code
    /// has been received since the last poll.
    fn decode(&mut self) -> Option<u32>;
}

/// NEC infrared transmitter (gun only).
pub trait IrTx {
    /// Emits a `bits`-wide NEC code.
    fn send_nec(&mut self, code: u32, bits: u32);
}

/// Indexed RGB pixel strip (vest HP bar, gun magazine LEDs).
pub trait LedStrip {
    /// Number of addressable pixels.
    fn len(&self) -> usize;
    /// Stages a pixel colour; takes effect on the next [`LedStrip::show`].
    fn set(&mut self, index: usize, color: smart_leds::RGB8);
    /// Latches staged pixel colours out to the physical strip.
    fn show(&mut self);
}

/// Millisecond monotonic clock every timeout in this protocol is measured
/// against.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}
