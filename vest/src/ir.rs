//! IR receive adapter: drains already-demodulated NEC command bytes from an
//! external FIFO into the [`IrRx`] port.
//!
//! The `Clock` port only resolves milliseconds, far coarser than NEC's 562us
//! bit time, so decoding raw mark/space timing in the cooperative loop itself
//! is not physically plausible. Real hardware pairs the vest's receive diode
//! with a dedicated demodulator (an IR receiver IC, or a PIO/timer-capture
//! program) that does that decoding and drops one command byte per detected
//! code into a FIFO; this adapter just drains it.

use link_protocol::ports::IrRx;

/// Wraps a byte-producing FIFO `pop` closure (a PIO RX FIFO read, an IC's
/// interrupt-fed ring buffer, ...). Each popped byte is one already-decoded
/// NEC command.
pub struct FifoIrRx<F> {
    pop: F,
}

impl<F: FnMut() -> Option<u8>> FifoIrRx<F> {
    pub fn new(pop: F) -> Self {
        Self { pop }
    }
}

impl<F: FnMut() -> Option<u8>> IrRx for FifoIrRx<F> {
    fn decode(&mut self) -> Option<u32> {
        (self.pop)().map(u32::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_fifo_one_command_at_a_time() {
        let mut queue = heapless::Deque::<u8, 4>::new();
        let _ = queue.push_back(0x16);
        let _ = queue.push_back(0x42);

        let mut rx = FifoIrRx::new(|| queue.pop_front());
        assert_eq!(rx.decode(), Some(0x16));
        assert_eq!(rx.decode(), Some(0x42));
        assert_eq!(rx.decode(), None);
    }
}
