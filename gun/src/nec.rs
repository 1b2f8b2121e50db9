//! Software NEC transmitter: bit-bangs the muzzle IR LED over a GPIO pin.
//!
//! The NEC format (9ms leader mark, 4.5ms leader space, 562us time-unit mark
//! per bit followed by either a 562us or 1687us space for 0/1) is a public,
//! well-documented IR protocol, built here on top of the `IrTx` port to
//! transmit the fixed shot code over a bit-banged GPIO line.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;
use link_protocol::ports::IrTx;

const LEADER_MARK_US: u32 = 9000;
const LEADER_SPACE_US: u32 = 4500;
const UNIT_US: u32 = 562;
const ONE_SPACE_US: u32 = 1687;
const ZERO_SPACE_US: u32 = 562;

/// Bit-bangs `code`'s low `bits` bits, LSB first, as a standard NEC frame.
pub struct NecIrTx<PIN, DELAY> {
    pin: PIN,
    delay: DELAY,
}

impl<PIN, DELAY> NecIrTx<PIN, DELAY>
where
    PIN: OutputPin,
    DELAY: DelayUs<u32>,
{
    pub fn new(pin: PIN, delay: DELAY) -> Self {
        Self { pin, delay }
    }

    fn mark(&mut self, micros: u32) {
        let _ = self.pin.set_high();
        self.delay.delay_us(micros);
    }

    fn space(&mut self, micros: u32) {
        let _ = self.pin.set_low();
        self.delay.delay_us(micros);
    }
}

impl<PIN, DELAY> IrTx for NecIrTx<PIN, DELAY>
where
    PIN: OutputPin,
    DELAY: DelayUs<u32>,
{
    fn send_nec(&mut self, code: u32, bits: u32) {
        self.mark(LEADER_MARK_US);
        self.space(LEADER_SPACE_US);
        for i in 0..bits {
            self.mark(UNIT_US);
            if (code >> i) & 1 == 1 {
                self.space(ONE_SPACE_US);
            } else {
                self.space(ZERO_SPACE_US);
            }
        }
        self.mark(UNIT_US);
        let _ = self.pin.set_low();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct RecordingPin {
        transitions: heapless::Vec<bool, 128>,
    }

    impl OutputPin for RecordingPin {
        type Error = Infallible;
        fn set_low(&mut self) -> Result<(), Infallible> {
            let _ = self.transitions.push(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            let _ = self.transitions.push(true);
            Ok(())
        }
    }

    struct NoopDelay;
    impl DelayUs<u32> for NoopDelay {
        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn emits_one_mark_per_bit_plus_leader_and_stop() {
        let pin = RecordingPin {
            transitions: heapless::Vec::new(),
        };
        let mut tx = NecIrTx::new(pin, NoopDelay);
        tx.send_nec(0xFF6897, 32);
        // leader mark+space, 32 x (mark+space), trailing stop mark+space = 66 transitions.
        assert_eq!(tx.pin.transitions.len(), 66);
        assert!(tx.pin.transitions[0]); // leader mark is high
        assert!(!tx.pin.transitions[1]); // leader space is low
    }
}
