//! Hardware glue: thin adapters from `smart-leds`/the ARMv7-M core to the
//! vest's LED and clock capability ports. Mirrors gun's `board` module; the
//! vest has no trigger or onboard IMU so only the LED strip and clock
//! adapters are needed here.

use cortex_m::peripheral::{DCB, DWT};
use link_protocol::ports::{Clock, LedStrip};

/// Stages pixels into a local buffer and flushes them through any
/// `smart_leds::SmartLedsWrite` backend on `show()`.
pub struct SmartLedAdapter<W, const N: usize> {
    writer: W,
    pixels: [smart_leds::RGB8; N],
}

impl<W, const N: usize> SmartLedAdapter<W, N> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pixels: [smart_leds::RGB8::new(0, 0, 0); N],
        }
    }
}

impl<W, const N: usize> LedStrip for SmartLedAdapter<W, N>
where
    W: smart_leds::SmartLedsWrite<Color = smart_leds::RGB8>,
{
    fn len(&self) -> usize {
        N
    }

    fn set(&mut self, index: usize, color: smart_leds::RGB8) {
        self.pixels[index] = color;
    }

    fn show(&mut self) {
        let _ = self.writer.write(self.pixels.iter().copied());
    }
}

/// Millisecond clock built on the ARMv7-M core's free-running cycle counter
/// (DWT), present on every Cortex-M3/M4/M33 without any vendor-specific
/// peripheral.
pub struct CycleCounterClock {
    cycles_per_ms: u32,
}

impl CycleCounterClock {
    /// `sysclk_hz` is the core clock the DWT counts at.
    pub fn new(dcb: &mut DCB, dwt: &mut DWT, sysclk_hz: u32) -> Self {
        dcb.enable_trace();
        dwt.enable_cycle_counter();
        Self {
            cycles_per_ms: sysclk_hz / 1000,
        }
    }
}

impl Clock for CycleCounterClock {
    fn now_ms(&mut self) -> u32 {
        DWT::cycle_count().wrapping_div(self.cycles_per_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct RecordingWriter {
        last_write: heapless::Vec<smart_leds::RGB8, 16>,
    }

    impl smart_leds::SmartLedsWrite for RecordingWriter {
        type Error = Infallible;
        type Color = smart_leds::RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Infallible>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            self.last_write.clear();
            for item in iterator {
                let _ = self.last_write.push(item.into());
            }
            Ok(())
        }
    }

    #[test]
    fn smart_led_adapter_flushes_staged_pixels_on_show() {
        let writer = RecordingWriter {
            last_write: heapless::Vec::new(),
        };
        let mut strip: SmartLedAdapter<RecordingWriter, 10> = SmartLedAdapter::new(writer);
        strip.set(3, smart_leds::RGB8::new(0, 20, 0));
        strip.show();
        assert_eq!(strip.writer.last_write[3], smart_leds::RGB8::new(0, 20, 0));
        assert_eq!(strip.writer.last_write[0], smart_leds::RGB8::new(0, 0, 0));
    }
}
