//! Hardware glue for the hand unit: an inertial sensor and a millisecond
//! clock are its only capability ports. Identical in construction to gun's
//! `I2cImu`/`CycleCounterClock`; duplicated rather than shared because each
//! firmware binary crate owns its own board-integration layer.

use cortex_m::peripheral::{DCB, DWT};
use embedded_hal::blocking::i2c::WriteRead;
use link_protocol::ports::{Clock, Imu};

/// Reads six sequential big-endian `i16` registers starting at `base_reg`
/// and converts to floating-point using `scale` (sensor-datasheet LSB/unit).
pub struct I2cImu<I2C> {
    i2c: I2C,
    address: u8,
    base_reg: u8,
    scale: f32,
}

impl<I2C: WriteRead> I2cImu<I2C> {
    pub fn new(i2c: I2C, address: u8, base_reg: u8, scale: f32) -> Self {
        Self {
            i2c,
            address,
            base_reg,
            scale,
        }
    }
}

impl<I2C: WriteRead> Imu for I2cImu<I2C> {
    fn read(&mut self) -> [f32; 6] {
        let mut raw = [0u8; 12];
        if self
            .i2c
            .write_read(self.address, &[self.base_reg], &mut raw)
            .is_err()
        {
            return [0.0; 6];
        }
        let mut samples = [0.0f32; 6];
        for (i, sample) in samples.iter_mut().enumerate() {
            let be = i16::from_be_bytes([raw[i * 2], raw[i * 2 + 1]]);
            *sample = be as f32 / self.scale;
        }
        samples
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
