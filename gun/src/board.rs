//! Hardware glue: thin adapters from generic `embedded-hal`/`smart-leds`
//! traits to the gun's four capability ports plus the millisecond clock.
//! Deliberately generic over pin/bus/writer types rather than pinned to one
//! vendor HAL — wiring concrete GPIO/I2C objects together is board
//! integration, left to whoever flashes a specific board.

use cortex_m::peripheral::{DCB, DWT};
use embedded_hal::blocking::i2c::WriteRead;
use embedded_hal::digital::v2::InputPin;
use link_protocol::ports::{Clock, Imu, LedStrip, Trigger};

/// Debounced edge-free GPIO read of the trigger switch; debouncing itself
/// lives in [`crate::role::Gun`], not here.
pub struct GpioTrigger<PIN> {
    pin: PIN,
}

impl<PIN: InputPin> GpioTrigger<PIN> {
    pub fn new(pin: PIN) -> Self {
        Self { pin }
    }
}

impl<PIN: InputPin> Trigger for GpioTrigger<PIN> {
    fn is_pressed(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}

/// Reads six sequential big-endian `i16` registers starting at `base_reg`
/// (the common accel/gyro burst-read layout most I2C inertial sensors use)
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

/// Stages pixels into a local buffer and flushes them through any
/// `smart_leds::SmartLedsWrite` backend (WS2812/PIO, SPI, bit-bang, ...) on
/// `show()`.
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
