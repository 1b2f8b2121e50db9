#![no_std]
#![no_main]

mod board;
mod nec;
mod role;

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;

use link_protocol::frame::Frame;
use link_protocol::framer::{Framer, FramerEvent};
use link_protocol::ports::{Clock, Imu, IrTx, LedStrip, Trigger};

use role::{render_magazine_leds, Gun, GunAction};

/// A minimal duplex byte port: whatever bytes are available to read, and a
/// way to write a frame's bytes back out (115200 8N1 on real hardware).
pub trait SerialPort {
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
    fn write_all(&mut self, bytes: &[u8]);
}

/// The full cooperative loop, generic over the capability ports so it runs
/// identically against real hardware or [`link_protocol::testing`] mocks.
fn run_loop(
    mut serial: impl SerialPort,
    mut trigger: impl Trigger,
    mut imu: impl Imu,
    mut ir_tx: impl IrTx,
    mut led_strip: impl LedStrip,
    mut clock: impl Clock,
) -> ! {
    let mut gun = Gun::new();
    let mut framer = Framer::new();
    let mut rx_buf = [0u8; 64];
    let mut last_displayed_bullets = u8::MAX;

    loop {
        let now_ms = clock.now_ms();

        // 1. Drain serial input; process at most one complete frame.
        let n = serial.read_available(&mut rx_buf);
        if n > 0 {
            framer.feed(&rx_buf[..n]);
        }
        if let Some(event) = framer.poll() {
            let action = match event {
                FramerEvent::Frame(frame) => gun.handle_frame(frame),
                FramerEvent::CrcReject => {
                    defmt::warn!("gun: CRC reject, flushing");
                    GunAction::Send(Frame::nak(gun.rx_expected()))
                }
            };
            dispatch(action, &mut serial);
        }

        // 2. Poll the trigger.
        let action = gun.poll_trigger(&mut trigger, &mut ir_tx, now_ms);
        dispatch(action, &mut serial);

        // 3. IMU cadence.
        let action = gun.poll_imu(&mut imu, now_ms);
        dispatch(action, &mut serial);

        // 4. ACK-timeout retransmit/abandon.
        let action = gun.poll_retransmit(now_ms);
        dispatch(action, &mut serial);

        let displayed = gun.displayed_bullets();
        if displayed != last_displayed_bullets {
            render_magazine_leds(displayed, &mut led_strip);
            last_displayed_bullets = displayed;
        }
    }
}

fn dispatch(action: GunAction, serial: &mut impl SerialPort) {
    match action {
        GunAction::None => {}
        GunAction::Send(frame) => serial.write_all(&frame.encode()),
        GunAction::FatalDesync => {
            defmt::error!("gun: fatal desync, emitting KILL and resetting");
            serial.write_all(&Frame::kill().encode());
            cortex_m::peripheral::SCB::sys_reset();
        }
        GunAction::ReceivedKill => {
            defmt::error!("gun: KILL received, resetting");
            cortex_m::peripheral::SCB::sys_reset();
        }
    }
}

#[entry]
fn main() -> ! {
    defmt::info!("gun firmware starting");

    // Hardware bring-up (concrete pin/bus assignment) is board-integration
    // work outside this link layer's scope; a real deployment
    // plugs its board's GPIO/I2C/PIO handles into the adapters in `board`
    // and calls `run_loop`; `role::Gun`'s own test module exercises the
    // sequencing/handshake/retransmit logic `run_loop` drives against mocks.
    loop {
        cortex_m::asm::wfi();
    }
}
