#![no_std]
#![no_main]

mod board;
mod role;

use cortex_m_rt::entry;
use defmt_rtt as _;
use panic_probe as _;

use link_protocol::frame::Frame;
use link_protocol::framer::{Framer, FramerEvent};
use link_protocol::ports::{Clock, Imu};

use role::{Hand, HandAction};

/// A minimal duplex byte port: whatever bytes are available to read, and a
/// way to write a frame's bytes back out (115200 8N1 on real hardware).
pub trait SerialPort {
    fn read_available(&mut self, buf: &mut [u8]) -> usize;
    fn write_all(&mut self, bytes: &[u8]);
}

/// The full cooperative loop, generic over the capability
/// ports so it runs identically against real hardware or
/// [`link_protocol::testing`] mocks. The hand has no trigger/IR step, so
/// loop ordering step 2 is simply absent here.
fn run_loop(mut serial: impl SerialPort, mut imu: impl Imu, mut clock: impl Clock) -> ! {
    let mut hand = Hand::new();
    let mut framer = Framer::new();
    let mut rx_buf = [0u8; 64];

    loop {
        let now_ms = clock.now_ms();

        // 1. Drain serial input; process at most one complete frame.
        let n = serial.read_available(&mut rx_buf);
        if n > 0 {
            framer.feed(&rx_buf[..n]);
        }
        if let Some(event) = framer.poll() {
            let action = match event {
                FramerEvent::Frame(frame) => hand.handle_frame(frame),
                FramerEvent::CrcReject => {
                    defmt::warn!("hand: CRC reject, flushing");
                    HandAction::Send(Frame::nak(hand.rx_expected()))
                }
            };
            dispatch(action, &mut serial);
        }

        // 3. IMU cadence (no trigger/IR step for this role).
        let action = hand.poll_imu(&mut imu, now_ms);
        dispatch(action, &mut serial);
    }
}

fn dispatch(action: HandAction, serial: &mut impl SerialPort) {
    match action {
        HandAction::None => {}
        HandAction::Send(frame) => serial.write_all(&frame.encode()),
        HandAction::ReceivedKill => {
            defmt::error!("hand: KILL received, resetting");
            cortex_m::peripheral::SCB::sys_reset();
        }
    }
}

#[entry]
fn main() -> ! {
    defmt::info!("hand firmware starting");

    // Hardware bring-up (concrete pin/bus assignment) is board-integration
    // work outside this link layer's scope; a real deployment
    // plugs its board's I2C handle into `board::I2cImu` and calls `run_loop`;
    // `role::Hand`'s own test module exercises the handshake/IMU-cadence
    // logic against mocks.
    loop {
        cortex_m::asm::wfi();
    }
}
