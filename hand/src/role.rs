//! Hand role logic: the minimal role. No buttons, no LEDs, no
//! IR — just handshake gating and a 50 ms IMU telemetry cadence. Responds
//! only to `SYN`/`ACK`/`KILL`; everything else (including `NAK`, since the
//! hand never has a self-originated sequence-tracked frame outstanding to
//! retransmit) is silently dropped.

use link_protocol::config::IMU_INTERVAL_MS;
use link_protocol::frame::{Frame, FrameType};
use link_protocol::handshake::Handshake;
use link_protocol::pending::Pending;
use link_protocol::ports::Imu;
use link_protocol::sequence::SequenceEngine;

/// Per-unit calibration offsets subtracted from raw IMU samples before
/// scaling (same scheme as the gun role). Accelerometer
/// offsets in m/s^2, gyroscope offsets in rad/s; flashed per board.
const ACCEL_OFFSET: [f32; 3] = [0.0, 0.0, 0.0];
const GYRO_OFFSET: [f32; 3] = [0.0, 0.0, 0.0];

/// The hand carries no role state beyond the handshake gate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandState;

impl From<(u8, u8)> for HandState {
    fn from(_: (u8, u8)) -> Self {
        HandState
    }
}

impl From<HandState> for (u8, u8) {
    fn from(_: HandState) -> Self {
        (0, 0)
    }
}

pub enum HandAction {
    /// Nothing to transmit.
    None,
    /// Transmit this frame.
    Send(Frame),
    /// The host sent `KILL` directly: reset without re-emitting it. The
    /// hand never originates sequence-tracked frames, so it has no
    /// NAK-beyond-window desync path of its own that would need to emit a
    /// `KILL` itself.
    ReceivedKill,
}

pub struct Hand {
    handshake: Handshake,
    sequence: SequenceEngine,
    pending: Pending<HandState>,
    last_imu_ms: u32,
}

impl Hand {
    pub const fn new() -> Self {
        Self {
            handshake: Handshake::new(),
            sequence: SequenceEngine::new(),
            pending: Pending::new(HandState),
            last_imu_ms: 0,
        }
    }

    pub fn accepts_application_traffic(&self) -> bool {
        self.handshake.accepts_application_traffic()
    }

    /// The sequence number a CRC-rejected frame's NAK should carry.
    pub fn rx_expected(&self) -> u8 {
        self.sequence.rx_expected()
    }

    /// Step 1 of the loop ordering: handle one CRC-verified inbound frame.
    pub fn handle_frame(&mut self, frame: Frame) -> HandAction {
        match frame.ty {
            FrameType::Syn => HandAction::Send(self.handshake.handle_syn(
                &frame,
                &mut self.pending,
                &mut self.sequence,
            )),
            FrameType::Ack => {
                self.handshake.handle_ack(&mut self.pending);
                HandAction::None
            }
            FrameType::Kill => HandAction::ReceivedKill,
            _ => HandAction::None,
        }
    }

    /// Step 3 of the loop ordering: the 50 ms IMU telemetry cadence, same
    /// schema as the gun's. IMU frames are never sequenced or
    /// acknowledged.
    pub fn poll_imu(&mut self, imu: &mut impl Imu, now_ms: u32) -> HandAction {
        if !self.accepts_application_traffic() {
            return HandAction::None;
        }
        if now_ms.wrapping_sub(self.last_imu_ms) < IMU_INTERVAL_MS {
            return HandAction::None;
        }
        self.last_imu_ms = now_ms;

        let raw = imu.read();
        let mut samples = [0i16; 6];
        for (i, sample) in samples.iter_mut().enumerate() {
            let offset = if i < 3 { ACCEL_OFFSET[i] } else { GYRO_OFFSET[i - 3] };
            *sample = ((raw[i] - offset) * link_protocol::config::IMU_FIXED_POINT_SCALE) as i16;
        }
        HandAction::Send(Frame::imu(samples))
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_protocol::testing::MockImu;

    fn handshaken_hand() -> Hand {
        let mut hand = Hand::new();
        let syn = Frame::with_handshake_role_state(FrameType::Syn, 0, 0, 0);
        hand.handle_frame(syn);
        hand.handle_frame(Frame::with_handshake_role_state(FrameType::Ack, 0, 0, 0));
        assert!(hand.accepts_application_traffic());
        hand
    }

    #[test]
    fn handshake_opens_gate_with_no_role_state() {
        let hand = handshaken_hand();
        assert!(hand.accepts_application_traffic());
    }

    #[test]
    fn imu_cadence_respects_interval_and_carries_fixed_point_samples() {
        let mut hand = handshaken_hand();
        let mut imu = MockImu::new([1.0, -2.0, 0.0, 0.5, 0.0, 0.0]);

        // First sample only fires once the interval has elapsed from the
        // (zeroed) initial cadence timestamp.
        let first = hand.poll_imu(&mut imu, 60);
        match first {
            HandAction::Send(frame) => {
                assert_eq!(frame.ty, FrameType::Imu);
                assert_eq!(frame.imu_samples(), [100, -200, 0, 50, 0, 0]);
            }
            _ => panic!("expected an imu frame after the cadence interval elapsed"),
        }

        // Too soon for the next one.
        assert!(matches!(hand.poll_imu(&mut imu, 70), HandAction::None));

        // Interval elapsed again.
        assert!(matches!(hand.poll_imu(&mut imu, 120), HandAction::Send(_)));
    }

    #[test]
    fn nak_and_gunshot_frames_are_silently_dropped() {
        let mut hand = handshaken_hand();
        assert!(matches!(hand.handle_frame(Frame::nak(0)), HandAction::None));
        assert!(matches!(
            hand.handle_frame(Frame::with_role_state(FrameType::Gunshot, 0, 5, 0)),
            HandAction::None
        ));
    }

    #[test]
    fn kill_is_fatal() {
        let mut hand = handshaken_hand();
        assert!(matches!(hand.handle_frame(Frame::kill()), HandAction::ReceivedKill));
    }
}
