//! Gun role logic: magazine state, trigger debounce, IMU cadence, and the
//! gunshot sequence-engine wiring.

use link_protocol::config::{
    DEBOUNCE_MS, GUNSHOT_IR_CODE, IMU_FIXED_POINT_SCALE, IMU_INTERVAL_MS, MAG_SIZE, NEC_BITS,
};
use link_protocol::frame::{Frame, FrameType};
use link_protocol::handshake::Handshake;
use link_protocol::pending::Pending;
use link_protocol::ports::{Imu, IrTx, LedStrip, Trigger};
use link_protocol::sequence::{HostSeqOutcome, RetransmitAction, RetransmitWaiter, SequenceEngine};

/// Per-unit calibration offsets subtracted from raw IMU samples before
/// scaling. Accelerometer offsets are in m/s^2, gyroscope offsets in rad/s.
/// Flashed per board at calibration time, not runtime configured.
const ACCEL_OFFSET: [f32; 3] = [0.0, 0.0, 0.0];
const GYRO_OFFSET: [f32; 3] = [0.0, 0.0, 0.0];

/// Canonical gun state: how many rounds remain in the magazine. A separate
/// per-shot identifier is deliberately not tracked: the sequence engine's
/// `tx_seq`/`rx_expected` already disambiguate retransmits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GunState {
    pub remaining_bullets: u8,
}

impl From<(u8, u8)> for GunState {
    fn from((bullets, _): (u8, u8)) -> Self {
        Self {
            remaining_bullets: bullets,
        }
    }
}

impl From<GunState> for (u8, u8) {
    fn from(state: GunState) -> Self {
        (state.remaining_bullets, 0)
    }
}

/// What the main loop should do after a role-logic call.
pub enum GunAction {
    /// Nothing to transmit.
    None,
    /// Transmit this frame.
    Send(Frame),
    /// A NAK named a frame outside the retransmit window (or the retransmit
    /// ring no longer holds the frame a timed-out resend wants): the
    /// peripheral itself must emit `KILL` before resetting, so the host
    /// observes the disconnect and re-drives the handshake.
    FatalDesync,
    /// The host sent `KILL` directly: reset without re-emitting it.
    ReceivedKill,
}

/// Debounces a single active-high switch: reports a rising edge only once
/// the raw reading has held stable for [`DEBOUNCE_MS`].
struct Debouncer {
    stable: bool,
    candidate: bool,
    candidate_since_ms: u32,
}

impl Debouncer {
    const fn new() -> Self {
        Self {
            stable: false,
            candidate: false,
            candidate_since_ms: 0,
        }
    }

    /// Feeds one raw reading. Returns `true` exactly on the iteration the
    /// debounced state transitions from released to pressed.
    fn poll(&mut self, raw: bool, now_ms: u32) -> bool {
        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since_ms = now_ms;
        }
        let elapsed = now_ms.wrapping_sub(self.candidate_since_ms);
        if self.candidate != self.stable && elapsed >= DEBOUNCE_MS {
            self.stable = self.candidate;
            return self.stable;
        }
        false
    }
}

/// The gun's full link-protocol-facing state: handshake, sequencing,
/// pending/canonical magazine count, the outstanding-shot retransmit waiter,
/// trigger debounce, and IMU cadence tracking.
pub struct Gun {
    handshake: Handshake,
    sequence: SequenceEngine,
    pending: Pending<GunState>,
    waiter: RetransmitWaiter,
    debouncer: Debouncer,
    last_imu_ms: u32,
}

impl Gun {
    pub const fn new() -> Self {
        Self {
            handshake: Handshake::new(),
            sequence: SequenceEngine::new(),
            pending: Pending::new(GunState { remaining_bullets: 0 }),
            waiter: RetransmitWaiter::new(),
            debouncer: Debouncer::new(),
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

    /// Current LED-facing bullet count: the pending value while a shot is
    /// in flight, canonical otherwise.
    pub fn displayed_bullets(&self) -> u8 {
        self.pending.reported().remaining_bullets
    }

    /// Step 1 of the loop ordering: handle one CRC-verified inbound frame.
    pub fn handle_frame(&mut self, frame: Frame) -> GunAction {
        match frame.ty {
            FrameType::Syn => {
                GunAction::Send(self.handshake.handle_syn(&frame, &mut self.pending, &mut self.sequence))
            }
            FrameType::Ack => {
                self.handshake.handle_ack(&mut self.pending);
                GunAction::None
            }
            FrameType::Kill => GunAction::ReceivedKill,
            _ if !self.accepts_application_traffic() => GunAction::None,
            FrameType::Gunshot => self.handle_gunshot_echo(frame),
            FrameType::Reload => self.handle_host_command(frame, FrameType::Reload, |_| MAG_SIZE),
            FrameType::UpdateState => {
                self.handle_host_command(frame, FrameType::GunstateAck, |payload| payload.0)
            }
            FrameType::Nak => self.handle_nak(frame),
            _ => GunAction::None,
        }
    }

    fn handle_gunshot_echo(&mut self, frame: Frame) -> GunAction {
        if self.waiter.is_waiting() && self.sequence.confirm_tx(frame.seq) {
            self.waiter.on_ack();
            self.pending.promote();
        }
        GunAction::None
    }

    fn handle_nak(&mut self, frame: Frame) -> GunAction {
        match self.sequence.lookup_for_nak(frame.seq) {
            Some(cached) => GunAction::Send(cached),
            None => GunAction::FatalDesync,
        }
    }

    /// Shared shape of the host-originated RELOAD/UPDATE_STATE handlers: both
    /// apply a new bullet count and reply with an echo/ack carrying the
    /// committed state.
    fn handle_host_command(
        &mut self,
        frame: Frame,
        ack_ty: FrameType,
        new_bullets: impl FnOnce((u8, u8)) -> u8,
    ) -> GunAction {
        match self.sequence.classify_host_seq(frame.seq) {
            HostSeqOutcome::InOrder => {
                let bullets = new_bullets(frame.role_state());
                self.pending.stage(GunState {
                    remaining_bullets: bullets,
                });
                self.pending.promote();
                let ack = Frame::with_role_state(ack_ty, self.sequence.rx_expected(), bullets, 0);
                self.sequence.accept_in_order(ack);
                GunAction::Send(ack)
            }
            HostSeqOutcome::Duplicate => match self.sequence.cached_ack(frame.seq) {
                Some(ack) => GunAction::Send(ack),
                None => GunAction::None,
            },
            HostSeqOutcome::Gap => GunAction::Send(Frame::nak(self.sequence.rx_expected())),
        }
    }

    /// Step 2 of the loop ordering: poll the trigger and, on a debounced
    /// rising edge with ammunition remaining, fire.
    pub fn poll_trigger(
        &mut self,
        trigger: &mut impl Trigger,
        ir_tx: &mut impl IrTx,
        now_ms: u32,
    ) -> GunAction {
        if !self.accepts_application_traffic() {
            return GunAction::None;
        }
        let raw = trigger.is_pressed();
        if !self.debouncer.poll(raw, now_ms) {
            return GunAction::None;
        }
        let bullets = self.pending.canonical().remaining_bullets;
        if bullets == 0 {
            return GunAction::None;
        }

        ir_tx.send_nec(GUNSHOT_IR_CODE, NEC_BITS);
        self.pending.stage(GunState {
            remaining_bullets: bullets - 1,
        });

        let shot = self
            .sequence
            .stamp_and_store(Frame::with_role_state(FrameType::Gunshot, 0, bullets - 1, 0));
        self.waiter.start(now_ms);
        GunAction::Send(shot)
    }

    /// Step 3 of the loop ordering: IMU sampling at a fixed cadence.
    pub fn poll_imu(&mut self, imu: &mut impl Imu, now_ms: u32) -> GunAction {
        if !self.accepts_application_traffic() {
            return GunAction::None;
        }
        if now_ms.wrapping_sub(self.last_imu_ms) < IMU_INTERVAL_MS {
            return GunAction::None;
        }
        self.last_imu_ms = now_ms;
        let raw = imu.read();
        let mut samples = [0i16; 6];
        for (i, dst) in samples.iter_mut().enumerate() {
            let offset = if i < 3 { ACCEL_OFFSET[i] } else { GYRO_OFFSET[i - 3] };
            *dst = ((raw[i] - offset) * IMU_FIXED_POINT_SCALE) as i16;
        }
        GunAction::Send(Frame::imu(samples))
    }

    /// Step 4 of the loop ordering: ACK-timeout retransmit/abandon.
    pub fn poll_retransmit(&mut self, now_ms: u32) -> GunAction {
        match self.waiter.poll(now_ms) {
            RetransmitAction::Idle | RetransmitAction::Wait => GunAction::None,
            RetransmitAction::Abandon => {
                self.pending.discard();
                GunAction::None
            }
            RetransmitAction::Retransmit => match self.sequence.outstanding_tx() {
                Some(frame) => GunAction::Send(frame),
                None => GunAction::FatalDesync,
            },
        }
    }
}

impl Default for Gun {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the six-pixel magazine strip: pixel `i` lit low-intensity green
/// iff `i < remaining_bullets`.
pub fn render_magazine_leds(remaining_bullets: u8, strip: &mut impl LedStrip) {
    for i in 0..strip.len() {
        let color = if (i as u8) < remaining_bullets {
            smart_leds::RGB8::new(0, 10, 0)
        } else {
            smart_leds::RGB8::new(0, 0, 0)
        };
        strip.set(i, color);
    }
    strip.show();
}

#[cfg(test)]
mod tests {
    use super::*;
    use link_protocol::testing::{MockImu, MockIrTx, MockLedStrip, MockTrigger};

    fn handshaken_gun(bullets: u8) -> Gun {
        let mut gun = Gun::new();
        let syn = Frame::with_handshake_role_state(FrameType::Syn, 0, bullets, 0);
        gun.handle_frame(syn);
        gun.handle_frame(Frame::with_handshake_role_state(FrameType::Ack, 0, bullets, 0));
        assert!(gun.accepts_application_traffic());
        gun
    }

    #[test]
    fn s2_gunshot_confirmed_decrements_canonical() {
        let mut gun = handshaken_gun(6);
        let mut trigger = MockTrigger::default();
        let mut ir_tx = MockIrTx::default();

        trigger.set_pressed(true);
        gun.poll_trigger(&mut trigger, &mut ir_tx, 0);
        let action = gun.poll_trigger(&mut trigger, &mut ir_tx, 60);
        let shot = match action {
            GunAction::Send(frame) => frame,
            _ => panic!("expected a gunshot frame"),
        };
        assert_eq!(shot.ty, FrameType::Gunshot);
        assert_eq!(shot.role_state(), (5, 0));
        assert_eq!(ir_tx.last_sent(), Some((GUNSHOT_IR_CODE, NEC_BITS)));
        assert_eq!(gun.displayed_bullets(), 5);

        gun.handle_frame(Frame::with_role_state(FrameType::Gunshot, 0, 5, 0));
        assert_eq!(gun.pending.canonical().remaining_bullets, 5);
    }

    #[test]
    fn s3_gunshot_abandoned_after_three_retransmits() {
        let mut gun = handshaken_gun(6);
        let mut trigger = MockTrigger::default();
        let mut ir_tx = MockIrTx::default();
        trigger.set_pressed(true);
        gun.poll_trigger(&mut trigger, &mut ir_tx, 0);
        gun.poll_trigger(&mut trigger, &mut ir_tx, 60);
        assert_eq!(gun.pending.canonical().remaining_bullets, 6);

        let mut now = 60;
        for _ in 0..3 {
            now += 1001;
            match gun.poll_retransmit(now) {
                GunAction::Send(frame) => assert_eq!(frame.ty, FrameType::Gunshot),
                _ => panic!("expected a retransmit"),
            }
        }
        now += 1001;
        assert!(matches!(gun.poll_retransmit(now), GunAction::None));
        assert_eq!(gun.pending.canonical().remaining_bullets, 6);
        assert_eq!(gun.displayed_bullets(), 6);
    }

    #[test]
    fn trigger_does_nothing_with_empty_magazine() {
        let mut gun = handshaken_gun(0);
        let mut trigger = MockTrigger::default();
        let mut ir_tx = MockIrTx::default();
        trigger.set_pressed(true);
        gun.poll_trigger(&mut trigger, &mut ir_tx, 0);
        assert!(matches!(
            gun.poll_trigger(&mut trigger, &mut ir_tx, 60),
            GunAction::None
        ));
        assert_eq!(ir_tx.last_sent(), None);
    }

    #[test]
    fn s4_duplicate_update_state_is_idempotent() {
        let mut gun = handshaken_gun(6);
        let update = Frame::with_role_state(FrameType::UpdateState, 0, 3, 0);
        let first = gun.handle_frame(update);
        let ack1 = match first {
            GunAction::Send(frame) => frame,
            _ => panic!("expected ack"),
        };
        assert_eq!(ack1.ty, FrameType::GunstateAck);
        assert_eq!(gun.displayed_bullets(), 3);

        let second = gun.handle_frame(update);
        let ack2 = match second {
            GunAction::Send(frame) => frame,
            _ => panic!("expected cached ack"),
        };
        assert_eq!(ack2, ack1);
        assert_eq!(gun.displayed_bullets(), 3);
    }

    #[test]
    fn imu_cadence_respects_interval() {
        let mut gun = handshaken_gun(6);
        let mut imu = MockImu::new([1.0, -1.0, 2.0, 0.0, 0.0, 0.0]);
        // The cadence timestamp starts at 0, so the first sample only fires
        // once the interval has actually elapsed.
        assert!(matches!(gun.poll_imu(&mut imu, 60), GunAction::Send(_)));
        assert!(matches!(gun.poll_imu(&mut imu, 70), GunAction::None));
        assert!(matches!(gun.poll_imu(&mut imu, 120), GunAction::Send(_)));
    }

    #[test]
    fn magazine_leds_light_remaining_bullets_only() {
        let mut strip: MockLedStrip<6> = MockLedStrip::new();
        render_magazine_leds(4, &mut strip);
        for i in 0..4 {
            assert_eq!(strip.shown()[i], smart_leds::RGB8::new(0, 10, 0));
        }
        for i in 4..6 {
            assert_eq!(strip.shown()[i], smart_leds::RGB8::new(0, 0, 0));
        }
    }

    #[test]
    fn nak_outside_window_is_fatal() {
        let mut gun = handshaken_gun(6);
        assert!(matches!(gun.handle_frame(Frame::nak(200)), GunAction::FatalDesync));
    }

    #[test]
    fn received_kill_resets_without_reemitting() {
        let mut gun = handshaken_gun(6);
        assert!(matches!(gun.handle_frame(Frame::kill()), GunAction::ReceivedKill));
    }
}
