//! Vest role logic: IR hit detection and shield/health damage arithmetic.

use link_protocol::config::{HIT_DAMAGE, MAX_HEALTH, VESTSHOT_IR_COMMAND};
use link_protocol::frame::{Frame, FrameType};
use link_protocol::handshake::Handshake;
use link_protocol::pending::Pending;
use link_protocol::ports::{IrRx, LedStrip};
use link_protocol::sequence::{HostSeqOutcome, RetransmitAction, RetransmitWaiter, SequenceEngine};

/// Canonical vest state: shield absorbs damage before health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VestState {
    pub shield: u8,
    pub health: u8,
}

impl From<(u8, u8)> for VestState {
    fn from((shield, health): (u8, u8)) -> Self {
        Self { shield, health }
    }
}

impl From<VestState> for (u8, u8) {
    fn from(state: VestState) -> Self {
        (state.shield, state.health)
    }
}

/// Shield absorbs `damage` before health; health dropping to zero or below
/// snaps to a full respawn (shield=0, health=100) rather than ever being
/// observed non-positive.
pub fn apply_damage(state: VestState, damage: u8) -> VestState {
    if damage <= state.shield {
        VestState {
            shield: state.shield - damage,
            health: state.health,
        }
    } else {
        let overflow = damage - state.shield;
        if overflow >= state.health {
            VestState {
                shield: 0,
                health: MAX_HEALTH,
            }
        } else {
            VestState {
                shield: 0,
                health: state.health - overflow,
            }
        }
    }
}

pub enum VestAction {
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

/// The vest's full link-protocol-facing state.
pub struct Vest {
    handshake: Handshake,
    sequence: SequenceEngine,
    pending: Pending<VestState>,
    waiter: RetransmitWaiter,
}

impl Vest {
    pub const fn new() -> Self {
        Self {
            handshake: Handshake::new(),
            sequence: SequenceEngine::new(),
            pending: Pending::new(VestState { shield: 0, health: 0 }),
            waiter: RetransmitWaiter::new(),
        }
    }

    pub fn accepts_application_traffic(&self) -> bool {
        self.handshake.accepts_application_traffic()
    }

    /// The sequence number a CRC-rejected frame's NAK should carry.
    pub fn rx_expected(&self) -> u8 {
        self.sequence.rx_expected()
    }

    /// Current HP-bar-facing state: pending while a hit is unconfirmed,
    /// canonical otherwise.
    pub fn displayed_state(&self) -> VestState {
        self.pending.reported()
    }

    /// Step 1 of the loop ordering: handle one CRC-verified inbound frame.
    pub fn handle_frame(&mut self, frame: Frame) -> VestAction {
        match frame.ty {
            FrameType::Syn => VestAction::Send(self.handshake.handle_syn(
                &frame,
                &mut self.pending,
                &mut self.sequence,
            )),
            FrameType::Ack => {
                self.handshake.handle_ack(&mut self.pending);
                VestAction::None
            }
            FrameType::Kill => VestAction::ReceivedKill,
            _ if !self.accepts_application_traffic() => VestAction::None,
            FrameType::Vestshot => self.handle_vestshot_echo(frame),
            FrameType::UpdateState => self.handle_update_state(frame),
            FrameType::Nak => self.handle_nak(frame),
            _ => VestAction::None,
        }
    }

    fn handle_vestshot_echo(&mut self, frame: Frame) -> VestAction {
        if self.waiter.is_waiting() && self.sequence.confirm_tx(frame.seq) {
            self.waiter.on_ack();
            self.pending.promote();
        }
        VestAction::None
    }

    fn handle_nak(&mut self, frame: Frame) -> VestAction {
        match self.sequence.lookup_for_nak(frame.seq) {
            Some(cached) => VestAction::Send(cached),
            None => VestAction::FatalDesync,
        }
    }

    fn handle_update_state(&mut self, frame: Frame) -> VestAction {
        match self.sequence.classify_host_seq(frame.seq) {
            HostSeqOutcome::InOrder => {
                let state = VestState::from(frame.role_state());
                self.pending.stage(state);
                self.pending.promote();
                let ack = Frame::with_role_state(
                    FrameType::VeststateAck,
                    self.sequence.rx_expected(),
                    state.shield,
                    state.health,
                );
                self.sequence.accept_in_order(ack);
                VestAction::Send(ack)
            }
            HostSeqOutcome::Duplicate => match self.sequence.cached_ack(frame.seq) {
                Some(ack) => VestAction::Send(ack),
                None => VestAction::None,
            },
            HostSeqOutcome::Gap => VestAction::Send(Frame::nak(self.sequence.rx_expected())),
        }
    }

    /// Step 2 of the loop ordering: poll the IR receiver for a decoded NEC
    /// command and, on a recognized hit code, apply damage.
    pub fn poll_ir(&mut self, ir_rx: &mut impl IrRx, now_ms: u32) -> VestAction {
        if !self.accepts_application_traffic() {
            return VestAction::None;
        }
        let Some(command) = ir_rx.decode() else {
            return VestAction::None;
        };
        if command != VESTSHOT_IR_COMMAND as u32 {
            return VestAction::None;
        }

        let damaged = apply_damage(self.pending.canonical(), HIT_DAMAGE);
        self.pending.stage(damaged);

        let shot = self.sequence.stamp_and_store(Frame::with_role_state(
            FrameType::Vestshot,
            0,
            damaged.shield,
            damaged.health,
        ));
        self.waiter.start(now_ms);
        VestAction::Send(shot)
    }

    /// Step 4 of the loop ordering: ACK-timeout retransmit/abandon.
    pub fn poll_retransmit(&mut self, now_ms: u32) -> VestAction {
        match self.waiter.poll(now_ms) {
            RetransmitAction::Idle | RetransmitAction::Wait => VestAction::None,
            RetransmitAction::Abandon => {
                self.pending.discard();
                VestAction::None
            }
            RetransmitAction::Retransmit => match self.sequence.outstanding_tx() {
                Some(frame) => VestAction::Send(frame),
                None => VestAction::FatalDesync,
            },
        }
    }
}

impl Default for Vest {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the ten-pixel HP bar: `full = health / 10` pixels fully lit
/// green, one more dim green iff `health % 10 > 0`, the rest off.
pub fn render_hp_bar(health: u8, strip: &mut impl LedStrip) {
    let full = (health / 10) as usize;
    let remainder = health % 10;
    for i in 0..strip.len() {
        let color = if i < full {
            smart_leds::RGB8::new(0, 20, 0)
        } else if i == full && remainder > 0 {
            smart_leds::RGB8::new(0, 5, 0)
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
    use link_protocol::testing::{MockIrRx, MockLedStrip};

    fn handshaken_vest(shield: u8, health: u8) -> Vest {
        let mut vest = Vest::new();
        let syn = Frame::with_handshake_role_state(FrameType::Syn, 0, shield, health);
        vest.handle_frame(syn);
        vest.handle_frame(Frame::with_handshake_role_state(FrameType::Ack, 0, shield, health));
        assert!(vest.accepts_application_traffic());
        vest
    }

    #[test]
    fn damage_consumes_shield_before_health() {
        let state = VestState { shield: 10, health: 80 };
        let after = apply_damage(state, 5);
        assert_eq!(after, VestState { shield: 5, health: 80 });
    }

    #[test]
    fn damage_overflowing_shield_spills_into_health() {
        let state = VestState { shield: 2, health: 80 };
        let after = apply_damage(state, 5);
        assert_eq!(after, VestState { shield: 0, health: 77 });
    }

    #[test]
    fn health_dropping_to_zero_snaps_to_full_respawn() {
        let state = VestState { shield: 0, health: 3 };
        let after = apply_damage(state, 5);
        assert_eq!(after, VestState { shield: 0, health: 100 });
    }

    #[test]
    fn ir_hit_emits_vestshot_and_stages_damage() {
        let mut vest = handshaken_vest(10, 80);
        let mut ir_rx = MockIrRx::default();
        ir_rx.push(VESTSHOT_IR_COMMAND as u32);

        let action = vest.poll_ir(&mut ir_rx, 0);
        let shot = match action {
            VestAction::Send(frame) => frame,
            _ => panic!("expected a vestshot frame"),
        };
        assert_eq!(shot.ty, FrameType::Vestshot);
        assert_eq!(shot.role_state(), (5, 80));
        assert_eq!(vest.displayed_state(), VestState { shield: 5, health: 80 });

        vest.handle_frame(Frame::with_role_state(FrameType::Vestshot, 0, 5, 80));
        assert_eq!(vest.pending.canonical(), VestState { shield: 5, health: 80 });
    }

    #[test]
    fn unrelated_ir_command_is_ignored() {
        let mut vest = handshaken_vest(10, 80);
        let mut ir_rx = MockIrRx::default();
        ir_rx.push(0x42);
        assert!(matches!(vest.poll_ir(&mut ir_rx, 0), VestAction::None));
        assert_eq!(vest.displayed_state(), VestState { shield: 10, health: 80 });
    }

    #[test]
    fn s4_style_duplicate_update_state_is_idempotent() {
        let mut vest = handshaken_vest(10, 80);
        let update = Frame::with_role_state(FrameType::UpdateState, 0, 20, 50);
        let first = vest.handle_frame(update);
        let ack1 = match first {
            VestAction::Send(frame) => frame,
            _ => panic!("expected ack"),
        };
        assert_eq!(ack1.ty, FrameType::VeststateAck);

        let second = vest.handle_frame(update);
        let ack2 = match second {
            VestAction::Send(frame) => frame,
            _ => panic!("expected cached ack"),
        };
        assert_eq!(ack2, ack1);
        assert_eq!(vest.displayed_state(), VestState { shield: 20, health: 50 });
    }

    #[test]
    fn hp_bar_renders_full_and_partial_pixels() {
        let mut strip: MockLedStrip<10> = MockLedStrip::new();
        render_hp_bar(53, &mut strip);
        for i in 0..5 {
            assert_eq!(strip.shown()[i], smart_leds::RGB8::new(0, 20, 0));
        }
        assert_eq!(strip.shown()[5], smart_leds::RGB8::new(0, 5, 0));
        for i in 6..10 {
            assert_eq!(strip.shown()[i], smart_leds::RGB8::new(0, 0, 0));
        }
    }

    #[test]
    fn s6_nak_outside_window_is_fatal() {
        let mut vest = handshaken_vest(10, 80);
        assert!(matches!(vest.handle_frame(Frame::nak(200)), VestAction::FatalDesync));
    }

    #[test]
    fn received_kill_resets_without_reemitting() {
        let mut vest = handshaken_vest(10, 80);
        assert!(matches!(vest.handle_frame(Frame::kill()), VestAction::ReceivedKill));
    }
}
