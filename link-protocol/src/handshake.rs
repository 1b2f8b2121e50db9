//! The `SYN → ACK → ACK` handshake controller.
//!
//! The peripheral never initiates a handshake: it starts `Idle` and waits for
//! the host to drive a `SYN`. Every `SYN`, whether the very first one or a
//! reconnection mid-session, resets the sequence engine and re-stages
//! `pending` from the frame's payload; the closing `ACK` promotes it and
//! gates application traffic open.

use crate::frame::{Frame, FrameType};
use crate::pending::Pending;
use crate::sequence::SequenceEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum HandshakeState {
    Idle,
    Running,
}

/// Drives the handshake state machine for one role. Owns no role state
/// itself — callers pass in the `Pending<R>` and `SequenceEngine` that the
/// handshake resets/stages/promotes, since both are shared with the role's
/// ordinary sequence-engine traffic once running.
pub struct Handshake {
    state: HandshakeState,
}

impl Handshake {
    pub const fn new() -> Self {
        Self {
            state: HandshakeState::Idle,
        }
    }

    /// Whether non-handshake traffic should be accepted. Until the handshake
    /// completes, exactly two frame types are accepted — SYN and ACK — and
    /// every other type is silently dropped.
    pub fn accepts_application_traffic(&self) -> bool {
        matches!(self.state, HandshakeState::Running)
    }

    /// Handles an inbound `SYN`, in either state — a `SYN` while `Running` is
    /// a reconnection and drops back to `Idle` first, resynchronising after a
    /// host-side restart. Resets the sequence engine, stages `pending` from
    /// the frame's role-state payload, and returns the `ACK` reply.
    pub fn handle_syn<R>(&mut self, frame: &Frame, pending: &mut Pending<R>, sequence: &mut SequenceEngine) -> Frame
    where
        R: Copy + From<(u8, u8)>,
    {
        self.state = HandshakeState::Idle;
        sequence.reset();
        let (a, b) = frame.handshake_role_state();
        pending.stage(R::from((a, b)));
        Frame::with_handshake_role_state(FrameType::Ack, 0, a, b)
    }

    /// Handles an inbound `ACK` while `Idle`: promotes the staged pending
    /// state to canonical and opens the gate to `Running`. An `ACK` received
    /// while already `Running` is ignored (it answers a `SYN` the peripheral
    /// never needed to re-send).
    pub fn handle_ack<R: Copy>(&mut self, pending: &mut Pending<R>) {
        if self.state == HandshakeState::Idle {
            pending.promote();
            self.state = HandshakeState::Running;
        }
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct VestState {
        shield: u8,
        health: u8,
    }

    impl From<(u8, u8)> for VestState {
        fn from((shield, health): (u8, u8)) -> Self {
            Self { shield, health }
        }
    }

    #[test]
    fn s1_handshake_promotes_host_state_and_opens_gate() {
        let mut handshake = Handshake::new();
        let mut pending = Pending::new(VestState { shield: 0, health: 0 });
        let mut sequence = SequenceEngine::new();

        assert!(!handshake.accepts_application_traffic());

        let syn = Frame::with_handshake_role_state(FrameType::Syn, 0, 0, 100);
        let ack = handshake.handle_syn(&syn, &mut pending, &mut sequence);
        assert_eq!(ack.ty, FrameType::Ack);
        assert_eq!(ack.handshake_role_state(), (0, 100));
        assert!(!handshake.accepts_application_traffic());
        assert_eq!(pending.canonical(), VestState { shield: 0, health: 0 });
        assert_eq!(pending.reported(), VestState { shield: 0, health: 100 });

        handshake.handle_ack(&mut pending);
        assert!(handshake.accepts_application_traffic());
        assert_eq!(pending.canonical(), VestState { shield: 0, health: 100 });
        assert_eq!(sequence.tx_seq(), 0);
        assert_eq!(sequence.rx_expected(), 0);
    }

    #[test]
    fn mid_session_syn_resyncs_and_drops_back_to_idle() {
        let mut handshake = Handshake::new();
        let mut pending = Pending::new(VestState { shield: 10, health: 80 });
        let mut sequence = SequenceEngine::new();

        let first_syn = Frame::with_handshake_role_state(FrameType::Syn, 0, 10, 80);
        handshake.handle_syn(&first_syn, &mut pending, &mut sequence);
        handshake.handle_ack(&mut pending);
        assert!(handshake.accepts_application_traffic());

        // Host restarts and re-drives the handshake with different state.
        let resync_syn = Frame::with_handshake_role_state(FrameType::Syn, 0, 30, 100);
        handshake.handle_syn(&resync_syn, &mut pending, &mut sequence);
        assert!(!handshake.accepts_application_traffic());
        assert_eq!(pending.reported(), VestState { shield: 30, health: 100 });

        handshake.handle_ack(&mut pending);
        assert!(handshake.accepts_application_traffic());
        assert_eq!(pending.canonical(), VestState { shield: 30, health: 100 });
    }

    #[test]
    fn ack_while_idle_without_syn_is_ignored() {
        let mut handshake = Handshake::new();
        let mut pending = Pending::new(VestState { shield: 0, health: 100 });
        // No SYN staged anything, but handle_ack should still only promote
        // whatever is (not) pending, never panic.
        handshake.handle_ack(&mut pending);
        assert!(handshake.accepts_application_traffic());
    }
}
