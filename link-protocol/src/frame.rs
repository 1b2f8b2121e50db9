//! The 20-byte frame that is the only thing crossing the serial wire.

use crate::config::{FRAME_LEN, PAYLOAD_LEN};
use crate::crc8::crc8;
use crate::error::LinkError;

/// One ASCII type code per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameType {
    Syn,
    Ack,
    Nak,
    Imu,
    Gunshot,
    Vestshot,
    Reload,
    UpdateState,
    GunstateAck,
    VeststateAck,
    Kill,
}

impl FrameType {
    /// The wire byte for this type.
    pub const fn code(self) -> u8 {
        match self {
            FrameType::Syn => b'S',
            FrameType::Ack => b'A',
            FrameType::Nak => b'N',
            FrameType::Imu => b'M',
            FrameType::Gunshot => b'G',
            FrameType::Vestshot => b'V',
            FrameType::Reload => b'R',
            FrameType::UpdateState => b'U',
            FrameType::GunstateAck => b'X',
            FrameType::VeststateAck => b'W',
            FrameType::Kill => b'K',
        }
    }

    /// Whether this type ever occupies a slot in the self-originated
    /// retransmit ring (handshake frames never do).
    pub const fn is_ring_eligible(self) -> bool {
        !matches!(self, FrameType::Syn | FrameType::Ack)
    }
}

impl TryFrom<u8> for FrameType {
    type Error = LinkError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            b'S' => FrameType::Syn,
            b'A' => FrameType::Ack,
            b'N' => FrameType::Nak,
            b'M' => FrameType::Imu,
            b'G' => FrameType::Gunshot,
            b'V' => FrameType::Vestshot,
            b'R' => FrameType::Reload,
            b'U' => FrameType::UpdateState,
            b'X' => FrameType::GunstateAck,
            b'W' => FrameType::VeststateAck,
            b'K' => FrameType::Kill,
            _ => return Err(LinkError::CrcMismatch),
        })
    }
}

/// A fully parsed frame: type, sequence number, and the 16-byte payload slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub ty: FrameType,
    pub seq: u8,
    pub payload: [u8; PAYLOAD_LEN],
}

impl Frame {
    /// Builds a frame with an explicit payload, computing the CRC on encode.
    pub const fn new(ty: FrameType, seq: u8, payload: [u8; PAYLOAD_LEN]) -> Self {
        Self { ty, seq, payload }
    }

    /// Builds a role-state frame: first two payload bytes are `(a, b)`,
    /// the rest zero-padded. Covers GUNSHOT/RELOAD/UPDATE_STATE/VESTSHOT,
    /// whose role state sits in the payload's first two slots (spec.md §8
    /// scenarios S2/S4).
    pub fn with_role_state(ty: FrameType, seq: u8, a: u8, b: u8) -> Self {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = a;
        payload[1] = b;
        Self { ty, seq, payload }
    }

    /// Reads back the two role-state bytes written by [`Frame::with_role_state`].
    pub fn role_state(&self) -> (u8, u8) {
        (self.payload[0], self.payload[1])
    }

    /// Builds a handshake role-state frame (SYN/ACK only). spec.md §8's S1
    /// gives the literal bytes `53 00 00 00 64 ...` for a SYN carrying
    /// `shield=0, hp=100` — that places the second field at payload index 2
    /// (wire offset 4), with a zero padding byte at index 1, rather than the
    /// tightly-packed `(payload[0], payload[1])` layout data frames use. The
    /// handshake payload follows that literal layout rather than the data
    /// frame one.
    pub fn with_handshake_role_state(ty: FrameType, seq: u8, a: u8, b: u8) -> Self {
        debug_assert!(matches!(ty, FrameType::Syn | FrameType::Ack));
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = a;
        payload[2] = b;
        Self { ty, seq, payload }
    }

    /// Reads back the two handshake role-state bytes written by
    /// [`Frame::with_handshake_role_state`].
    pub fn handshake_role_state(&self) -> (u8, u8) {
        (self.payload[0], self.payload[2])
    }

    /// Builds an IMU frame: six signed 16-bit samples, little-endian,
    /// zero-padded. IMU frames are never sequence-tracked — high-rate
    /// telemetry where loss is tolerable; `seq` is carried as 0 and ignored
    /// by both sides.
    pub fn imu(samples: [i16; 6]) -> Self {
        let mut payload = [0u8; PAYLOAD_LEN];
        for (i, sample) in samples.iter().enumerate() {
            let bytes = sample.to_le_bytes();
            payload[i * 2] = bytes[0];
            payload[i * 2 + 1] = bytes[1];
        }
        Self {
            ty: FrameType::Imu,
            seq: 0,
            payload,
        }
    }

    /// Reads back the six IMU samples written by [`Frame::imu`].
    pub fn imu_samples(&self) -> [i16; 6] {
        let mut samples = [0i16; 6];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = i16::from_le_bytes([self.payload[i * 2], self.payload[i * 2 + 1]]);
        }
        samples
    }

    /// Builds a NAK: `seq` carries the sequence number the receiver expects next.
    pub const fn nak(expected_seq: u8) -> Self {
        Self {
            ty: FrameType::Nak,
            seq: expected_seq,
            payload: [0u8; PAYLOAD_LEN],
        }
    }

    /// Builds a KILL frame. Payload is unused.
    pub const fn kill() -> Self {
        Self {
            ty: FrameType::Kill,
            seq: 0,
            payload: [0u8; PAYLOAD_LEN],
        }
    }

    /// Serializes this frame to its 20-byte wire form, appending a fresh CRC-8.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = self.ty.code();
        bytes[1] = self.seq;
        bytes[2..2 + PAYLOAD_LEN].copy_from_slice(&self.payload);
        bytes[18] = 0; // reserved, always zero on the wire
        bytes[19] = crc8(&bytes[0..19]);
        bytes
    }

    /// Parses a 20-byte wire frame, rejecting it if the CRC-8 does not match
    /// or the type byte is unrecognized. A frame is only ever accepted once
    /// its checksum verifies.
    pub fn decode(bytes: &[u8; FRAME_LEN]) -> Result<Self, LinkError> {
        if crc8(&bytes[0..19]) != bytes[19] {
            return Err(LinkError::CrcMismatch);
        }
        let ty = FrameType::try_from(bytes[0]).map_err(|_| LinkError::CrcMismatch)?;
        let mut payload = [0u8; PAYLOAD_LEN];
        payload.copy_from_slice(&bytes[2..2 + PAYLOAD_LEN]);
        Ok(Self {
            ty,
            seq: bytes[1],
            payload,
        })
    }
}
