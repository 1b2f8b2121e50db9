//! Protocol-wide tunables.
//!
//! These are compile-time constants rather than a runtime-parsed file: the
//! host-side key/value config (player id, MAC addresses, IP/port) governs
//! how the host finds a peripheral, not how the peripheral itself behaves,
//! and is out of scope here.

/// Size in bytes of one frame on the wire.
pub const FRAME_LEN: usize = 20;
/// Size in bytes of the payload slot within a frame.
pub const PAYLOAD_LEN: usize = 16;

/// Depth of the self-originated-frame retransmission ring (§4.3, §9).
pub const TX_RING_DEPTH: usize = 4;

/// Capacity of the raw byte reassembly buffer, in frames (§4.1: "capacity >= 2 x 20").
pub const FRAMER_CAPACITY_FRAMES: usize = 2;

/// Magazine capacity for the gun role.
pub const MAG_SIZE: u8 = 6;
/// Maximum shield value for the vest role.
pub const MAX_SHIELD: u8 = 30;
/// Maximum (and respawn) health value for the vest role.
pub const MAX_HEALTH: u8 = 100;
/// Damage applied per detected IR hit.
pub const HIT_DAMAGE: u8 = 5;

/// Trigger debounce stability window, milliseconds.
pub const DEBOUNCE_MS: u32 = 50;
/// IMU sample/send cadence, milliseconds.
pub const IMU_INTERVAL_MS: u32 = 50;
/// How long a self-originated shot frame waits for its echo before retrying.
pub const RESPONSE_TIMEOUT_MS: u32 = 1000;
/// Maximum number of retransmit attempts before a shot is abandoned.
pub const MAX_RESEND: u8 = 3;

/// 32-bit NEC command the gun transmits on a trigger pull.
pub const GUNSHOT_IR_CODE: u32 = 0xFF6897;
/// NEC command the vest recognizes as an incoming hit.
pub const VESTSHOT_IR_COMMAND: u8 = 0x16;
/// Bit width of the NEC codes this protocol exchanges.
pub const NEC_BITS: u32 = 32;

/// Fixed-point scale applied to IMU readings before truncation to `i16`.
pub const IMU_FIXED_POINT_SCALE: f32 = 100.0;

/// Depth of the mock IR queues used by [`crate::testing`]. Not a wire
/// constant — purely a host-test convenience bound.
pub const MAX_QUEUED_IR_CODES: usize = 8;
