//! Shared link-layer core for the gun/vest/hand peripheral firmwares:
//! framing, CRC-8, handshake, selective-repeat sequencing, and the
//! pending/canonical state arbiter. Carries no gun/vest/hand-specific
//! semantics — those are built on top of these pieces by each firmware
//! binary.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod crc8;
pub mod error;
pub mod frame;
pub mod framer;
pub mod handshake;
pub mod pending;
pub mod ports;
pub mod sequence;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
