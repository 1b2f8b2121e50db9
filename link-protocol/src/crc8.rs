//! CRC-8 integrity check for frames on the wire: polynomial `0x07`, initial
//! value `0x00`, no input/output reflection, no final XOR, computed over the
//! first 19 bytes of a frame.

use crc::{Algorithm, Crc};

/// The exact CRC-8 variant this link uses (the classic "CRC-8"/SMBUS parameters).
const ALGORITHM: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x07,
    init: 0x00,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xF4,
    residue: 0x00,
};

static CRC: Crc<u8> = Crc::<u8>::new(&ALGORITHM);

/// Computes the CRC-8 over `bytes` (callers pass the first 19 frame bytes).
pub fn crc8(bytes: &[u8]) -> u8 {
    CRC.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value_matches_catalog() {
        assert_eq!(crc8(b"123456789"), 0xF4);
    }

    #[test]
    fn single_bit_flip_changes_crc() {
        let base = [0u8; 19];
        let base_crc = crc8(&base);
        for bit in 0..19 * 8 {
            let mut flipped = base;
            flipped[bit / 8] ^= 1 << (bit % 8);
            assert_ne!(crc8(&flipped), base_crc, "bit {bit} flip was not detected");
        }
    }
}
