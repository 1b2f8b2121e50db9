//! Local error taxonomy.
//!
//! Every other failure mode this protocol defines — sequence gaps,
//! duplicates, NAKs outside the retransmit window, ACK timeouts — is handled
//! in-band as ordinary control flow ([`crate::sequence::HostSeqOutcome`],
//! [`crate::sequence::RetransmitAction`], a role's `FatalDesync` return) and
//! never needs to surface as a `Result`. The one thing that does is frame
//! decode, which the caller cannot recover from except by flushing and
//! NAK'ing.

/// Errors a peripheral can observe locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// A candidate frame's CRC-8 did not match its trailing byte, or its
    /// type byte was not one of the recognized codes.
    CrcMismatch,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match self {
            LinkError::CrcMismatch => "frame CRC mismatch",
        };
        f.write_str(message)
    }
}
