//! Errors raised while marshalling or unmarshalling Art-Net packets.

use super::code::OpCode;

/// Errors that may occur when decoding an Art-Net packet from the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The datagram is shorter than the packet's fixed header.
    #[error("header length incorrect: got {0} bytes")]
    InvalidHeaderLength(usize),

    /// The first 8 bytes are not the "Art-Net\0" magic.
    #[error("not an Art-Net packet")]
    InvalidMagic,

    /// The opcode is not in the published opcode table.
    #[error("invalid opcode 0x{0:04x}")]
    InvalidOpCode(u16),

    /// The opcode is published but this crate does not implement it.
    #[error("unsupported opcode {0}")]
    UnsupportedOpCode(OpCode),

    /// The protocol version predates revision 14.
    #[error("incompatible version: want >= 14, got {0}")]
    IncompatibleVersion(u16),

    /// The style code is not in the published style table.
    #[error("invalid style code 0x{0:02x}")]
    InvalidStyle(u8),

    /// Neither byte order of the reply's port field yields 6454.
    #[error("invalid port: {0} is not the Art-Net port")]
    InvalidPort(u16),

    /// The DMX payload length is odd or outside 2..=512.
    #[error("invalid packet boundary: DMX length {0} not an even number in 2..=512")]
    InvalidPacketBoundary(u16),

    /// The packet is shorter than the smallest valid form.
    #[error("packet too short: got {got} bytes, want at least {min}")]
    InvalidPacketMin { got: usize, min: usize },

    /// The packet is longer than the largest valid form.
    #[error("packet too long: got {got} bytes, want at most {max}")]
    InvalidPacketMax { got: usize, max: usize },
}
