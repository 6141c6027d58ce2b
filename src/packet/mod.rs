//! The Art-Net wire codec.
//!
//! Every packet begins with the 8-byte magic `"Art-Net\0"` and a
//! little-endian opcode. All other multi-byte integers on the wire are
//! big-endian except where a packet notes otherwise (the ArtPollReply
//! port field). Byte order handling lives entirely in this module; the
//! runtimes above it only ever see decoded values.
//!
//! [`Packet::unmarshal`] classifies a datagram and dispatches to the
//! decoder for its opcode. Opcodes published by the protocol but not
//! implemented here (RDM, file transfer, video, firmware, time sync,
//! media server control) are recognized and rejected with
//! [`ParseError::UnsupportedOpCode`] rather than a generic failure.

pub mod code;
mod error;
mod header;

mod address;
mod command;
mod diag;
mod dmx;
mod ip_prog;
mod nzs;
mod poll;
mod poll_reply;
mod sync;
mod timecode;
mod trigger;

pub use address::ArtAddress;
pub use command::ArtCommand;
pub use diag::ArtDiagData;
pub use dmx::ArtDmx;
pub use error::ParseError;
pub use header::{Header, ARTNET_MAGIC, PROTOCOL_VERSION};
pub use ip_prog::{ArtIpProg, ArtIpProgReply};
pub use nzs::ArtNzs;
pub use poll::ArtPoll;
pub use poll_reply::ArtPollReply;
pub use sync::ArtSync;
pub use timecode::ArtTimeCode;
pub use trigger::ArtTrigger;

use code::OpCode;

/// The fixed Art-Net UDP port, 0x1936.
pub const ARTNET_PORT: u16 = 6454;

/// A decoded Art-Net packet of any supported opcode.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Packet {
    /// Discovery request.
    Poll(ArtPoll),
    /// Discovery response.
    PollReply(ArtPollReply),
    /// Diagnostics message.
    DiagData(ArtDiagData),
    /// Text command.
    Command(ArtCommand),
    /// Zero start code DMX512 data.
    Dmx(ArtDmx),
    /// Non-zero start code DMX512 data.
    Nzs(ArtNzs),
    /// Synchronous output directive.
    Sync(ArtSync),
    /// Remote address programming.
    Address(ArtAddress),
    /// Time code.
    TimeCode(ArtTimeCode),
    /// Trigger macro.
    Trigger(ArtTrigger),
    /// Remote IP programming.
    IpProg(ArtIpProg),
    /// Remote IP programming acknowledgement.
    IpProgReply(ArtIpProgReply),
}

impl Packet {
    /// The opcode of this packet.
    pub fn opcode(&self) -> OpCode {
        match self {
            Packet::Poll(_) => OpCode::Poll,
            Packet::PollReply(_) => OpCode::PollReply,
            Packet::DiagData(_) => OpCode::DiagData,
            Packet::Command(_) => OpCode::Command,
            Packet::Dmx(_) => OpCode::Dmx,
            Packet::Nzs(_) => OpCode::Nzs,
            Packet::Sync(_) => OpCode::Sync,
            Packet::Address(_) => OpCode::Address,
            Packet::TimeCode(_) => OpCode::TimeCode,
            Packet::Trigger(_) => OpCode::Trigger,
            Packet::IpProg(_) => OpCode::IpProg,
            Packet::IpProgReply(_) => OpCode::IpProgReply,
        }
    }

    /// Encodes the packet into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        match self {
            Packet::Poll(p) => p.marshal(),
            Packet::PollReply(p) => p.marshal(),
            Packet::DiagData(p) => p.marshal(),
            Packet::Command(p) => p.marshal(),
            Packet::Dmx(p) => p.marshal(),
            Packet::Nzs(p) => p.marshal(),
            Packet::Sync(p) => p.marshal(),
            Packet::Address(p) => p.marshal(),
            Packet::TimeCode(p) => p.marshal(),
            Packet::Trigger(p) => p.marshal(),
            Packet::IpProg(p) => p.marshal(),
            Packet::IpProgReply(p) => p.marshal(),
        }
    }

    /// Decodes a datagram into a packet, dispatching on its opcode.
    pub fn unmarshal(b: &[u8]) -> Result<Packet, ParseError> {
        let header = Header::unmarshal(b)?;
        let packet = match header.opcode {
            OpCode::Poll => Packet::Poll(ArtPoll::unmarshal(b)?),
            OpCode::PollReply => Packet::PollReply(ArtPollReply::unmarshal(b)?),
            OpCode::DiagData => Packet::DiagData(ArtDiagData::unmarshal(b)?),
            OpCode::Command => Packet::Command(ArtCommand::unmarshal(b)?),
            OpCode::Dmx => Packet::Dmx(ArtDmx::unmarshal(b)?),
            OpCode::Nzs => Packet::Nzs(ArtNzs::unmarshal(b)?),
            OpCode::Sync => Packet::Sync(ArtSync::unmarshal(b)?),
            OpCode::Address => Packet::Address(ArtAddress::unmarshal(b)?),
            OpCode::TimeCode => Packet::TimeCode(ArtTimeCode::unmarshal(b)?),
            OpCode::Trigger => Packet::Trigger(ArtTrigger::unmarshal(b)?),
            OpCode::IpProg => Packet::IpProg(ArtIpProg::unmarshal(b)?),
            OpCode::IpProgReply => Packet::IpProgReply(ArtIpProgReply::unmarshal(b)?),
            other => return Err(ParseError::UnsupportedOpCode(other)),
        };
        Ok(packet)
    }
}

/// Appends `s` as a fixed-length, NUL-terminated ASCII field, truncating
/// to `len - 1` characters and zero-padding the remainder.
fn write_padded_string(buf: &mut Vec<u8>, s: &str, len: usize) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(len - 1);
    buf.extend_from_slice(&bytes[..n]);
    buf.resize(buf.len() + (len - n), 0);
}

/// Reads a NUL-terminated ASCII field; the first zero byte truncates.
fn read_string(b: &[u8]) -> String {
    let end = b.iter().position(|&c| c == 0).unwrap_or(b.len());
    String::from_utf8_lossy(&b[..end]).into_owned()
}
