//! ArtCommand: text based parameter commands.

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};
use super::read_string;

const ART_COMMAND_MAX_DATA: usize = 512;

/// Property-set style commands as ASCII text, e.g.
/// `"SwoutText=Playback&"`. Unicast or broadcast, application specific.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtCommand {
    /// Manufacturer code of the devices that shall process this command.
    pub esta_manufacturer: [u8; 2],
    /// The command text. At most 511 characters; a terminating NUL is
    /// added on the wire.
    pub data: String,
}

impl ArtCommand {
    /// Encodes the packet into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let text = self.data.as_bytes();
        let len = text.len().min(ART_COMMAND_MAX_DATA - 1);
        let mut buf = Vec::with_capacity(HEADER_LENGTH + 4 + len + 1);
        write_header(&mut buf, OpCode::Command);
        buf.extend_from_slice(&self.esta_manufacturer);
        buf.extend_from_slice(&((len + 1) as u16).to_be_bytes());
        buf.extend_from_slice(&text[..len]);
        buf.push(0);
        buf
    }

    /// Decodes an ArtCommand from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Command)?;
        let base = HEADER_LENGTH + 4;
        if b.len() < base {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        let length = u16::from_be_bytes([b[14], b[15]]) as usize;
        if length > ART_COMMAND_MAX_DATA {
            return Err(ParseError::InvalidPacketMax {
                got: length,
                max: ART_COMMAND_MAX_DATA,
            });
        }
        let available = (b.len() - base).min(length);
        Ok(Self {
            esta_manufacturer: [b[12], b[13]],
            data: read_string(&b[base..base + available]),
        })
    }
}
