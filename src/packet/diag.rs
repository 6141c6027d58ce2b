//! ArtDiagData: diagnostics messages.

use super::code::{OpCode, Priority};
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};
use super::read_string;

const ART_DIAG_MAX_DATA: usize = 512;

/// A diagnostics message for display. The ArtPoll packet defines whether
/// these are unicast or broadcast and the minimum priority of interest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtDiagData {
    /// Priority of this message.
    pub priority: Priority,
    /// The message text. At most 511 characters; a terminating NUL is
    /// added on the wire.
    pub data: String,
}

impl ArtDiagData {
    /// Encodes the packet into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let text = self.data.as_bytes();
        let len = text.len().min(ART_DIAG_MAX_DATA - 1);
        let mut buf = Vec::with_capacity(HEADER_LENGTH + 6 + len + 1);
        write_header(&mut buf, OpCode::DiagData);
        buf.push(0); // filler
        buf.push(self.priority.0);
        buf.extend_from_slice(&[0; 2]); // filler
        buf.extend_from_slice(&((len + 1) as u16).to_be_bytes());
        buf.extend_from_slice(&text[..len]);
        buf.push(0);
        buf
    }

    /// Decodes an ArtDiagData from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::DiagData)?;
        let base = HEADER_LENGTH + 6;
        if b.len() < base {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        let length = u16::from_be_bytes([b[16], b[17]]) as usize;
        if length > ART_DIAG_MAX_DATA {
            return Err(ParseError::InvalidPacketMax {
                got: length,
                max: ART_DIAG_MAX_DATA,
            });
        }
        let available = (b.len() - base).min(length);
        Ok(Self {
            priority: Priority(b[13]),
            data: read_string(&b[base..base + available]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let p = ArtDiagData {
            priority: Priority::HIGH,
            data: "output 2 short detected".into(),
        };
        assert_eq!(ArtDiagData::unmarshal(&p.marshal()).unwrap(), p);
    }
}
