//! ArtTimeCode: time code transport.

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};

const ART_TIME_CODE_LENGTH: usize = 19;

/// Time code transported over the network, compatible with both
/// longitudinal and MIDI time code. Usually broadcast by a single
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtTimeCode {
    /// Frames time, 0-29 depending on mode.
    pub frames: u8,
    /// Seconds, 0-59.
    pub seconds: u8,
    /// Minutes, 0-59.
    pub minutes: u8,
    /// Hours, 0-23.
    pub hours: u8,
    /// Source type: 0 = Film (24 fps), 1 = EBU (25 fps),
    /// 2 = DF (29.97 fps), 3 = SMPTE (30 fps).
    pub kind: u8,
}

impl ArtTimeCode {
    /// Encodes the packet into its 19-byte wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ART_TIME_CODE_LENGTH);
        write_header(&mut buf, OpCode::TimeCode);
        buf.extend_from_slice(&[0; 2]); // filler
        buf.push(self.frames);
        buf.push(self.seconds);
        buf.push(self.minutes);
        buf.push(self.hours);
        buf.push(self.kind);
        buf
    }

    /// Decodes an ArtTimeCode from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::TimeCode)?;
        if b.len() < ART_TIME_CODE_LENGTH {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        let base = HEADER_LENGTH + 2;
        Ok(Self {
            frames: b[base],
            seconds: b[base + 1],
            minutes: b[base + 2],
            hours: b[base + 3],
            kind: b[base + 4],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let p = ArtTimeCode {
            frames: 24,
            seconds: 59,
            minutes: 30,
            hours: 23,
            kind: 3,
        };
        let b = p.marshal();
        assert_eq!(b.len(), 19);
        assert_eq!(ArtTimeCode::unmarshal(&b).unwrap(), p);
    }
}
