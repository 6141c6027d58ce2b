//! ArtTrigger: trigger macros.

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};

const ART_TRIGGER_LENGTH: usize = HEADER_LENGTH + 2 + 2 + 2 + 512;

/// Sends trigger macros to the network, usually broadcast by a single
/// controller.
///
/// When `oem` is 0xffff the key has a generic meaning (0 = ASCII key
/// press, 1 = macro number, 2 = soft key, 3 = show number, with the
/// sub-key carrying the value); otherwise key, sub-key and payload are
/// manufacturer specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtTrigger {
    /// Manufacturer code of the devices that shall accept this trigger.
    pub oem: u16,
    /// The trigger key.
    pub key: u8,
    /// The trigger sub-key.
    pub sub_key: u8,
    /// Payload; interpretation is defined by the key.
    pub data: [u8; 512],
}

impl Default for ArtTrigger {
    fn default() -> Self {
        Self {
            oem: 0,
            key: 0,
            sub_key: 0,
            data: [0; 512],
        }
    }
}

impl ArtTrigger {
    /// Encodes the packet into its 530-byte wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ART_TRIGGER_LENGTH);
        write_header(&mut buf, OpCode::Trigger);
        buf.extend_from_slice(&[0; 2]); // filler
        buf.extend_from_slice(&self.oem.to_be_bytes());
        buf.push(self.key);
        buf.push(self.sub_key);
        buf.extend_from_slice(&self.data);
        buf
    }

    /// Decodes an ArtTrigger from its wire form. A truncated payload
    /// decodes with the missing bytes as zero.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Trigger)?;
        let base = HEADER_LENGTH + 2;
        if b.len() < base + 4 {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        let mut data = [0u8; 512];
        let available = (b.len() - base - 4).min(512);
        data[..available].copy_from_slice(&b[base + 4..base + 4 + available]);
        Ok(Self {
            oem: u16::from_be_bytes([b[base], b[base + 1]]),
            key: b[base + 2],
            sub_key: b[base + 3],
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut p = ArtTrigger {
            oem: 0xffff,
            key: 1,    // macro
            sub_key: 9,
            ..ArtTrigger::default()
        };
        p.data[0] = 0xaa;
        let b = p.marshal();
        assert_eq!(b.len(), 530);
        assert_eq!(ArtTrigger::unmarshal(&b).unwrap(), p);
    }
}
