//! ArtNzs: non-zero start code DMX512 data.

use crate::types::{DmxData, PortAddress, DMX_CHANNELS};

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};

const ART_NZS_HEADER: usize = HEADER_LENGTH + 6;

/// DMX512 data with a non-zero start code (except RDM) for a single
/// universe. Layout matches ArtDmx apart from the start code replacing
/// the physical-port byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtNzs {
    /// Resequencing counter, 0 disables sequencing.
    pub sequence: u8,
    /// The DMX512 start code. Must not be zero or the RDM start code.
    pub start_code: u8,
    /// The destination universe.
    pub address: PortAddress,
    /// Number of encoded channels, 1..=512.
    pub length: u16,
    /// Channel data; only the first `length` bytes are meaningful.
    pub data: DmxData,
}

impl Default for ArtNzs {
    fn default() -> Self {
        Self {
            sequence: 0,
            start_code: 0,
            address: PortAddress::default(),
            length: DMX_CHANNELS as u16,
            data: [0; DMX_CHANNELS],
        }
    }
}

impl ArtNzs {
    /// Encodes the packet into its wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let len = (self.length as usize).min(DMX_CHANNELS);
        let mut buf = Vec::with_capacity(ART_NZS_HEADER + len);
        write_header(&mut buf, OpCode::Nzs);
        buf.push(self.sequence);
        buf.push(self.start_code);
        buf.push(self.address.sub_uni);
        buf.push(self.address.net);
        buf.extend_from_slice(&self.length.to_be_bytes());
        buf.extend_from_slice(&self.data[..len]);
        buf
    }

    /// Decodes an ArtNzs from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Nzs)?;
        if b.len() < ART_NZS_HEADER {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }

        let length = u16::from_be_bytes([b[16], b[17]]);
        if !(1..=DMX_CHANNELS as u16).contains(&length) {
            return Err(ParseError::InvalidPacketBoundary(length));
        }

        let mut data = [0u8; DMX_CHANNELS];
        let available = (b.len() - ART_NZS_HEADER).min(length as usize);
        data[..available].copy_from_slice(&b[ART_NZS_HEADER..ART_NZS_HEADER + available]);

        Ok(Self {
            sequence: b[12],
            start_code: b[13],
            address: PortAddress::new(b[15], b[14]),
            length,
            data,
        })
    }
}
