//! ArtDmx: one universe of zero start code DMX512 data.

use crate::types::{DmxData, PortAddress, DMX_CHANNELS};

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};

/// Offset of the channel data within the packet.
const ART_DMX_HEADER: usize = HEADER_LENGTH + 6;

/// The data packet used to transfer DMX512 data for a single universe.
///
/// The format is identical between controllers and nodes. A sender whose
/// input is active but unchanged re-transmits the last frame at roughly
/// one second intervals; receivers keep outputting the last frame they
/// saw in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtDmx {
    /// Resequencing counter, incremented 1-255 by the sender. 0 disables
    /// sequencing.
    pub sequence: u8,
    /// Physical input port the data originated from. Informational only;
    /// routing uses the Port-Address.
    pub physical: u8,
    /// The destination universe.
    pub address: PortAddress,
    /// Number of encoded channels: an even value in 2..=512. Senders
    /// converting to DMX512 conventionally transmit all 512.
    pub length: u16,
    /// Channel data; only the first `length` bytes are meaningful.
    pub data: DmxData,
}

impl Default for ArtDmx {
    fn default() -> Self {
        Self {
            sequence: 0,
            physical: 0,
            address: PortAddress::default(),
            length: DMX_CHANNELS as u16,
            data: [0; DMX_CHANNELS],
        }
    }
}

impl ArtDmx {
    /// Builds a full 512-channel frame for one universe.
    pub fn new(address: PortAddress, data: DmxData, sequence: u8) -> Self {
        Self {
            sequence,
            physical: 0,
            address,
            length: DMX_CHANNELS as u16,
            data,
        }
    }

    /// Encodes the packet into its wire form: an 18-byte header followed
    /// by `length` channel bytes.
    pub fn marshal(&self) -> Vec<u8> {
        let len = (self.length as usize).min(DMX_CHANNELS);
        let mut buf = Vec::with_capacity(ART_DMX_HEADER + len);
        write_header(&mut buf, OpCode::Dmx);
        buf.push(self.sequence);
        buf.push(self.physical);
        buf.push(self.address.sub_uni);
        buf.push(self.address.net);
        buf.extend_from_slice(&self.length.to_be_bytes());
        buf.extend_from_slice(&self.data[..len]);
        buf
    }

    /// Decodes an ArtDmx from its wire form.
    ///
    /// Accepts any even channel count in 2..=512; channels the datagram
    /// does not carry decode as zero.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Dmx)?;
        if b.len() < ART_DMX_HEADER {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }

        let length = u16::from_be_bytes([b[16], b[17]]);
        if length % 2 != 0 || !(2..=DMX_CHANNELS as u16).contains(&length) {
            return Err(ParseError::InvalidPacketBoundary(length));
        }

        let mut data = [0u8; DMX_CHANNELS];
        let available = (b.len() - ART_DMX_HEADER).min(length as usize);
        data[..available].copy_from_slice(&b[ART_DMX_HEADER..ART_DMX_HEADER + available]);

        Ok(Self {
            sequence: b[12],
            physical: b[13],
            address: PortAddress::new(b[15], b[14]),
            length,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_layout() {
        let mut data = [0u8; DMX_CHANNELS];
        data[3] = 0x14;
        let p = ArtDmx::new(PortAddress::new(0x00, 0x07), data, 0xb3);
        let b = p.marshal();

        assert_eq!(b.len(), 530);
        assert_eq!(&b[0..8], b"Art-Net\0");
        assert_eq!(&b[8..10], &[0x00, 0x50]); // opcode low byte first
        assert_eq!(&b[10..12], &[0x00, 0x0e]); // version high byte first
        assert_eq!(b[12], 0xb3); // sequence
        assert_eq!(b[13], 0x00); // physical
        assert_eq!(b[14], 0x07); // sub-uni
        assert_eq!(b[15], 0x00); // net
        assert_eq!(&b[16..18], &[0x02, 0x00]); // length 512, big-endian
        assert_eq!(&b[18..22], &[0x00, 0x00, 0x00, 0x14]);
    }

    #[test]
    fn test_round_trip_full_frame() {
        let mut data = [0u8; DMX_CHANNELS];
        for (i, c) in data.iter_mut().enumerate() {
            *c = (i % 251) as u8;
        }
        let p = ArtDmx::new(PortAddress::new(1, 0x23), data, 0x42);
        let b = p.marshal();
        assert_eq!(ArtDmx::unmarshal(&b).unwrap(), p);
        assert_eq!(ArtDmx::unmarshal(&b).unwrap().marshal(), b);
    }

    #[test]
    fn test_round_trip_short_frame() {
        let mut p = ArtDmx::default();
        p.length = 4;
        p.data[0] = 0xff;
        p.data[3] = 0x80;
        let b = p.marshal();
        assert_eq!(b.len(), 22);
        assert_eq!(ArtDmx::unmarshal(&b).unwrap(), p);
    }

    #[test]
    fn test_rejects_odd_length() {
        let mut b = ArtDmx::default().marshal();
        b[16..18].copy_from_slice(&3u16.to_be_bytes());
        assert_eq!(
            ArtDmx::unmarshal(&b),
            Err(ParseError::InvalidPacketBoundary(3))
        );
    }

    #[test]
    fn test_rejects_out_of_range_length() {
        let mut b = ArtDmx::default().marshal();
        b[16..18].copy_from_slice(&0u16.to_be_bytes());
        assert_eq!(
            ArtDmx::unmarshal(&b),
            Err(ParseError::InvalidPacketBoundary(0))
        );
        b[16..18].copy_from_slice(&514u16.to_be_bytes());
        assert_eq!(
            ArtDmx::unmarshal(&b),
            Err(ParseError::InvalidPacketBoundary(514))
        );
    }

    #[test]
    fn test_missing_channels_decode_as_zero() {
        let p = ArtDmx::default();
        let mut b = p.marshal();
        b.truncate(18 + 100);
        let decoded = ArtDmx::unmarshal(&b).unwrap();
        assert_eq!(decoded.length, 512);
        assert_eq!(decoded.data, [0u8; DMX_CHANNELS]);
    }
}
