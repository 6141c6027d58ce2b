//! ArtAddress: remote programming of a node's address settings.

use super::code::OpCode;
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};
use super::{read_string, write_padded_string};

const ART_ADDRESS_LENGTH: usize = HEADER_LENGTH + 2 + 18 + 64 + 8 + 3;

/// Reprograms a node's names and Port-Addresses remotely.
///
/// Unicast by a controller to a node's IP address; the node answers by
/// broadcasting an ArtPollReply. Address fields use a value of `0x00` to
/// mean "no change" in the high bit; the raw bytes are carried here
/// unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtAddress {
    /// Bits 14-8 of the Port-Address to program.
    pub net_switch: u8,
    /// The bound node this packet targets; 1 is the root device.
    pub bind_index: u8,
    /// Short name to program, up to 17 characters.
    pub short_name: String,
    /// Long name to program, up to 63 characters.
    pub long_name: String,
    /// Low nibbles of the four input port addresses.
    pub sw_in: [u8; 4],
    /// Low nibbles of the four output port addresses.
    pub sw_out: [u8; 4],
    /// Bits 7-4 of the Port-Address to program, in the low nibble.
    pub sub_switch: u8,
    /// Deprecated video display switch.
    pub sw_video: u8,
    /// Node configuration command.
    pub command: u8,
}

impl ArtAddress {
    /// Encodes the packet into its 107-byte wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ART_ADDRESS_LENGTH);
        write_header(&mut buf, OpCode::Address);
        buf.push(self.net_switch);
        buf.push(self.bind_index);
        write_padded_string(&mut buf, &self.short_name, 18);
        write_padded_string(&mut buf, &self.long_name, 64);
        buf.extend_from_slice(&self.sw_in);
        buf.extend_from_slice(&self.sw_out);
        buf.push(self.sub_switch);
        buf.push(self.sw_video);
        buf.push(self.command);
        buf
    }

    /// Decodes an ArtAddress from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Address)?;
        if b.len() < ART_ADDRESS_LENGTH {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        let mut sw_in = [0u8; 4];
        sw_in.copy_from_slice(&b[96..100]);
        let mut sw_out = [0u8; 4];
        sw_out.copy_from_slice(&b[100..104]);
        Ok(Self {
            net_switch: b[12],
            bind_index: b[13],
            short_name: read_string(&b[14..32]),
            long_name: read_string(&b[32..96]),
            sw_in,
            sw_out,
            sub_switch: b[104],
            sw_video: b[105],
            command: b[106],
        })
    }
}
