//! ArtPollReply: the discovery response.

use std::net::Ipv4Addr;

use super::code::{
    GoodInput, GoodOutput, OpCode, PortType, Status1, Status2, Status3, Style, SwMacro, SwRemote,
};
use super::error::ParseError;
use super::header::{write_short_header, ARTNET_MAGIC};
use super::{read_string, write_padded_string, ARTNET_PORT};

/// Smallest reply on the wire: everything up to and including the MAC.
const ART_POLL_REPLY_MIN: usize = 207;

/// Full reply including the backward-compatible tail.
const ART_POLL_REPLY_MAX: usize = 239;

/// The discovery response, broadcast by every device in answer to an
/// ArtPoll (and on power up).
///
/// This is the only packet without a protocol version slot: the IP
/// address follows the opcode directly, a layout kept for compatibility
/// with implementations predating the versioned header. The packet grew
/// over protocol revisions from 207 to 239 bytes; the trailing 32 bytes
/// are decoded when present and transmitted always.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPollReply {
    /// The device's IPv4 address. Bound sub-devices may share the root
    /// device's IP, distinguished by `bind_index`.
    pub ip_address: Ipv4Addr,
    /// Always 6454. Transmitted low byte first, but noncompliant senders
    /// are tolerated on decode.
    pub port: u16,
    /// Firmware revision, higher is newer.
    pub version_info: u16,
    /// Bits 14-8 of the device's base Port-Address.
    pub net_switch: u8,
    /// Bits 7-4 of the device's base Port-Address, in the low nibble.
    pub sub_switch: u8,
    /// The OEM product code.
    pub oem: u16,
    /// Firmware version of the User Bios Extension Area, 0 if absent.
    pub ubea_version: u8,
    /// General status register.
    pub status1: Status1,
    /// ESTA manufacturer code, two ASCII bytes.
    pub esta_manufacturer: [u8; 2],
    /// Short device name, up to 17 characters.
    pub short_name: String,
    /// Long device name, up to 63 characters.
    pub long_name: String,
    /// Textual report of operating status, up to 63 characters.
    pub node_report: String,
    /// Number of implemented ports; the larger of the input and output
    /// counts, at most 4.
    pub num_ports: u16,
    /// Operation and protocol of each channel.
    pub port_types: [PortType; 4],
    /// Input status of each channel.
    pub good_input: [GoodInput; 4],
    /// Output status of each channel.
    pub good_output: [GoodOutput; 4],
    /// Bits 3-0 of each input port's Port-Address, in the low nibble.
    pub sw_in: [u8; 4],
    /// Bits 3-0 of each output port's Port-Address, in the low nibble.
    pub sw_out: [u8; 4],
    /// Deprecated video display switch.
    pub sw_video: u8,
    /// Macro key trigger state.
    pub sw_macro: SwMacro,
    /// Remote trigger state.
    pub sw_remote: SwRemote,
    /// Equipment style.
    pub style: Style,
    /// MAC address, zero if the device cannot supply it.
    pub mac_address: [u8; 6],
    /// IP of the root device when this device is part of a larger
    /// product.
    pub bind_ip: Ipv4Addr,
    /// Order of bound devices; 1 is the root.
    pub bind_index: u8,
    /// Product capability register.
    pub status2: Status2,
    /// Supplementary output status of each channel.
    pub good_output_b: [u8; 4],
    /// General product state register.
    pub status3: Status3,
    /// RDMnet default responder UID.
    pub default_responder_uid: [u8; 6],
    /// Available for user-specific data.
    pub user: u16,
    /// Maximum refresh rate supported on the device's outputs.
    pub refresh_rate: u16,
}

impl Default for ArtPollReply {
    fn default() -> Self {
        Self {
            ip_address: Ipv4Addr::UNSPECIFIED,
            port: ARTNET_PORT,
            version_info: 0,
            net_switch: 0,
            sub_switch: 0,
            oem: 0,
            ubea_version: 0,
            status1: Status1::default(),
            esta_manufacturer: [0; 2],
            short_name: String::new(),
            long_name: String::new(),
            node_report: String::new(),
            num_ports: 0,
            port_types: [PortType::default(); 4],
            good_input: [GoodInput::default(); 4],
            good_output: [GoodOutput::default(); 4],
            sw_in: [0; 4],
            sw_out: [0; 4],
            sw_video: 0,
            sw_macro: SwMacro::default(),
            sw_remote: SwRemote::default(),
            style: Style::Node,
            mac_address: [0; 6],
            bind_ip: Ipv4Addr::UNSPECIFIED,
            bind_index: 0,
            status2: Status2::default(),
            good_output_b: [0; 4],
            status3: Status3::default(),
            default_responder_uid: [0; 6],
            user: 0,
            refresh_rate: 0,
        }
    }
}

impl ArtPollReply {
    /// Encodes the packet into its full 239-byte wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ART_POLL_REPLY_MAX);
        write_short_header(&mut buf, OpCode::PollReply);
        buf.extend_from_slice(&self.ip_address.octets());
        buf.extend_from_slice(&self.port.to_le_bytes());
        buf.extend_from_slice(&self.version_info.to_be_bytes());
        buf.push(self.net_switch);
        buf.push(self.sub_switch);
        buf.extend_from_slice(&self.oem.to_be_bytes());
        buf.push(self.ubea_version);
        buf.push(self.status1.0);
        buf.extend_from_slice(&self.esta_manufacturer);
        write_padded_string(&mut buf, &self.short_name, 18);
        write_padded_string(&mut buf, &self.long_name, 64);
        write_padded_string(&mut buf, &self.node_report, 64);
        buf.extend_from_slice(&self.num_ports.to_be_bytes());
        buf.extend(self.port_types.iter().map(|t| t.0));
        buf.extend(self.good_input.iter().map(|g| g.0));
        buf.extend(self.good_output.iter().map(|g| g.0));
        buf.extend_from_slice(&self.sw_in);
        buf.extend_from_slice(&self.sw_out);
        buf.push(self.sw_video);
        buf.push(self.sw_macro.0);
        buf.push(self.sw_remote.0);
        buf.extend_from_slice(&[0; 3]); // spare
        buf.push(self.style as u8);
        buf.extend_from_slice(&self.mac_address);
        buf.extend_from_slice(&self.bind_ip.octets());
        buf.push(self.bind_index);
        buf.push(self.status2.0);
        buf.extend_from_slice(&self.good_output_b);
        buf.push(self.status3.0);
        buf.extend_from_slice(&self.default_responder_uid);
        buf.extend_from_slice(&self.user.to_be_bytes());
        buf.extend_from_slice(&self.refresh_rate.to_be_bytes());
        buf.resize(ART_POLL_REPLY_MAX, 0); // filler
        buf
    }

    /// Decodes an ArtPollReply from its wire form.
    ///
    /// Any length between the original 207-byte form and the current
    /// 239-byte form is accepted; short packets are zero-padded before
    /// decoding so absent tail fields read as zero.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        if b.len() < ART_POLL_REPLY_MIN {
            return Err(ParseError::InvalidPacketMin {
                got: b.len(),
                min: ART_POLL_REPLY_MIN,
            });
        }
        if b.len() > ART_POLL_REPLY_MAX {
            return Err(ParseError::InvalidPacketMax {
                got: b.len(),
                max: ART_POLL_REPLY_MAX,
            });
        }
        if b[0..8] != ARTNET_MAGIC {
            return Err(ParseError::InvalidMagic);
        }
        let raw_opcode = u16::from_le_bytes([b[8], b[9]]);
        if raw_opcode != OpCode::PollReply as u16 {
            return Err(ParseError::InvalidOpCode(raw_opcode));
        }

        let mut padded = [0u8; ART_POLL_REPLY_MAX];
        padded[..b.len()].copy_from_slice(b);
        let b = &padded[..];

        // Compliant senders put the low byte first; tolerate the
        // opposite order before giving up.
        let port = u16::from_le_bytes([b[14], b[15]]);
        let port = if port == ARTNET_PORT {
            port
        } else {
            let swapped = u16::from_be_bytes([b[14], b[15]]);
            if swapped != ARTNET_PORT {
                return Err(ParseError::InvalidPort(port));
            }
            swapped
        };

        let style = Style::from_u8(b[200]).ok_or(ParseError::InvalidStyle(b[200]))?;

        let mut reply = ArtPollReply {
            ip_address: Ipv4Addr::new(b[10], b[11], b[12], b[13]),
            port,
            version_info: u16::from_be_bytes([b[16], b[17]]),
            net_switch: b[18],
            sub_switch: b[19],
            oem: u16::from_be_bytes([b[20], b[21]]),
            ubea_version: b[22],
            status1: Status1(b[23]),
            esta_manufacturer: [b[24], b[25]],
            short_name: read_string(&b[26..44]),
            long_name: read_string(&b[44..108]),
            node_report: read_string(&b[108..172]),
            num_ports: u16::from_be_bytes([b[172], b[173]]),
            port_types: [PortType(b[174]), PortType(b[175]), PortType(b[176]), PortType(b[177])],
            good_input: [
                GoodInput(b[178]),
                GoodInput(b[179]),
                GoodInput(b[180]),
                GoodInput(b[181]),
            ],
            good_output: [
                GoodOutput(b[182]),
                GoodOutput(b[183]),
                GoodOutput(b[184]),
                GoodOutput(b[185]),
            ],
            sw_in: [b[186], b[187], b[188], b[189]],
            sw_out: [b[190], b[191], b[192], b[193]],
            sw_video: b[194],
            sw_macro: SwMacro(b[195]),
            sw_remote: SwRemote(b[196]),
            style,
            mac_address: [0; 6],
            bind_ip: Ipv4Addr::new(b[207], b[208], b[209], b[210]),
            bind_index: b[211],
            status2: Status2(b[212]),
            good_output_b: [b[213], b[214], b[215], b[216]],
            status3: Status3(b[217]),
            default_responder_uid: [0; 6],
            user: u16::from_be_bytes([b[224], b[225]]),
            refresh_rate: u16::from_be_bytes([b[226], b[227]]),
        };
        reply.mac_address.copy_from_slice(&b[201..207]);
        reply.default_responder_uid.copy_from_slice(&b[218..224]);
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::code::PortProtocol;

    fn sample_reply() -> ArtPollReply {
        ArtPollReply {
            ip_address: Ipv4Addr::new(2, 0, 0, 20),
            version_info: 0x0123,
            net_switch: 1,
            sub_switch: 2,
            oem: 0x1234,
            status1: Status1::default().with_rdm(true),
            esta_manufacturer: *b"AL",
            short_name: "baraddur".into(),
            long_name: "the dark tower".into(),
            node_report: "#0001 [0] up".into(),
            num_ports: 2,
            port_types: [
                PortType::default()
                    .with_output(true)
                    .with_protocol(PortProtocol::Dmx512),
                PortType::default()
                    .with_output(true)
                    .with_protocol(PortProtocol::Dmx512),
                PortType::default(),
                PortType::default(),
            ],
            sw_out: [0x03, 0x04, 0, 0],
            style: Style::Controller,
            mac_address: [0xde, 0xad, 0xbe, 0xef, 0x00, 0x01],
            bind_ip: Ipv4Addr::new(2, 0, 0, 20),
            bind_index: 1,
            status2: Status2::default().with_port15(true),
            refresh_rate: 44,
            ..ArtPollReply::default()
        }
    }

    #[test]
    fn test_marshal_length_and_header() {
        let b = sample_reply().marshal();
        assert_eq!(b.len(), 239);
        assert_eq!(&b[0..8], b"Art-Net\0");
        // opcode low byte first, no version slot: IP follows directly
        assert_eq!(&b[8..10], &[0x00, 0x21]);
        assert_eq!(&b[10..14], &[2, 0, 0, 20]);
        // port 6454 = 0x1936, low byte first
        assert_eq!(&b[14..16], &[0x36, 0x19]);
    }

    #[test]
    fn test_round_trip_byte_exact() {
        let reply = sample_reply();
        let b = reply.marshal();
        let decoded = ArtPollReply::unmarshal(&b).unwrap();
        assert_eq!(decoded, reply);
        assert_eq!(decoded.marshal(), b);
    }

    #[test]
    fn test_short_packet_zero_padded() {
        let reply = sample_reply();
        let b = reply.marshal();
        // the original 207-byte form: tail fields decode as zero
        let decoded = ArtPollReply::unmarshal(&b[..207]).unwrap();
        assert_eq!(decoded.short_name, "baraddur");
        assert_eq!(decoded.style, Style::Controller);
        assert_eq!(decoded.bind_ip, Ipv4Addr::UNSPECIFIED);
        assert_eq!(decoded.bind_index, 0);
        assert_eq!(decoded.refresh_rate, 0);
    }

    #[test]
    fn test_every_length_in_window_decodes() {
        let b = sample_reply().marshal();
        for len in 207..=239 {
            assert!(ArtPollReply::unmarshal(&b[..len]).is_ok(), "len {}", len);
        }
    }

    #[test]
    fn test_length_bounds() {
        let b = sample_reply().marshal();
        assert_eq!(
            ArtPollReply::unmarshal(&b[..206]),
            Err(ParseError::InvalidPacketMin { got: 206, min: 207 })
        );
        let mut long = b.clone();
        long.push(0);
        assert_eq!(
            ArtPollReply::unmarshal(&long),
            Err(ParseError::InvalidPacketMax { got: 240, max: 239 })
        );
    }

    #[test]
    fn test_port_accepts_either_byte_order() {
        let mut b = sample_reply().marshal();
        b[14] = 0x19;
        b[15] = 0x36;
        let decoded = ArtPollReply::unmarshal(&b).unwrap();
        assert_eq!(decoded.port, 6454);
    }

    #[test]
    fn test_port_rejects_other_values() {
        let mut b = sample_reply().marshal();
        b[14] = 0x34;
        b[15] = 0x12;
        assert!(matches!(
            ArtPollReply::unmarshal(&b),
            Err(ParseError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_style() {
        let mut b = sample_reply().marshal();
        b[200] = 0x42;
        assert_eq!(
            ArtPollReply::unmarshal(&b),
            Err(ParseError::InvalidStyle(0x42))
        );
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let mut b = sample_reply().marshal();
        b[7] = b'!';
        assert_eq!(ArtPollReply::unmarshal(&b), Err(ParseError::InvalidMagic));
    }

    #[test]
    fn test_names_truncate_at_nul() {
        let mut b = sample_reply().marshal();
        // inject a NUL mid-name
        b[26 + 4] = 0;
        let decoded = ArtPollReply::unmarshal(&b).unwrap();
        assert_eq!(decoded.short_name, "bara");
    }
}
