//! Typed view of an Art-Net device and its ArtPollReply conversion.
//!
//! A [`NodeConfig`] describes one bound device: identity, network
//! parameters, status registers and up to four input and four output
//! ports. The conversion to and from ArtPollReply is lossy by protocol
//! design (the reply does not carry every configuration field), but every
//! field the reply does carry is copied faithfully in both directions.

use std::net::Ipv4Addr;

use crate::packet::code::{
    GoodInput, GoodOutput, PortType, ReportCode, Status1, Status2, Status3, Style,
};
use crate::packet::{ArtPollReply, ARTNET_PORT};
use crate::types::{BindIndex, PortAddress};

/// Errors detected when validating a [`NodeConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// More than four input ports were configured.
    #[error("more than 4 input ports configured ({0}), not supported by the protocol")]
    TooManyInputPorts(usize),

    /// More than four output ports were configured.
    #[error("more than 4 output ports configured ({0}), not supported by the protocol")]
    TooManyOutputPorts(usize),

    /// The input and output port at one index carry different protocols.
    #[error("input port {index} carries a different protocol than output port {index}; \
             ports sharing an index must agree")]
    PortProtocolMismatch {
        /// The conflicting port index.
        index: usize,
    },
}

/// An input port advertised by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputPort {
    /// The port's effective Port-Address.
    pub address: PortAddress,
    /// Direction bits and protocol tag.
    pub kind: PortType,
    /// Input status bits.
    pub status: GoodInput,
}

/// An output port owned by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputPort {
    /// The port's effective Port-Address.
    pub address: PortAddress,
    /// Direction bits and protocol tag.
    pub kind: PortType,
    /// Output status bits.
    pub status: GoodOutput,
}

/// The capabilities and state of a single bound device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// OEM product code.
    pub oem: u16,
    /// Firmware revision.
    pub version: u16,
    /// User Bios Extension Area version, 0 if absent.
    pub bios_version: u8,
    /// ESTA manufacturer code, two ASCII characters.
    pub manufacturer: String,
    /// Equipment style.
    pub style: Style,
    /// Short name, up to 17 characters.
    pub name: String,
    /// Long name, up to 63 characters.
    pub description: String,
    /// Textual node report, conventionally `#xxxx [count] text` as
    /// produced by [`ReportCode::report`]. Reports received from remote
    /// devices are carried opaquely.
    pub report: String,

    /// MAC address, zero when unknown.
    pub ethernet: [u8; 6],
    /// The device's IPv4 address.
    pub ip: Ipv4Addr,
    /// IP of the root device for modular products.
    pub bind_ip: Ipv4Addr,
    /// Order of bound devices; 1 is the root.
    pub bind_index: BindIndex,
    /// UDP port, always 6454.
    pub port: u16,

    /// General status register.
    pub status1: Status1,
    /// Product capability register.
    pub status2: Status2,
    /// General product state register.
    pub status3: Status3,

    /// Base Port-Address; per-port addresses share its net and sub-net.
    pub base_address: PortAddress,
    /// Advertised input ports, at most 4.
    pub input_ports: Vec<InputPort>,
    /// Owned output ports, at most 4.
    pub output_ports: Vec<OutputPort>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            oem: 0,
            version: 0,
            bios_version: 0,
            manufacturer: String::new(),
            style: Style::Node,
            name: String::new(),
            description: String::new(),
            report: ReportCode::PowerOk.report(0, "Power On Tests successful"),
            ethernet: [0; 6],
            ip: Ipv4Addr::UNSPECIFIED,
            bind_ip: Ipv4Addr::UNSPECIFIED,
            bind_index: 0,
            port: ARTNET_PORT,
            status1: Status1::default(),
            status2: Status2::default(),
            status3: Status3::default(),
            base_address: PortAddress::default(),
            input_ports: Vec::new(),
            output_ports: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Creates a minimal config with the given identity.
    pub fn new(name: impl Into<String>, style: Style, ip: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            style,
            ip,
            ..Self::default()
        }
    }

    /// Checks that the configured ports can be announced on the network.
    ///
    /// At most 4 ports per direction are supported, and when an index has
    /// both an input and an output port their protocol tags must match.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_ports.len() > 4 {
            return Err(ConfigError::TooManyInputPorts(self.input_ports.len()));
        }
        if self.output_ports.len() > 4 {
            return Err(ConfigError::TooManyOutputPorts(self.output_ports.len()));
        }
        for index in 0..self.input_ports.len().min(self.output_ports.len()) {
            let input = self.input_ports[index].kind.0 & 0x3f;
            let output = self.output_ports[index].kind.0 & 0x3f;
            if input != output {
                return Err(ConfigError::PortProtocolMismatch { index });
            }
        }
        Ok(())
    }

    /// The port count reported on the wire: the larger of the input and
    /// output counts. Assumes a validated config.
    pub fn num_ports(&self) -> u16 {
        self.input_ports.len().max(self.output_ports.len()) as u16
    }

    /// Merges the input and output ports into the four per-channel
    /// descriptors of the reply. Assumes a validated config.
    pub fn port_types(&self) -> [PortType; 4] {
        let mut types = [PortType::default(); 4];
        for (i, slot) in types.iter_mut().enumerate() {
            if let Some(port) = self.input_ports.get(i) {
                *slot = PortType(port.kind.0 & 0x3f).with_input(true);
            }
            if let Some(port) = self.output_ports.get(i) {
                *slot = PortType(port.kind.0 & 0x3f)
                    .with_input(slot.input())
                    .with_output(true);
            }
        }
        types
    }

    /// Builds the ArtPollReply announcing this device.
    ///
    /// The config is validated first; an invalid port layout refuses to
    /// encode rather than announcing something other devices would
    /// misroute on.
    pub fn to_poll_reply(&self) -> Result<ArtPollReply, ConfigError> {
        self.validate()?;

        let mut reply = ArtPollReply {
            ip_address: self.ip,
            port: ARTNET_PORT,
            version_info: self.version,
            net_switch: self.base_address.net,
            sub_switch: self.base_address.sub(),
            oem: self.oem,
            ubea_version: self.bios_version,
            status1: self.status1,
            short_name: self.name.clone(),
            long_name: self.description.clone(),
            node_report: self.report.clone(),
            num_ports: self.num_ports(),
            port_types: self.port_types(),
            style: self.style,
            mac_address: self.ethernet,
            bind_ip: self.bind_ip,
            bind_index: self.bind_index,
            status2: self.status2,
            status3: self.status3,
            ..ArtPollReply::default()
        };

        let esta = self.manufacturer.as_bytes();
        for (slot, c) in reply.esta_manufacturer.iter_mut().zip(esta) {
            *slot = *c;
        }
        for (i, port) in self.input_ports.iter().enumerate() {
            reply.good_input[i] = port.status;
            reply.sw_in[i] = port.address.sub_uni & 0x0f;
        }
        for (i, port) in self.output_ports.iter().enumerate() {
            reply.good_output[i] = port.status;
            reply.sw_out[i] = port.address.sub_uni & 0x0f;
        }

        Ok(reply)
    }

    /// Reconstructs a config from a received ArtPollReply.
    ///
    /// Per-port addresses are rebuilt by merging the reply's base address
    /// with each port's low nibble: `base | sw[i]`.
    pub fn from_poll_reply(reply: &ArtPollReply) -> NodeConfig {
        let base_address = PortAddress::new(
            reply.net_switch & 0x7f,
            (reply.sub_switch & 0x0f) << 4,
        );

        let mut config = NodeConfig {
            oem: reply.oem,
            version: reply.version_info,
            bios_version: reply.ubea_version,
            manufacturer: String::from_utf8_lossy(
                &reply.esta_manufacturer[..reply
                    .esta_manufacturer
                    .iter()
                    .position(|&c| c == 0)
                    .unwrap_or(2)],
            )
            .into_owned(),
            style: reply.style,
            name: reply.short_name.clone(),
            description: reply.long_name.clone(),
            report: reply.node_report.clone(),
            ethernet: reply.mac_address,
            ip: reply.ip_address,
            bind_ip: reply.bind_ip,
            bind_index: reply.bind_index,
            port: reply.port,
            status1: reply.status1,
            status2: reply.status2,
            status3: reply.status3,
            base_address,
            input_ports: Vec::new(),
            output_ports: Vec::new(),
        };

        let ports = (reply.num_ports as usize).min(4);
        for i in 0..ports {
            let kind = reply.port_types[i];
            if kind.output() {
                config.output_ports.push(OutputPort {
                    address: PortAddress::new(
                        base_address.net,
                        base_address.sub_uni | (reply.sw_out[i] & 0x0f),
                    ),
                    kind,
                    status: reply.good_output[i],
                });
            }
            if kind.input() {
                config.input_ports.push(InputPort {
                    address: PortAddress::new(
                        base_address.net,
                        base_address.sub_uni | (reply.sw_in[i] & 0x0f),
                    ),
                    kind,
                    status: reply.good_input[i],
                });
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::code::PortProtocol;

    fn dmx_output(address: PortAddress) -> OutputPort {
        OutputPort {
            address,
            kind: PortType::default()
                .with_output(true)
                .with_protocol(PortProtocol::Dmx512),
            status: GoodOutput::default().with_data_transmitted(true),
        }
    }

    fn dmx_input(address: PortAddress) -> InputPort {
        InputPort {
            address,
            kind: PortType::default()
                .with_input(true)
                .with_protocol(PortProtocol::Dmx512),
            status: GoodInput::default(),
        }
    }

    fn sample_config() -> NodeConfig {
        let mut config = NodeConfig::new("gateway-1", Style::Node, Ipv4Addr::new(2, 0, 0, 10));
        config.oem = 0x2a2a;
        config.version = 0x0100;
        config.manufacturer = "AL".into();
        config.description = "two universe gateway".into();
        config.report = ReportCode::DmxError.report(2, "receive errors on input 1");
        config.ethernet = [2, 0, 0, 0, 0, 10];
        config.bind_ip = config.ip;
        config.bind_index = 1;
        config.base_address = PortAddress::from_parts(0, 1, 0);
        config.output_ports = vec![
            dmx_output(PortAddress::from_parts(0, 1, 0)),
            dmx_output(PortAddress::from_parts(0, 1, 1)),
        ];
        config.input_ports = vec![dmx_input(PortAddress::from_parts(0, 1, 0))];
        config
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn test_default_report_is_power_ok() {
        let config = NodeConfig::default();
        assert_eq!(config.report, "#0001 [0] Power On Tests successful");

        // the report rides the reply like every other carried field
        let reply = config.to_poll_reply().unwrap();
        assert_eq!(reply.node_report, config.report);
    }

    #[test]
    fn test_validate_rejects_five_outputs() {
        let mut config = sample_config();
        config.output_ports = (0..5)
            .map(|i| dmx_output(PortAddress::new(0, i)))
            .collect();
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyOutputPorts(5))
        );
    }

    #[test]
    fn test_validate_rejects_five_inputs() {
        let mut config = sample_config();
        config.input_ports = (0..5).map(|i| dmx_input(PortAddress::new(0, i))).collect();
        assert_eq!(config.validate(), Err(ConfigError::TooManyInputPorts(5)));
    }

    #[test]
    fn test_validate_rejects_protocol_mismatch() {
        let mut config = sample_config();
        config.input_ports[0].kind = config.input_ports[0].kind.with_protocol(PortProtocol::Midi);
        assert_eq!(
            config.validate(),
            Err(ConfigError::PortProtocolMismatch { index: 0 })
        );
        assert!(config.to_poll_reply().is_err());
    }

    #[test]
    fn test_num_ports_is_larger_count() {
        let config = sample_config();
        assert_eq!(config.num_ports(), 2);
    }

    #[test]
    fn test_port_types_merge() {
        let types = sample_config().port_types();
        assert!(types[0].input() && types[0].output());
        assert!(!types[1].input() && types[1].output());
        assert_eq!(types[0].protocol(), Some(PortProtocol::Dmx512));
        assert_eq!(types[2], PortType::default());
    }

    #[test]
    fn test_poll_reply_round_trip() {
        let config = sample_config();
        let reply = config.to_poll_reply().unwrap();

        assert_eq!(reply.num_ports, 2);
        assert_eq!(reply.sw_out[0], 0x00);
        assert_eq!(reply.sw_out[1], 0x01);
        assert_eq!(reply.net_switch, 0);
        assert_eq!(reply.sub_switch, 1);

        let decoded = NodeConfig::from_poll_reply(&reply);
        assert_eq!(decoded.name, config.name);
        assert_eq!(decoded.description, config.description);
        assert_eq!(decoded.report, config.report);
        assert_eq!(decoded.manufacturer, config.manufacturer);
        assert_eq!(decoded.oem, config.oem);
        assert_eq!(decoded.version, config.version);
        assert_eq!(decoded.ip, config.ip);
        assert_eq!(decoded.bind_ip, config.bind_ip);
        assert_eq!(decoded.bind_index, config.bind_index);
        assert_eq!(decoded.ethernet, config.ethernet);
        assert_eq!(decoded.style, config.style);
        assert_eq!(decoded.base_address, config.base_address);
        assert_eq!(decoded.output_ports.len(), 2);
        assert_eq!(decoded.input_ports.len(), 1);
        assert_eq!(
            decoded.output_ports[0].address,
            PortAddress::from_parts(0, 1, 0)
        );
        assert_eq!(
            decoded.output_ports[1].address,
            PortAddress::from_parts(0, 1, 1)
        );
        assert_eq!(
            decoded.input_ports[0].address,
            PortAddress::from_parts(0, 1, 0)
        );
    }

    #[test]
    fn test_round_trip_through_wire_form() {
        let config = sample_config();
        let bytes = config.to_poll_reply().unwrap().marshal();
        let reply = ArtPollReply::unmarshal(&bytes).unwrap();
        let decoded = NodeConfig::from_poll_reply(&reply);

        assert_eq!(decoded.name, config.name);
        // the reply carries the merged channel descriptor, so a shared
        // index reads back as bidirectional; addresses, protocols and
        // statuses survive exactly
        for (got, want) in decoded.output_ports.iter().zip(&config.output_ports) {
            assert_eq!(got.address, want.address);
            assert_eq!(got.kind.protocol(), want.kind.protocol());
            assert_eq!(got.status, want.status);
        }
        for (got, want) in decoded.input_ports.iter().zip(&config.input_ports) {
            assert_eq!(got.address, want.address);
            assert_eq!(got.kind.protocol(), want.kind.protocol());
            assert_eq!(got.status, want.status);
        }
        assert!(decoded.output_ports[0].kind.input());
    }
}
