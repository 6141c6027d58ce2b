//! The per-channel port descriptor byte of ArtPollReply.

use std::fmt;

/// The link-layer protocol carried by a port, encoded in the low six bits
/// of [`PortType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PortProtocol {
    /// DMX512 serial data.
    #[default]
    Dmx512 = 0,
    /// MIDI.
    Midi = 1,
    /// Avab.
    Avab = 2,
    /// Colortran CMX.
    ColortranCmx = 3,
    /// ADB 62.5.
    Adb62_5 = 4,
    /// Art-Net (routed onwards).
    ArtNet = 5,
}

impl PortProtocol {
    /// Looks up a protocol tag; values above 5 are not defined.
    pub fn from_u8(value: u8) -> Option<PortProtocol> {
        let protocol = match value {
            0 => PortProtocol::Dmx512,
            1 => PortProtocol::Midi,
            2 => PortProtocol::Avab,
            3 => PortProtocol::ColortranCmx,
            4 => PortProtocol::Adb62_5,
            5 => PortProtocol::ArtNet,
            _ => return None,
        };
        Some(protocol)
    }
}

impl fmt::Display for PortProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortProtocol::Dmx512 => "DMX512",
            PortProtocol::Midi => "MIDI",
            PortProtocol::Avab => "Avab",
            PortProtocol::ColortranCmx => "Colortran CMX",
            PortProtocol::Adb62_5 => "ADB 62.5",
            PortProtocol::ArtNet => "Art-Net",
        };
        f.write_str(name)
    }
}

/// Describes the operation and protocol of one node channel.
///
/// A product with 4 inputs and 4 outputs reports `0xc0` four times. The
/// array in the reply is fixed length, independent of how many ports the
/// node physically has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PortType(pub u8);

impl PortType {
    const INPUT: u8 = 1 << 6;
    const OUTPUT: u8 = 1 << 7;
    const PROTOCOL_MASK: u8 = 0x3f;

    /// Set whether this channel can input onto the Art-Net network.
    pub fn with_input(self, enable: bool) -> Self {
        if enable {
            Self(self.0 | Self::INPUT)
        } else {
            Self(self.0 & !Self::INPUT)
        }
    }

    /// Whether this channel can input onto the Art-Net network.
    pub fn input(self) -> bool {
        self.0 & Self::INPUT != 0
    }

    /// Set whether this channel can output from the Art-Net network.
    pub fn with_output(self, enable: bool) -> Self {
        if enable {
            Self(self.0 | Self::OUTPUT)
        } else {
            Self(self.0 & !Self::OUTPUT)
        }
    }

    /// Whether this channel can output from the Art-Net network.
    pub fn output(self) -> bool {
        self.0 & Self::OUTPUT != 0
    }

    /// Set the protocol tag, leaving the direction bits untouched.
    pub fn with_protocol(self, protocol: PortProtocol) -> Self {
        Self((self.0 & !Self::PROTOCOL_MASK) | protocol as u8)
    }

    /// The protocol tag, or `None` for values outside the published table.
    pub fn protocol(self) -> Option<PortProtocol> {
        PortProtocol::from_u8(self.0 & Self::PROTOCOL_MASK)
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol() {
            Some(p) => write!(f, "{} (input: {}, output: {})", p, self.input(), self.output()),
            None => write!(f, "unknown protocol 0x{:02x}", self.0 & Self::PROTOCOL_MASK),
        }
    }
}
