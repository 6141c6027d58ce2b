//! Opcode table for the Art-Net packet family.

use std::fmt;

/// The class of data carried in an Art-Net UDP packet.
///
/// Transmitted low byte first at offset 8 of every packet. The full
/// published table is enumerated here so unsupported packets can be
/// recognized and rejected distinctly from garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum OpCode {
    /// Discovery request, broadcast by controllers.
    Poll = 0x2000,
    /// Discovery response carrying device status.
    PollReply = 0x2100,
    /// Diagnostics and data logging packet.
    DiagData = 0x2300,
    /// Text based parameter commands.
    Command = 0x2400,
    /// Zero start code DMX512 data for a single universe (ArtDmx).
    Dmx = 0x5000,
    /// Non-zero start code DMX512 data for a single universe.
    Nzs = 0x5100,
    /// Forces synchronous transfer of buffered ArtDmx to outputs.
    Sync = 0x5200,
    /// Remote programming of a node's address settings.
    Address = 0x6000,
    /// Enable/disable data for DMX inputs.
    Input = 0x7000,
    /// Requests a Table of Devices for RDM discovery.
    TodRequest = 0x8000,
    /// Carries a Table of Devices for RDM discovery.
    TodData = 0x8100,
    /// RDM discovery control messages.
    TodControl = 0x8200,
    /// Non-discovery RDM messages.
    Rdm = 0x8300,
    /// Compressed RDM sub-device data.
    RdmSub = 0x8400,
    /// Unicast by a media server, acted upon by a controller.
    Media = 0x9000,
    /// Unicast by a controller, acted upon by a media server.
    MediaPatch = 0x9100,
    /// Unicast by a controller, acted upon by a media server.
    MediaControl = 0x9200,
    /// Unicast by a media server, acted upon by a controller.
    MediaControlReply = 0x9300,
    /// Time code transport.
    TimeCode = 0x9700,
    /// Real time date and clock synchronisation.
    TimeSync = 0x9800,
    /// Trigger macros.
    Trigger = 0x9900,
    /// Requests a node's file list.
    Directory = 0x9a00,
    /// Replies to a directory request with a file list.
    DirectoryReply = 0x9b00,
    /// Video screen setup for nodes with extended video features.
    VideoSetup = 0xa010,
    /// Colour palette setup for nodes with extended video features.
    VideoPalette = 0xa020,
    /// Display data for nodes with extended video features.
    VideoData = 0xa040,
    /// Deprecated.
    MacMaster = 0xf000,
    /// Deprecated.
    MacSlave = 0xf100,
    /// Firmware upload to a node.
    FirmwareMaster = 0xf200,
    /// Acknowledges receipt of a firmware or file upload packet.
    FirmwareReply = 0xf300,
    /// Uploads a user file to a node.
    FileTnMaster = 0xf400,
    /// Downloads a user file from a node.
    FileFnMaster = 0xf500,
    /// Server to node acknowledge for download packets.
    FileFnReply = 0xf600,
    /// Remote programming of a node's IP address and mask.
    IpProg = 0xf800,
    /// Acknowledges receipt of an ArtIpProg packet.
    IpProgReply = 0xf900,
}

impl OpCode {
    /// Looks up a wire value in the published opcode table.
    pub fn from_u16(value: u16) -> Option<OpCode> {
        use OpCode::*;
        let op = match value {
            0x2000 => Poll,
            0x2100 => PollReply,
            0x2300 => DiagData,
            0x2400 => Command,
            0x5000 => Dmx,
            0x5100 => Nzs,
            0x5200 => Sync,
            0x6000 => Address,
            0x7000 => Input,
            0x8000 => TodRequest,
            0x8100 => TodData,
            0x8200 => TodControl,
            0x8300 => Rdm,
            0x8400 => RdmSub,
            0x9000 => Media,
            0x9100 => MediaPatch,
            0x9200 => MediaControl,
            0x9300 => MediaControlReply,
            0x9700 => TimeCode,
            0x9800 => TimeSync,
            0x9900 => Trigger,
            0x9a00 => Directory,
            0x9b00 => DirectoryReply,
            0xa010 => VideoSetup,
            0xa020 => VideoPalette,
            0xa040 => VideoData,
            0xf000 => MacMaster,
            0xf100 => MacSlave,
            0xf200 => FirmwareMaster,
            0xf300 => FirmwareReply,
            0xf400 => FileTnMaster,
            0xf500 => FileFnMaster,
            0xf600 => FileFnReply,
            0xf800 => IpProg,
            0xf900 => IpProgReply,
            _ => return None,
        };
        Some(op)
    }

    /// Whether this crate implements a codec for the opcode.
    ///
    /// Recognized but unimplemented opcodes decode to a distinct
    /// "unsupported" error instead of a generic parse failure.
    pub fn is_supported(self) -> bool {
        use OpCode::*;
        matches!(
            self,
            Poll | PollReply
                | DiagData
                | Command
                | Dmx
                | Nzs
                | Sync
                | Address
                | TimeCode
                | Trigger
                | IpProg
                | IpProgReply
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Op{:?} (0x{:04x})", self, *self as u16)
    }
}
