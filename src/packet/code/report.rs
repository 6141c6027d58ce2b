//! Node-report status codes.

use std::fmt;

/// Generic error, advisory and status codes for the textual node report.
///
/// A report string conventionally starts with `#xxxx`, the hex form of one
/// of these codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum ReportCode {
    /// Booted in debug mode (only used in development).
    Debug = 0x0000,
    /// Power-on tests successful.
    #[default]
    PowerOk = 0x0001,
    /// Hardware tests failed at power on.
    PowerFail = 0x0002,
    /// Last UDP from the node failed due to truncated length.
    SocketWr1 = 0x0003,
    /// Unable to identify last UDP transmission.
    ParseFail = 0x0004,
    /// Unable to open a UDP socket in the last transmission attempt.
    UdpFail = 0x0005,
    /// Short name programming via ArtAddress succeeded.
    ShortNameOk = 0x0006,
    /// Long name programming via ArtAddress succeeded.
    LongNameOk = 0x0007,
    /// DMX512 receive errors detected.
    DmxError = 0x0008,
    /// Ran out of internal DMX transmit buffers.
    DmxUdpFull = 0x0009,
    /// Ran out of internal DMX receive buffers.
    DmxRxFull = 0x000a,
    /// Receive universe switches conflict.
    SwitchErr = 0x000b,
    /// Product configuration does not match firmware.
    ConfigErr = 0x000c,
    /// DMX output short detected.
    DmxShort = 0x000d,
    /// Last firmware upload attempt failed.
    FirmwareFail = 0x000e,
    /// Switch settings changed while locked by remote programming.
    UserFail = 0x000f,
    /// A factory reset has occurred.
    FactoryRes = 0x0010,
}

impl ReportCode {
    /// Formats a node report string for this code with a free-text tail,
    /// e.g. `"#0001 [0] Power On Tests successful"`.
    pub fn report(self, counter: u32, text: &str) -> String {
        format!("#{:04x} [{}] {}", self as u16, counter, text)
    }
}

impl fmt::Display for ReportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:04x}", *self as u16)
    }
}
