//! The ArtPoll behaviour flags byte.

use std::fmt;

/// Behaviour requested of the polled devices. Only bits 1-4 are defined;
/// the rest are preserved as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TalkToMe(pub u8);

impl TalkToMe {
    const REPLY_ON_CHANGE: u8 = 1 << 1;
    const DIAGNOSTICS: u8 = 1 << 2;
    const DIAG_UNICAST: u8 = 1 << 3;
    const VLC: u8 = 1 << 4;

    fn with_bit(self, mask: u8, enable: bool) -> Self {
        if enable {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Ask devices to send an ArtPollReply whenever their state changes,
    /// without waiting for the next poll.
    pub fn with_reply_on_change(self, enable: bool) -> Self {
        self.with_bit(Self::REPLY_ON_CHANGE, enable)
    }

    /// Whether devices should reply on state changes.
    pub fn reply_on_change(self) -> bool {
        self.0 & Self::REPLY_ON_CHANGE != 0
    }

    /// Ask devices to send diagnostics messages.
    pub fn with_diagnostics(self, enable: bool) -> Self {
        self.with_bit(Self::DIAGNOSTICS, enable)
    }

    /// Whether devices should send diagnostics messages.
    pub fn diagnostics(self) -> bool {
        self.0 & Self::DIAGNOSTICS != 0
    }

    /// Ask for diagnostics messages to be unicast instead of broadcast.
    pub fn with_diag_unicast(self, enable: bool) -> Self {
        self.with_bit(Self::DIAG_UNICAST, enable)
    }

    /// Whether diagnostics messages are unicast.
    pub fn diag_unicast(self) -> bool {
        self.0 & Self::DIAG_UNICAST != 0
    }

    /// Enable or disable VLC transmission.
    pub fn with_vlc(self, enable: bool) -> Self {
        self.with_bit(Self::VLC, enable)
    }

    /// Whether VLC transmission is enabled.
    pub fn vlc(self) -> bool {
        self.0 & Self::VLC != 0
    }
}

impl fmt::Display for TalkToMe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reply on change: {}, diagnostics: {} (unicast: {}), vlc: {}",
            self.reply_on_change(),
            self.diagnostics(),
            self.diag_unicast(),
            self.vlc()
        )
    }
}
