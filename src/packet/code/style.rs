//! Equipment style codes reported in ArtPollReply.

use std::fmt;

/// The equipment style of an Art-Net device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Style {
    /// A DMX to/from Art-Net device (gateway).
    #[default]
    Node = 0x00,
    /// A lighting console.
    Controller = 0x01,
    /// A media server.
    Media = 0x02,
    /// A network routing device.
    Route = 0x03,
    /// A backup device.
    Backup = 0x04,
    /// A configuration or diagnostic tool.
    Config = 0x05,
    /// A visualiser.
    Visual = 0x06,
}

impl Style {
    /// Looks up a wire value in the published style table.
    pub fn from_u8(value: u8) -> Option<Style> {
        let style = match value {
            0x00 => Style::Node,
            0x01 => Style::Controller,
            0x02 => Style::Media,
            0x03 => Style::Route,
            0x04 => Style::Backup,
            0x05 => Style::Config,
            0x06 => Style::Visual,
            _ => return None,
        };
        Some(style)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Style::Node => "Node",
            Style::Controller => "Controller",
            Style::Media => "Media",
            Style::Route => "Route",
            Style::Backup => "Backup",
            Style::Config => "Config",
            Style::Visual => "Visual",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_round_trip() {
        for value in 0x00..=0x06 {
            let style = Style::from_u8(value).unwrap();
            assert_eq!(style as u8, value);
        }
    }

    #[test]
    fn test_style_rejects_unknown() {
        assert_eq!(Style::from_u8(0x07), None);
        assert_eq!(Style::from_u8(0xff), None);
    }
}
