//! ArtPoll: the discovery request.

use super::code::{OpCode, Priority, TalkToMe};
use super::error::ParseError;
use super::header::{write_header, Header, HEADER_LENGTH};

const ART_POLL_LENGTH: usize = 14;

/// The discovery request, broadcast by controllers.
///
/// Controllers broadcast an ArtPoll to the directed broadcast address
/// every 2.5-3 seconds; all devices (including other controllers) answer
/// with an ArtPollReply. A device that misses several consecutive polls
/// can be considered disconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtPoll {
    /// Behaviour requested of the polled devices.
    pub talk_to_me: TalkToMe,
    /// The lowest priority of diagnostics message that should be sent.
    pub priority: Priority,
}

impl ArtPoll {
    /// Encodes the packet into its 14-byte wire form.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ART_POLL_LENGTH);
        write_header(&mut buf, OpCode::Poll);
        buf.push(self.talk_to_me.0);
        buf.push(self.priority.0);
        buf
    }

    /// Decodes an ArtPoll from its wire form.
    pub fn unmarshal(b: &[u8]) -> Result<Self, ParseError> {
        Header::unmarshal_expecting(b, OpCode::Poll)?;
        if b.len() < ART_POLL_LENGTH {
            return Err(ParseError::InvalidHeaderLength(b.len()));
        }
        Ok(Self {
            talk_to_me: TalkToMe(b[HEADER_LENGTH]),
            priority: Priority(b[HEADER_LENGTH + 1]),
        })
    }
}
