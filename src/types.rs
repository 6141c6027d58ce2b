//! Core Art-Net types shared by the codec and the runtimes.
//!
//! The central type is [`PortAddress`], the 15-bit universe identifier that
//! routes every ArtDmx packet. It is split on the wire across three fields
//! (`Net`, `SubSwitch`, per-port `SwIn`/`SwOut` nibbles) but presented to
//! callers as a single value.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Number of channels in a DMX512 universe.
pub const DMX_CHANNELS: usize = 512;

/// One universe of DMX512 data: 512 channels, 8 bits each.
pub type DmxData = [u8; DMX_CHANNELS];

/// Index of a bound sub-device sharing the root device's IP. 1 is the root.
pub type BindIndex = u8;

// =============================================================================
// PortAddress
// =============================================================================

/// A 15-bit Art-Net Port-Address identifying one universe.
///
/// The address is partitioned as `Net` (7 bits, 0-127), `Sub` (4 bits) and
/// `Universe` (4 bits); the latter two travel together in the `sub_uni`
/// byte (`sub * 16 + universe`).
///
/// Ordering is lexicographic on `(net, sub_uni)`, which matches the integer
/// form `(net << 8) | sub_uni`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PortAddress {
    /// Top 7 bits of the Port-Address.
    pub net: u8,
    /// Low byte of the Port-Address: sub-net in the high nibble, universe
    /// in the low nibble.
    pub sub_uni: u8,
}

impl PortAddress {
    /// Creates a Port-Address from its net and sub-uni parts.
    pub fn new(net: u8, sub_uni: u8) -> Self {
        Self { net, sub_uni }
    }

    /// Creates a Port-Address from net, sub-net and universe parts.
    pub fn from_parts(net: u8, sub: u8, universe: u8) -> Self {
        Self {
            net,
            sub_uni: (sub << 4) | (universe & 0x0f),
        }
    }

    /// The sub-net part (high nibble of `sub_uni`).
    pub fn sub(&self) -> u8 {
        self.sub_uni >> 4
    }

    /// The universe part (low nibble of `sub_uni`).
    pub fn universe(&self) -> u8 {
        self.sub_uni & 0x0f
    }

    /// The canonical 15-bit integer form: `(net << 8) | sub_uni`.
    pub fn integer(&self) -> u16 {
        (u16::from(self.net) << 8) | u16::from(self.sub_uni)
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.net, self.sub(), self.universe())
    }
}

impl From<PortAddress> for u16 {
    fn from(a: PortAddress) -> u16 {
        a.integer()
    }
}

impl From<u16> for PortAddress {
    fn from(v: u16) -> Self {
        Self {
            net: ((v >> 8) & 0x7f) as u8,
            sub_uni: (v & 0xff) as u8,
        }
    }
}

// =============================================================================
// CancelToken
// =============================================================================

/// Cooperative shutdown signal shared by all runtime loops.
///
/// Cloning the token shares the underlying flag. Every long-lived loop
/// checks the token at its next suspension point (socket timeout, queue
/// wait, ticker), so cancellation takes effect within one poll period.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals every holder of this token to shut down.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_integer() {
        let a = PortAddress::new(1, 0x23);
        assert_eq!(a.integer(), 0x0123);
        assert_eq!(u16::from(a), 0x0123);
    }

    #[test]
    fn test_address_string() {
        let a = PortAddress::new(1, 0x23);
        assert_eq!(a.to_string(), "1:2.3");
        assert_eq!(PortAddress::new(0, 0).to_string(), "0:0.0");
        assert_eq!(PortAddress::new(127, 0xff).to_string(), "127:15.15");
    }

    #[test]
    fn test_address_from_parts() {
        let a = PortAddress::from_parts(1, 2, 3);
        assert_eq!(a.sub_uni, 0x23);
        assert_eq!(a.sub(), 2);
        assert_eq!(a.universe(), 3);
    }

    #[test]
    fn test_address_from_integer_masks_net() {
        let a = PortAddress::from(0xff23u16);
        assert_eq!(a.net, 0x7f);
        assert_eq!(a.sub_uni, 0x23);
    }

    #[test]
    fn test_address_sort_order() {
        let mut addrs = vec![
            PortAddress::new(1, 0x00),
            PortAddress::new(0, 0xff),
            PortAddress::new(0, 0x01),
            PortAddress::new(2, 0x10),
        ];
        addrs.sort();
        let ints: Vec<u16> = addrs.iter().map(|a| a.integer()).collect();
        assert_eq!(ints, vec![0x0001, 0x00ff, 0x0100, 0x0210]);
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
