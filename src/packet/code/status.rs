//! The three general status registers reported in ArtPollReply.

use std::fmt;

// =============================================================================
// Status1
// =============================================================================

/// Who programmed the node's Port-Address, bits 5-4 of [`Status1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AddressAuthority {
    /// Programming authority unknown.
    #[default]
    Unknown = 0,
    /// All Port-Addresses set by front panel controls.
    FrontPanel = 1,
    /// All or part of the Port-Address programmed over the network.
    Network = 2,
    /// Not used.
    Unused = 3,
}

/// Indicator LED state, bits 7-6 of [`Status1`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum IndicatorState {
    /// Indicator state unknown.
    #[default]
    Unknown = 0,
    /// Indicators in locate / identify mode.
    Locate = 1,
    /// Indicators in mute mode.
    Mute = 2,
    /// Indicators in normal mode.
    Normal = 3,
}

/// General status register: boot state, RDM capability, UBEA presence and
/// the two-bit address-authority and indicator slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status1(pub u8);

impl Status1 {
    const UBEA: u8 = 1 << 0;
    const RDM: u8 = 1 << 1;
    const BOOT_ROM: u8 = 1 << 2;
    const AUTHORITY_SHIFT: u8 = 4;
    const AUTHORITY_MASK: u8 = 0b11 << 4;
    const INDICATOR_SHIFT: u8 = 6;
    const INDICATOR_MASK: u8 = 0b11 << 6;

    fn with_bit(self, mask: u8, enable: bool) -> Self {
        if enable {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Set whether a User Bios Extension Area is present.
    pub fn with_ubea(self, enable: bool) -> Self {
        self.with_bit(Self::UBEA, enable)
    }

    /// Whether a User Bios Extension Area is present.
    pub fn ubea(self) -> bool {
        self.0 & Self::UBEA != 0
    }

    /// Set whether the device is capable of Remote Device Management.
    pub fn with_rdm(self, enable: bool) -> Self {
        self.with_bit(Self::RDM, enable)
    }

    /// Whether the device is capable of Remote Device Management.
    pub fn rdm(self) -> bool {
        self.0 & Self::RDM != 0
    }

    /// Set whether the device booted from ROM rather than flash.
    pub fn with_boot_rom(self, enable: bool) -> Self {
        self.with_bit(Self::BOOT_ROM, enable)
    }

    /// Whether the device booted from ROM.
    pub fn boot_rom(self) -> bool {
        self.0 & Self::BOOT_ROM != 0
    }

    /// Set the Port-Address programming authority, preserving other bits.
    pub fn with_address_authority(self, authority: AddressAuthority) -> Self {
        Self((self.0 & !Self::AUTHORITY_MASK) | ((authority as u8) << Self::AUTHORITY_SHIFT))
    }

    /// The Port-Address programming authority.
    pub fn address_authority(self) -> AddressAuthority {
        match (self.0 & Self::AUTHORITY_MASK) >> Self::AUTHORITY_SHIFT {
            0 => AddressAuthority::Unknown,
            1 => AddressAuthority::FrontPanel,
            2 => AddressAuthority::Network,
            _ => AddressAuthority::Unused,
        }
    }

    /// Set the indicator state, preserving other bits.
    pub fn with_indicator(self, state: IndicatorState) -> Self {
        Self((self.0 & !Self::INDICATOR_MASK) | ((state as u8) << Self::INDICATOR_SHIFT))
    }

    /// The indicator state.
    pub fn indicator(self) -> IndicatorState {
        match (self.0 & Self::INDICATOR_MASK) >> Self::INDICATOR_SHIFT {
            0 => IndicatorState::Unknown,
            1 => IndicatorState::Locate,
            2 => IndicatorState::Mute,
            _ => IndicatorState::Normal,
        }
    }
}

impl fmt::Display for Status1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ubea: {}, rdm: {}, boot rom: {}, authority: {:?}, indicator: {:?}",
            self.ubea(),
            self.rdm(),
            self.boot_rom(),
            self.address_authority(),
            self.indicator()
        )
    }
}

// =============================================================================
// Status2
// =============================================================================

/// Product capability register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status2(pub u8);

impl Status2 {
    const BROWSER: u8 = 1 << 0;
    const DHCP: u8 = 1 << 1;
    const DHCP_CAPABLE: u8 = 1 << 2;
    const PORT15: u8 = 1 << 3;
    const SACN_SWITCH: u8 = 1 << 4;
    const SQUAWKING: u8 = 1 << 5;

    fn with_bit(self, mask: u8, enable: bool) -> Self {
        if enable {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Set whether the product supports web browser configuration.
    pub fn with_browser(self, enable: bool) -> Self {
        self.with_bit(Self::BROWSER, enable)
    }

    /// Whether the product supports web browser configuration.
    pub fn browser(self) -> bool {
        self.0 & Self::BROWSER != 0
    }

    /// Set whether the current IP was configured by DHCP.
    pub fn with_dhcp(self, enable: bool) -> Self {
        self.with_bit(Self::DHCP, enable)
    }

    /// Whether the current IP was configured by DHCP.
    pub fn dhcp(self) -> bool {
        self.0 & Self::DHCP != 0
    }

    /// Set whether the product is capable of DHCP.
    pub fn with_dhcp_capable(self, enable: bool) -> Self {
        self.with_bit(Self::DHCP_CAPABLE, enable)
    }

    /// Whether the product is capable of DHCP.
    pub fn dhcp_capable(self) -> bool {
        self.0 & Self::DHCP_CAPABLE != 0
    }

    /// Set whether the product supports 15-bit Port-Addresses (Art-Net 3/4).
    pub fn with_port15(self, enable: bool) -> Self {
        self.with_bit(Self::PORT15, enable)
    }

    /// Whether the product supports 15-bit Port-Addresses.
    pub fn port15(self) -> bool {
        self.0 & Self::PORT15 != 0
    }

    /// Set whether the product can switch between Art-Net and sACN.
    pub fn with_sacn_switch(self, enable: bool) -> Self {
        self.with_bit(Self::SACN_SWITCH, enable)
    }

    /// Whether the product can switch between Art-Net and sACN.
    pub fn sacn_switch(self) -> bool {
        self.0 & Self::SACN_SWITCH != 0
    }

    /// Set whether the product is squawking.
    pub fn with_squawking(self, enable: bool) -> Self {
        self.with_bit(Self::SQUAWKING, enable)
    }

    /// Whether the product is squawking.
    pub fn squawking(self) -> bool {
        self.0 & Self::SQUAWKING != 0
    }
}

// =============================================================================
// Status3
// =============================================================================

/// What the node does with its outputs when network data is lost,
/// bits 7-6 of [`Status3`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FailsafeMode {
    /// Hold the last received state.
    #[default]
    HoldLast = 0,
    /// Drive all outputs to zero.
    OutputsZero = 1,
    /// Drive all outputs to full.
    OutputsFull = 2,
    /// Play back the failsafe scene.
    PlaybackScene = 3,
}

/// General product state register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Status3(pub u8);

impl Status3 {
    const RDM_NET: u8 = 1 << 2;
    const PORT_SWITCHING: u8 = 1 << 3;
    const LLRP: u8 = 1 << 4;
    const FAIL_OVER: u8 = 1 << 5;
    const FAILSAFE_SHIFT: u8 = 6;
    const FAILSAFE_MASK: u8 = 0b11 << 6;

    fn with_bit(self, mask: u8, enable: bool) -> Self {
        if enable {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    /// Set the behaviour on loss of network data, preserving other bits.
    pub fn with_failsafe(self, mode: FailsafeMode) -> Self {
        Self((self.0 & !Self::FAILSAFE_MASK) | ((mode as u8) << Self::FAILSAFE_SHIFT))
    }

    /// The behaviour on loss of network data.
    pub fn failsafe(self) -> FailsafeMode {
        match (self.0 & Self::FAILSAFE_MASK) >> Self::FAILSAFE_SHIFT {
            0 => FailsafeMode::HoldLast,
            1 => FailsafeMode::OutputsZero,
            2 => FailsafeMode::OutputsFull,
            _ => FailsafeMode::PlaybackScene,
        }
    }

    /// Set whether the product supports RDMnet.
    pub fn with_rdm_net(self, enable: bool) -> Self {
        self.with_bit(Self::RDM_NET, enable)
    }

    /// Whether the product supports RDMnet.
    pub fn rdm_net(self) -> bool {
        self.0 & Self::RDM_NET != 0
    }

    /// Set whether input and output ports can be switched.
    pub fn with_port_switching(self, enable: bool) -> Self {
        self.with_bit(Self::PORT_SWITCHING, enable)
    }

    /// Whether input and output ports can be switched.
    pub fn port_switching(self) -> bool {
        self.0 & Self::PORT_SWITCHING != 0
    }

    /// Set whether the product supports LLRP.
    pub fn with_llrp(self, enable: bool) -> Self {
        self.with_bit(Self::LLRP, enable)
    }

    /// Whether the product supports LLRP.
    pub fn llrp(self) -> bool {
        self.0 & Self::LLRP != 0
    }

    /// Set whether the product supports fail-over.
    pub fn with_fail_over(self, enable: bool) -> Self {
        self.with_bit(Self::FAIL_OVER, enable)
    }

    /// Whether the product supports fail-over.
    pub fn fail_over(self) -> bool {
        self.0 & Self::FAIL_OVER != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status1_flags() {
        let s = Status1::default().with_ubea(true).with_rdm(true);
        assert!(s.ubea() && s.rdm() && !s.boot_rom());
        assert_eq!(s.0, 0b0000_0011);
    }

    #[test]
    fn test_status1_authority_slice() {
        let s = Status1(0b1000_0001).with_address_authority(AddressAuthority::Network);
        assert_eq!(s.address_authority(), AddressAuthority::Network);
        // other bits untouched
        assert_eq!(s.0 & 0b1000_0001, 0b1000_0001);

        let s = s.with_address_authority(AddressAuthority::FrontPanel);
        assert_eq!(s.address_authority(), AddressAuthority::FrontPanel);
    }

    #[test]
    fn test_status1_indicator_slice() {
        let s = Status1::default().with_indicator(IndicatorState::Locate);
        assert_eq!(s.indicator(), IndicatorState::Locate);
        assert_eq!(s.0, 0b0100_0000);
    }

    #[test]
    fn test_status2_flags() {
        let s = Status2::default()
            .with_dhcp_capable(true)
            .with_port15(true)
            .with_sacn_switch(true);
        assert_eq!(s.0, 0b0001_1100);
        assert!(!s.dhcp());

        let s = s.with_port15(false);
        assert!(!s.port15());
        assert!(s.dhcp_capable() && s.sacn_switch());
    }

    #[test]
    fn test_status3_failsafe_slice() {
        let s = Status3::default()
            .with_llrp(true)
            .with_failsafe(FailsafeMode::OutputsFull);
        assert_eq!(s.failsafe(), FailsafeMode::OutputsFull);
        assert!(s.llrp());

        let s = s.with_failsafe(FailsafeMode::HoldLast);
        assert_eq!(s.failsafe(), FailsafeMode::HoldLast);
        assert!(s.llrp());
    }
}
