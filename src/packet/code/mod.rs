//! Single-byte bitfields and code tables used across the packet family.
//!
//! Bitfields are newtype wrappers over their wire byte with fluent
//! `with_*` setters and boolean predicates. Multi-bit slices (indicator
//! state, address authority, failsafe mode, port protocol) are exposed as
//! typed enums; unrecognized bits survive read-modify-write untouched.

mod good_io;
mod opcode;
mod port_type;
mod priority;
mod report;
mod status;
mod style;
mod switches;
mod talk_to_me;

pub use good_io::{GoodInput, GoodOutput};
pub use opcode::OpCode;
pub use port_type::{PortProtocol, PortType};
pub use priority::Priority;
pub use report::ReportCode;
pub use status::{AddressAuthority, FailsafeMode, IndicatorState, Status1, Status2, Status3};
pub use style::Style;
pub use switches::{SwMacro, SwRemote};
pub use talk_to_me::TalkToMe;
