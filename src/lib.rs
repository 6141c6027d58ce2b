//! Art-Net 4 controller and node library for DMX512 over UDP/IPv4.
//!
//! Art-Net devices announce themselves with broadcast poll/reply
//! exchanges, then carry universes of 512-channel DMX data between a
//! *controller* (typically a console) and *nodes* (DMX gateways). This
//! crate provides the three layers of that stack:
//!
//! - the [`packet`] module: a bit-exact wire codec for the Art-Net
//!   packet family,
//! - [`Node`]: the UDP receive/dispatch/transmit engine with a built-in
//!   poll responder,
//! - [`Controller`]: periodic discovery, a node table with liveness
//!   expiry, per-universe DMX buffering with an active/idle resend
//!   policy, and broadcast synchronization.
//!
//! The library terminates at UDP; it does not drive DMX hardware.
//!
//! # Getting Started
//!
//! A controller discovers nodes on its own and streams whatever is
//! written into its buffers:
//!
//! ```no_run
//! use artnet::{CancelToken, Controller, ControllerOptions, PortAddress};
//! use std::time::Duration;
//!
//! let mut controller = Controller::new(
//!     "console-1",
//!     "2.0.0.1".parse().unwrap(),
//!     ControllerOptions::default(),
//! );
//! let cancel = CancelToken::new();
//! controller.start(cancel.clone()).unwrap();
//!
//! // give discovery a poll cycle
//! std::thread::sleep(Duration::from_secs(3));
//!
//! let mut frame = [0u8; 512];
//! frame[0] = 255; // channel 1 to full
//! controller.range_all(|ip, address| {
//!     controller.send_dmx(ip, address, frame).unwrap();
//! });
//! ```
//!
//! A node answers discovery for the ports it is configured with; what to
//! do with inbound DMX is up to the application via a packet handler:
//!
//! ```no_run
//! use artnet::packet::{code::OpCode, Packet};
//! use artnet::{CancelToken, Node, Style};
//!
//! let mut node = Node::new("gateway-1", Style::Node, "2.0.0.10".parse().unwrap());
//! node.handle(
//!     OpCode::Dmx,
//!     Box::new(|packet| {
//!         if let Packet::Dmx(dmx) = packet {
//!             println!("universe {}: ch1 = {}", dmx.address, dmx.data[0]);
//!         }
//!     }),
//! )
//! .unwrap();
//! node.start(CancelToken::new()).unwrap();
//! ```

pub mod config;
pub mod controlled_node;
pub mod controller;
mod error;
pub mod node;
pub mod packet;
pub mod types;

// Crate-level error types
pub use error::{Error, Result};

// Core types
pub use types::{BindIndex, CancelToken, DmxData, PortAddress, DMX_CHANNELS};

// Device model
pub use config::{ConfigError, InputPort, NodeConfig, OutputPort};

// Runtimes
pub use controlled_node::ControlledNode;
pub use controller::{Controller, ControllerOptions};
pub use node::{Node, NodeOptions, NodeSender, PacketHandler};

// The style code appears in every constructor signature, so it lives at
// the crate root alongside them.
pub use packet::code::Style;
pub use packet::ARTNET_PORT;
