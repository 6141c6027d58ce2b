//! Controller-side state for one discovered remote node.
//!
//! A [`ControlledNode`] owns a DMX buffer per output universe the node
//! advertises. Writes land in the buffer and mark it stale; the
//! controller's transmit tick drains buffers that are due, either because
//! fresh data aged past the active window or because an idle buffer hit
//! the passive refresh window.

use std::collections::{BTreeMap, HashMap};
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::{InputPort, NodeConfig};
use crate::error::{Error, Result};
use crate::packet::{ArtDmx, ARTNET_PORT};
use crate::types::{BindIndex, DmxData, PortAddress};

// =============================================================================
// DmxBuffer
// =============================================================================

/// One universe worth of pending output data.
///
/// `last_update` is `None` until the first emission, so a freshly
/// allocated buffer transmits on the next tick and blacks the output out
/// explicitly.
#[derive(Debug)]
struct DmxBuffer {
    data: DmxData,
    last_update: Option<Instant>,
    stale: bool,
}

impl DmxBuffer {
    fn new() -> Self {
        Self {
            data: [0; 512],
            last_update: None,
            stale: false,
        }
    }

    fn set(&mut self, dmx: &DmxData) {
        self.data = *dmx;
        self.stale = true;
    }

    /// Returns the frame to transmit when the buffer is due.
    ///
    /// Stale buffers emit once `active` has elapsed since the previous
    /// emission; clean buffers re-emit after `passive` so nodes keep
    /// receiving data while the source is idle.
    fn check_update(&mut self, active: Duration, passive: Duration) -> Option<DmxData> {
        if let Some(last) = self.last_update {
            let since = last.elapsed();
            let window = if self.stale { active } else { passive };
            if since < window {
                return None;
            }
        }
        self.last_update = Some(Instant::now());
        self.stale = false;
        Some(self.data)
    }
}

// =============================================================================
// ControlledNode
// =============================================================================

struct NodeState {
    bound_devices: HashMap<BindIndex, NodeConfig>,
    outputs: BTreeMap<PortAddress, DmxBuffer>,
    inputs: BTreeMap<PortAddress, InputPort>,
    last_seen: Instant,
    sequence: u8,
}

/// A remote node as tracked by a [`Controller`](crate::Controller).
///
/// One physical device may expose several bound sub-devices sharing the
/// root IP; their configurations are merged here per bind index. All
/// mutating operations take the node's own mutex; the controller locks
/// its table first and a node second, never the other way around.
pub struct ControlledNode {
    udp_address: SocketAddr,
    state: Mutex<NodeState>,
}

impl ControlledNode {
    pub(crate) fn new(config: NodeConfig) -> Self {
        let node = Self {
            udp_address: SocketAddr::new(IpAddr::V4(config.ip), ARTNET_PORT),
            state: Mutex::new(NodeState {
                bound_devices: HashMap::new(),
                outputs: BTreeMap::new(),
                inputs: BTreeMap::new(),
                last_seen: Instant::now(),
                sequence: 0,
            }),
        };
        node.update(config);
        node
    }

    /// The unicast destination for this node's DMX traffic.
    pub fn udp_address(&self) -> SocketAddr {
        self.udp_address
    }

    /// When the node last answered a poll.
    pub fn last_seen(&self) -> Instant {
        self.state.lock().unwrap().last_seen
    }

    pub(crate) fn is_stale(&self, timeout: Duration) -> bool {
        self.last_seen().elapsed() >= timeout
    }

    /// The configuration of one bound device, the root at index 1.
    pub fn config(&self, bind_index: BindIndex) -> Option<NodeConfig> {
        self.state
            .lock()
            .unwrap()
            .bound_devices
            .get(&bind_index)
            .cloned()
    }

    /// Snapshot of the input ports the node advertises.
    pub fn inputs(&self) -> Vec<InputPort> {
        self.state.lock().unwrap().inputs.values().copied().collect()
    }

    /// Merges a freshly received configuration for one bind index.
    ///
    /// Output universes that disappeared lose their buffers; new ones get
    /// a zero-filled buffer. Buffers for universes present in both
    /// configurations keep their data, so a re-announcing node does not
    /// flicker. Universes owned by other bind indices are untouched.
    pub(crate) fn update(&self, config: NodeConfig) {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        state.last_seen = Instant::now();

        if let Some(previous) = state.bound_devices.get(&config.bind_index) {
            for port in &previous.output_ports {
                if !config.output_ports.iter().any(|p| p.address == port.address) {
                    state.outputs.remove(&port.address);
                }
            }
            for port in &previous.input_ports {
                state.inputs.remove(&port.address);
            }
        }

        for port in &config.output_ports {
            state.outputs.entry(port.address).or_insert_with(DmxBuffer::new);
        }
        for port in &config.input_ports {
            state.inputs.insert(port.address, *port);
        }

        state.bound_devices.insert(config.bind_index, config);
    }

    /// Writes a frame into the buffer for one output universe and marks
    /// it stale.
    pub fn set_dmx(&self, address: PortAddress, data: &DmxData) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.outputs.get_mut(&address) {
            Some(buffer) => {
                buffer.set(data);
                Ok(())
            }
            None => Err(Error::UnknownAddress(address)),
        }
    }

    /// Collects one ArtDmx per universe that is due for transmission,
    /// incrementing the sequence counter per emitted packet.
    pub(crate) fn get_dmx_updates(&self, active: Duration, passive: Duration) -> Vec<ArtDmx> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        let mut packets = Vec::new();
        for (address, buffer) in state.outputs.iter_mut() {
            let Some(data) = buffer.check_update(active, passive) else {
                continue;
            };
            // 0 means "sequencing disabled", skip it on wrap
            state.sequence = if state.sequence == u8::MAX {
                1
            } else {
                state.sequence + 1
            };
            packets.push(ArtDmx::new(*address, data, state.sequence));
        }
        packets
    }

    /// Invokes `f` with every output universe, sorted by `(net, sub_uni)`.
    pub fn range_outputs(&self, mut f: impl FnMut(PortAddress)) {
        let addresses: Vec<PortAddress> =
            self.state.lock().unwrap().outputs.keys().copied().collect();
        for address in addresses {
            f(address);
        }
    }
}
