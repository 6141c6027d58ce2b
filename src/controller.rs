//! The Art-Net controller runtime.
//!
//! A [`Controller`] embeds a [`Node`] styled as a console and layers
//! three concerns on top of it: periodic discovery (broadcast ArtPoll,
//! admit ArtPollReply into a node table), liveness expiry, and the DMX
//! transmit tick that drains per-universe buffers and chases them with a
//! broadcast ArtSync.
//!
//! # Example
//!
//! ```no_run
//! use artnet::{CancelToken, Controller, ControllerOptions};
//!
//! let mut controller = Controller::new(
//!     "console-1",
//!     "2.0.0.1".parse().unwrap(),
//!     ControllerOptions::default(),
//! );
//! let cancel = CancelToken::new();
//! controller.start(cancel.clone()).unwrap();
//!
//! // black-out universe 0:0.0 on every discovered node
//! controller.range_all(|ip, address| {
//!     let _ = controller.send_dmx(ip, address, [0u8; 512]);
//! });
//! # cancel.cancel();
//! ```

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::NodeConfig;
use crate::controlled_node::ControlledNode;
use crate::error::{Error, Result};
use crate::node::{Node, NodeOptions, NodeSender, DEFAULT_BROADCAST};
use crate::packet::code::{OpCode, Priority, Style, TalkToMe};
use crate::packet::{ArtPoll, ArtPollReply, ArtSync, Packet, ARTNET_PORT};
use crate::types::{CancelToken, DmxData, PortAddress};

type NodeTable = Arc<Mutex<HashMap<Ipv4Addr, Arc<ControlledNode>>>>;

/// Depth of the poll-reply intake queue between the receive loop and the
/// discovery loop.
const REPLY_QUEUE_DEPTH: usize = 64;

// =============================================================================
// Options
// =============================================================================

/// Timing and socket configuration for a [`Controller`].
///
/// All intervals are fixed once [`Controller::start`] runs.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Where broadcasts (ArtPoll, ArtSync) are sent.
    /// Defaults to `2.255.255.255:6454`.
    pub broadcast_address: SocketAddr,
    /// Local bind address. Defaults to `0.0.0.0:6454`.
    pub listen_address: SocketAddr,
    /// How often ArtPoll is broadcast. Defaults to 3 s; the protocol
    /// expects 2.5-3 s.
    pub poll_interval: Duration,
    /// The DMX transmit tick. Defaults to 30 ms.
    pub update_interval: Duration,
    /// Nodes silent for this long are dropped from the table. Defaults
    /// to 10 s, five missed polls.
    pub expiry_interval: Duration,
    /// How long a freshly written buffer may age before it is sent.
    /// `None` (the default) uses `update_interval`.
    pub active_interval: Option<Duration>,
    /// Idle-refresh cadence for unchanged buffers. Defaults to 1 s.
    pub passive_interval: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            broadcast_address: SocketAddr::new(IpAddr::V4(DEFAULT_BROADCAST), ARTNET_PORT),
            listen_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), ARTNET_PORT),
            poll_interval: Duration::from_secs(3),
            update_interval: Duration::from_millis(30),
            expiry_interval: Duration::from_secs(10),
            active_interval: None,
            passive_interval: Duration::from_secs(1),
        }
    }
}

impl ControllerOptions {
    /// Set the broadcast destination (builder pattern).
    pub fn with_broadcast_address(mut self, address: SocketAddr) -> Self {
        self.broadcast_address = address;
        self
    }

    /// Set the local bind address (builder pattern).
    pub fn with_listen_address(mut self, address: SocketAddr) -> Self {
        self.listen_address = address;
        self
    }

    /// Set the poll cadence (builder pattern).
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the DMX transmit tick directly (builder pattern).
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    /// Set the DMX transmit tick as a frame rate, capped at 1000 Hz
    /// (builder pattern).
    pub fn with_max_fps(mut self, fps: u32) -> Self {
        let fps = fps.clamp(1, 1000);
        self.update_interval = Duration::from_micros(1_000_000 / u64::from(fps));
        self
    }

    /// Set the liveness expiry threshold (builder pattern).
    pub fn with_expiry_interval(mut self, interval: Duration) -> Self {
        self.expiry_interval = interval;
        self
    }

    /// Set the active retransmit window (builder pattern).
    pub fn with_active_interval(mut self, interval: Duration) -> Self {
        self.active_interval = Some(interval);
        self
    }

    /// Set the idle-refresh window (builder pattern).
    pub fn with_passive_interval(mut self, interval: Duration) -> Self {
        self.passive_interval = interval;
        self
    }
}

// =============================================================================
// Controller
// =============================================================================

/// An Art-Net controller: discovers nodes, owns their DMX buffers and
/// streams universes to them.
pub struct Controller {
    node: Node,
    nodes: NodeTable,
    options: ControllerOptions,
    reply_rx: Option<Receiver<ArtPollReply>>,
    handles: Vec<JoinHandle<()>>,
}

impl Controller {
    /// Creates a controller with the given name and IP.
    ///
    /// The embedded node is constructed with the poll-reply handler
    /// already registered, so the node never needs a reference back to
    /// the controller.
    pub fn new(name: impl Into<String>, ip: Ipv4Addr, options: ControllerOptions) -> Self {
        let node_options = NodeOptions::default()
            .with_listen_address(options.listen_address)
            .with_broadcast_address(options.broadcast_address);
        let mut node = Node::with_options(
            NodeConfig::new(name, Style::Controller, ip),
            node_options,
        );

        let (reply_tx, reply_rx) = mpsc::sync_channel(REPLY_QUEUE_DEPTH);
        node.handle(
            OpCode::PollReply,
            Box::new(move |packet| {
                if let Packet::PollReply(reply) = packet {
                    // discovery is periodic; a reply lost to a full
                    // queue returns with the next poll
                    let _ = reply_tx.try_send(reply);
                }
            }),
        )
        .expect("fresh node accepts handlers");

        Self {
            node,
            nodes: Arc::new(Mutex::new(HashMap::new())),
            options,
            reply_rx: Some(reply_rx),
            handles: Vec::new(),
        }
    }

    /// The address the controller's socket is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.node.local_addr()
    }

    /// Starts the embedded node and the discovery and transmit loops.
    pub fn start(&mut self, cancel: CancelToken) -> Result<()> {
        let reply_rx = self.reply_rx.take().ok_or(Error::AlreadyStarted)?;
        self.node.start(cancel.clone())?;

        let sender = self.node.sender();
        let own_ip = self.node.config().ip;
        let own_reply = self.node.config().to_poll_reply()?;

        let discovery = DiscoveryLoop {
            nodes: Arc::clone(&self.nodes),
            sender: sender.clone(),
            own_ip,
            own_reply,
            poll_interval: self.options.poll_interval,
            expiry_interval: self.options.expiry_interval,
            cancel: cancel.clone(),
        };
        self.handles.push(thread::spawn(move || {
            discovery.run(reply_rx);
        }));

        let transmit = TransmitLoop {
            nodes: Arc::clone(&self.nodes),
            sender,
            update_interval: self.options.update_interval,
            active_interval: self
                .options
                .active_interval
                .unwrap_or(self.options.update_interval),
            passive_interval: self.options.passive_interval,
            cancel,
        };
        self.handles.push(thread::spawn(move || {
            transmit.run();
        }));

        Ok(())
    }

    /// Writes a frame into the buffer for one universe on one node. The
    /// frame leaves with the next transmit tick.
    pub fn send_dmx(&self, ip: Ipv4Addr, address: PortAddress, data: DmxData) -> Result<()> {
        self.get_node(ip)?.set_dmx(address, &data)
    }

    /// Looks up a discovered node by IP.
    pub fn get_node(&self, ip: Ipv4Addr) -> Result<Arc<ControlledNode>> {
        self.nodes
            .lock()
            .unwrap()
            .get(&ip)
            .cloned()
            .ok_or(Error::UnknownNode(ip))
    }

    /// Invokes `f` with a snapshot of every discovered node.
    pub fn range_nodes(&self, mut f: impl FnMut(Ipv4Addr, &ControlledNode)) {
        let snapshot: Vec<(Ipv4Addr, Arc<ControlledNode>)> = self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .map(|(ip, node)| (*ip, Arc::clone(node)))
            .collect();
        for (ip, node) in snapshot {
            f(ip, &node);
        }
    }

    /// Invokes `f` with every (node, output universe) pair, universes
    /// sorted per node.
    pub fn range_all(&self, mut f: impl FnMut(Ipv4Addr, PortAddress)) {
        self.range_nodes(|ip, node| node.range_outputs(|address| f(ip, address)));
    }
}

// =============================================================================
// Discovery
// =============================================================================

struct DiscoveryLoop {
    nodes: NodeTable,
    sender: NodeSender,
    own_ip: Ipv4Addr,
    own_reply: ArtPollReply,
    poll_interval: Duration,
    expiry_interval: Duration,
    cancel: CancelToken,
}

impl DiscoveryLoop {
    fn run(self, replies: Receiver<ArtPollReply>) {
        let poll = ArtPoll {
            talk_to_me: TalkToMe::default().with_reply_on_change(true),
            priority: Priority::ALL,
        };

        let mut next_poll = Instant::now();
        let mut next_expiry = Instant::now() + self.expiry_interval;

        while !self.cancel.is_cancelled() {
            let now = Instant::now();

            if now >= next_poll {
                self.sender.broadcast(Packet::Poll(poll));
                // answer our own poll too, so other controllers on the
                // network see us without polling themselves
                self.sender
                    .broadcast(Packet::PollReply(self.own_reply.clone()));
                next_poll = now + self.poll_interval;
            }

            if now >= next_expiry {
                self.expire();
                next_expiry = now + self.expiry_interval;
            }

            let wait = next_poll.min(next_expiry).saturating_duration_since(now);
            match replies.recv_timeout(wait.max(Duration::from_millis(1))) {
                Ok(reply) => self.admit(reply),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    /// Filters one discovery response and merges it into the node table.
    fn admit(&self, reply: ArtPollReply) {
        if !admissible(&reply, self.own_ip) {
            log::debug!(
                "ignoring poll reply from {} (style {})",
                reply.ip_address,
                reply.style
            );
            return;
        }
        update_node(&self.nodes, NodeConfig::from_poll_reply(&reply));
    }

    fn expire(&self) {
        let mut nodes = self.nodes.lock().unwrap();
        nodes.retain(|ip, node| {
            let alive = !node.is_stale(self.expiry_interval);
            if !alive {
                log::info!("removing stale node {}", ip);
            }
            alive
        });
    }
}

/// Discovery admission policy: nodes always; other controllers only when
/// they own output universes and are not us; everything else is noise.
fn admissible(reply: &ArtPollReply, own_ip: Ipv4Addr) -> bool {
    if reply.ip_address == own_ip {
        return false;
    }
    match reply.style {
        Style::Node => true,
        Style::Controller => reply.port_types.iter().any(|t| t.output()),
        _ => false,
    }
}

/// Inserts or merges one device configuration under the table lock.
fn update_node(nodes: &NodeTable, config: NodeConfig) {
    let mut nodes = nodes.lock().unwrap();
    match nodes.get(&config.ip) {
        Some(node) => {
            log::debug!("updated node {} ({})", config.name, config.ip);
            node.update(config);
        }
        None => {
            log::info!("added node {} ({})", config.name, config.ip);
            nodes.insert(config.ip, Arc::new(ControlledNode::new(config)));
        }
    }
}

// =============================================================================
// DMX transmit
// =============================================================================

struct TransmitLoop {
    nodes: NodeTable,
    sender: NodeSender,
    update_interval: Duration,
    active_interval: Duration,
    passive_interval: Duration,
    cancel: CancelToken,
}

impl TransmitLoop {
    fn run(self) {
        let mut last_tick = Instant::now();

        while !self.cancel.is_cancelled() {
            let elapsed = last_tick.elapsed();
            if elapsed < self.update_interval {
                thread::sleep(self.update_interval - elapsed);
            }
            last_tick = Instant::now();

            // snapshot under the table lock, then take each node's own
            // lock while collecting its due universes
            let snapshot: Vec<Arc<ControlledNode>> =
                self.nodes.lock().unwrap().values().cloned().collect();

            let mut sent = 0usize;
            for node in snapshot {
                for dmx in node.get_dmx_updates(self.active_interval, self.passive_interval) {
                    self.sender.send_to(node.udp_address(), Packet::Dmx(dmx));
                    sent += 1;
                }
            }

            // one sync per productive tick, so nodes buffering several
            // universes flip them to the outputs atomically
            if sent > 0 {
                self.sender.broadcast(Packet::Sync(ArtSync::default()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::code::{PortProtocol, PortType};

    fn table() -> NodeTable {
        Arc::new(Mutex::new(HashMap::new()))
    }

    fn node_reply(ip: Ipv4Addr) -> ArtPollReply {
        ArtPollReply {
            ip_address: ip,
            short_name: "fixture".into(),
            num_ports: 1,
            port_types: [
                PortType::default()
                    .with_output(true)
                    .with_protocol(PortProtocol::Dmx512),
                PortType::default(),
                PortType::default(),
                PortType::default(),
            ],
            ..ArtPollReply::default()
        }
    }

    #[test]
    fn test_admits_node_style() {
        let reply = node_reply(Ipv4Addr::new(2, 0, 0, 10));
        assert!(admissible(&reply, Ipv4Addr::new(2, 0, 0, 1)));

        let nodes = table();
        update_node(&nodes, NodeConfig::from_poll_reply(&reply));
        assert!(nodes.lock().unwrap().contains_key(&Ipv4Addr::new(2, 0, 0, 10)));
    }

    #[test]
    fn test_ignores_own_reply() {
        let own = Ipv4Addr::new(2, 0, 0, 1);
        let reply = node_reply(own);
        assert!(!admissible(&reply, own));
    }

    #[test]
    fn test_ignores_media_style() {
        let mut reply = node_reply(Ipv4Addr::new(2, 0, 0, 10));
        reply.style = Style::Media;
        assert!(!admissible(&reply, Ipv4Addr::new(2, 0, 0, 1)));
    }

    #[test]
    fn test_controller_style_needs_outputs() {
        let mut reply = node_reply(Ipv4Addr::new(2, 0, 0, 10));
        reply.style = Style::Controller;
        assert!(admissible(&reply, Ipv4Addr::new(2, 0, 0, 1)));

        reply.port_types = [PortType::default(); 4];
        assert!(!admissible(&reply, Ipv4Addr::new(2, 0, 0, 1)));
    }

    #[test]
    fn test_update_node_merges_existing() {
        let nodes = table();
        let ip = Ipv4Addr::new(2, 0, 0, 10);
        update_node(&nodes, NodeConfig::from_poll_reply(&node_reply(ip)));
        let first = Arc::clone(nodes.lock().unwrap().get(&ip).unwrap());

        update_node(&nodes, NodeConfig::from_poll_reply(&node_reply(ip)));
        let second = Arc::clone(nodes.lock().unwrap().get(&ip).unwrap());
        assert!(Arc::ptr_eq(&first, &second), "same record is updated in place");
    }

    #[test]
    fn test_send_dmx_unknown_node() {
        let controller = Controller::new(
            "c",
            Ipv4Addr::new(2, 0, 0, 1),
            ControllerOptions::default(),
        );
        let err = controller
            .send_dmx(Ipv4Addr::new(2, 0, 0, 99), PortAddress::new(0, 0), [0; 512])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownNode(ip) if ip == Ipv4Addr::new(2, 0, 0, 99)));
    }

    #[test]
    fn test_send_dmx_unknown_address() {
        let controller = Controller::new(
            "c",
            Ipv4Addr::new(2, 0, 0, 1),
            ControllerOptions::default(),
        );
        let ip = Ipv4Addr::new(2, 0, 0, 10);
        update_node(&controller.nodes, NodeConfig::from_poll_reply(&node_reply(ip)));

        assert!(controller.send_dmx(ip, PortAddress::new(0, 0), [0; 512]).is_ok());
        assert!(matches!(
            controller.send_dmx(ip, PortAddress::new(7, 7), [0; 512]),
            Err(Error::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_expiry_removes_silent_nodes() {
        let nodes = table();
        let ip = Ipv4Addr::new(2, 0, 0, 10);
        update_node(&nodes, NodeConfig::from_poll_reply(&node_reply(ip)));

        let discovery = DiscoveryLoop {
            nodes: Arc::clone(&nodes),
            sender: sender_stub(),
            own_ip: Ipv4Addr::new(2, 0, 0, 1),
            own_reply: ArtPollReply::default(),
            poll_interval: Duration::from_secs(3),
            expiry_interval: Duration::from_millis(5),
            cancel: CancelToken::new(),
        };

        std::thread::sleep(Duration::from_millis(10));
        discovery.expire();
        assert!(nodes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_expiry_keeps_fresh_nodes() {
        let nodes = table();
        let ip = Ipv4Addr::new(2, 0, 0, 10);
        update_node(&nodes, NodeConfig::from_poll_reply(&node_reply(ip)));

        let discovery = DiscoveryLoop {
            nodes: Arc::clone(&nodes),
            sender: sender_stub(),
            own_ip: Ipv4Addr::new(2, 0, 0, 1),
            own_reply: ArtPollReply::default(),
            poll_interval: Duration::from_secs(3),
            expiry_interval: Duration::from_secs(60),
            cancel: CancelToken::new(),
        };

        discovery.expire();
        assert!(nodes.lock().unwrap().contains_key(&ip));
    }

    #[test]
    fn test_range_all_visits_universes() {
        let controller = Controller::new(
            "c",
            Ipv4Addr::new(2, 0, 0, 1),
            ControllerOptions::default(),
        );
        update_node(
            &controller.nodes,
            NodeConfig::from_poll_reply(&node_reply(Ipv4Addr::new(2, 0, 0, 10))),
        );

        let mut seen = Vec::new();
        controller.range_all(|ip, address| seen.push((ip, address)));
        assert_eq!(
            seen,
            vec![(Ipv4Addr::new(2, 0, 0, 10), PortAddress::new(0, 0))]
        );
    }

    #[test]
    fn test_max_fps_builder() {
        let options = ControllerOptions::default().with_max_fps(50);
        assert_eq!(options.update_interval, Duration::from_millis(20));
        // capped at 1000 Hz
        let options = ControllerOptions::default().with_max_fps(100_000);
        assert_eq!(options.update_interval, Duration::from_millis(1));
    }

    /// A sender whose queue has no consumer; enqueue attempts drop.
    fn sender_stub() -> NodeSender {
        let node = Node::new("stub", Style::Controller, Ipv4Addr::new(2, 0, 0, 1));
        node.sender()
    }
}
