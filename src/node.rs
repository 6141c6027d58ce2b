//! The Art-Net node runtime.
//!
//! A [`Node`] owns one UDP socket and three long-lived loops: a receive
//! loop that decodes datagrams and dispatches them to per-opcode
//! handlers, a send loop that drains a bounded outbound queue, and a
//! poll responder that answers every ArtPoll with a freshly built
//! ArtPollReply. Starting a node also broadcasts one unsolicited
//! ArtPollReply, the power-up announcement the protocol expects from
//! every device. Handlers are registered before [`Node::start`]; a
//! [`CancelToken`](crate::CancelToken) winds all loops down.
//!
//! # Example
//!
//! ```no_run
//! use artnet::{CancelToken, Node, Style};
//!
//! let mut node = Node::new("gateway-1", Style::Node, "2.0.0.10".parse().unwrap());
//! let cancel = CancelToken::new();
//! node.start(cancel.clone()).unwrap();
//! // ... the node now answers discovery polls ...
//! cancel.cancel();
//! ```

use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::config::NodeConfig;
use crate::error::{Error, Result};
use crate::packet::code::{OpCode, Style};
use crate::packet::{ArtPoll, Packet, ARTNET_PORT};
use crate::types::CancelToken;

/// Depth of the outbound queue. Bounded so an enqueue under a lock can
/// never wedge on kernel syscall latency.
const SEND_QUEUE_DEPTH: usize = 64;

/// How long blocking socket and queue waits run before re-checking the
/// cancellation token.
const WAKE_INTERVAL: Duration = Duration::from_millis(250);

/// The default directed broadcast address for a 2.x.x.x primary network.
pub const DEFAULT_BROADCAST: Ipv4Addr = Ipv4Addr::new(2, 255, 255, 255);

/// Called by the receive loop for every decoded packet of the registered
/// opcode.
pub type PacketHandler = Box<dyn Fn(Packet) + Send + 'static>;

// =============================================================================
// Options
// =============================================================================

/// Socket configuration for a [`Node`].
#[derive(Debug, Clone)]
pub struct NodeOptions {
    /// Local bind address. Defaults to `0.0.0.0:6454`.
    pub listen_address: SocketAddr,
    /// Where broadcasts are sent. Defaults to `2.255.255.255:6454`.
    pub broadcast_address: SocketAddr,
}

impl Default for NodeOptions {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), ARTNET_PORT),
            broadcast_address: SocketAddr::new(IpAddr::V4(DEFAULT_BROADCAST), ARTNET_PORT),
        }
    }
}

impl NodeOptions {
    /// Set the local bind address (builder pattern).
    pub fn with_listen_address(mut self, address: SocketAddr) -> Self {
        self.listen_address = address;
        self
    }

    /// Set the broadcast destination (builder pattern).
    pub fn with_broadcast_address(mut self, address: SocketAddr) -> Self {
        self.broadcast_address = address;
        self
    }
}

// =============================================================================
// NodeSender
// =============================================================================

/// A cheap, cloneable handle for enqueueing outbound packets.
///
/// Enqueueing is best-effort: when the queue is full or the node has
/// shut down the packet is dropped and logged, matching the rest of the
/// data plane.
#[derive(Clone)]
pub struct NodeSender {
    queue: SyncSender<(SocketAddr, Packet)>,
    broadcast_address: SocketAddr,
}

impl NodeSender {
    /// Enqueues a packet for unicast transmission.
    pub fn send_to(&self, destination: SocketAddr, packet: Packet) {
        match self.queue.try_send((destination, packet)) {
            Ok(()) => {}
            Err(TrySendError::Full((_, packet))) => {
                log::warn!(
                    "outbound queue full, dropping {} to {}",
                    packet.opcode(),
                    destination
                );
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("send loop gone, dropping packet to {}", destination);
            }
        }
    }

    /// Enqueues a packet for transmission to the broadcast address.
    pub fn broadcast(&self, packet: Packet) {
        self.send_to(self.broadcast_address, packet);
    }
}

// =============================================================================
// Node
// =============================================================================

/// An Art-Net device on the network: one socket, a handler registry and
/// the loops that keep discovery answered.
pub struct Node {
    config: NodeConfig,
    options: NodeOptions,
    handlers: HashMap<OpCode, PacketHandler>,
    send_tx: SyncSender<(SocketAddr, Packet)>,
    send_rx: Option<Receiver<(SocketAddr, Packet)>>,
    poll_rx: Option<Receiver<ArtPoll>>,
    local_addr: Option<SocketAddr>,
    handles: Vec<JoinHandle<()>>,
}

impl Node {
    /// Creates a node with the given identity and default options.
    pub fn new(name: impl Into<String>, style: Style, ip: Ipv4Addr) -> Self {
        Self::with_options(NodeConfig::new(name, style, ip), NodeOptions::default())
    }

    /// Creates a node from a full config and explicit socket options.
    pub fn with_options(config: NodeConfig, options: NodeOptions) -> Self {
        let (send_tx, send_rx) = mpsc::sync_channel(SEND_QUEUE_DEPTH);
        let (poll_tx, poll_rx) = mpsc::sync_channel(SEND_QUEUE_DEPTH);

        let mut node = Self {
            config,
            options,
            handlers: HashMap::new(),
            send_tx,
            send_rx: Some(send_rx),
            poll_rx: Some(poll_rx),
            local_addr: None,
            handles: Vec::new(),
        };

        // built-in discovery handler: forward polls to the responder loop
        node.handlers.insert(
            OpCode::Poll,
            Box::new(move |packet| {
                if let Packet::Poll(poll) = packet {
                    let _ = poll_tx.try_send(poll);
                }
            }),
        );

        node
    }

    /// The node's configuration.
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// The address the socket is bound to, once started. Useful when
    /// binding to an ephemeral port.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// A cloneable handle for enqueueing outbound packets.
    pub fn sender(&self) -> NodeSender {
        NodeSender {
            queue: self.send_tx.clone(),
            broadcast_address: self.options.broadcast_address,
        }
    }

    /// Registers the handler for an opcode. All registrations happen
    /// before [`Node::start`]; later calls fail.
    pub fn handle(&mut self, opcode: OpCode, handler: PacketHandler) -> Result<()> {
        if self.local_addr.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.handlers.insert(opcode, handler);
        Ok(())
    }

    /// Validates the config, binds the socket and spawns the receive,
    /// send and poll-responder loops. Returns once the loops are running;
    /// cancelling the token winds them down and closes the socket.
    pub fn start(&mut self, cancel: CancelToken) -> Result<()> {
        self.config.validate()?;

        let (send_rx, poll_rx) = match (self.send_rx.take(), self.poll_rx.take()) {
            (Some(s), Some(p)) => (s, p),
            _ => return Err(Error::AlreadyStarted),
        };

        let socket = bind_socket(self.options.listen_address)?;
        let local_addr = socket.local_addr()?;
        self.local_addr = Some(local_addr);
        let recv_socket = socket.try_clone()?;

        let handlers = std::mem::take(&mut self.handlers);
        let local_ip = self.config.ip;
        let sender = self.sender();
        let config = self.config.clone();

        log::debug!(
            "node {} ({}) listening on {}",
            config.name,
            config.style,
            local_addr
        );

        let recv_cancel = cancel.clone();
        self.handles.push(thread::spawn(move || {
            recv_loop(recv_socket, local_ip, handlers, recv_cancel);
        }));

        let send_cancel = cancel.clone();
        self.handles.push(thread::spawn(move || {
            send_loop(socket, send_rx, send_cancel);
        }));

        self.handles.push(thread::spawn(move || {
            poll_reply_loop(config, poll_rx, sender, cancel);
        }));

        // devices broadcast their presence on power up, ahead of any
        // poll; the config was validated above, so the reply builds
        if let Ok(reply) = self.config.to_poll_reply() {
            self.sender().broadcast(Packet::PollReply(reply));
        }

        Ok(())
    }
}

/// Builds the UDP socket: broadcast capable, address reuse for parallel
/// Art-Net applications on one host, and a short read timeout so the
/// receive loop can observe cancellation.
fn bind_socket(listen: SocketAddr) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_broadcast(true)?;
    socket.set_reuse_address(true)?;
    socket.bind(&SockAddr::from(listen))?;
    socket.set_read_timeout(Some(WAKE_INTERVAL))?;
    Ok(socket.into())
}

/// Blocking read, self-broadcast filtering, decode, dispatch.
fn recv_loop(
    socket: UdpSocket,
    local_ip: Ipv4Addr,
    handlers: HashMap<OpCode, PacketHandler>,
    cancel: CancelToken,
) {
    let mut buffer = [0u8; 4096];
    while !cancel.is_cancelled() {
        let (length, from) = match socket.recv_from(&mut buffer) {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                continue;
            }
            Err(e) => {
                if cancel.is_cancelled() {
                    return;
                }
                log::error!("failed to read from socket: {}", e);
                continue;
            }
        };

        // broadcasts loop back to us; ignore our own traffic
        if from.ip() == IpAddr::V4(local_ip) {
            continue;
        }

        let packet = match Packet::unmarshal(&buffer[..length]) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("dropping {} byte datagram from {}: {}", length, from, e);
                continue;
            }
        };

        match handlers.get(&packet.opcode()) {
            Some(handler) => handler(packet),
            None => log::debug!("ignoring unhandled {} from {}", packet.opcode(), from),
        }
    }
}

/// Drains the outbound queue onto the socket. Write errors are logged
/// and the loop continues; the socket closes when the loop returns.
fn send_loop(socket: UdpSocket, queue: Receiver<(SocketAddr, Packet)>, cancel: CancelToken) {
    loop {
        match queue.recv_timeout(WAKE_INTERVAL) {
            Ok((destination, packet)) => {
                let bytes = packet.marshal();
                if let Err(e) = socket.send_to(&bytes, destination) {
                    log::error!("error writing {} to {}: {}", packet.opcode(), destination, e);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // drain what was queued before shutdown, then let the socket close
    while let Ok((destination, packet)) = queue.try_recv() {
        let _ = socket.send_to(&packet.marshal(), destination);
    }
}

/// Answers each inbound ArtPoll by broadcasting a fresh ArtPollReply
/// built from the node's config.
fn poll_reply_loop(
    config: NodeConfig,
    polls: Receiver<ArtPoll>,
    sender: NodeSender,
    cancel: CancelToken,
) {
    // a periodic reply ticker belongs here once ReplyOnChange reporting
    // is implemented; polls are answered one for one until then
    loop {
        match polls.recv_timeout(WAKE_INTERVAL) {
            Ok(_poll) => match config.to_poll_reply() {
                Ok(reply) => sender.broadcast(Packet::PollReply(reply)),
                Err(e) => log::error!("cannot announce node: {}", e),
            },
            Err(RecvTimeoutError::Timeout) => {
                if cancel.is_cancelled() {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builders() {
        let listen: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let broadcast: SocketAddr = "10.255.255.255:6454".parse().unwrap();
        let options = NodeOptions::default()
            .with_listen_address(listen)
            .with_broadcast_address(broadcast);
        assert_eq!(options.listen_address, listen);
        assert_eq!(options.broadcast_address, broadcast);
    }

    #[test]
    fn test_default_options() {
        let options = NodeOptions::default();
        assert_eq!(options.listen_address.port(), ARTNET_PORT);
        assert_eq!(
            options.broadcast_address,
            "2.255.255.255:6454".parse().unwrap()
        );
    }

    #[test]
    fn test_handle_after_start_fails() {
        let options = NodeOptions::default()
            .with_listen_address("127.0.0.1:0".parse().unwrap());
        let config = NodeConfig::new("n", Style::Node, Ipv4Addr::new(2, 0, 0, 1));
        let mut node = Node::with_options(config, options);
        let cancel = CancelToken::new();
        node.start(cancel.clone()).unwrap();

        let result = node.handle(OpCode::Dmx, Box::new(|_| {}));
        assert!(matches!(result, Err(Error::AlreadyStarted)));
        cancel.cancel();
    }

    #[test]
    fn test_start_twice_fails() {
        let options = NodeOptions::default()
            .with_listen_address("127.0.0.1:0".parse().unwrap());
        let config = NodeConfig::new("n", Style::Node, Ipv4Addr::new(2, 0, 0, 1));
        let mut node = Node::with_options(config, options);
        let cancel = CancelToken::new();
        node.start(cancel.clone()).unwrap();
        assert!(matches!(
            node.start(cancel.clone()),
            Err(Error::AlreadyStarted)
        ));
        cancel.cancel();
    }

    #[test]
    fn test_invalid_config_refuses_to_start() {
        let mut config = NodeConfig::new("n", Style::Node, Ipv4Addr::new(2, 0, 0, 1));
        config.output_ports = (0..5)
            .map(|i| crate::config::OutputPort {
                address: crate::types::PortAddress::new(0, i),
                ..Default::default()
            })
            .collect();
        let options = NodeOptions::default()
            .with_listen_address("127.0.0.1:0".parse().unwrap());
        let mut node = Node::with_options(config, options);
        assert!(matches!(
            node.start(CancelToken::new()),
            Err(Error::Config(_))
        ));
    }
}
