//! Fire one ArtDmx frame at a known node, no discovery involved.
//!
//! Run with: cargo run --example simple_dmx -- 2.231.20.36

use std::env;
use std::net::UdpSocket;

use artnet::packet::ArtDmx;
use artnet::{PortAddress, ARTNET_PORT};

fn main() {
    let target = env::args().nth(1).unwrap_or_else(|| "2.231.20.36".into());

    let socket = UdpSocket::bind("0.0.0.0:0").expect("bind socket");

    // channels 1 and 4 to full; on an RGB par this is red at full with
    // zero strobing
    let mut frame = [0u8; 512];
    frame[0] = 0xff;
    frame[3] = 0xff;

    let packet = ArtDmx::new(PortAddress::new(0, 0), frame, 1);
    let bytes = packet.marshal();

    match socket.send_to(&bytes, (target.as_str(), ARTNET_PORT)) {
        Ok(n) => println!("sent {} bytes to {}", n, target),
        Err(e) => eprintln!("error writing packet: {}", e),
    }
}
