//! Discover nodes and sweep a colour across every universe they own.
//!
//! Run with: cargo run --example controller

use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::thread;
use std::time::Duration;

use artnet::{CancelToken, Controller, ControllerOptions, ARTNET_PORT};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let ip = local_ip().expect("no routable IPv4 interface");
    println!("controller on {}, polling the limited broadcast", ip);

    let options = ControllerOptions::default()
        .with_broadcast_address((Ipv4Addr::BROADCAST, ARTNET_PORT).into())
        .with_max_fps(40);
    let mut controller = Controller::new("console-1", ip, options);

    let cancel = CancelToken::new();
    controller.start(cancel.clone()).expect("start controller");

    // let a poll cycle complete before expecting any nodes
    thread::sleep(Duration::from_secs(3));

    let mut hue = 0f32;
    loop {
        hue = (hue + 0.4) % 360.0;
        let (r, g, b) = hsv_to_rgb(hue, 1.0, 0.2);

        let mut frame = [0u8; 512];
        for chunk in frame.chunks_exact_mut(3) {
            chunk[0] = r;
            chunk[1] = g;
            chunk[2] = b;
        }

        controller.range_all(|ip, address| {
            if let Err(e) = controller.send_dmx(ip, address, frame) {
                eprintln!("send_dmx {} {}: {}", ip, address, e);
            }
        });

        thread::sleep(Duration::from_millis(25));
    }
}

/// Connecting a UDP socket makes the OS pick the outbound interface;
/// no packet is sent.
fn local_ip() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) => Some(ip),
        IpAddr::V6(_) => None,
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 / 60 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}
