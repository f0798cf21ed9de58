//! Local address detection.

use std::io;
use std::net::{IpAddr, UdpSocket};

/// Detect the local IP address used for outbound traffic.
///
/// Connecting a UDP socket sends no packets; it only asks the OS routing
/// table which interface would carry traffic to a public address.
pub(crate) fn local_ip() -> io::Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.connect(("8.8.8.8", 80))?;
    Ok(socket.local_addr()?.ip())
}
