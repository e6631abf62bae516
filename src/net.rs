use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort guess of the address other hosts can reach us on
///
/// Asks the OS which interface would route to a public address. Nothing is
/// actually sent. Falls back to loopback.
pub fn local_ip() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
