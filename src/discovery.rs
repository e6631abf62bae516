use crate::error::Result;
use crate::types::SERVICE_TYPE;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::sleep;
use uuid::Uuid;

/// SSDP multicast group
pub const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// SSDP port
pub const SSDP_PORT: u16 = 1900;

/// Upper bound on how long the device waits before answering a search
pub const MAX_RESPONSE_DELAY: Duration = Duration::from_secs(2);

/// Advertisement lifetime in seconds
const MAX_AGE: u32 = 1800;

const SERVER_ID: &str = "Linux/3.10 UPnP/1.0 SamsungUPnP/1.0";
const SEARCH_VERB: &str = "M-SEARCH";
const DISCOVER_KEYWORD: &str = "ssdp:discover";
const ALL_SERVICES: &str = "ssdp:all";
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);
const MAX_DATAGRAM: usize = 65507;

/// An admitted discovery search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Raw `MX` hint in seconds, if present and numeric
    pub max_wait: Option<i64>,
}

impl SearchRequest {
    /// Filter a datagram down to searches this device should answer
    ///
    /// Returns `None` unless the text is an `M-SEARCH` carrying `ssdp:discover`
    /// and targeting either our service type or `ssdp:all`.
    pub fn parse(text: &str) -> Option<Self> {
        if !text.contains(SEARCH_VERB) || !text.contains(DISCOVER_KEYWORD) {
            return None;
        }
        if !text.contains(SERVICE_TYPE) && !text.contains(ALL_SERVICES) {
            return None;
        }

        let max_wait = text
            .split("\r\n")
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.trim().eq_ignore_ascii_case("MX").then_some(value)
            })
            .last()
            .and_then(|value| value.trim().parse::<i64>().ok());

        Some(Self { max_wait })
    }

    /// Delay before replying: the smaller of the hint and `cap`
    ///
    /// Negative hints mean no wait at all.
    pub fn delay(&self, cap: Duration) -> Duration {
        match self.max_wait {
            Some(secs) => Duration::from_secs(secs.max(0).unsigned_abs()).min(cap),
            None => cap,
        }
    }
}

/// What the device advertises in response to a search
#[derive(Debug, Clone)]
pub struct Advertisement {
    location: String,
}

impl Advertisement {
    /// Advertise the description document served at `host:port`
    pub fn new(host: impl std::fmt::Display, port: u16) -> Self {
        Self {
            location: format!("http://{}:{}/description.xml", host, port),
        }
    }

    /// The `LOCATION` URL
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Render a search response with a freshly generated USN
    pub fn render(&self) -> String {
        let usn = format!("uuid:{}::{}", Uuid::new_v4(), SERVICE_TYPE);
        format!(
            "HTTP/1.1 200 OK\r\n\
             ST: {}\r\n\
             USN: {}\r\n\
             LOCATION: {}\r\n\
             CACHE-CONTROL: max-age={}\r\n\
             SERVER: {}\r\n\
             \r\n",
            SERVICE_TYPE, usn, self.location, MAX_AGE, SERVER_ID
        )
    }
}

/// Multicast search responder
///
/// Each admitted search is answered from its own task after its delay, so a
/// slow reply never holds up the receive loop.
pub struct DiscoveryResponder {
    socket: Arc<UdpSocket>,
    advertisement: Arc<Advertisement>,
    max_delay: Duration,
}

impl DiscoveryResponder {
    /// Bind the SSDP port and join the multicast group
    ///
    /// Fails if the port cannot be bound; the caller decides whether that is
    /// fatal. Failing to join the group is only logged.
    pub async fn bind(port: u16, advertisement: Advertisement) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
        socket.bind(&bind_addr.into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        if let Err(e) = socket.join_multicast_v4(SSDP_MULTICAST_ADDR, Ipv4Addr::UNSPECIFIED) {
            tracing::warn!("Failed to join {}: {}", SSDP_MULTICAST_ADDR, e);
        }

        Ok(Self::from_socket(socket, advertisement))
    }

    /// Build a responder around an already bound socket
    pub fn from_socket(socket: UdpSocket, advertisement: Advertisement) -> Self {
        Self {
            socket: Arc::new(socket),
            advertisement: Arc::new(advertisement),
            max_delay: MAX_RESPONSE_DELAY,
        }
    }

    /// Override the device-side cap on response delay
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Address the responder is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive searches forever
    pub async fn run(self) {
        tracing::info!(
            "Discovery responder running on {}:{}, advertising {}",
            SSDP_MULTICAST_ADDR,
            self.socket.local_addr().map(|a| a.port()).unwrap_or(SSDP_PORT),
            self.advertisement.location()
        );

        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, src) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    tracing::warn!("Discovery receive error: {}", e);
                    sleep(RECV_RETRY_DELAY).await;
                    continue;
                }
            };

            let text = String::from_utf8_lossy(&buf[..len]);
            let Some(search) = SearchRequest::parse(&text) else {
                continue;
            };

            let delay = search.delay(self.max_delay);
            tracing::debug!("Search from {}, replying in {:?}", src, delay);

            let socket = self.socket.clone();
            let advertisement = self.advertisement.clone();
            tokio::spawn(async move {
                sleep(delay).await;
                let reply = advertisement.render();
                match socket.send_to(reply.as_bytes(), src).await {
                    Ok(_) => tracing::debug!("Search response sent to {}", src),
                    Err(e) => tracing::warn!("Failed to send search response to {}: {}", src, e),
                }
            });
        }
    }
}
