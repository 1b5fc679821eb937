// transport.rs: one UDP exchange per request
//
// A socket is bound, connected, used for a single request (with retries) and
// dropped. Nothing is pooled: a failed exchange leaves nothing behind that a
// later exchange could trip over.

use std::future::Future;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

use crate::ber;
use crate::error::{Result, SnmpError};

/// Largest datagram an agent can send back.
const MAX_DATAGRAM: usize = 65_507;

// ── Request ids ─────────────────────────────────────────────────────────────

static REQUEST_ID: LazyLock<AtomicI32> = LazyLock::new(|| {
    use std::time::{SystemTime, UNIX_EPOCH};
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as i32)
        .unwrap_or(1);
    AtomicI32::new(t.wrapping_add(std::process::id() as i32) & 0x3fff_ffff)
});

/// Process-unique, never zero.
pub fn alloc_request_id() -> i32 {
    loop {
        let id = REQUEST_ID.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}

// ── Seam ────────────────────────────────────────────────────────────────────

/// Sends one encoded request and returns the datagram answering it.
pub trait Transport: Send + Sync {
    fn exchange(&self, request_id: i32, request: &[u8]) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Human-readable peer, used in error messages.
    fn peer(&self) -> String;
}

// ── UDP ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct UdpTransport {
    target: Target,
    timeout: Duration,
    retries: u32,
}

impl UdpTransport {
    pub fn new(target: Target, timeout: Duration, retries: u32) -> Self {
        Self { target, timeout, retries }
    }

    async fn resolve(&self) -> Result<SocketAddr> {
        let Target { host, port } = &self.target;
        let mut addrs = tokio::net::lookup_host((host.as_str(), *port))
            .await
            .map_err(|source| SnmpError::Resolve { host: host.clone(), port: *port, source })?;
        addrs
            .next()
            .ok_or_else(|| SnmpError::NoAddress { host: host.clone(), port: *port })
    }
}

impl Transport for UdpTransport {
    async fn exchange(&self, request_id: i32, request: &[u8]) -> Result<Vec<u8>> {
        let peer = self.resolve().await?;
        let local: SocketAddr = match peer {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;

        let mut buf = vec![0u8; MAX_DATAGRAM];
        let attempts = self.retries + 1;
        for attempt in 1..=attempts {
            socket.send(request).await?;
            let deadline = Instant::now() + self.timeout;
            loop {
                let n = match timeout_at(deadline, socket.recv(&mut buf)).await {
                    Err(_) => {
                        debug!("{}: request {} attempt {}/{} timed out", peer, request_id, attempt, attempts);
                        break;
                    }
                    Ok(res) => res?,
                };
                if ber::peek_request_id(&buf[..n]) == Some(request_id) {
                    return Ok(buf[..n].to_vec());
                }
                debug!("{}: discarding datagram not matching request {}", peer, request_id);
            }
        }
        Err(SnmpError::Timeout { target: self.target.to_string(), attempts })
    }

    fn peer(&self) -> String {
        self.target.to_string()
    }
}
