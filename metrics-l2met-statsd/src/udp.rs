use std::{
    io,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket},
    time::Duration,
};

use metrics_l2met::BackendError;
use tracing::{debug, trace};

use crate::StatsdClient;

#[derive(Clone, Copy)]
enum MetricType {
    Counter,
    Gauge,
    Timing,
}

impl MetricType {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            MetricType::Counter => b"|c",
            MetricType::Gauge => b"|g",
            MetricType::Timing => b"|ms",
        }
    }
}

/// A [`StatsdClient`] that sends each metric as its own UDP datagram, in the plain statsd line
/// protocol: `<prefix><name>:<value>|<type>`.
#[derive(Debug)]
pub struct UdpStatsdClient {
    socket: UdpSocket,
    prefix: String,
}

impl UdpStatsdClient {
    /// Creates a new `UdpStatsdClient` sending to the given address.
    ///
    /// # Errors
    ///
    /// If the address cannot be resolved, or the socket cannot be bound or connected, an error is
    /// returned.
    pub fn new<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        Self::with_write_timeout(addr, None)
    }

    /// Creates a new `UdpStatsdClient` sending to the given address, with a write timeout.
    ///
    /// A zero timeout is treated as no timeout.
    ///
    /// # Errors
    ///
    /// If the address cannot be resolved, or the socket cannot be bound or connected, an error is
    /// returned.
    pub fn with_write_timeout<A: ToSocketAddrs>(
        addr: A,
        write_timeout: Option<Duration>,
    ) -> io::Result<Self> {
        let addrs = addr.to_socket_addrs()?.collect::<Vec<_>>();
        let first = addrs.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        })?;

        let local: SocketAddr = if first.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)?;
        socket.connect(&addrs[..])?;
        socket.set_write_timeout(write_timeout.filter(|t| !t.is_zero()))?;
        debug!(remote_addr = ?socket.peer_addr().ok(), "statsd client connected");

        Ok(UdpStatsdClient { socket, prefix: String::new() })
    }

    /// Sets a prefix prepended verbatim to every metric name.
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Gets the address of the statsd server.
    pub fn remote_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }

    fn send(&self, name: &str, value: i64, metric_type: MetricType) -> Result<(), BackendError> {
        let mut int_writer = itoa::Buffer::new();
        let value = int_writer.format(value);

        let suffix = metric_type.as_bytes();
        let mut buf =
            Vec::with_capacity(self.prefix.len() + name.len() + 1 + value.len() + suffix.len());
        buf.extend_from_slice(self.prefix.as_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.push(b':');
        buf.extend_from_slice(value.as_bytes());
        buf.extend_from_slice(suffix);

        match self.socket.send(&buf) {
            Ok(n) => {
                trace!(bytes = n, "sent statsd payload");
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "failed to send statsd payload");
                Err(e.into())
            }
        }
    }
}

impl StatsdClient for UdpStatsdClient {
    fn incr(&self, name: &str, count: i64) -> Result<(), BackendError> {
        self.send(name, count, MetricType::Counter)
    }

    fn gauge(&self, name: &str, value: i64) -> Result<(), BackendError> {
        self.send(name, value, MetricType::Gauge)
    }

    fn timing(&self, name: &str, ms: i64) -> Result<(), BackendError> {
        self.send(name, ms, MetricType::Timing)
    }
}
