use std::{
    io,
    net::{SocketAddr, ToSocketAddrs as _},
    time::Duration,
};

use metrics_l2met::{NameTemplate, TemplateError};
use thiserror::Error;
use tracing::debug;

use crate::{StatsdDrain, UdpStatsdClient};

const DEFAULT_TEMPLATE: &str = "{{.Name}}";
const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Errors that could occur while building or installing a statsd drain.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Failed to parse the remote address.
    #[error("invalid remote address: {reason}")]
    InvalidRemoteAddress {
        /// Details about the parsing failure.
        reason: String,
    },

    /// Failed to parse the name template.
    #[error("invalid name template: {0}")]
    Template(#[from] TemplateError),

    /// Failed to create the UDP socket.
    #[error("failed to create statsd client: {0}")]
    Io(#[from] io::Error),
}

/// Builder for a statsd drain.
pub struct StatsdBuilder {
    remote_addr: Vec<SocketAddr>,
    template: Option<NameTemplate>,
    prefix: String,
    write_timeout: Duration,
    source: Option<String>,
}

impl StatsdBuilder {
    /// Set the remote address to send metrics to, in the format of `<host>:<port>`.
    ///
    /// Defaults to `127.0.0.1:8125`.
    ///
    /// # Errors
    ///
    /// If the given address cannot be resolved, an error is returned indicating the reason.
    pub fn with_remote_address<A: AsRef<str>>(mut self, addr: A) -> Result<Self, BuildError> {
        self.remote_addr = resolve(addr.as_ref())?;
        Ok(self)
    }

    /// Set the template used to render the name of each metric.
    ///
    /// Defaults to `{{.Name}}`.
    ///
    /// # Errors
    ///
    /// If the template cannot be parsed, an error is returned.
    pub fn with_template<T: AsRef<str>>(mut self, template: T) -> Result<Self, BuildError> {
        self.template = Some(NameTemplate::parse(template.as_ref())?);
        Ok(self)
    }

    /// Set a prefix prepended verbatim to every rendered name.
    ///
    /// Defaults to no prefix.
    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the write timeout for sending metrics.
    ///
    /// A zero timeout disables it, letting sends block. Defaults to 1 second.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the source exposed to the template as `{{.Source}}`.
    ///
    /// Defaults to the global source.
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Builds the drain.
    ///
    /// # Errors
    ///
    /// If the UDP socket cannot be created, an error is returned.
    pub fn build(self) -> Result<StatsdDrain<UdpStatsdClient>, BuildError> {
        let template = match self.template {
            Some(template) => template,
            None => NameTemplate::parse(DEFAULT_TEMPLATE)?,
        };

        let client =
            UdpStatsdClient::with_write_timeout(&self.remote_addr[..], Some(self.write_timeout))?
                .with_prefix(self.prefix);

        let drain = StatsdDrain::with_template(client, template);
        Ok(match self.source {
            Some(source) => drain.with_source(source),
            None => drain,
        })
    }

    /// Builds the drain and installs it as the global drainer.
    ///
    /// # Errors
    ///
    /// If the UDP socket cannot be created, an error is returned.
    pub fn install(self) -> Result<(), BuildError> {
        let drain = self.build()?;
        debug!(template = %drain.template(), "installing statsd drain");
        metrics_l2met::set_global_drainer(drain);
        Ok(())
    }
}

impl Default for StatsdBuilder {
    fn default() -> Self {
        StatsdBuilder {
            remote_addr: vec![SocketAddr::from(([127, 0, 0, 1], 8125))],
            template: None,
            prefix: String::new(),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            source: None,
        }
    }
}

fn resolve(addr: &str) -> Result<Vec<SocketAddr>, BuildError> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|e| BuildError::InvalidRemoteAddress { reason: e.to_string() })?
        .collect::<Vec<_>>();

    if addrs.is_empty() {
        return Err(BuildError::InvalidRemoteAddress {
            reason: format!("'{}' did not resolve to any address", addr),
        });
    }

    Ok(addrs)
}
