//! A [`metrics-l2met`][metrics_l2met]-compatible drain for forwarding metrics to a statsd server.
//!
//! # Usage
//!
//! ```no_run
//! # use metrics_l2met_statsd::StatsdBuilder;
//! // Send to a statsd server on localhost, naming each metric after the host it came from.
//! StatsdBuilder::default()
//!     .with_remote_address("127.0.0.1:8125")?
//!     .with_template("{{.Name}}.{{.Source}}")?
//!     .with_source("web1")
//!     .install()?;
//!
//! metrics_l2met::count("user.signup", 1)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`StatsdDrain`] itself only depends on the [`StatsdClient`] trait, so any statsd client can be
//! plugged in with [`StatsdDrain::new`]. [`UdpStatsdClient`] is a minimal client speaking the
//! plain statsd line protocol over UDP.
//!
//! # Values
//!
//! statsd counters, gauges, and timings are integers, so only integer values can be drained:
//! floating-point and text values fail with [`DrainError::ValueInvalid`], and unsigned values that
//! do not fit in an `i64` fail with [`DrainError::ValueOverflow`].
//!
//! [`DrainError::ValueInvalid`]: metrics_l2met::DrainError::ValueInvalid
//! [`DrainError::ValueOverflow`]: metrics_l2met::DrainError::ValueOverflow
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod builder;
pub use self::builder::{BuildError, StatsdBuilder};

mod client;
pub use self::client::StatsdClient;

mod drain;
pub use self::drain::StatsdDrain;

mod udp;
pub use self::udp::UdpStatsdClient;
