//! Count, sample, measure, and time code, one observation at a time.
//!
//! `metrics-l2met` turns each observation into a [`Metric`] and hands it straight to a [`Drainer`],
//! which forwards it to an output: a log stream in the [l2met] format, a statsd server, or an
//! in-memory store for tests. Nothing is aggregated or buffered along the way.
//!
//! # Metric kinds
//!
//! - a **count** is a monotonic delta, usually `1`: `count#user.signup=1`
//! - a **sample** is a point-in-time value: `sample#goroutine=12`
//! - a **measure** is a point-in-time measurement, often a duration: `measure#request.time=6ms`
//!
//! # Emission
//!
//! Metrics are emitted through a [`Namespace`], which prefixes their names, or through the free
//! functions [`count`], [`sample`], [`measure`], and [`time`], which use the default namespace:
//!
//! ```
//! # use metrics_l2met::{set_default_local_drainer, LocalStoreDrain, Namespace};
//! # let store = LocalStoreDrain::new();
//! # let _guard = set_default_local_drainer(store.clone());
//! metrics_l2met::count("user.signup", 1)?;
//! metrics_l2met::sample("goroutine", 12, "")?;
//!
//! let memcached = Namespace::new("memcached");
//! memcached.count("hits", 1)?;
//! memcached.measure("get.time", 3, "ms")?;
//!
//! let timer = memcached.time("set.time");
//! // ... talk to memcached ...
//! timer.done()?;
//! # assert_eq!(store.get("memcached.hits").len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Emitting a metric returns any error from the drainer. Drain failures are lost telemetry, not
//! operational failures: the log, null, and local-store drainers never fail, and nothing in this
//! crate panics when a drainer does.
//!
//! # Drainers
//!
//! The drainer that metrics go to is resolved on every emission:
//!
//! - a drainer installed for the current thread with [`set_default_local_drainer`] or
//!   [`with_local_drainer`], if any
//! - otherwise, the global drainer, set with [`set_global_drainer`] or a [`Builder`]
//!
//! The global drainer starts out as a [`LogDrain`] writing to standard output, and can be swapped
//! at any time.
//!
//! [l2met]: https://github.com/ryandotsmith/l2met
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), deny(rustdoc::broken_intra_doc_links))]

mod config;
pub use self::config::{clear_source, set_source, source, Builder};

mod drainer;
pub use self::drainer::{
    drain, global_drainer, set_default_local_drainer, set_global_drainer, set_global_drainer_arc,
    with_drainer, with_local_drainer, BackendError, DrainError, Drainer, LocalDrainerGuard,
    LocalStoreDrain, LogDrain, LogOutput, NullDrain, TimerError,
};

mod formatter;
pub use self::formatter::{format_l2met, Formatter, L2metFormatter};

mod metric;
pub use self::metric::{Metric, MetricKind, Value};

mod namespace;
pub use self::namespace::{
    count, default_namespace, measure, sample, set_default_namespace, time, Namespace,
};

mod template;
pub use self::template::{NameTemplate, TemplateError};

mod timer;
pub use self::timer::Timer;

pub use quanta::Clock;
