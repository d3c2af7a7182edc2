use std::{cell::RefCell, marker::PhantomData, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

mod errors;
pub use self::errors::{BackendError, DrainError, TimerError};

mod local;
pub use self::local::LocalStoreDrain;

mod log_drain;
pub use self::log_drain::{LogDrain, LogOutput};

mod null;
pub use self::null::NullDrain;

use crate::Metric;

static GLOBAL_DRAINER: Lazy<RwLock<Arc<dyn Drainer>>> = Lazy::new(|| {
    let drainer: Arc<dyn Drainer> = Arc::new(LogDrain::new());
    RwLock::new(drainer)
});

thread_local! {
    static LOCAL_DRAINER: RefCell<Option<Arc<dyn Drainer>>> = RefCell::new(None);
}

/// A trait for forwarding metrics to an output.
///
/// This is the seam between the emission API ([`Namespace`][crate::Namespace],
/// [`Timer`][crate::Timer], and the free functions) and the backend that metrics end up in.
///
/// Draining is synchronous and happens exactly once per call: implementations must not retry or
/// buffer internally, and must report any failure to the caller.
pub trait Drainer: Send + Sync {
    /// Drains a metric.
    ///
    /// # Errors
    ///
    /// If the metric could not be forwarded to the backend, an error is returned. Callers should
    /// treat it as lost telemetry rather than as an operational failure.
    fn drain(&self, metric: Metric) -> Result<(), DrainError>;
}

// Blanket implementations.
macro_rules! impl_drainer {
    ($inner_ty:ident, $ptr_ty:ty) => {
        impl<$inner_ty> $crate::Drainer for $ptr_ty
        where
            $inner_ty: $crate::Drainer + ?Sized,
        {
            fn drain(&self, metric: $crate::Metric) -> Result<(), $crate::DrainError> {
                std::ops::Deref::deref(self).drain(metric)
            }
        }
    };
}

impl_drainer!(T, &T);
impl_drainer!(T, std::boxed::Box<T>);
impl_drainer!(T, std::sync::Arc<T>);

/// Guard for setting a local drainer.
///
/// The drainer stays installed for the current thread until the guard is dropped, at which point
/// whichever local drainer was installed before it is restored.
#[must_use]
pub struct LocalDrainerGuard {
    prev_drainer: Option<Arc<dyn Drainer>>,

    // Local drainers are per-thread, so the guard must be dropped on the thread that created it.
    _not_send: PhantomData<*const ()>,
}

impl LocalDrainerGuard {
    fn new(drainer: Arc<dyn Drainer>) -> Self {
        let prev_drainer = LOCAL_DRAINER.with(|local| local.borrow_mut().replace(drainer));
        Self { prev_drainer, _not_send: PhantomData }
    }
}

impl Drop for LocalDrainerGuard {
    fn drop(&mut self) {
        let prev_drainer = self.prev_drainer.take();
        LOCAL_DRAINER.with(|local| *local.borrow_mut() = prev_drainer);
    }
}

/// Sets the global drainer, returning the drainer it replaced.
///
/// Unlike a recorder in a set-once facade, the global drainer can be swapped at any time. Drains
/// that are already in flight finish against the drainer they started with.
pub fn set_global_drainer<D>(drainer: D) -> Arc<dyn Drainer>
where
    D: Drainer + 'static,
{
    set_global_drainer_arc(Arc::new(drainer))
}

/// Sets an already shared drainer as the global drainer, returning the drainer it replaced.
pub fn set_global_drainer_arc(drainer: Arc<dyn Drainer>) -> Arc<dyn Drainer> {
    let prev = std::mem::replace(&mut *GLOBAL_DRAINER.write(), drainer);
    debug!("replaced global drainer");
    prev
}

/// Gets the global drainer.
pub fn global_drainer() -> Arc<dyn Drainer> {
    GLOBAL_DRAINER.read().clone()
}

/// Sets the drainer as the default for the current thread for the lifetime of the returned
/// [`LocalDrainerGuard`].
///
/// Local drainers can be nested: when the guard drops, the previously installed local drainer, if
/// any, is restored. While no local drainer is installed, the global drainer is used.
pub fn set_default_local_drainer<D>(drainer: D) -> LocalDrainerGuard
where
    D: Drainer + 'static,
{
    LocalDrainerGuard::new(Arc::new(drainer))
}

/// Runs the closure with the given drainer installed as the local drainer for the current thread.
pub fn with_local_drainer<D, T>(drainer: D, f: impl FnOnce() -> T) -> T
where
    D: Drainer + 'static,
{
    let _local = set_default_local_drainer(drainer);
    f()
}

/// Runs the closure with a reference to the current drainer.
///
/// If a local drainer has been set for this thread, it is used. Otherwise, the global drainer is
/// used.
pub fn with_drainer<T>(f: impl FnOnce(&dyn Drainer) -> T) -> T {
    // Clone out of the cell so the drainer can itself install or swap drainers.
    let drainer = LOCAL_DRAINER.with(|local| local.borrow().clone()).unwrap_or_else(global_drainer);
    f(drainer.as_ref())
}

/// Drains a metric to the current drainer.
pub fn drain(metric: Metric) -> Result<(), DrainError> {
    with_drainer(|drainer| drainer.drain(metric))
}
