use metrics_l2met::BackendError;

/// A statsd client.
///
/// [`StatsdDrain`][crate::StatsdDrain] depends only on this narrow interface, and not on how the
/// client reaches the server.
pub trait StatsdClient: Send + Sync {
    /// Increments a counter.
    ///
    /// # Errors
    ///
    /// If the client fails to send the increment, an error is returned.
    fn incr(&self, name: &str, count: i64) -> Result<(), BackendError>;

    /// Sets a gauge.
    ///
    /// # Errors
    ///
    /// If the client fails to send the gauge, an error is returned.
    fn gauge(&self, name: &str, value: i64) -> Result<(), BackendError>;

    /// Records a timing, in milliseconds.
    ///
    /// # Errors
    ///
    /// If the client fails to send the timing, an error is returned.
    fn timing(&self, name: &str, ms: i64) -> Result<(), BackendError>;
}

macro_rules! impl_statsd_client {
    ($inner_ty:ident, $ptr_ty:ty) => {
        impl<$inner_ty> $crate::StatsdClient for $ptr_ty
        where
            $inner_ty: $crate::StatsdClient + ?Sized,
        {
            fn incr(&self, name: &str, count: i64) -> Result<(), metrics_l2met::BackendError> {
                std::ops::Deref::deref(self).incr(name, count)
            }

            fn gauge(&self, name: &str, value: i64) -> Result<(), metrics_l2met::BackendError> {
                std::ops::Deref::deref(self).gauge(name, value)
            }

            fn timing(&self, name: &str, ms: i64) -> Result<(), metrics_l2met::BackendError> {
                std::ops::Deref::deref(self).timing(name, ms)
            }
        }
    };
}

impl_statsd_client!(T, &T);
impl_statsd_client!(T, std::boxed::Box<T>);
impl_statsd_client!(T, std::sync::Arc<T>);
