//! Diagnostic observers for resolution events.
//!
//! Observers are notified around every top-level resolution on a container
//! (nested resolutions made by providers through their
//! [`ResolutionContext`](crate::ResolutionContext) are part of the outer
//! call and are not reported separately).

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;
use crate::key::BindingKey;

/// Observer of resolution events.
///
/// Calls are made synchronously on the resolving thread. Keep
/// implementations cheap.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{BindingKey, Container, DiError, ResolutionObserver, Resolver};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counter {
///     resolved: AtomicUsize,
///     failed: AtomicUsize,
/// }
///
/// impl ResolutionObserver for Counter {
///     fn resolving(&self, _binding: &BindingKey) {}
///
///     fn resolved(&self, _binding: &BindingKey, _elapsed: Duration) {
///         self.resolved.fetch_add(1, Ordering::SeqCst);
///     }
///
///     fn failed(&self, _binding: &BindingKey, _error: &DiError) {
///         self.failed.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// let ioc = Container::builder().observer(counter.clone()).build();
/// ioc.bind::<u8>().to_instance(Arc::new(1));
///
/// ioc.resolve::<u8>().unwrap();
/// assert!(ioc.resolve::<u16>().is_err());
///
/// assert_eq!(counter.resolved.load(Ordering::SeqCst), 1);
/// assert_eq!(counter.failed.load(Ordering::SeqCst), 1);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before planning starts.
    fn resolving(&self, binding: &BindingKey);

    /// Called after the instance was produced.
    ///
    /// `elapsed` covers planning and activation.
    fn resolved(&self, binding: &BindingKey, elapsed: Duration);

    /// Called when the resolution failed. The error is still returned to the
    /// caller afterwards.
    fn failed(&self, binding: &BindingKey, error: &DiError);
}

/// Registered observers of one container.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ResolutionObserver>>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, binding: &BindingKey) {
        for observer in &self.observers {
            observer.resolving(binding);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, binding: &BindingKey, elapsed: Duration) {
        for observer in &self.observers {
            observer.resolved(binding, elapsed);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, binding: &BindingKey, error: &DiError) {
        for observer in &self.observers {
            observer.failed(binding, error);
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// Successful resolutions are logged at `DEBUG`, failures at `WARN`, all
/// under the `ferrous_ioc::resolution` target. The prefix is attached to
/// every event as a `prefix` field.
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{Container, LoggingObserver};
/// use std::sync::Arc;
///
/// let ioc = Container::builder()
///     .observer(Arc::new(LoggingObserver::new()))
///     .build();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-ioc]".to_string(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, binding: &BindingKey) {
        tracing::trace!(target: "ferrous_ioc::resolution", prefix = %self.prefix, service = %binding, "resolving");
    }

    fn resolved(&self, binding: &BindingKey, elapsed: Duration) {
        tracing::debug!(
            target: "ferrous_ioc::resolution",
            prefix = %self.prefix,
            service = %binding,
            ?elapsed,
            "resolved"
        );
    }

    fn failed(&self, binding: &BindingKey, error: &DiError) {
        tracing::warn!(
            target: "ferrous_ioc::resolution",
            prefix = %self.prefix,
            service = %binding,
            %error,
            "resolution failed"
        );
    }
}
