//! Container construction and options.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::{Container, ContainerInner};
use crate::internal::ReentryPolicy;
use crate::observer::{Observers, ResolutionObserver};
use crate::registration::Registry;
use crate::traits::ServiceLocator;

static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Behavioural options of a container.
///
/// With the `config` feature the options can be read from JSON, see
/// [`ContainerOptions::from_json`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    /// Allow providers to call back into the container they are being
    /// resolved from. Off by default: such calls fail with
    /// [`DiError::Reentrant`](crate::DiError::Reentrant).
    pub allow_recursive_resolution: bool,
    /// How long a caller waits for another thread to finish activating a
    /// singleton before giving up.
    #[cfg_attr(
        feature = "config",
        serde(rename = "singleton_timeout_ms", with = "crate::config::millis")
    )]
    pub singleton_timeout: Duration,
    /// Bound on nested resolutions of one container on one thread when
    /// recursion is allowed.
    pub max_recursion_depth: usize,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            allow_recursive_resolution: false,
            singleton_timeout: Duration::from_secs(5),
            max_recursion_depth: 64,
        }
    }
}

impl ContainerOptions {
    pub(crate) fn reentry_policy(&self) -> ReentryPolicy {
        ReentryPolicy {
            allow_recursion: self.allow_recursive_resolution,
            max_depth: self.max_recursion_depth,
        }
    }
}

/// Builder for a [`Container`].
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, LoggingObserver};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let parent = Container::new();
/// let ioc = Container::builder()
///     .parent(Arc::new(parent))
///     .allow_recursive_resolution(true)
///     .singleton_timeout(Duration::from_millis(500))
///     .observer(Arc::new(LoggingObserver::new()))
///     .build();
///
/// assert!(ioc.options().allow_recursive_resolution);
/// assert!(ioc.has_parent());
/// ```
#[derive(Default)]
pub struct ContainerBuilder {
    options: ContainerOptions,
    parent: Option<Arc<dyn ServiceLocator + Send + Sync>>,
    observers: Observers,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_recursive_resolution(mut self, allow: bool) -> Self {
        self.options.allow_recursive_resolution = allow;
        self
    }

    pub fn singleton_timeout(mut self, timeout: Duration) -> Self {
        self.options.singleton_timeout = timeout;
        self
    }

    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.options.max_recursion_depth = depth;
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: ContainerOptions) -> Self {
        self.options = options;
        self
    }

    /// Falls back to `parent` when a service cannot be resolved locally.
    pub fn parent(mut self, parent: Arc<dyn ServiceLocator + Send + Sync>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn build(self) -> Container {
        let id = NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(container = id, has_parent = self.parent.is_some(), "container created");
        Container {
            inner: Arc::new(ContainerInner {
                id,
                registry: RwLock::new(Registry::new()),
                parent: self.parent,
                options: self.options,
                observers: self.observers,
            }),
        }
    }
}
