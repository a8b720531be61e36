//! The IoC container: binding registry, resolution entry points and
//! parent chaining.

mod binding;
mod builder;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

pub use binding::BindingBuilder;
pub use builder::{ContainerBuilder, ContainerOptions};

use crate::context::ResolutionContext;
use crate::descriptors::BindingDescriptor;
use crate::error::{DiError, DiResult};
use crate::internal::{self, ReentrancyGuard};
use crate::key::{BindingKey, Instance, ServiceType};
use crate::observer::Observers;
use crate::registration::{Registration, Registry};
use crate::traits::ServiceLocator;
use crate::Configuration;

/// Inversion-of-control container.
///
/// Holds bindings from `(type, key)` to providers and resolves services from
/// them. Types implementing [`Injectable`](crate::Injectable) that have no
/// binding are constructed by matching their constructors against what the
/// container can resolve. A container may have a parent it falls back to.
///
/// `Container` is a cheap handle: clones share the same registry.
///
/// Resolutions hold a shared lock on the registry for their whole duration,
/// binds take it exclusively. Concurrent resolutions never block each other.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{implements, Constructor, Container, Injectable, Resolver};
/// use std::sync::Arc;
///
/// trait Repository: Send + Sync {
///     fn find(&self, id: u32) -> String;
/// }
///
/// struct SqlRepository { url: Arc<String> }
/// impl Repository for SqlRepository {
///     fn find(&self, id: u32) -> String { format!("{}#{}", self.url, id) }
/// }
/// impl Injectable for SqlRepository {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|args| Ok(SqlRepository { url: args.next()? }))
///                 .keyed::<String>("db_url"),
///         ]
///     }
/// }
/// implements!(SqlRepository => dyn Repository);
///
/// struct UserService { repo: Arc<dyn Repository> }
/// impl Injectable for UserService {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|args| Ok(UserService { repo: args.next()? }))
///                 .param::<dyn Repository>(),
///         ]
///     }
/// }
///
/// let ioc = Container::new();
/// ioc.bind::<String>().keyed("db_url").to_instance(Arc::new("sql://db".to_string()));
/// ioc.bind::<dyn Repository>().single_instance().to::<SqlRepository>();
///
/// let service = ioc.resolve_injectable::<UserService>().unwrap();
/// assert_eq!(service.repo.find(7), "sql://db#7");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    id: u64,
    registry: RwLock<Registry>,
    parent: Option<Arc<dyn ServiceLocator + Send + Sync>>,
    options: ContainerOptions,
    observers: Observers,
}

impl Container {
    /// Creates a root container with default options.
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Creates a container that falls back to `parent`.
    pub fn with_parent(parent: Arc<dyn ServiceLocator + Send + Sync>) -> Self {
        ContainerBuilder::new().parent(parent).build()
    }

    /// Creates a child container of this one.
    ///
    /// The child starts empty, inherits this container's options and falls
    /// back to this container for anything it cannot resolve itself.
    /// Bindings in the child shadow the parent's for resolutions against the
    /// child.
    ///
    /// ```rust
    /// use ferrous_ioc::{Container, Resolver};
    /// use std::sync::Arc;
    ///
    /// let root = Container::new();
    /// root.bind::<String>().to_instance(Arc::new("root".to_string()));
    /// root.bind::<u8>().to_instance(Arc::new(1));
    ///
    /// let child = root.child();
    /// child.bind::<u8>().to_instance(Arc::new(2));
    ///
    /// assert_eq!(*child.resolve::<String>().unwrap(), "root");
    /// assert_eq!(*child.resolve::<u8>().unwrap(), 2);
    /// assert_eq!(*root.resolve::<u8>().unwrap(), 1);
    /// ```
    pub fn child(&self) -> Container {
        ContainerBuilder::new()
            .options(self.inner.options.clone())
            .parent(Arc::new(self.clone()))
            .build()
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    pub fn has_parent(&self) -> bool {
        self.inner.parent.is_some()
    }

    pub(crate) fn parent(&self) -> Option<&Arc<dyn ServiceLocator + Send + Sync>> {
        self.inner.parent.as_ref()
    }

    /// Starts a binding for service type `T`.
    ///
    /// # Panics
    ///
    /// Registering the binding panics when called from a provider that runs
    /// inside a resolution on this same container and thread, since the
    /// registry is locked for that resolution.
    pub fn bind<T: ?Sized + Send + Sync + 'static>(&self) -> BindingBuilder<'_, T> {
        BindingBuilder::new(self)
    }

    /// Registers `value` as the singleton [`Configuration<T>`].
    ///
    /// ```rust
    /// use ferrous_ioc::{Configuration, Container, Resolver};
    ///
    /// struct SmtpOptions { host: String }
    ///
    /// let ioc = Container::new();
    /// ioc.configure(SmtpOptions { host: "mail.local".into() });
    ///
    /// let options = ioc.resolve::<Configuration<SmtpOptions>>().unwrap();
    /// assert_eq!(options.value().host, "mail.local");
    /// ```
    pub fn configure<T: Send + Sync + 'static>(&self, value: T) -> &Self {
        self.bind::<Configuration<T>>()
            .single_instance()
            .to_instance(Arc::new(Configuration::new(value)))
    }

    /// Registers `value` as the singleton [`Configuration<T>`] under `key`.
    pub fn configure_keyed<T: Send + Sync + 'static>(&self, key: impl Into<Arc<str>>, value: T) -> &Self {
        self.bind::<Configuration<T>>()
            .keyed(key)
            .single_instance()
            .to_instance(Arc::new(Configuration::new(value)))
    }

    /// Whether this container has an exact binding for `(T, key)`.
    ///
    /// The parent is not consulted.
    pub fn is_bound<T: ?Sized + 'static>(&self, key: Option<&str>) -> bool {
        self.inner
            .registry
            .read_recursive()
            .get(&ServiceType::of::<T>(), key)
            .is_some()
    }

    /// Descriptors of all local bindings, in registration order.
    pub fn binding_descriptors(&self) -> Vec<BindingDescriptor> {
        self.inner
            .registry
            .read_recursive()
            .iter()
            .map(|registration| BindingDescriptor {
                key: registration.binding.clone(),
                lifetime: registration.lifetime,
                implementation: registration.implementation,
                singleton_state: registration.singleton.as_ref().map(|cell| cell.state()),
            })
            .collect()
    }

    /// Number of local bindings.
    pub fn binding_count(&self) -> usize {
        self.inner.registry.read_recursive().len()
    }

    /// Dumps the registry for debugging.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let registry = self.inner.registry.read_recursive();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Container #{} ({} bindings, parent: {})",
            self.inner.id,
            registry.len(),
            if self.has_parent() { "yes" } else { "no" }
        );
        for registration in registry.iter() {
            let _ = write!(out, "  {} [{:?}]", registration.binding, registration.lifetime);
            if let Some(implementation) = registration.implementation {
                let _ = write!(out, " => {}", implementation);
            }
            if let Some(cell) = &registration.singleton {
                let _ = write!(out, " ({:?})", cell.state());
            }
            out.push('\n');
        }
        out
    }

    pub(crate) fn register(&self, registration: Registration) {
        if internal::is_resolving(self.inner.id) {
            panic!(
                "cannot bind {} while this thread is resolving on the same container; \
                 register bindings before resolving",
                registration.binding
            );
        }
        let binding = registration.binding.clone();
        let lifetime = registration.lifetime;
        let replaced = self.inner.registry.write().insert(registration);
        tracing::debug!(service = %binding, ?lifetime, replaced, "binding registered");
    }

    /// Enters a resolution on this container and runs `f` with a fresh
    /// context holding the registry read lock.
    fn with_context<R>(
        &self,
        binding: &BindingKey,
        f: impl FnOnce(&ResolutionContext<'_>) -> DiResult<R>,
    ) -> DiResult<R> {
        let guard = ReentrancyGuard::enter(self.inner.id, self.inner.options.reentry_policy(), || {
            binding.to_string()
        })?;
        // A queued writer must not block a permitted nested read.
        let registry = if guard.is_nested() {
            self.inner.registry.read_recursive()
        } else {
            self.inner.registry.read()
        };
        let ctx = ResolutionContext::new(self, &registry);
        f(&ctx)
    }

    fn observe<R>(&self, binding: &BindingKey, f: impl FnOnce() -> DiResult<R>) -> DiResult<R> {
        let observers = &self.inner.observers;
        let started = observers.has_observers().then(|| {
            observers.resolving(binding);
            Instant::now()
        });

        let result = f();
        match &result {
            Ok(_) => {
                if let Some(started) = started {
                    observers.resolved(binding, started.elapsed());
                }
            }
            Err(err) => {
                if matches!(err, DiError::Activation { .. }) {
                    tracing::error!(service = %binding, error = %err, "activation failed");
                } else {
                    tracing::debug!(service = %binding, error = %err, "resolution failed");
                }
                observers.failed(binding, err);
            }
        }
        result
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("id", &self.inner.id)
            .field("bindings", &self.binding_count())
            .field("has_parent", &self.has_parent())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl ServiceLocator for Container {
    fn resolve_service(&self, service: &ServiceType, key: Option<&str>) -> DiResult<Instance> {
        let binding = BindingKey::new(*service, key.map(Arc::from));
        let span = tracing::debug_span!("resolve", container = self.inner.id, service = %binding);
        let _entered = span.enter();

        self.observe(&binding, || {
            self.with_context(&binding, |ctx| ctx.resolve_top(service, key))
        })
    }

    fn resolve_all_services(&self, service: &ServiceType) -> DiResult<Vec<Instance>> {
        let binding = BindingKey::new(*service, None);
        let span = tracing::debug_span!("resolve_all", container = self.inner.id, service = %service);
        let _entered = span.enter();

        self.observe(&binding, || {
            self.with_context(&binding, |ctx| ctx.resolve_all(service))
        })
    }
}
