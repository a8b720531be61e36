//! Fluent binding registration.

use std::marker::PhantomData;
use std::sync::Arc;

use super::Container;
use crate::constructor::Injectable;
use crate::context::ResolutionContext;
use crate::error::{BoxError, DiError};
use crate::key::{downcast, erase, BindingKey, ServiceCast, ServiceType};
use crate::lifetime::Lifetime;
use crate::registration::{Provider, Registration};

/// Pending binding for service type `T`.
///
/// Obtained from [`Container::bind`]. The binding is registered by one of
/// the terminal methods ([`to`](Self::to), [`to_factory`](Self::to_factory),
/// [`to_provider`](Self::to_provider) or [`to_instance`](Self::to_instance)),
/// each of which replaces any earlier binding for the same `(type, key)`.
#[must_use = "nothing is bound until one of the `to*` methods is called"]
pub struct BindingBuilder<'c, T: ?Sized> {
    container: &'c Container,
    key: Option<Arc<str>>,
    lifetime: Lifetime,
    _service: PhantomData<fn() -> Box<T>>,
}

impl<'c, T: ?Sized + Send + Sync + 'static> BindingBuilder<'c, T> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Self {
            container,
            key: None,
            lifetime: Lifetime::Transient,
            _service: PhantomData,
        }
    }

    /// Registers under `key` instead of the default binding.
    pub fn keyed(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Shorthand for `lifetime(Lifetime::Singleton)`.
    pub fn single_instance(self) -> Self {
        self.lifetime(Lifetime::Singleton)
    }

    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Binds to implementation type `C`, activated through the container.
    ///
    /// `C` is resolved from its own default binding if there is one and
    /// constructed from its constructors otherwise.
    ///
    /// ```rust
    /// use ferrous_ioc::{implements, Constructor, Container, Injectable, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Store: Send + Sync {
    ///     fn name(&self) -> &'static str;
    /// }
    ///
    /// struct MemoryStore;
    /// impl Store for MemoryStore {
    ///     fn name(&self) -> &'static str { "memory" }
    /// }
    /// impl Injectable for MemoryStore {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::new(|_| Ok(MemoryStore))]
    ///     }
    /// }
    /// implements!(MemoryStore => dyn Store);
    ///
    /// let ioc = Container::new();
    /// ioc.bind::<dyn Store>().single_instance().to::<MemoryStore>();
    ///
    /// let a = ioc.resolve::<dyn Store>().unwrap();
    /// let b = ioc.resolve::<dyn Store>().unwrap();
    /// assert_eq!(a.name(), "memory");
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    pub fn to<C>(self) -> &'c Container
    where
        C: Injectable,
        T: ServiceCast<C>,
    {
        let binding = self.binding_key();
        let implementation = ServiceType::injectable::<C>();
        let bound = binding.clone();
        let provider: Provider = Arc::new(move |ctx: &ResolutionContext<'_>| {
            let instance = ctx.resolve_implementation(&bound, &implementation)?;
            let concrete = downcast::<C>(&instance)?;
            Ok(erase(T::cast(concrete)))
        });
        self.register(binding, provider, Some(std::any::type_name::<C>()))
    }

    /// Binds to a factory invoked on every activation (once for singletons).
    pub fn to_factory<F>(self, factory: F) -> &'c Container
    where
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        let binding = self.binding_key();
        let provider: Provider = Arc::new(move |_: &ResolutionContext<'_>| Ok(erase(factory())));
        self.register(binding, provider, None)
    }

    /// Binds to a fallible factory that may resolve other services.
    ///
    /// Services resolved through the context share the current resolution,
    /// so dependency cycles through providers are reported as
    /// [`DiError::Circular`]. Errors returned by the provider are wrapped in
    /// [`DiError::Activation`] unless they already are a `DiError`.
    pub fn to_provider<F, E>(self, provider: F) -> &'c Container
    where
        F: for<'a> Fn(&ResolutionContext<'a>) -> Result<Arc<T>, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let binding = self.binding_key();
        let bound = binding.clone();
        let provider: Provider = Arc::new(move |ctx: &ResolutionContext<'_>| {
            provider(ctx)
                .map(erase)
                .map_err(|err| DiError::activation(&bound, err.into()))
        });
        self.register(binding, provider, None)
    }

    /// Binds to a fixed instance.
    pub fn to_instance(self, instance: Arc<T>) -> &'c Container {
        let binding = self.binding_key();
        let provider: Provider = Arc::new(move |_: &ResolutionContext<'_>| Ok(erase(instance.clone())));
        self.register(binding, provider, None)
    }

    fn binding_key(&self) -> BindingKey {
        BindingKey::new(ServiceType::of::<T>(), self.key.clone())
    }

    fn register(
        self,
        binding: BindingKey,
        provider: Provider,
        implementation: Option<&'static str>,
    ) -> &'c Container {
        self.container
            .register(Registration::new(binding, self.lifetime, provider, implementation));
        self.container
    }
}
