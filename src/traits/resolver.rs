//! Resolver traits for service resolution.

use std::sync::Arc;

use crate::constructor::Injectable;
use crate::error::DiResult;
use crate::key::{downcast, Instance, ServiceType};

/// Object-safe resolution by runtime type token.
///
/// This is the capability a parent container must offer: resolve one
/// service by type and optional key, and resolve every binding of a type.
/// [`Container`](crate::Container) implements it, and so can any
/// `Send + Sync` user type that should act as a parent.
/// [`ResolutionContext`](crate::ResolutionContext) implements it only for
/// nested resolutions inside providers; it borrows the resolving container
/// and can never be a parent.
///
/// Most callers use the typed methods of [`Resolver`] instead.
pub trait ServiceLocator {
    /// Resolves a single service.
    ///
    /// # Returns
    ///
    /// * `Ok(Instance)` - an `Arc<dyn Any>` holding the service's `Arc<T>`
    /// * `Err(DiError)` - the service is not resolvable or its activation failed
    fn resolve_service(&self, service: &ServiceType, key: Option<&str>) -> DiResult<Instance>;

    /// Resolves every explicit binding of `service`, in registration order.
    ///
    /// Returns an empty vector when nothing is bound.
    fn resolve_all_services(&self, service: &ServiceType) -> DiResult<Vec<Instance>>;
}

/// Typed resolution methods, available on every [`ServiceLocator`].
///
/// # Examples
///
/// ```
/// use ferrous_ioc::{implements, Container, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str) -> String;
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) -> String {
///         format!("LOG: {}", msg)
///     }
/// }
/// implements!(ConsoleLogger => dyn Logger);
///
/// let ioc = Container::new();
/// ioc.bind::<usize>().to_instance(Arc::new(42));
/// ioc.bind::<dyn Logger>().to_factory(|| Arc::new(ConsoleLogger));
///
/// let number = ioc.resolve_required::<usize>();
/// assert_eq!(*number, 42);
///
/// let logger = ioc.resolve::<dyn Logger>().unwrap();
/// assert_eq!(logger.log("ready"), "LOG: ready");
/// ```
pub trait Resolver: ServiceLocator {
    /// Resolves the default binding of `T`.
    ///
    /// `T` is looked up in explicit bindings and the parent only; use
    /// [`resolve_injectable`](Self::resolve_injectable) to let the container
    /// construct an unbound type.
    fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        let instance = self.resolve_service(&ServiceType::of::<T>(), None)?;
        downcast::<T>(&instance)
    }

    /// Resolves the binding of `T` registered under `key`.
    fn resolve_keyed<T: ?Sized + Send + Sync + 'static>(&self, key: &str) -> DiResult<Arc<T>> {
        let instance = self.resolve_service(&ServiceType::of::<T>(), Some(key))?;
        downcast::<T>(&instance)
    }

    /// Resolves `C`, constructing it from its constructors when unbound.
    ///
    /// ```
    /// use ferrous_ioc::{Constructor, Container, Injectable, Resolver};
    /// use std::sync::Arc;
    ///
    /// struct Clock;
    /// impl Injectable for Clock {
    ///     fn constructors() -> Vec<Constructor<Self>> {
    ///         vec![Constructor::new(|_| Ok(Clock))]
    ///     }
    /// }
    ///
    /// let ioc = Container::new();
    /// let a = ioc.resolve_injectable::<Clock>().unwrap();
    /// let b = ioc.resolve_injectable::<Clock>().unwrap();
    /// assert!(!Arc::ptr_eq(&a, &b));
    /// ```
    fn resolve_injectable<C: Injectable>(&self) -> DiResult<Arc<C>> {
        let instance = self.resolve_service(&ServiceType::injectable::<C>(), None)?;
        downcast::<C>(&instance)
    }

    /// Resolves `C` under `key`, constructing it when no such binding exists.
    fn resolve_injectable_keyed<C: Injectable>(&self, key: &str) -> DiResult<Arc<C>> {
        let instance = self.resolve_service(&ServiceType::injectable::<C>(), Some(key))?;
        downcast::<C>(&instance)
    }

    /// Resolves every binding of `T`, in registration order.
    fn resolve_all<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Vec<Arc<T>>> {
        self.resolve_all_services(&ServiceType::of::<T>())?
            .iter()
            .map(downcast::<T>)
            .collect()
    }

    /// Resolves the default binding of `T`, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be resolved.
    fn resolve_required<T: ?Sized + Send + Sync + 'static>(&self) -> Arc<T> {
        self.resolve::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", std::any::type_name::<T>(), e))
    }
}

impl<L: ServiceLocator + ?Sized> Resolver for L {}
