//! Service identity: runtime type tokens and `(type, key)` binding keys.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::constructor::{erased_constructors, ErasedConstructor, Injectable};
use crate::error::{DiError, DiResult};

/// Type-erased service instance.
///
/// The payload is always an `Arc<T>` for the service type `T`, which lets
/// `T` be a trait object.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Runtime type token for a service.
///
/// Tokens compare by `TypeId` only; the name is carried for diagnostics.
/// A token created with [`ServiceType::injectable`] also knows how to list
/// the constructors of its type, which makes the type implicitly
/// constructible when no binding exists for it.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::ServiceType;
///
/// trait Logger: Send + Sync {}
///
/// let logger = ServiceType::of::<dyn Logger>();
/// assert!(logger.name().contains("Logger"));
/// assert!(!logger.is_constructible());
/// assert_eq!(logger, ServiceType::of::<dyn Logger>());
/// ```
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
    constructors: Option<fn() -> Vec<ErasedConstructor>>,
}

impl ServiceType {
    /// Token for any service type, including trait objects.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            constructors: None,
        }
    }

    /// Token for a type the container may construct itself.
    pub fn injectable<C: Injectable>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
            constructors: Some(erased_constructors::<C>),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether constructor matching can be attempted for this type.
    pub fn is_constructible(&self) -> bool {
        self.constructors.is_some()
    }

    /// Constructors ordered greediest first; ties keep declaration order.
    pub(crate) fn constructors(&self) -> Vec<ErasedConstructor> {
        let mut ctors = match self.constructors {
            Some(list) => list(),
            None => Vec::new(),
        };
        ctors.sort_by(|a, b| b.arity().cmp(&a.arity()));
        ctors
    }
}

impl PartialEq for ServiceType {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceType")
            .field("name", &self.name)
            .field("constructible", &self.is_constructible())
            .finish()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a binding: a service type plus an optional disambiguating key.
///
/// `None` is the default binding.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{BindingKey, ServiceType};
///
/// let default = BindingKey::new(ServiceType::of::<u32>(), None);
/// let port = BindingKey::new(ServiceType::of::<u32>(), Some("port".into()));
///
/// assert_ne!(default, port);
/// assert_eq!(port.key(), Some("port"));
/// assert_eq!(port.to_string(), "u32 [\"port\"]");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    service: ServiceType,
    key: Option<Arc<str>>,
}

impl BindingKey {
    pub fn new(service: ServiceType, key: Option<Arc<str>>) -> Self {
        Self { service, key }
    }

    pub fn of<T: ?Sized + 'static>(key: Option<&str>) -> Self {
        Self::new(ServiceType::of::<T>(), key.map(Arc::from))
    }

    pub fn service(&self) -> &ServiceType {
        &self.service
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The same service under the default (unkeyed) binding.
    pub fn default_binding(&self) -> Self {
        Self::new(self.service, None)
    }

    pub(crate) fn matches(&self, service: &ServiceType, key: Option<&str>) -> bool {
        self.service == *service && self.key() == key
    }
}

impl fmt::Debug for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingKey({})", self)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{} [{:?}]", self.service.name, key),
            None => f.write_str(self.service.name),
        }
    }
}

/// Conversion from an implementation `Arc<C>` to the service `Arc<Self>`.
///
/// Every type converts to itself. Trait-object services are declared with
/// [`implements!`](crate::implements):
///
/// ```rust
/// use ferrous_ioc::{implements, ServiceCast};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// implements!(English => dyn Greeter);
///
/// let greeter: Arc<dyn Greeter> = <dyn Greeter as ServiceCast<English>>::cast(Arc::new(English));
/// assert_eq!(greeter.greet(), "hello");
/// ```
pub trait ServiceCast<C> {
    fn cast(concrete: Arc<C>) -> Arc<Self>;
}

impl<C> ServiceCast<C> for C {
    #[inline]
    fn cast(concrete: Arc<C>) -> Arc<C> {
        concrete
    }
}

/// Wraps a typed `Arc<T>` as an [`Instance`].
#[inline]
pub fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// Recovers the typed `Arc<T>` from an [`Instance`].
#[inline]
pub fn downcast<T: ?Sized + Send + Sync + 'static>(instance: &Instance) -> DiResult<Arc<T>> {
    instance
        .downcast_ref::<Arc<T>>()
        .cloned()
        .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
}
