//! Binding descriptors for introspection and diagnostics.

use crate::key::BindingKey;
use crate::lifetime::Lifetime;
use crate::singleton::SingletonState;

/// Binding descriptor for introspection and diagnostics
///
/// Describes one registered binding: its `(type, key)` identity, its
/// lifetime and, when bound with [`to`](crate::BindingBuilder::to), the
/// implementation type behind it.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{implements, Constructor, Container, Injectable, Lifetime, SingletonState};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {}
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
/// impl Injectable for ConsoleLogger {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![Constructor::new(|_| Ok(ConsoleLogger))]
///     }
/// }
/// implements!(ConsoleLogger => dyn Logger);
///
/// let ioc = Container::new();
/// ioc.bind::<u32>().keyed("port").to_instance(Arc::new(5432));
/// ioc.bind::<dyn Logger>().single_instance().to::<ConsoleLogger>();
///
/// let descriptors = ioc.binding_descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// assert_eq!(descriptors[0].type_name(), "u32");
/// assert_eq!(descriptors[0].binding_key(), Some("port"));
/// assert_eq!(descriptors[0].lifetime, Lifetime::Transient);
///
/// assert!(descriptors[1].type_name().contains("Logger"));
/// assert_eq!(descriptors[1].lifetime, Lifetime::Singleton);
/// assert!(descriptors[1].implementation.unwrap().contains("ConsoleLogger"));
/// assert_eq!(descriptors[1].singleton_state, Some(SingletonState::Uninitialized));
/// ```
#[derive(Debug, Clone)]
pub struct BindingDescriptor {
    /// The `(type, key)` identity of the binding
    pub key: BindingKey,
    /// Binding lifetime
    pub lifetime: Lifetime,
    /// Implementation type name, for bindings to an implementation type
    pub implementation: Option<&'static str>,
    /// State of the singleton cell at the time of the snapshot; `None` for
    /// transient bindings
    pub singleton_state: Option<SingletonState>,
}

impl BindingDescriptor {
    pub fn type_name(&self) -> &'static str {
        self.key.service().name()
    }

    /// The disambiguating key, or `None` for the default binding.
    pub fn binding_key(&self) -> Option<&str> {
        self.key.key()
    }

    pub fn is_keyed(&self) -> bool {
        self.binding_key().is_some()
    }
}
