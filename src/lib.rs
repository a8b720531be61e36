//! # ferrous-ioc
//!
//! Inversion-of-control container for Rust with constructor matching, keyed
//! bindings, lazily created singletons and parent containers.
//!
//! ## Features
//!
//! - **Implicit construction**: unbound types are built by matching their
//!   declared constructors, greediest first, against what the container can
//!   resolve
//! - **Keyed bindings**: several bindings per service type, selected by key,
//!   with optional fallback to the default binding per constructor parameter
//! - **Singletons**: created once per container, with concurrent first
//!   activations serialised and a bounded wait
//! - **Parent containers**: a child falls back to its parent and shadows it
//! - **Cycle detection**: dependency cycles fail with the full path instead
//!   of overflowing the stack
//! - **Recursion control**: providers calling back into their own container
//!   are rejected or depth-limited
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_ioc::{implements, Constructor, Container, Injectable, Resolver};
//! use std::sync::Arc;
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> String;
//! }
//!
//! struct SmtpMailer;
//! impl Mailer for SmtpMailer {
//!     fn send(&self, to: &str) -> String { format!("mail to {}", to) }
//! }
//! impl Injectable for SmtpMailer {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![Constructor::new(|_| Ok(SmtpMailer))]
//!     }
//! }
//! implements!(SmtpMailer => dyn Mailer);
//!
//! struct SignupService {
//!     mailer: Arc<dyn Mailer>,
//! }
//! impl Injectable for SignupService {
//!     fn constructors() -> Vec<Constructor<Self>> {
//!         vec![
//!             Constructor::new(|args| Ok(SignupService { mailer: args.next()? }))
//!                 .param::<dyn Mailer>(),
//!         ]
//!     }
//! }
//!
//! let ioc = Container::new();
//! ioc.bind::<dyn Mailer>().single_instance().to::<SmtpMailer>();
//!
//! // SignupService has no binding; it is built from its constructor.
//! let signup = ioc.resolve_injectable::<SignupService>().unwrap();
//! assert_eq!(signup.mailer.send("ada"), "mail to ada");
//! ```
//!
//! ## Keyed bindings
//!
//! ```rust
//! use ferrous_ioc::{Container, Resolver};
//! use std::sync::Arc;
//!
//! let ioc = Container::new();
//! ioc.bind::<String>().to_instance(Arc::new("default".to_string()));
//! ioc.bind::<String>().keyed("eu").to_instance(Arc::new("eu-west".to_string()));
//!
//! assert_eq!(*ioc.resolve::<String>().unwrap(), "default");
//! assert_eq!(*ioc.resolve_keyed::<String>("eu").unwrap(), "eu-west");
//! assert!(ioc.resolve_keyed::<String>("us").is_err());
//! ```
//!
//! ## Logging
//!
//! The container emits `tracing` spans and events: a `resolve` span per
//! top-level resolution, `DEBUG` events for registrations, constructor
//! selection and parent delegation, `WARN` for cycles, timeouts and rejected
//! reentry, `ERROR` for failed activations. Install any subscriber to see
//! them, or register a [`ResolutionObserver`].

// Module declarations
pub mod constructor;
pub mod container;
pub mod context;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod traits;

#[cfg(feature = "config")]
pub mod config;

// Internal modules
mod internal;
mod macros;
mod plan;
mod registration;
mod singleton;

use std::sync::Arc;

// Re-export core types
pub use constructor::{Args, Constructor, Injectable, Parameter};
pub use container::{BindingBuilder, Container, ContainerBuilder, ContainerOptions};
pub use context::ResolutionContext;
pub use descriptors::BindingDescriptor;
pub use error::{BoxError, DiError, DiResult, ProviderPanic};
pub use key::{downcast, erase, BindingKey, Instance, ServiceCast, ServiceType};
pub use lifetime::Lifetime;
pub use observer::{LoggingObserver, ResolutionObserver};
pub use singleton::SingletonState;
pub use traits::{Resolver, ServiceLocator};

// ===== Configuration Pattern =====

/// Configuration value injected as a dependency.
///
/// Registered with [`Container::configure`] (or
/// [`configure_keyed`](Container::configure_keyed)) as a singleton, so
/// constructors can ask for "the configuration of `T`" instead of a raw
/// value:
///
/// ```
/// use ferrous_ioc::{Configuration, Constructor, Container, Injectable, Resolver};
/// use std::sync::Arc;
///
/// struct CacheOptions { capacity: usize }
///
/// struct Cache { capacity: usize }
/// impl Injectable for Cache {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|args| {
///                 let options: Arc<Configuration<CacheOptions>> = args.next()?;
///                 Ok(Cache { capacity: options.value().capacity })
///             })
///             .param::<Configuration<CacheOptions>>(),
///         ]
///     }
/// }
///
/// let ioc = Container::new();
/// ioc.configure(CacheOptions { capacity: 128 });
///
/// let cache = ioc.resolve_injectable::<Cache>().unwrap();
/// assert_eq!(cache.capacity, 128);
/// ```
pub struct Configuration<T> {
    inner: Arc<T>,
}

impl<T> Configuration<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Arc::new(value) }
    }

    /// Gets a reference to the configured value.
    pub fn value(&self) -> &T {
        &self.inner
    }

    /// Gets a shared handle to the configured value.
    pub fn get(&self) -> Arc<T> {
        self.inner.clone()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Configuration<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Configuration").field(&self.inner).finish()
    }
}
