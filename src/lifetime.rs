//! Binding lifetime definitions.

/// Binding lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Lifetime, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let ioc = Container::new();
///
/// // Singleton: one instance for the lifetime of the container
/// ioc.bind::<Database>()
///     .lifetime(Lifetime::Singleton)
///     .to_factory(|| Arc::new(Database { url: "postgres://localhost".to_string() }));
///
/// // Transient: new instance every time
/// ioc.bind::<RequestModel>()
///     .to_factory(|| Arc::new(RequestModel { id: 12345 }));
///
/// let db1 = ioc.resolve::<Database>().unwrap();
/// let db2 = ioc.resolve::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let model1 = ioc.resolve::<RequestModel>().unwrap();
/// let model2 = ioc.resolve::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&model1, &model2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// New instance per activation, never cached
    ///
    /// Every occurrence of the binding in a resolution plan invokes the
    /// provider again, even within a single `resolve` call.
    #[default]
    Transient,
    /// Single instance per container, created lazily on first activation
    ///
    /// Concurrent first activations are serialised: exactly one thread runs
    /// the provider, the others wait for its outcome. A failed activation is
    /// permanent and is reported again on every later resolution.
    Singleton,
}
