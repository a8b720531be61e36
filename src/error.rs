//! Error types for the IoC container.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::key::BindingKey;

/// Boxed error returned by user factories and constructor closures.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Activation failure raised by the container.
///
/// Every failure that reaches a caller of [`Resolver`](crate::Resolver) is a
/// `DiError`. The variants distinguish why the activation failed; errors
/// raised by user code are carried in [`DiError::Activation`] with the
/// original error attached as the source.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, DiError, Resolver};
///
/// trait Clock: Send + Sync {}
///
/// let ioc = Container::new();
/// match ioc.resolve::<dyn Clock>() {
///     Err(DiError::NotResolvable(name)) => assert!(name.contains("Clock")),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_ioc::DiError;
///
/// let circular = DiError::Circular(vec!["A".to_string(), "B".to_string(), "A".to_string()]);
/// assert_eq!(circular.to_string(), "Circular dependency: A -> B -> A");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// No binding, no satisfiable constructor and no parent could provide the service
    #[error("Service not resolvable: {0}")]
    NotResolvable(String),
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<String>),
    /// A factory, provider or constructor failed while activating a service
    #[error("Activation of {service} failed: {cause}")]
    Activation {
        service: String,
        #[source]
        cause: Arc<dyn Error + Send + Sync + 'static>,
    },
    /// Gave up waiting for another thread to finish creating a singleton
    #[error("Timed out after {timeout:?} waiting for singleton {service}")]
    SingletonTimeout { service: String, timeout: Duration },
    /// Resolution re-entered the same container while recursion is disabled
    #[error("Reentrant resolution of {0} is not permitted on this container")]
    Reentrant(String),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Configuration could not be read or applied
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl DiError {
    /// Wraps an error raised while activating `service`.
    ///
    /// A `DiError` passed in comes back unchanged, so failures bubbling up
    /// through nested factories are never wrapped twice.
    pub fn activation(service: &BindingKey, cause: BoxError) -> Self {
        match cause.downcast::<DiError>() {
            Ok(inner) => *inner,
            Err(other) => DiError::Activation {
                service: service.to_string(),
                cause: Arc::from(other),
            },
        }
    }

    /// Returns `true` if the failure was caused by a dependency cycle.
    pub fn is_circular(&self) -> bool {
        matches!(self, DiError::Circular(_))
    }
}

/// Panic raised by user code during activation, captured as an error.
#[derive(Debug, Clone, thiserror::Error)]
#[error("provider panicked: {0}")]
pub struct ProviderPanic(pub String);

impl ProviderPanic {
    pub(crate) fn from_payload(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "non-string panic payload".to_string()
        };
        ProviderPanic(message)
    }
}

/// Result type for container operations.
///
/// ```rust
/// use ferrous_ioc::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NotResolvable("some_service".to_string()))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
