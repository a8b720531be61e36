//! Constructor descriptions used for implicit construction.
//!
//! A type opts into implicit construction by implementing [`Injectable`] and
//! listing its constructors. Each constructor names its parameters up front,
//! so the container can decide whether it is satisfiable before calling it.

use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult};
use crate::key::{downcast, erase, BindingKey, Instance, ServiceType};

/// A type the container can construct by matching one of its constructors.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Constructor, Container, Injectable, Resolver};
/// use std::sync::Arc;
///
/// struct Config { port: u16 }
///
/// struct Server { config: Arc<Config> }
///
/// impl Injectable for Server {
///     fn constructors() -> Vec<Constructor<Self>> {
///         vec![
///             Constructor::new(|args| Ok(Server { config: args.next()? }))
///                 .param::<Config>(),
///         ]
///     }
/// }
///
/// let ioc = Container::new();
/// ioc.bind::<Config>().to_instance(Arc::new(Config { port: 8080 }));
///
/// let server = ioc.resolve_injectable::<Server>().unwrap();
/// assert_eq!(server.config.port, 8080);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// All constructors of the type, in any order.
    fn constructors() -> Vec<Constructor<Self>>;
}

/// One constructor parameter: the service it needs and how to look it up.
///
/// The optional key plays the role of a binding-key annotation on the
/// parameter. With [`or_default`](Parameter::or_default) a missing keyed
/// binding falls back to the default binding of the same type.
#[derive(Clone)]
pub struct Parameter {
    binding: BindingKey,
    fallback_to_default: bool,
}

impl Parameter {
    /// Parameter resolved from bindings (or the parent) only.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::for_service(ServiceType::of::<T>())
    }

    /// Parameter whose type may itself be constructed implicitly.
    pub fn injectable<C: Injectable>() -> Self {
        Self::for_service(ServiceType::injectable::<C>())
    }

    pub fn for_service(service: ServiceType) -> Self {
        Self {
            binding: BindingKey::new(service, None),
            fallback_to_default: false,
        }
    }

    /// Resolve this parameter from the binding registered under `key`.
    pub fn keyed(mut self, key: impl Into<Arc<str>>) -> Self {
        self.binding = BindingKey::new(*self.binding.service(), Some(key.into()));
        self
    }

    /// Retry with the default binding when the keyed one cannot be resolved.
    pub fn or_default(mut self) -> Self {
        self.fallback_to_default = true;
        self
    }

    pub fn binding(&self) -> &BindingKey {
        &self.binding
    }

    pub fn falls_back_to_default(&self) -> bool {
        self.fallback_to_default && self.binding.key().is_some()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("binding", &self.binding)
            .field("fallback_to_default", &self.fallback_to_default)
            .finish()
    }
}

type BuildFn<C> = Arc<dyn Fn(&mut Args) -> Result<C, BoxError> + Send + Sync>;

/// A constructor of `C`: its parameter list and the closure that builds `C`
/// from the resolved arguments.
///
/// Parameters are declared in the order the closure consumes them with
/// [`Args::next`].
pub struct Constructor<C> {
    params: Vec<Parameter>,
    build: BuildFn<C>,
}

impl<C: Injectable> Constructor<C> {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&mut Args) -> Result<C, BoxError> + Send + Sync + 'static,
    {
        Self {
            params: Vec::new(),
            build: Arc::new(build),
        }
    }

    /// Adds a parameter resolved from bindings of `T`.
    pub fn param<T: ?Sized + 'static>(self) -> Self {
        self.with(Parameter::of::<T>())
    }

    /// Adds a parameter the container may construct implicitly.
    pub fn inject<D: Injectable>(self) -> Self {
        self.with(Parameter::injectable::<D>())
    }

    /// Adds a parameter bound under `key`.
    pub fn keyed<T: ?Sized + 'static>(self, key: impl Into<Arc<str>>) -> Self {
        self.with(Parameter::of::<T>().keyed(key))
    }

    /// Adds a parameter bound under `key`, falling back to the default binding.
    pub fn keyed_or_default<T: ?Sized + 'static>(self, key: impl Into<Arc<str>>) -> Self {
        self.with(Parameter::of::<T>().keyed(key).or_default())
    }

    pub fn with(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    fn erase(self) -> ErasedConstructor {
        let owner = ServiceType::injectable::<C>();
        let build = self.build;
        ErasedConstructor {
            owner,
            params: self.params.into(),
            invoke: Arc::new(move |args: &mut Args| {
                let value = build(args)?;
                Ok(erase(Arc::new(value)))
            }),
        }
    }
}

pub(crate) fn erased_constructors<C: Injectable>() -> Vec<ErasedConstructor> {
    C::constructors().into_iter().map(Constructor::<C>::erase).collect()
}

type InvokeFn = Arc<dyn Fn(&mut Args) -> Result<Instance, BoxError> + Send + Sync>;

/// Type-erased constructor stored in resolution plans.
#[derive(Clone)]
pub(crate) struct ErasedConstructor {
    owner: ServiceType,
    params: Arc<[Parameter]>,
    invoke: InvokeFn,
}

impl ErasedConstructor {
    pub(crate) fn arity(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub(crate) fn owner(&self) -> &ServiceType {
        &self.owner
    }

    pub(crate) fn invoke(&self, args: &mut Args) -> Result<Instance, BoxError> {
        (self.invoke)(args)
    }
}

impl fmt::Debug for ErasedConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedConstructor")
            .field("owner", &self.owner.name())
            .field("params", &self.params)
            .finish()
    }
}

/// Materialised constructor arguments, consumed in parameter order.
pub struct Args {
    owner: &'static str,
    values: std::vec::IntoIter<Instance>,
    position: usize,
}

impl Args {
    pub(crate) fn new(owner: &'static str, values: Vec<Instance>) -> Self {
        Self {
            owner,
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Takes the next argument as an `Arc<T>`.
    ///
    /// Fails with [`DiError::TypeMismatch`] when the arguments are exhausted
    /// or the next one is not a `T`, which means the constructor's parameter
    /// list and its closure disagree.
    pub fn next<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        let value = self.values.next().ok_or_else(|| {
            tracing::error!(
                constructor = self.owner,
                position = self.position,
                "constructor consumed more arguments than it declared"
            );
            DiError::TypeMismatch(std::any::type_name::<T>())
        })?;
        self.position += 1;
        downcast::<T>(&value)
    }

    /// Number of arguments not yet consumed.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unit;

    impl Injectable for Unit {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![
                Constructor::new(|_| Ok(Unit)),
                Constructor::new(|args| {
                    let _: Arc<u32> = args.next()?;
                    let _: Arc<String> = args.next()?;
                    Ok(Unit)
                })
                .param::<u32>()
                .keyed::<String>("name"),
                Constructor::new(|args| {
                    let _: Arc<u32> = args.next()?;
                    Ok(Unit)
                })
                .param::<u32>(),
            ]
        }
    }

    #[test]
    fn test_constructors_sorted_greediest_first() {
        let ctors = ServiceType::injectable::<Unit>().constructors();
        let arities: Vec<usize> = ctors.iter().map(ErasedConstructor::arity).collect();
        assert_eq!(arities, vec![2, 1, 0]);
    }

    #[test]
    fn test_keyed_parameter_metadata() {
        let param = Parameter::of::<String>().keyed("name").or_default();
        assert_eq!(param.binding().key(), Some("name"));
        assert!(param.falls_back_to_default());

        // Fallback without a key is meaningless and reported as off.
        let unkeyed = Parameter::of::<String>().or_default();
        assert!(!unkeyed.falls_back_to_default());
    }

    #[test]
    fn test_args_type_mismatch() {
        let mut args = Args::new("Unit", vec![erase(Arc::new(5u32))]);
        assert!(matches!(args.next::<String>(), Err(DiError::TypeMismatch(_))));
        assert_eq!(args.remaining(), 0);
        assert!(args.next::<u32>().is_err());
    }

    #[test]
    fn test_erased_invoke_builds_instance() {
        let ctor = ServiceType::injectable::<Unit>()
            .constructors()
            .pop()
            .unwrap();
        assert_eq!(ctor.arity(), 0);
        let instance = ctor.invoke(&mut Args::new("Unit", Vec::new())).unwrap();
        assert!(downcast::<Unit>(&instance).is_ok());
    }
}
