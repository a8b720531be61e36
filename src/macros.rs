//! Declarative helpers for implementing [`Injectable`](crate::Injectable)
//! and [`ServiceCast`](crate::ServiceCast).

/// Implements [`Injectable`](crate::Injectable) for a struct whose fields
/// are all `Arc`s of services.
///
/// The generated single constructor takes one parameter per field, in field
/// order, each resolved from the default binding of the field's service
/// type. Types needing keyed parameters or several constructors implement
/// the trait by hand.
///
/// ```rust
/// use ferrous_ioc::{injectable, Container, Resolver};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
/// struct Fixed;
/// impl Clock for Fixed {
///     fn now(&self) -> u64 { 42 }
/// }
///
/// struct Audit {
///     clock: Arc<dyn Clock>,
///     tag: Arc<String>,
/// }
/// injectable!(Audit { clock: dyn Clock, tag: String });
///
/// let ioc = Container::new();
/// ioc.bind::<dyn Clock>().to_factory(|| Arc::new(Fixed));
/// ioc.bind::<String>().to_instance(Arc::new("audit".into()));
///
/// let audit = ioc.resolve_injectable::<Audit>().unwrap();
/// assert_eq!(audit.clock.now(), 42);
/// assert_eq!(*audit.tag, "audit");
/// ```
#[macro_export]
macro_rules! injectable {
    ($ty:ident { $($field:ident : $dep:ty),* $(,)? }) => {
        impl $crate::Injectable for $ty {
            fn constructors() -> ::std::vec::Vec<$crate::Constructor<Self>> {
                ::std::vec![
                    $crate::Constructor::new(|args: &mut $crate::Args| {
                        let _ = &args;
                        ::std::result::Result::Ok($ty {
                            $($field: args.next::<$dep>()?,)*
                        })
                    })
                    $(.param::<$dep>())*
                ]
            }
        }
    };
}

/// Declares that a concrete type can be served as one or more trait-object
/// services, enabling `bind::<dyn Trait>().to::<Concrete>()`.
///
/// ```rust
/// use ferrous_ioc::{implements, ServiceCast};
/// use std::sync::Arc;
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// struct File;
/// impl Reader for File {}
/// impl Writer for File {}
///
/// implements!(File => dyn Reader, dyn Writer);
///
/// let _reader: Arc<dyn Reader> = <dyn Reader as ServiceCast<File>>::cast(Arc::new(File));
/// ```
#[macro_export]
macro_rules! implements {
    ($concrete:ty => $($service:ty),+ $(,)?) => {
        $(
            impl $crate::ServiceCast<$concrete> for $service {
                fn cast(concrete: ::std::sync::Arc<$concrete>) -> ::std::sync::Arc<Self> {
                    concrete
                }
            }
        )+
    };
}
