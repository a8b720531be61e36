//! Per-call resolution state and the plan-building algorithm.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::constructor::Parameter;
use crate::container::Container;
use crate::error::{DiError, DiResult, ProviderPanic};
use crate::key::{BindingKey, Instance, ServiceType};
use crate::plan::BoundActivation;
use crate::registration::{Registration, Registry};
use crate::traits::ServiceLocator;

/// State of one top-level resolution.
///
/// The context owns the stack of `(type, key)` pairs currently being planned
/// or activated and holds the container's registry for the whole call.
/// Providers registered with
/// [`BindingBuilder::to_provider`](crate::BindingBuilder::to_provider)
/// receive the context and may resolve further services through it; those
/// nested resolutions share the stack, so cycles through providers are
/// detected, and they never count as reentrant calls into the container.
///
/// # Examples
///
/// ```rust
/// use ferrous_ioc::{Container, Resolver};
/// use std::sync::Arc;
///
/// struct Settings { name: String }
/// struct Greeting(String);
///
/// let ioc = Container::new();
/// ioc.bind::<Settings>().to_instance(Arc::new(Settings { name: "ioc".into() }));
/// ioc.bind::<Greeting>().to_provider(|ctx| {
///     let settings = ctx.resolve::<Settings>()?;
///     Ok::<_, ferrous_ioc::DiError>(Arc::new(Greeting(format!("hello {}", settings.name))))
/// });
///
/// assert_eq!(ioc.resolve::<Greeting>().unwrap().0, "hello ioc");
/// ```
pub struct ResolutionContext<'a> {
    container: &'a Container,
    registry: &'a Registry,
    stack: RefCell<Vec<BindingKey>>,
    /// First cycle or parent failure seen while planning; reported when
    /// planning fails as a whole.
    failure: RefCell<Option<DiError>>,
}

pub(crate) struct Frame<'c> {
    stack: &'c RefCell<Vec<BindingKey>>,
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}

impl<'a> ResolutionContext<'a> {
    pub(crate) fn new(container: &'a Container, registry: &'a Registry) -> Self {
        Self {
            container,
            registry,
            stack: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
        }
    }

    /// Number of services currently being planned or activated.
    pub fn depth(&self) -> usize {
        self.stack.borrow().len()
    }

    /// The `(type, key)` pairs currently being planned or activated,
    /// outermost first.
    pub fn active_bindings(&self) -> Vec<BindingKey> {
        self.stack.borrow().clone()
    }

    pub(crate) fn push_frame(&self, binding: &BindingKey) -> Frame<'_> {
        self.stack.borrow_mut().push(binding.clone());
        Frame { stack: &self.stack }
    }

    /// Runs user code, turning a panic into an activation failure.
    pub(crate) fn guard_user_code<F>(&self, binding: &BindingKey, f: F) -> DiResult<Instance>
    where
        F: FnOnce() -> DiResult<Instance>,
    {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => {
                let panic = ProviderPanic::from_payload(payload.as_ref());
                tracing::error!(service = %binding, message = %panic.0, "provider panicked");
                Err(DiError::activation(binding, Box::new(panic)))
            }
        }
    }

    pub(crate) fn activate_registration(&self, registration: &Arc<Registration>) -> DiResult<Instance> {
        let binding = &registration.binding;
        let _frame = self.push_frame(binding);
        let invoke = || self.guard_user_code(binding, || (registration.provider)(self));

        match &registration.singleton {
            Some(cell) => {
                let timeout = self.container.options().singleton_timeout;
                cell.get_or_activate(binding, timeout, || {
                    tracing::debug!(service = %binding, "activating singleton");
                    invoke()
                })
            }
            None => invoke(),
        }
    }

    /// Plans and activates `(service, key)`.
    pub(crate) fn resolve_top(&self, service: &ServiceType, key: Option<&str>) -> DiResult<Instance> {
        let binding = BindingKey::new(*service, key.map(Arc::from));
        self.plan_and_activate(&binding, || self.try_plan(service, key))
    }

    /// Activates the implementation type behind a `to::<C>()` binding.
    ///
    /// A default self binding (`bind::<C>().to::<C>()`) is already on the
    /// stack, so it goes straight to constructor matching instead of finding
    /// itself as a cycle.
    pub(crate) fn resolve_implementation(
        &self,
        bound: &BindingKey,
        implementation: &ServiceType,
    ) -> DiResult<Instance> {
        let target = BindingKey::new(*implementation, None);
        if *bound == target {
            self.plan_and_activate(&target, || self.plan_constructors(&target))
        } else {
            self.plan_and_activate(&target, || self.try_plan(implementation, None))
        }
    }

    /// Activates every local binding of `service` in registration order.
    ///
    /// Fails with [`DiError::Circular`] when one of those bindings is
    /// already being activated in this resolution.
    pub(crate) fn resolve_all(&self, service: &ServiceType) -> DiResult<Vec<Instance>> {
        let registrations: Vec<Arc<Registration>> = self.registry.all_of(service).cloned().collect();
        tracing::debug!(service = %service, count = registrations.len(), "resolving all bindings");
        registrations
            .iter()
            .map(|registration| {
                // A provider enumerating its own service would otherwise
                // activate itself again without end.
                if let Some(cycle) = self.cycle_through(&registration.binding) {
                    tracing::warn!(path = %cycle.join(" -> "), "dependency cycle detected");
                    return Err(DiError::Circular(cycle));
                }
                self.activate_registration(registration)
            })
            .collect()
    }

    fn plan_and_activate<F>(&self, binding: &BindingKey, plan: F) -> DiResult<Instance>
    where
        F: FnOnce() -> Option<BoundActivation>,
    {
        // Nested resolutions through providers get their own failure record.
        let outer = self.failure.take();
        let planned = plan();
        let failure = self.failure.replace(outer);

        match planned {
            Some(plan) => plan.activate(self),
            None => Err(failure.unwrap_or_else(|| DiError::NotResolvable(binding.to_string()))),
        }
    }

    fn try_plan(&self, service: &ServiceType, key: Option<&str>) -> Option<BoundActivation> {
        let binding = BindingKey::new(*service, key.map(Arc::from));
        if let Some(cycle) = self.cycle_through(&binding) {
            tracing::warn!(path = %cycle.join(" -> "), "dependency cycle detected");
            self.record_failure(DiError::Circular(cycle));
            return None;
        }
        let _frame = self.push_frame(&binding);

        if let Some(registration) = self.registry.get(service, key) {
            tracing::trace!(service = %binding, "binding found");
            return Some(BoundActivation::Binding(registration.clone()));
        }
        if let Some(plan) = self.plan_constructors(&binding) {
            return Some(plan);
        }
        self.delegate_to_parent(binding)
    }

    /// Tries constructors greediest first and keeps the first whose
    /// parameters all resolve.
    fn plan_constructors(&self, binding: &BindingKey) -> Option<BoundActivation> {
        'ctors: for ctor in binding.service().constructors() {
            let mut args = Vec::with_capacity(ctor.arity());
            for param in ctor.params() {
                match self.plan_parameter(param) {
                    Some(arg) => args.push(arg),
                    None => {
                        tracing::trace!(
                            service = %binding,
                            arity = ctor.arity(),
                            parameter = %param.binding(),
                            "constructor not satisfiable"
                        );
                        continue 'ctors;
                    }
                }
            }

            let arity = ctor.arity();
            let plan = BoundActivation::Construct {
                binding: binding.clone(),
                ctor,
                args,
            };
            if let Some(cycle) = plan.find_cycle() {
                tracing::warn!(path = %cycle.join(" -> "), "constructor plan contains a cycle");
                self.record_failure(DiError::Circular(cycle));
                continue;
            }
            tracing::debug!(service = %binding, arity, "constructor selected");
            return Some(plan);
        }
        None
    }

    fn plan_parameter(&self, param: &Parameter) -> Option<BoundActivation> {
        let binding = param.binding();
        self.try_plan(binding.service(), binding.key()).or_else(|| {
            if !param.falls_back_to_default() {
                return None;
            }
            tracing::debug!(parameter = %binding, "keyed binding missing, falling back to default");
            self.try_plan(binding.service(), None)
        })
    }

    fn delegate_to_parent(&self, binding: BindingKey) -> Option<BoundActivation> {
        let parent = self.container.parent()?;
        match parent.resolve_service(binding.service(), binding.key()) {
            Ok(instance) => {
                tracing::debug!(service = %binding, "resolved by parent container");
                Some(BoundActivation::Activated { binding, instance })
            }
            Err(DiError::NotResolvable(_)) => None,
            Err(err) => {
                tracing::debug!(service = %binding, error = %err, "parent container failed");
                self.record_failure(err);
                None
            }
        }
    }

    fn cycle_through(&self, binding: &BindingKey) -> Option<Vec<String>> {
        let stack = self.stack.borrow();
        let start = stack.iter().position(|active| active == binding)?;
        let mut path: Vec<String> = stack[start..].iter().map(ToString::to_string).collect();
        path.push(binding.to_string());
        Some(path)
    }

    fn record_failure(&self, err: DiError) {
        let mut slot = self.failure.borrow_mut();
        if slot.is_none() {
            *slot = Some(err);
        }
    }
}

impl ServiceLocator for ResolutionContext<'_> {
    fn resolve_service(&self, service: &ServiceType, key: Option<&str>) -> DiResult<Instance> {
        self.resolve_top(service, key)
    }

    fn resolve_all_services(&self, service: &ServiceType) -> DiResult<Vec<Instance>> {
        self.resolve_all(service)
    }
}
