//! Resolution plans: how a requested service will be activated.
//!
//! A plan is built fresh for each resolution, checked for cycles, walked once
//! to produce the instance and then dropped.

use std::sync::Arc;

use crate::constructor::{Args, ErasedConstructor};
use crate::context::ResolutionContext;
use crate::error::{DiError, DiResult};
use crate::key::{BindingKey, Instance};
use crate::registration::Registration;

pub(crate) enum BoundActivation {
    /// Invoke a registered binding's provider.
    Binding(Arc<Registration>),
    /// An instance the parent container already produced.
    Activated { binding: BindingKey, instance: Instance },
    /// Call a constructor with the activated child plans as arguments.
    Construct {
        binding: BindingKey,
        ctor: ErasedConstructor,
        args: Vec<BoundActivation>,
    },
}

impl BoundActivation {
    pub(crate) fn binding(&self) -> &BindingKey {
        match self {
            BoundActivation::Binding(registration) => &registration.binding,
            BoundActivation::Activated { binding, .. } => binding,
            BoundActivation::Construct { binding, .. } => binding,
        }
    }

    /// Returns the first repeated `(type, key)` path in the tree, if any.
    pub(crate) fn find_cycle(&self) -> Option<Vec<String>> {
        let mut path = Vec::new();
        Self::walk(self, &mut path)
    }

    fn walk<'p>(node: &'p BoundActivation, path: &mut Vec<&'p BindingKey>) -> Option<Vec<String>> {
        let binding = node.binding();
        if let Some(start) = path.iter().position(|seen| *seen == binding) {
            let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
            cycle.push(binding.to_string());
            return Some(cycle);
        }

        path.push(binding);
        if let BoundActivation::Construct { args, .. } = node {
            for arg in args {
                if let Some(cycle) = Self::walk(arg, path) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        None
    }

    /// Materialises the plan, children first, in parameter order.
    pub(crate) fn activate(&self, ctx: &ResolutionContext<'_>) -> DiResult<Instance> {
        match self {
            BoundActivation::Binding(registration) => ctx.activate_registration(registration),
            BoundActivation::Activated { instance, .. } => Ok(instance.clone()),
            BoundActivation::Construct { binding, ctor, args } => {
                let _frame = ctx.push_frame(binding);
                let values = args
                    .iter()
                    .map(|arg| arg.activate(ctx))
                    .collect::<DiResult<Vec<_>>>()?;

                tracing::trace!(service = %binding, arity = ctor.arity(), "invoking constructor");
                let mut args = Args::new(ctor.owner().name(), values);
                ctx.guard_user_code(binding, || {
                    ctor.invoke(&mut args).map_err(|err| DiError::activation(binding, err))
                })
            }
        }
    }
}
