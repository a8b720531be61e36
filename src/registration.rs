//! Binding registrations and the ordered registry that stores them.

use std::any::TypeId;
use std::sync::Arc;

use ahash::AHashMap;

use crate::context::ResolutionContext;
use crate::error::DiResult;
use crate::key::{BindingKey, Instance, ServiceType};
use crate::lifetime::Lifetime;
use crate::singleton::SingletonCell;

/// Type-erased provider invoked to activate a binding.
pub(crate) type Provider =
    Arc<dyn for<'a> Fn(&ResolutionContext<'a>) -> DiResult<Instance> + Send + Sync>;

/// One registered binding.
pub(crate) struct Registration {
    pub(crate) binding: BindingKey,
    pub(crate) lifetime: Lifetime,
    pub(crate) provider: Provider,
    /// Present iff `lifetime` is `Singleton`.
    pub(crate) singleton: Option<SingletonCell>,
    /// Implementation type name, for diagnostics.
    pub(crate) implementation: Option<&'static str>,
}

impl Registration {
    pub(crate) fn new(
        binding: BindingKey,
        lifetime: Lifetime,
        provider: Provider,
        implementation: Option<&'static str>,
    ) -> Self {
        let singleton = match lifetime {
            Lifetime::Singleton => Some(SingletonCell::new()),
            Lifetime::Transient => None,
        };
        Self {
            binding,
            lifetime,
            provider,
            singleton,
            implementation,
        }
    }
}

/// Registry of bindings, at most one per `(type, key)`.
///
/// Entries keep registration order for bulk enumeration; replacing a binding
/// reuses the slot of the binding it replaces.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Arc<Registration>>,
    /// Entry positions per service type, in registration order
    index: AHashMap<TypeId, Vec<usize>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the binding for `registration.binding`.
    ///
    /// Returns `true` when an earlier binding was replaced. Singletons already
    /// handed out by the old binding stay with their holders.
    pub(crate) fn insert(&mut self, registration: Registration) -> bool {
        let service = *registration.binding.service();
        let key = registration.binding.key().map(str::to_owned);
        let slots = self.index.entry(service.id()).or_default();

        let existing = slots
            .iter()
            .copied()
            .find(|&i| self.entries[i].binding.matches(&service, key.as_deref()));

        match existing {
            Some(i) => {
                self.entries[i] = Arc::new(registration);
                true
            }
            None => {
                slots.push(self.entries.len());
                self.entries.push(Arc::new(registration));
                false
            }
        }
    }

    /// Exact lookup, no fallback.
    #[inline]
    pub(crate) fn get(&self, service: &ServiceType, key: Option<&str>) -> Option<&Arc<Registration>> {
        self.index
            .get(&service.id())?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|reg| reg.binding.matches(service, key))
    }

    /// All bindings of `service`, any key, in registration order.
    pub(crate) fn all_of<'r>(&'r self, service: &ServiceType) -> impl Iterator<Item = &'r Arc<Registration>> + 'r {
        self.index
            .get(&service.id())
            .into_iter()
            .flatten()
            .map(move |&i| &self.entries[i])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.entries.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
